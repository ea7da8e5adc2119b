//! Local, best-effort decoding of token claims
//!
//! Only the payload segment is read. Signatures are never checked: the token
//! was issued by the backend and is treated as opaque apart from its public
//! claims. Every failure collapses into `None`.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::models::Identity;
use crate::config::ClaimsConfig;

/// Well-known claim keys, long claim-type URI first, short alias after
pub mod keys {
    pub const USER_ID: &[&str] = &[
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
        "nameidentifier",
    ];
    pub const NAME: &[&str] = &[
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
        "name",
    ];
    pub const EMAIL: &[&str] = &[
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
        "emailaddress",
        "email",
    ];
    pub const ROLE: &[&str] = &[
        "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
        "role",
    ];
    pub const GROUP_ID: &[&str] = &["GroupId"];
    pub const EXPIRY: &str = "exp";
}

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Maps a token's payload claims to an [`Identity`]
#[derive(Debug, Clone)]
pub struct ClaimsDecoder {
    admin_role: String,
}

impl Default for ClaimsDecoder {
    fn default() -> Self {
        Self::from_config(&ClaimsConfig::default())
    }
}

impl ClaimsDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClaimsConfig) -> Self {
        Self {
            admin_role: config.admin_role.clone(),
        }
    }

    /// Decode a token into an identity.
    ///
    /// Requires a three-segment token whose payload is a JSON object carrying a
    /// name claim. A missing email becomes an empty string; missing or
    /// non-numeric ids become `None`. Expiry is not consulted.
    pub fn decode(&self, token: Option<&str>) -> Option<Identity> {
        let claims = payload(token?)?;

        let Some(user_name) = claim_string(&claims, keys::NAME) else {
            debug!("Token payload has no name claim");
            return None;
        };

        let is_admin = claim_as_str(&claims, keys::ROLE) == Some(self.admin_role.as_str());

        Some(Identity {
            user_id: claim_string(&claims, keys::USER_ID).and_then(|v| parse_id(&v)),
            user_name,
            email: claim_string(&claims, keys::EMAIL).unwrap_or_default(),
            is_admin,
            group_id: claim_string(&claims, keys::GROUP_ID).and_then(|v| parse_id(&v)),
        })
    }

    /// Expiry instant of a token, if its `exp` claim is readable
    pub fn expires_at(&self, token: &str) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(expiry_seconds(token)?, 0)
    }

    /// Whether the token is expired now. Unreadable tokens count as expired.
    pub fn is_expired(&self, token: &str) -> bool {
        self.is_expired_at(token, Utc::now())
    }

    pub fn is_expired_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        match expiry_seconds(token) {
            Some(exp) => now.timestamp() >= exp,
            None => true,
        }
    }
}

fn payload(token: &str) -> Option<Map<String, Value>> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        debug!("Token has {} segments, expected 3", segments.len());
        return None;
    }

    let bytes = URL_SAFE_LENIENT
        .decode(segments[1])
        .or_else(|_| STANDARD_LENIENT.decode(segments[1]))
        .map_err(|e| debug!("Token payload is not base64: {}", e))
        .ok()?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            debug!("Token payload is not a JSON object");
            None
        }
        Err(e) => {
            debug!("Token payload is not JSON: {}", e);
            None
        }
    }
}

fn expiry_seconds(token: &str) -> Option<i64> {
    match payload(token)?.get(keys::EXPIRY)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lookup<'a>(claims: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|key| claims.get(*key))
}

fn claim_as_str<'a>(claims: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a str> {
    lookup(claims, aliases)?.as_str()
}

/// String claims pass through; numeric claims are rendered as text
fn claim_string(claims: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    match lookup(claims, aliases)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
