//! CLI command implementations

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthorizationGuard, FileTokenStore, LogNavigator, SessionState, TokenStore};
use crate::cli::{
    error, info, print_decision, print_emission, print_identity_table, print_status, success,
    warn, OutputFormat,
};
use crate::config::{self, Config};

/// Initialize a new caseguard.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("caseguard.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created caseguard.toml");
    Ok(())
}

/// Store a token, either given directly or taken from a login response body
pub async fn login(
    config_path: Option<&Path>,
    token: Option<String>,
    response: Option<&Path>,
    status: u16,
) -> Result<()> {
    let (_, session, _) = open(config_path)?;

    let applied = match (token, response) {
        (Some(token), _) => {
            session.apply_login(token.trim());
            true
        }
        (None, Some(path)) => {
            let body = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            session.apply_login_response(status, &body)
        }
        (None, None) => false,
    };

    if !applied {
        error("No token applied: response was not a successful login");
        anyhow::bail!("login response rejected");
    }

    match session.current_identity() {
        Some(identity) => success(&format!("Logged in as {}", identity.user_name)),
        None => warn("Token stored, but its claims could not be decoded"),
    }
    Ok(())
}

/// Clear the stored token
pub async fn logout(config_path: Option<&Path>) -> Result<()> {
    let (_, session, _) = open(config_path)?;
    session.apply_logout();
    success("Logged out");
    Ok(())
}

/// Show the decoded identity
pub async fn whoami(config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let (_, session, _) = open(config_path)?;
    let identity = session.current_identity();

    match format {
        OutputFormat::Table => match &identity {
            Some(identity) => print_identity_table(identity),
            None => info("Not logged in. Store a token with 'caseguard login --token <token>'"),
        },
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&identity)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&identity)?),
    }
    Ok(())
}

/// Show authentication state
pub async fn status(config_path: Option<&Path>) -> Result<()> {
    let (_, session, guard) = open(config_path)?;
    let expires_at = session
        .token()
        .and_then(|token| session.decoder().expires_at(&token));

    print_status(
        session.current_identity().as_ref(),
        guard.is_authenticated(),
        guard.is_admin(),
        expires_at,
    );
    Ok(())
}

/// Evaluate the guard for a route
pub async fn check(config_path: Option<&Path>, route: &str) -> Result<()> {
    let (_, _, guard) = open(config_path)?;
    let route = guard.routes().resolve(route);
    let decision = guard.can_enter(&route);
    print_decision(&route, &decision);
    Ok(())
}

/// Refresh on an interval and print every emission until interrupted
pub async fn watch(config_path: Option<&Path>, interval: u64) -> Result<()> {
    let (config, session, _) = open(config_path)?;
    let mut stream = session.observe();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    info(&format!(
        "Watching {} (Ctrl+C to stop)",
        config.token_path().display()
    ));

    loop {
        tokio::select! {
            item = stream.next() => match item {
                Some(identity) => print_emission(identity.as_ref()),
                None => break,
            },
            _ = ticker.tick() => session.refresh(),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn open(config_path: Option<&Path>) -> Result<(Config, SessionState, AuthorizationGuard)> {
    let config = config::load_config_or_default(config_path)?;
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::from_config(&config));
    let session = SessionState::from_config(&config, store, Arc::new(LogNavigator));
    let guard = AuthorizationGuard::new(session.clone(), config.routes.clone());
    Ok((config, session, guard))
}
