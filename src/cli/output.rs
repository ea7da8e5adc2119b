//! CLI output formatting utilities

use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::auth::{AuthorizationDecision, Identity, Route};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

fn format_id(id: Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Print an identity as a two-column table
pub fn print_identity_table(identity: &Identity) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Claim").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let email = if identity.email.is_empty() {
        "-".to_string()
    } else {
        identity.email.clone()
    };
    let admin_color = if identity.is_admin {
        Color::Green
    } else {
        Color::Yellow
    };

    table.add_row(vec![Cell::new("User ID"), Cell::new(format_id(identity.user_id))]);
    table.add_row(vec![Cell::new("Name"), Cell::new(&identity.user_name)]);
    table.add_row(vec![Cell::new("Email"), Cell::new(email)]);
    table.add_row(vec![
        Cell::new("Admin"),
        Cell::new(if identity.is_admin { "yes" } else { "no" }).fg(admin_color),
    ]);
    table.add_row(vec![Cell::new("Group ID"), Cell::new(format_id(identity.group_id))]);

    println!("{table}");
}

/// Print session status details
pub fn print_status(
    identity: Option<&Identity>,
    authenticated: bool,
    admin: bool,
    expires_at: Option<DateTime<Utc>>,
) {
    println!("{}", "Session Status".bold().underline());
    println!();

    let user = identity
        .map(|i| i.user_name.clone())
        .unwrap_or_else(|| "-".to_string());
    println!("  {} {}", "User:".bold(), user);

    let auth = if authenticated {
        "authenticated".green()
    } else {
        "unauthenticated".red()
    };
    println!("  {} {}", "State:".bold(), auth);
    println!("  {} {}", "Admin:".bold(), if admin { "yes" } else { "no" });

    match expires_at {
        Some(at) => {
            let label = at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
            let label = if at <= Utc::now() {
                format!("{} (expired)", label).red()
            } else {
                label.normal()
            };
            println!("  {} {}", "Expires:".bold(), label);
        }
        None => println!("  {} -", "Expires:".bold()),
    }
}

/// Print a guard decision
pub fn print_decision(route: &Route, decision: &AuthorizationDecision) {
    if decision.allowed {
        success(&format!("{} ({}) may be entered", route, route.access));
    } else {
        let target = decision
            .redirect_target
            .as_ref()
            .map(|r| r.path.as_str())
            .unwrap_or("-");
        warn(&format!(
            "{} ({}) denied, redirect to {}",
            route, route.access, target.cyan()
        ));
    }
}

/// One line per identity emission, used by `watch`
pub fn print_emission(identity: Option<&Identity>) {
    let now = Utc::now().format("%H:%M:%S");
    match identity {
        Some(i) => println!(
            "[{}] {} {}{}",
            now,
            "●".green(),
            i.user_name,
            if i.is_admin { " (admin)" } else { "" }
        ),
        None => println!("[{}] {} logged out", now, "○".red()),
    }
}
