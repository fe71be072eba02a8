//! Command handlers.

mod account;
mod admin;
mod billing;
mod groups;
mod pair;

use groupguard_domain::Ack;

use crate::cli::Command;
use crate::console::{CliResult, Console};

/// Runs one parsed command.
pub async fn run(console: &Console, command: Command) -> CliResult {
    match command {
        Command::Login {
            phone,
            password,
            admin,
        } => account::login(console, &phone, &password, admin).await,
        Command::Register(args) => account::register(console, args).await,
        Command::Logout => account::logout(console).await,
        Command::Whoami => account::whoami(console).await,
        Command::Dashboard { limit } => account::dashboard(console, limit).await,
        Command::Notifications => account::notifications(console).await,
        Command::Groups(command) => groups::groups(console, command).await,
        Command::Words(command) => groups::words(console, command).await,
        Command::Protection(command) => groups::protection(console, command).await,
        Command::Subscription(command) => billing::subscription(console, command).await,
        Command::Pair { qr_out, timeout } => pair::pair(console, qr_out, timeout).await,
        Command::Admin(command) => admin::admin(console, command).await,
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// Prints the backend's message, or `fallback` when it sent none.
fn report(ack: &Ack, fallback: &str) {
    let message = ack.message.as_deref().unwrap_or(fallback);
    if ack.is_success() {
        println!("{message}");
    } else {
        eprintln!("failed: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blanks_become_dashes() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("Family")), "Family");
    }
}
