//! Session and subscriber overview commands.

use groupguard_domain::{RegistrationForm, Role};

use super::or_dash;
use crate::cli::RegisterArgs;
use crate::console::{CliResult, Console};

pub async fn login(console: &Console, phone: &str, password: &str, admin: bool) -> CliResult {
    let role = if admin { Role::Admin } else { Role::User };
    let outcome = console.client.login(phone, password, role).await?;

    println!("Logged in as {} ({})", outcome.user.name, outcome.user.role.as_str());
    if let Some(subscription) = &outcome.subscription {
        println!("Subscription: {}", subscription.status.label());
    }
    println!("Next: {}", outcome.landing.path());
    Ok(())
}

pub async fn register(console: &Console, args: RegisterArgs) -> CliResult {
    let form = RegistrationForm {
        confirm_password: args.confirm.unwrap_or_else(|| args.password.clone()),
        name: args.name,
        email: args.email,
        phone: args.phone,
        password: args.password,
    };
    let response = console.client.register(&form).await?;

    println!(
        "{}",
        response
            .message
            .as_deref()
            .unwrap_or("Account created; log in to choose a subscription.")
    );
    Ok(())
}

pub async fn logout(console: &Console) -> CliResult {
    console.client.logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami(console: &Console) -> CliResult {
    let session = console.client.session().await?;
    if session.token.is_none() {
        println!("Not logged in");
        return Ok(());
    }

    println!("Name:         {}", or_dash(session.name.as_deref()));
    println!("Role:         {}", session.role.unwrap_or_default().as_str());
    println!("User id:      {}", or_dash(session.user_id.as_deref()));
    if let Some(subscription) = &session.subscription {
        println!("Subscription: {}", subscription.status.label());
    }
    Ok(())
}

pub async fn dashboard(console: &Console, limit: u32) -> CliResult {
    let user = console.client.user();
    let profile = user.profile().await?;
    let stats = user.dashboard_stats().await?;
    let violations = user.recent_violations(limit).await?;

    println!("{} <{}>", profile.name, profile.phone);
    println!("Groups: {} ({} protected)", stats.user_groups, stats.active_groups);

    if violations.is_empty() {
        println!("No recent violations");
    }
    for violation in violations {
        println!(
            "- {} | {} | {}",
            or_dash(violation.group_name.as_deref()),
            or_dash(violation.detected_word.as_deref()),
            or_dash(violation.action.as_deref()),
        );
    }
    Ok(())
}

pub async fn notifications(console: &Console) -> CliResult {
    let notifications = console.client.user().notifications().await?;
    if notifications.is_empty() {
        println!("No notifications");
    }
    for notification in notifications {
        println!("{}  {}", or_dash(notification.date.as_deref()), notification.message);
    }
    Ok(())
}
