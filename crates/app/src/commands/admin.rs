//! Back-office commands.

use groupguard_domain::AccountStatus;
use groupguard_domain::resources::NewBillingRecord;

use super::billing::file_name;
use super::{or_dash, report};
use crate::cli::AdminCommand;
use crate::console::{CliResult, Console};

#[allow(clippy::too_many_lines)]
pub async fn admin(console: &Console, command: AdminCommand) -> CliResult {
    let admin = console.client.admin();
    let ack = match command {
        AdminCommand::Stats => {
            let stats = admin.dashboard_stats().await?;
            println!("Users:      {} ({} active)", stats.total_users, stats.active_users);
            println!("Groups:     {}", stats.total_groups);
            println!("Broadcasts: {}", stats.total_broadcasts);
            return Ok(());
        }
        AdminCommand::Users => {
            for user in admin.users().await? {
                println!(
                    "{:<26} {:<24} {:<16} {:<10} {}",
                    user.id,
                    user.name,
                    user.phone,
                    status_name(&user.status),
                    or_dash(user.plan.as_deref()),
                );
            }
            return Ok(());
        }
        AdminCommand::SetStatus { id, status } => {
            admin.set_user_status(&id, &status.into()).await?
        }
        AdminCommand::ToggleUser { id } => {
            let users = admin.users().await?;
            let Some(user) = users.iter().find(|user| user.id == id) else {
                return Err(format!("no user with id {id}").into());
            };
            let status = admin.toggle_user_status(user).await?;
            println!("{} is now {}", user.name, status_name(&status));
            return Ok(());
        }
        AdminCommand::DeleteUser { id } => admin.delete_user(&id).await?,
        AdminCommand::Subscribers => {
            for subscriber in admin.new_subscribers().await? {
                println!(
                    "{:<26} {:<24} {:<16} {}",
                    subscriber.id,
                    subscriber.name,
                    subscriber.phone,
                    or_dash(subscriber.email.as_deref()),
                );
            }
            return Ok(());
        }
        AdminCommand::Review { id, reject } => admin.review_subscriber(&id, !reject).await?,
        AdminCommand::Requests => {
            for request in admin.subscription_requests().await? {
                println!(
                    "{:<26} {:<24} {:<12} {:>10} {}{}",
                    request.id,
                    request.name,
                    or_dash(request.plan.as_deref()),
                    request.amount.map_or_else(String::new, |a| a.to_string()),
                    or_dash(request.status.as_deref()),
                    if request.is_under_review() { " *" } else { "" },
                );
                print_proof(console, request.proof_file.as_deref());
            }
            return Ok(());
        }
        AdminCommand::ApproveRequest { id } => admin.approve_request(&id).await?,
        AdminCommand::RejectRequest { id, reason } => admin.reject_request(&id, &reason).await?,
        AdminCommand::Pending => {
            for pending in admin.pending_subscriptions().await? {
                println!(
                    "{:<26} {:<12} {:>10} {} ({} invoices)",
                    pending.id,
                    or_dash(pending.plan.as_deref()),
                    pending.amount.map_or_else(String::new, |a| a.to_string()),
                    pending.status.label(),
                    pending.invoices.len(),
                );
            }
            return Ok(());
        }
        AdminCommand::Approve { id } => admin.approve_subscription(&id).await?,
        AdminCommand::Reject { id, reason } => admin.reject_subscription(&id, &reason).await?,
        AdminCommand::Billing => {
            for record in admin.billing().await? {
                println!(
                    "{:<26} {:<12} {:>10} {:<12} {:<8} {}",
                    record.id,
                    or_dash(record.plan.as_deref()),
                    record.amount.map_or_else(String::new, |a| a.to_string()),
                    or_dash(record.method.as_deref()),
                    or_dash(record.status.as_deref()),
                    or_dash(record.date.as_deref()),
                );
                print_proof(console, record.proof_file.as_deref());
            }
            return Ok(());
        }
        AdminCommand::AddBilling {
            user_id,
            plan,
            amount,
            method,
            status,
            proof,
        } => {
            let proof = match proof {
                Some(path) => Some((file_name(&path), tokio::fs::read(&path).await?)),
                None => None,
            };
            let record = NewBillingRecord {
                user_id,
                plan,
                amount,
                method,
                status,
                proof,
            };
            admin.add_billing(record).await?
        }
        AdminCommand::Bots => {
            for bot in admin.bots().await? {
                println!(
                    "{:<26} {:<16} {:<12} {:>4} groups  {}",
                    bot.id,
                    or_dash(bot.user_phone.as_deref()),
                    or_dash(bot.status.as_deref()),
                    bot.groups_count,
                    or_dash(bot.last_seen.as_deref()),
                );
            }
            return Ok(());
        }
        AdminCommand::RestartBot { id } => admin.restart_bot(&id).await?,
        AdminCommand::StopBot { id } => admin.stop_bot(&id).await?,
        AdminCommand::Broadcasts => {
            for broadcast in admin.broadcasts().await? {
                println!("{}  {}", or_dash(broadcast.sent_at.as_deref()), broadcast.message);
            }
            return Ok(());
        }
        AdminCommand::Broadcast { message } => {
            let broadcast = admin.broadcast(&message).await?;
            println!("Broadcast {} sent", broadcast.id);
            return Ok(());
        }
    };
    report(&ack, "Done");
    Ok(())
}

fn print_proof(console: &Console, proof_file: Option<&str>) {
    if let Some(path) = proof_file.filter(|p| !p.is_empty()) {
        println!("    proof: {}", console.client.config().file_url(path));
    }
}

const fn status_name(status: &AccountStatus) -> &'static str {
    match status {
        AccountStatus::Active => "active",
        AccountStatus::Suspended => "suspended",
        AccountStatus::Banned => "banned",
        AccountStatus::Pending => "pending",
        AccountStatus::Unknown => "unknown",
    }
}
