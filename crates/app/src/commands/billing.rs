//! Subscription commands.

use std::path::Path;

use groupguard_domain::resources::{InvoiceUpload, NewSubscription, SubscriptionOverview};

use super::{or_dash, report};
use crate::cli::SubscriptionCommand;
use crate::console::{CliResult, Console};

pub async fn subscription(console: &Console, command: SubscriptionCommand) -> CliResult {
    let user = console.client.user();
    match command {
        SubscriptionCommand::Show => print_overview(&user.subscription().await?),
        SubscriptionCommand::Create {
            plan,
            amount,
            method,
        } => {
            let request = NewSubscription {
                plan,
                amount,
                payment_method: method,
            };
            let overview = user.create_subscription(&request).await?;
            if let Some(message) = &overview.message {
                println!("{message}");
            }
            print_overview(&overview);
        }
        SubscriptionCommand::Invoice {
            id,
            file,
            amount,
            method,
            reference,
        } => {
            let upload = InvoiceUpload {
                amount,
                method,
                reference,
                file_name: file_name(&file),
                bytes: tokio::fs::read(&file).await?,
            };
            let ack = user.upload_invoice(&id, upload).await?;
            report(&ack, "Proof uploaded; awaiting review");
        }
    }
    Ok(())
}

/// Last path component, as sent in the multipart part.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned())
}

fn print_overview(overview: &SubscriptionOverview) {
    let Some(subscription) = &overview.subscription else {
        println!("No subscription");
        return;
    };

    println!("Id:     {}", or_dash(subscription.id.as_deref()));
    println!("Plan:   {}", or_dash(subscription.plan.as_deref()));
    println!("Status: {}", subscription.status.label());
    if let Some(amount) = subscription.amount {
        println!(
            "Amount: {amount} {}",
            subscription.currency.as_deref().unwrap_or_default()
        );
    }
    if let Some(expires) = subscription.expires_at {
        println!("Expires: {}", expires.format("%Y-%m-%d"));
    }

    for invoice in &overview.invoices {
        println!(
            "- {} {:?} {}",
            or_dash(invoice.invoice_number.as_deref().or(invoice.id.as_deref())),
            invoice.status,
            invoice.amount.map_or_else(String::new, |a| a.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn uses_the_last_path_component() {
        assert_eq!(file_name(Path::new("/tmp/proofs/receipt.pdf")), "receipt.pdf");
        assert_eq!(file_name(Path::new("/")), "upload");
    }
}
