//! Group, banned-word and protection commands.

use groupguard_domain::Ack;
use groupguard_domain::resources::{NewBannedWord, ProtectionSettings};

use super::{or_dash, report};
use crate::cli::{GroupsCommand, ProtectionCommand, WordsCommand};
use crate::console::{CliResult, Console};

pub async fn groups(console: &Console, command: GroupsCommand) -> CliResult {
    let wa = console.client.whatsapp();
    let ack: Ack = match command {
        GroupsCommand::List => {
            let groups = wa.sync_groups().await?;
            if groups.is_empty() {
                println!("No groups; is the bot paired?");
            }
            for group in groups {
                println!(
                    "{:<40} {:<30} {:>5} {}",
                    or_dash(group.jid()),
                    group.title(),
                    group.size.map_or_else(String::new, |s| s.to_string()),
                    if group.is_protected { "protected" } else { "" },
                );
            }
            return Ok(());
        }
        GroupsCommand::Join { link } => wa.join_group(&link).await?,
        GroupsCommand::Leave { jid } => wa.leave_group(&jid).await?,
        GroupsCommand::Send { jid, text } => wa.send_message(&jid, &text).await?,
        GroupsCommand::Protect { jid } => console.client.user().toggle_group_protection(&jid).await?,
    };
    report(&ack, "Done");
    Ok(())
}

pub async fn words(console: &Console, command: WordsCommand) -> CliResult {
    let user = console.client.user();
    let ack = match command {
        WordsCommand::List => {
            let words = user.banned_words().await?;
            if words.is_empty() {
                println!("No banned words");
            }
            for word in words {
                println!(
                    "{:<26} {:<20} {:?}/{:?}/{:?} {}",
                    word.id,
                    word.word,
                    word.match_type,
                    word.severity,
                    word.action,
                    if word.is_active { "" } else { "(disabled)" },
                );
            }
            return Ok(());
        }
        WordsCommand::Add {
            word,
            match_type,
            severity,
            action,
            notes,
        } => {
            let word = NewBannedWord {
                match_type,
                severity,
                action,
                notes,
                ..NewBannedWord::new(word)
            };
            user.add_banned_word(word).await?
        }
        WordsCommand::Toggle { id } => user.toggle_banned_word(&id).await?,
        WordsCommand::Delete { id } => user.delete_banned_word(&id).await?,
    };
    report(&ack, "Done");
    Ok(())
}

pub async fn protection(console: &Console, command: ProtectionCommand) -> CliResult {
    let wa = console.client.whatsapp();
    let current = wa.protection_settings().await?;

    match command {
        ProtectionCommand::Show => {
            let Some(settings) = current else {
                println!("No bot session yet; pair a device first");
                return Ok(());
            };
            print_settings(&settings);
        }
        ProtectionCommand::Set {
            enabled,
            auto_kick,
            auto_delete,
            owner_bypass,
        } => {
            let mut settings = current.unwrap_or_default();
            let options = &mut settings.protection_settings;
            settings.protection_enabled = enabled.unwrap_or(settings.protection_enabled);
            options.auto_kick = auto_kick.unwrap_or(options.auto_kick);
            options.auto_delete = auto_delete.unwrap_or(options.auto_delete);
            options.allow_owner_bypass = owner_bypass.unwrap_or(options.allow_owner_bypass);

            let ack = wa.update_protection_settings(&settings).await?;
            report(&ack, "Settings saved");
            print_settings(&settings);
        }
    }
    Ok(())
}

fn print_settings(settings: &ProtectionSettings) {
    let options = &settings.protection_settings;
    println!("Protection:   {}", on_off(settings.protection_enabled));
    println!("Auto kick:    {}", on_off(options.auto_kick));
    println!("Auto delete:  {}", on_off(options.auto_delete));
    println!("Owner bypass: {}", on_off(options.allow_owner_bypass));
}

const fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
