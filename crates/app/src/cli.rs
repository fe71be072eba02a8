//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use groupguard_domain::AccountStatus;
use groupguard_domain::resources::{MatchType, Severity, WordAction};

#[derive(Debug, Parser)]
#[command(name = "groupguard")]
#[command(about = "Console for the GroupGuard group protection service")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend address, overriding the configuration
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login {
        /// Phone number
        phone: String,
        /// Password
        #[arg(long, env = "GROUPGUARD_PASSWORD", hide_env_values = true)]
        password: String,
        /// Log in to the back office
        #[arg(long)]
        admin: bool,
    },

    /// Create an account
    Register(RegisterArgs),

    /// Forget the session
    Logout,

    /// Show the remembered session
    Whoami,

    /// Profile, group counters and recent violations
    Dashboard {
        /// Violations to show
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },

    /// List notifications
    Notifications,

    /// Manage groups
    #[command(subcommand)]
    Groups(GroupsCommand),

    /// Manage the banned-word list
    #[command(subcommand)]
    Words(WordsCommand),

    /// Show or change protection settings
    #[command(subcommand)]
    Protection(ProtectionCommand),

    /// Subscription and payment proofs
    #[command(subcommand)]
    Subscription(SubscriptionCommand),

    /// Pair a WhatsApp device with the bot
    Pair {
        /// Write data-URL codes to this file
        #[arg(long)]
        qr_out: Option<PathBuf>,
        /// Give up after this many seconds
        #[arg(long, default_value_t = 180)]
        timeout: u64,
    },

    /// Back-office operations
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// E-mail address
    #[arg(long)]
    pub email: String,
    /// Phone number, local or international
    #[arg(long)]
    pub phone: String,
    /// Password
    #[arg(long, env = "GROUPGUARD_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Password confirmation; defaults to the password
    #[arg(long)]
    pub confirm: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// Fetch groups from the bot
    List,
    /// Join a group by invite link
    Join {
        /// `https://chat.whatsapp.com/...` link
        link: String,
    },
    /// Leave a group
    Leave {
        /// Group JID
        jid: String,
    },
    /// Send a message to a group
    Send {
        /// Group JID
        jid: String,
        /// Message text
        text: String,
    },
    /// Toggle protection for one group
    Protect {
        /// Group JID
        jid: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum WordsCommand {
    /// List banned words
    List,
    /// Add a banned word
    Add {
        /// Word or phrase
        word: String,
        /// contains, exact, starts or ends
        #[arg(long = "type", default_value = "contains")]
        match_type: MatchType,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        severity: Severity,
        /// delete, kick, warn or mute
        #[arg(long, default_value = "kick")]
        action: WordAction,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Enable or disable a word
    Toggle {
        /// Word id
        id: String,
    },
    /// Delete a word
    Delete {
        /// Word id
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProtectionCommand {
    /// Show the settings
    Show,
    /// Change some settings; unspecified ones are kept
    Set {
        /// Master switch
        #[arg(long)]
        enabled: Option<bool>,
        /// Remove offenders
        #[arg(long)]
        auto_kick: Option<bool>,
        /// Delete offending messages
        #[arg(long)]
        auto_delete: Option<bool>,
        /// Never moderate group owners
        #[arg(long)]
        owner_bypass: Option<bool>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SubscriptionCommand {
    /// Show the subscription and invoices
    Show,
    /// Request a subscription
    Create {
        /// Plan name
        #[arg(long)]
        plan: String,
        /// Amount
        #[arg(long)]
        amount: String,
        /// Payment method
        #[arg(long)]
        method: String,
    },
    /// Upload a payment proof
    Invoice {
        /// Subscription id
        id: String,
        /// Proof image or PDF
        #[arg(long)]
        file: PathBuf,
        /// Amount paid
        #[arg(long)]
        amount: String,
        /// Payment method
        #[arg(long)]
        method: String,
        /// Transfer reference
        #[arg(long, default_value = "")]
        reference: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Active,
    Suspended,
    Banned,
    Pending,
}

impl From<StatusArg> for AccountStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => Self::Active,
            StatusArg::Suspended => Self::Suspended,
            StatusArg::Banned => Self::Banned,
            StatusArg::Pending => Self::Pending,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Platform counters
    Stats,
    /// List users
    Users,
    /// Set a user's status
    SetStatus {
        /// User id
        id: String,
        /// New status
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Suspend an active user or reactivate any other
    ToggleUser {
        /// User id
        id: String,
    },
    /// Delete a user
    DeleteUser {
        /// User id
        id: String,
    },
    /// Accounts waiting for review
    Subscribers,
    /// Approve or reject a new account
    Review {
        /// User id
        id: String,
        /// Reject instead of approving
        #[arg(long)]
        reject: bool,
    },
    /// Subscription requests
    Requests,
    /// Approve a subscription request
    ApproveRequest {
        /// Request id
        id: String,
    },
    /// Reject a subscription request
    RejectRequest {
        /// Request id
        id: String,
        /// Reason shown to the user
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Subscriptions waiting for payment review
    Pending,
    /// Approve a pending subscription
    Approve {
        /// Subscription id
        id: String,
    },
    /// Reject a pending subscription
    Reject {
        /// Subscription id
        id: String,
        /// Reason shown to the user
        #[arg(long)]
        reason: String,
    },
    /// Billing records
    Billing,
    /// Record a payment
    AddBilling {
        /// User id
        #[arg(long)]
        user_id: String,
        /// Plan name
        #[arg(long, default_value = "")]
        plan: String,
        /// Amount
        #[arg(long)]
        amount: String,
        /// Payment method
        #[arg(long, default_value = "")]
        method: String,
        /// Record status
        #[arg(long, default_value = "paid")]
        status: String,
        /// Payment proof file
        #[arg(long)]
        proof: Option<PathBuf>,
    },
    /// Bot instances
    Bots,
    /// Restart a bot
    RestartBot {
        /// Bot id
        id: String,
    },
    /// Stop a bot
    StopBot {
        /// Bot id
        id: String,
    },
    /// Past broadcasts
    Broadcasts,
    /// Send a broadcast to every user
    Broadcast {
        /// Message text
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_login() {
        let cli = Cli::try_parse_from([
            "groupguard",
            "--base-url",
            "http://api.test",
            "login",
            "772292869",
            "--password",
            "secret1",
            "--admin",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://api.test"));
        assert!(matches!(
            cli.command,
            Command::Login { ref phone, admin: true, .. } if phone == "772292869"
        ));
    }

    #[test]
    fn parses_word_options() {
        let cli = Cli::try_parse_from([
            "groupguard",
            "words",
            "add",
            "spam",
            "--type",
            "exact",
            "--severity",
            "high",
        ])
        .unwrap();

        let Command::Words(WordsCommand::Add {
            match_type,
            severity,
            action,
            ..
        }) = cli.command
        else {
            panic!("expected words add");
        };
        assert_eq!(match_type, MatchType::Exact);
        assert_eq!(severity, Severity::High);
        assert_eq!(action, WordAction::Kick);
    }

    #[test]
    fn rejects_unknown_match_type() {
        let result = Cli::try_parse_from(["groupguard", "words", "add", "spam", "--type", "fuzzy"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_admin_status() {
        let cli =
            Cli::try_parse_from(["groupguard", "admin", "set-status", "u1", "suspended"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Admin(AdminCommand::SetStatus {
                status: StatusArg::Suspended,
                ..
            })
        ));
    }
}
