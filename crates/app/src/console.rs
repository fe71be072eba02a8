//! Wiring of the API client for the console.

use std::sync::Arc;

use groupguard_application::{ApiClient, Navigator};
use groupguard_domain::ClientConfig;
use groupguard_infrastructure::{FileCredentialStore, ReqwestTransport, load_config};
use tracing::{debug, warn};

use crate::cli::Cli;

/// Result type of console commands.
pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// A console has no login screen to return to; it tells the user instead.
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect_to_login(&self) {
        warn!("session expired; run `groupguard login` again");
    }
}

/// The API client the commands run against.
#[derive(Debug)]
pub struct Console {
    pub client: ApiClient,
}

impl Console {
    /// Loads configuration and builds the client over the real adapters.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let mut config = load_config(cli.config.as_deref())?;
        if let Some(base_url) = &cli.base_url {
            config = ClientConfig {
                base_url: base_url.clone(),
                ..config
            }
            .normalized();
            config.validate()?;
        }
        Self::new(config)
    }

    pub fn new(config: ClientConfig) -> CliResult<Self> {
        let store = FileCredentialStore::open(config.credentials_file.as_deref())?;
        debug!(
            base_url = %config.base_url,
            credentials = %store.path().display(),
            "console ready"
        );
        let transport = ReqwestTransport::new(&config)?;
        let client = ApiClient::new(
            config,
            Arc::new(transport),
            Arc::new(store),
            Arc::new(TerminalNavigator),
        );
        Ok(Self { client })
    }
}
