//! Socket.io push channel over tokio-tungstenite.
//!
//! Connects to the bot backend's socket.io endpoint using the websocket
//! transport only, joins the default namespace with the bearer credential,
//! and republishes every known event on an [`EventHub`]. Dropped connections
//! are retried on the configured schedule with ±50% jitter.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use groupguard_application::{CredentialStore, EventHub};
use groupguard_domain::{BearerToken, ClientConfig, PushEvent, ReconnectPolicy};
use rand::Rng;
use serde_json::{Value, json};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, error, info, warn};
use url::Url;

use super::frame::{self, Frame};

/// Silence tolerated before the server's handshake arrives.
const DEFAULT_HEARTBEAT_MS: u64 = 45_000;

/// Push channel errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    /// The channel address is unusable.
    #[error("invalid push URL: {0}")]
    InvalidUrl(String),

    /// Websocket failure.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// The server refused the namespace join, usually a bad credential.
    #[error("connection rejected: {0}")]
    Rejected(String),

    /// Every reconnection attempt failed.
    #[error("reconnection failed after {attempts} attempts")]
    ReconnectFailed {
        /// Attempts made.
        attempts: u32,
    },

    /// The background task panicked or was aborted.
    #[error("push task failed: {0}")]
    Task(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for PushError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(error.to_string())
    }
}

/// Websocket endpoint for a backend address.
///
/// `http` becomes `ws` and `https` becomes `wss`; the socket.io path and the
/// engine.io query are appended.
///
/// # Errors
///
/// Returns `InvalidUrl` for unparseable addresses and non-HTTP schemes.
pub fn websocket_url(base: &str) -> Result<Url, PushError> {
    let mut url = Url::parse(base).map_err(|e| PushError::InvalidUrl(format!("{e}: {base}")))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(PushError::InvalidUrl(format!(
                "unsupported scheme '{other}': {base}"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| PushError::InvalidUrl(base.to_string()))?;

    let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

/// Delay before reconnection attempt `attempt`, randomized by ±50% and
/// capped at the policy ceiling.
#[must_use]
pub fn jittered_delay(policy: &ReconnectPolicy, attempt: u32) -> Duration {
    let factor = rand::rng().random_range(0.5..=1.5);
    policy
        .base_delay(attempt)
        .mul_f64(factor)
        .min(Duration::from_millis(policy.delay_max_ms))
}

/// Why one connection ended.
#[derive(Debug)]
enum SessionEnd {
    /// Local shutdown.
    Shutdown,
    /// The server left the namespace on purpose; socket.io does not retry.
    ServerDisconnect,
    /// The connection dropped.
    Dropped(String),
}

/// A socket.io client feeding an [`EventHub`].
pub struct PushChannel {
    url: Url,
    token: BearerToken,
    store: Option<Arc<dyn CredentialStore>>,
    policy: ReconnectPolicy,
    hub: Arc<EventHub>,
}

impl fmt::Debug for PushChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushChannel")
            .field("url", &self.url)
            .field("policy", &self.policy)
            .field("follows_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl PushChannel {
    /// Creates a channel for the configured push address.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the address is unusable.
    pub fn new(
        config: &ClientConfig,
        token: BearerToken,
        hub: Arc<EventHub>,
    ) -> Result<Self, PushError> {
        Ok(Self {
            url: websocket_url(config.ws_url())?,
            token,
            store: None,
            policy: config.reconnect,
            hub,
        })
    }

    /// Reads the credential from `store` on every (re)connect, so a token
    /// renewed by the HTTP client is picked up. The token given to
    /// [`Self::new`] is used while the store holds none.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    async fn current_token(&self) -> BearerToken {
        let Some(store) = &self.store else {
            return self.token.clone();
        };
        match store.token().await {
            Ok(Some(token)) => token,
            Ok(None) => self.token.clone(),
            Err(error) => {
                warn!(%error, "could not read credential, using the initial one");
                self.token.clone()
            }
        }
    }

    /// The websocket endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.url
    }

    /// Runs the channel on a background task.
    ///
    /// Dropping the returned handle stops the channel too.
    #[must_use]
    pub fn spawn(self) -> PushHandle {
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(self.run(receiver));
        PushHandle { shutdown, task }
    }

    /// Runs the channel until shutdown, rejection or reconnection failure.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when the server refuses the credential and
    /// `ReconnectFailed` when the retry budget is spent.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), PushError> {
        let mut attempt = 0_u32;

        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            let mut connected = false;
            let outcome = self.session(&mut shutdown, &mut connected).await;
            if connected {
                attempt = 0;
            }

            match outcome {
                Ok(SessionEnd::Shutdown) => {
                    if connected {
                        self.disconnected("io client disconnect");
                    }
                    return Ok(());
                }
                Ok(SessionEnd::ServerDisconnect) => {
                    self.disconnected("io server disconnect");
                    return Ok(());
                }
                Ok(SessionEnd::Dropped(reason)) => {
                    warn!(%reason, "push channel dropped");
                    if connected {
                        self.disconnected(&reason);
                    }
                }
                Err(PushError::Rejected(message)) => {
                    error!(%message, "push channel rejected");
                    self.hub.publish(&PushEvent::ErrorOccurred {
                        message: message.clone(),
                    });
                    return Err(PushError::Rejected(message));
                }
                Err(e) => {
                    warn!(error = %e, "push channel connection failed");
                    if connected {
                        self.disconnected(&e.to_string());
                    }
                }
            }

            attempt += 1;
            if attempt > self.policy.attempts {
                error!(attempts = self.policy.attempts, "push channel gave up reconnecting");
                self.hub.publish(&PushEvent::ErrorOccurred {
                    message: format!(
                        "push channel unavailable after {} attempts",
                        self.policy.attempts
                    ),
                });
                return Err(PushError::ReconnectFailed {
                    attempts: self.policy.attempts,
                });
            }

            let delay = jittered_delay(&self.policy, attempt);
            info!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "reconnecting push channel"
            );
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => return Ok(()),
            }
        }
    }

    fn disconnected(&self, reason: &str) {
        self.hub.publish(&PushEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    /// One websocket connection, from handshake to close.
    async fn session(
        &self,
        shutdown: &mut watch::Receiver<bool>,
        connected: &mut bool,
    ) -> Result<SessionEnd, PushError> {
        debug!(url = %self.url, "connecting push channel");
        let (ws, _) = connect_async(self.url.as_str()).await?;
        let (mut sink, mut stream) = ws.split();

        let mut heartbeat = Duration::from_millis(DEFAULT_HEARTBEAT_MS);
        let idle = tokio::time::sleep(heartbeat);
        tokio::pin!(idle);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    let _ = sink.send(Message::Text(frame::DISCONNECT.into())).await;
                    let _ = sink.close().await;
                    return Ok(SessionEnd::Shutdown);
                }
                () = &mut idle => return Ok(SessionEnd::Dropped("ping timeout".to_string())),
                message = stream.next() => {
                    let text = match message {
                        None | Some(Ok(Message::Close(_))) => {
                            return Ok(SessionEnd::Dropped("transport close".to_string()));
                        }
                        Some(Err(e)) => return Err(e.into()),
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(_)) => continue,
                    };

                    match frame::decode(text.as_str()) {
                        Ok(Frame::Open(handshake)) => {
                            heartbeat = Duration::from_millis(handshake.heartbeat_ms());
                            idle.as_mut().reset(Instant::now() + heartbeat);
                            let token = self.current_token().await;
                            let auth = json!({ "token": token.as_str() });
                            sink.send(Message::Text(frame::encode_connect("/", &auth).into()))
                                .await?;
                        }
                        Ok(Frame::Ping) => {
                            idle.as_mut().reset(Instant::now() + heartbeat);
                            sink.send(Message::Text(frame::PONG.into())).await?;
                        }
                        Ok(Frame::Connect { .. }) => {
                            *connected = true;
                            info!(url = %self.url, "push channel connected");
                            self.hub.publish(&PushEvent::Connected);
                        }
                        Ok(Frame::Event { name, args, .. }) => self.dispatch(&name, args.first()),
                        Ok(Frame::ConnectError { message, .. }) => {
                            return Err(PushError::Rejected(message));
                        }
                        Ok(Frame::Disconnect { .. }) => return Ok(SessionEnd::ServerDisconnect),
                        Ok(Frame::Close) => {
                            return Ok(SessionEnd::Dropped("transport close".to_string()));
                        }
                        Ok(Frame::Pong | Frame::Noop | Frame::Unsupported(_)) => {}
                        Err(e) => warn!(error = %e, "undecodable push frame"),
                    }
                }
            }
        }
    }

    fn dispatch(&self, name: &str, payload: Option<&Value>) {
        let payload = payload.cloned().unwrap_or(Value::Null);
        match PushEvent::from_named(name, &payload) {
            Some(event) => {
                let delivered = self.hub.publish(&event);
                debug!(event = name, delivered, "push event");
            }
            None => debug!(event = name, "ignoring push event"),
        }
    }
}

/// Handle to a spawned [`PushChannel`].
#[derive(Debug)]
pub struct PushHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), PushError>>,
}

impl PushHandle {
    /// Whether the channel stopped on its own.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the channel and waits for it.
    ///
    /// # Errors
    ///
    /// Returns the error the channel stopped with, if it stopped on its own.
    pub async fn close(self) -> Result<(), PushError> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| PushError::Task(e.to_string()))?
    }

    /// Waits for the channel to stop on its own.
    ///
    /// # Errors
    ///
    /// Same as [`Self::close`].
    pub async fn join(self) -> Result<(), PushError> {
        let Self { shutdown, task } = self;
        let result = task.await.map_err(|e| PushError::Task(e.to_string()))?;
        drop(shutdown);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_websocket_endpoint() {
        let url = websocket_url("http://localhost:5000").map(String::from);
        assert_eq!(
            url,
            Ok("ws://localhost:5000/socket.io/?EIO=4&transport=websocket".to_string())
        );

        let url = websocket_url("https://bot.example.com/api/").map(String::from);
        assert_eq!(
            url,
            Ok("wss://bot.example.com/api/socket.io/?EIO=4&transport=websocket".to_string())
        );
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(websocket_url("ftp://x"), Err(PushError::InvalidUrl(_))));
        assert!(matches!(websocket_url("nope"), Err(PushError::InvalidUrl(_))));
    }

    #[test]
    fn jitter_stays_within_half_and_ceiling() {
        let policy = ReconnectPolicy::default();
        for _ in 0..200 {
            let first = jittered_delay(&policy, 1);
            assert!(first >= Duration::from_millis(500), "{first:?}");
            assert!(first <= Duration::from_millis(1_500), "{first:?}");

            let late = jittered_delay(&policy, 5);
            assert!(late >= Duration::from_millis(2_000), "{late:?}");
            assert!(late <= Duration::from_millis(4_000), "{late:?}");
        }
    }

    #[test]
    fn channel_uses_ws_url_override() {
        let mut config = ClientConfig::new("http://api.test");
        config.ws_url = Some("https://push.test".to_string());
        let channel = PushChannel::new(&config, BearerToken::new("t"), Arc::new(EventHub::new()));
        assert_eq!(
            channel.map(|c| c.endpoint().host_str().map(str::to_string)),
            Ok(Some("push.test".to_string()))
        );
    }
}
