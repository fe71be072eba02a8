//! Companion-device pairing flow.
//!
//! [`PairingSession`] is a plain state machine fed with push events; it
//! never performs I/O itself. When it needs the backend to (re)start the bot
//! session it says so through [`PairingStep::StartSession`], and
//! [`run_pairing`] makes the call.

use groupguard_domain::resources::ConnectionMethod;
use groupguard_domain::{PushEvent, QrEncoding};
use tracing::{debug, warn};

use super::EventStream;
use crate::error::{ClientError, ClientResult};
use crate::services::WhatsAppApi;

/// A pairing code ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCode {
    /// Payload.
    pub data: String,
    /// Payload encoding.
    pub encoding: QrEncoding,
}

/// What the pairing screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingView {
    /// Current code, if any.
    pub qr: Option<QrCode>,
    /// Status line.
    pub status: String,
    /// A code is being requested.
    pub loading: bool,
    /// The push channel is up.
    pub connected: bool,
    /// The device is paired.
    pub paired: bool,
    /// Last error reported by the backend.
    pub error: Option<String>,
    /// Recommended pairing method, once known.
    pub method: Option<ConnectionMethod>,
}

impl Default for PairingView {
    fn default() -> Self {
        Self {
            qr: None,
            status: "Initializing connection...".to_string(),
            loading: true,
            connected: false,
            paired: false,
            error: None,
            method: None,
        }
    }
}

/// Follow-up the caller must perform after feeding an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingStep {
    /// Nothing to do.
    Wait,
    /// Call `POST /wa/session/start`; the code arrives as a push event.
    StartSession,
}

/// Pairing state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingSession {
    view: PairingView,
}

impl PairingSession {
    /// A session in the initializing state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view.
    #[must_use]
    pub const fn view(&self) -> &PairingView {
        &self.view
    }

    /// Applies one push event.
    pub fn apply(&mut self, event: &PushEvent) -> PairingStep {
        let view = &mut self.view;
        match event {
            PushEvent::Connected => {
                view.connected = true;
                view.status = "Connected, requesting a pairing code...".to_string();
                return PairingStep::StartSession;
            }
            PushEvent::Disconnected { .. } => {
                view.connected = false;
                view.status = "Connection lost. You can try again.".to_string();
            }
            PushEvent::QrReceived { data, encoding } => {
                view.loading = false;
                if data.is_empty() {
                    view.qr = None;
                    view.status = "No pairing code arrived. Try again.".to_string();
                } else {
                    view.qr = Some(QrCode {
                        data: data.clone(),
                        encoding: *encoding,
                    });
                    view.status = "Scan the code with WhatsApp within 60 seconds".to_string();
                }
            }
            PushEvent::StatusChanged { state } => {
                view.status = state.description();
                if state.is_paired() {
                    view.qr = None;
                    view.loading = false;
                    view.paired = true;
                }
            }
            PushEvent::ErrorOccurred { message } => {
                view.loading = false;
                let message = if message.is_empty() {
                    "unknown"
                } else {
                    message.as_str()
                };
                view.status = format!("An error occurred: {message}");
                view.error = Some(message.to_string());
            }
        }
        PairingStep::Wait
    }

    /// Drops the current code and asks for a new one.
    pub fn regenerate(&mut self) -> PairingStep {
        self.view.qr = None;
        self.view.loading = true;
        self.view.error = None;
        self.view.status = "Generating a new code...".to_string();
        PairingStep::StartSession
    }

    /// Records a failed `POST /wa/session/start`.
    pub fn start_failed(&mut self, error: &ClientError) {
        self.view.loading = false;
        self.view.status = "Could not start the session.".to_string();
        self.view.error = Some(error.to_string());
    }

    /// Records the recommended pairing method.
    pub const fn set_method(&mut self, method: ConnectionMethod) {
        self.view.method = Some(method);
    }
}

/// Drives a pairing session until the device is paired or the event stream
/// ends.
///
/// `on_change` is called with the view after every change.
///
/// # Errors
///
/// Only store failures are returned; backend errors end up in the view.
pub async fn run_pairing<F>(
    api: WhatsAppApi<'_>,
    mut events: EventStream,
    mut on_change: F,
) -> ClientResult<PairingSession>
where
    F: FnMut(&PairingView) + Send,
{
    let mut session = PairingSession::new();

    let method = match api.device_info().await {
        Ok(info) => info.primary_method(ConnectionMethod::Qr),
        Err(ClientError::Store(error)) => return Err(ClientError::Store(error)),
        Err(error) => {
            debug!(%error, "device info unavailable, defaulting to QR");
            ConnectionMethod::Qr
        }
    };
    session.set_method(method);
    on_change(session.view());

    while let Some(event) = events.recv().await {
        if session.apply(&event) == PairingStep::StartSession {
            on_change(session.view());
            start(&api, &mut session).await?;
        }
        on_change(session.view());
        if session.view().paired {
            break;
        }
    }
    Ok(session)
}

/// Asks for a fresh code on an ongoing pairing.
///
/// # Errors
///
/// Only store failures are returned; backend errors end up in the view.
pub async fn regenerate(api: &WhatsAppApi<'_>, session: &mut PairingSession) -> ClientResult<()> {
    if session.regenerate() == PairingStep::StartSession {
        start(api, session).await?;
    }
    Ok(())
}

async fn start(api: &WhatsAppApi<'_>, session: &mut PairingSession) -> ClientResult<()> {
    match api.start_session().await {
        Ok(_) => Ok(()),
        Err(ClientError::Store(error)) => Err(ClientError::Store(error)),
        Err(error) => {
            warn!(%error, "failed to start bot session");
            session.start_failed(&error);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupguard_domain::SessionState;
    use pretty_assertions::assert_eq;

    #[test]
    fn connect_requests_a_session() {
        let mut session = PairingSession::new();
        assert!(session.view().loading);
        assert_eq!(session.apply(&PushEvent::Connected), PairingStep::StartSession);
        assert!(session.view().connected);
    }

    #[test]
    fn qr_then_ready_clears_code() {
        let mut session = PairingSession::new();
        session.apply(&PushEvent::QrReceived {
            data: "2@abc".to_string(),
            encoding: QrEncoding::Raw,
        });
        assert!(!session.view().loading);
        assert_eq!(session.view().qr.as_ref().map(|q| q.data.as_str()), Some("2@abc"));

        session.apply(&PushEvent::StatusChanged {
            state: SessionState::Ready,
        });
        assert_eq!(session.view().qr, None);
        assert!(session.view().paired);
        assert_eq!(session.view().status, "Session ready.");
    }

    #[test]
    fn empty_qr_clears_code_with_retry_message() {
        let mut session = PairingSession::new();
        session.apply(&PushEvent::QrReceived {
            data: "2@abc".to_string(),
            encoding: QrEncoding::Raw,
        });
        session.apply(&PushEvent::QrReceived {
            data: String::new(),
            encoding: QrEncoding::Raw,
        });
        assert_eq!(session.view().qr, None);
        assert!(session.view().status.contains("Try again"));
    }

    #[test]
    fn error_stops_loading() {
        let mut session = PairingSession::new();
        session.apply(&PushEvent::ErrorOccurred {
            message: String::new(),
        });
        assert!(!session.view().loading);
        assert_eq!(session.view().error.as_deref(), Some("unknown"));
    }

    #[test]
    fn awaiting_scan_keeps_code() {
        let mut session = PairingSession::new();
        session.apply(&PushEvent::QrReceived {
            data: "data:image/png;base64,AA".to_string(),
            encoding: QrEncoding::DataUrl,
        });
        session.apply(&PushEvent::StatusChanged {
            state: SessionState::AwaitingScan,
        });
        assert!(session.view().qr.is_some());
        assert!(!session.view().paired);
    }

    #[test]
    fn regenerate_clears_and_restarts() {
        let mut session = PairingSession::new();
        session.apply(&PushEvent::QrReceived {
            data: "2@abc".to_string(),
            encoding: QrEncoding::Raw,
        });
        assert_eq!(session.regenerate(), PairingStep::StartSession);
        assert_eq!(session.view().qr, None);
        assert!(session.view().loading);
    }
}
