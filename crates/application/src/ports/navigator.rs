//! Navigation port.

/// Sends the user back to the unauthenticated entry point.
///
/// Called once when the session ends: on logout, and when credential
/// renewal fails.
pub trait Navigator: Send + Sync {
    /// Leaves the current screen for the login entry point.
    fn redirect_to_login(&self);
}
