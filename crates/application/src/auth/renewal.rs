//! Single-flight credential renewal.
//!
//! When several requests hit a 401 at the same time only the first one
//! renews the credential. The others park here and receive the outcome of
//! that single renewal, in the order they arrived.

use std::sync::{Mutex, MutexGuard, PoisonError};

use groupguard_domain::BearerToken;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

type Waiter = oneshot::Sender<ClientResult<BearerToken>>;

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    InFlight {
        waiters: Vec<Waiter>,
    },
}

/// Serializes renewals and fans their outcome out to queued callers.
#[derive(Debug, Default)]
pub struct RenewalCoordinator {
    state: Mutex<State>,
}

/// Role assigned by [`RenewalCoordinator::begin`].
#[derive(Debug)]
pub enum RenewalTicket<'a> {
    /// No renewal was running; the caller must perform it and settle the guard.
    Leader(RenewalGuard<'a>),
    /// A renewal is running; await its outcome.
    Follower(oneshot::Receiver<ClientResult<BearerToken>>),
}

impl RenewalCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the current renewal, or starts one.
    ///
    /// The check and the state change happen under one lock, so exactly one
    /// caller becomes the leader.
    pub fn begin(&self) -> RenewalTicket<'_> {
        let mut state = self.lock();
        match &mut *state {
            State::InFlight { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                debug!(queued = waiters.len(), "renewal in progress, request queued");
                RenewalTicket::Follower(rx)
            }
            State::Idle => {
                *state = State::InFlight {
                    waiters: Vec::new(),
                };
                RenewalTicket::Leader(RenewalGuard {
                    coordinator: self,
                    settled: false,
                })
            }
        }
    }

    /// Whether a renewal is running.
    #[must_use]
    pub fn is_renewing(&self) -> bool {
        matches!(*self.lock(), State::InFlight { .. })
    }

    /// Number of callers waiting on the running renewal.
    #[must_use]
    pub fn queued(&self) -> usize {
        match &*self.lock() {
            State::InFlight { waiters } => waiters.len(),
            State::Idle => 0,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(&self, outcome: &ClientResult<BearerToken>) {
        let waiters = match std::mem::take(&mut *self.lock()) {
            State::InFlight { waiters } => waiters,
            State::Idle => Vec::new(),
        };
        for waiter in waiters {
            // A waiter whose caller went away is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Held by the renewing caller; resets the coordinator when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard abandons the renewal"]
pub struct RenewalGuard<'a> {
    coordinator: &'a RenewalCoordinator,
    settled: bool,
}

impl RenewalGuard<'_> {
    /// Delivers the renewal outcome to every queued caller, first come first
    /// served, and returns the coordinator to idle.
    pub fn settle(mut self, outcome: &ClientResult<BearerToken>) {
        self.settled = true;
        self.coordinator.finish(outcome);
    }
}

impl Drop for RenewalGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.finish(&Err(ClientError::RenewalAbandoned));
        }
    }
}
