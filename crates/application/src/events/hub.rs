//! Typed fan-out of push events.
//!
//! Each subscriber gets its own unbounded queue, so delivery is in order and
//! a slow subscriber never makes the channel drop events for the others.

use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::Stream;
use groupguard_domain::{EventKind, PushEvent};
use tokio::sync::mpsc;
use tracing::trace;

struct Subscriber {
    kinds: Option<Vec<EventKind>>,
    sender: mpsc::UnboundedSender<PushEvent>,
}

impl Subscriber {
    fn wants(&self, kind: EventKind) -> bool {
        self.kinds.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Broadcaster for push events.
#[derive(Default)]
pub struct EventHub {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventHub {
    /// Create a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every event.
    pub fn subscribe(&self) -> EventStream {
        self.add(None)
    }

    /// Subscribe to the given kinds only.
    pub fn subscribe_to(&self, kinds: &[EventKind]) -> EventStream {
        self.add(Some(kinds.to_vec()))
    }

    fn add(&self, kinds: Option<Vec<EventKind>>) -> EventStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock().push(Subscriber { kinds, sender });
        EventStream { receiver }
    }

    /// Deliver an event to every interested subscriber.
    ///
    /// Subscribers whose stream was dropped are removed. Returns the number
    /// of subscribers that received the event.
    pub fn publish(&self, event: &PushEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        self.lock().retain(|subscriber| {
            if subscriber.sender.is_closed() {
                return false;
            }
            if !subscriber.wants(kind) {
                return true;
            }
            let sent = subscriber.sender.send(event.clone()).is_ok();
            delivered += usize::from(sent);
            sent
        });
        trace!(?kind, delivered, "push event published");
        delivered
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().iter().filter(|s| !s.sender.is_closed()).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of a subscription; dropping it unsubscribes.
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<PushEvent>,
}

impl EventStream {
    /// Waits for the next event; `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.receiver.recv().await
    }

    /// Returns an already queued event without waiting.
    pub fn try_recv(&mut self) -> Option<PushEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for EventStream {
    type Item = PushEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
