//! Broadcast fan-out of registry and tool call events.

use super::{ServiceTargetEvent, ToolCallEvent};
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Publishes registry events to any number of subscribers.
///
/// Publishing never blocks. Events published while nobody subscribes are
/// dropped; slow subscribers observe a lag error and skip ahead.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<ServiceTargetEvent>,
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventPublisher {
    /// Creates a publisher buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServiceTargetEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event, returning how many subscribers received it.
    pub fn publish(&self, event: ServiceTargetEvent) -> usize {
        let event_type = event.event();
        let event_id = event.id().to_owned();
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!(event = %event_type, id = %event_id, "no subscribers; event dropped");
                0
            }
        }
    }
}

/// Publishes tool call lifecycle events to any number of subscribers.
///
/// Shares the delivery rules of [`EventPublisher`]. The clock stamps every
/// event built through [`ToolCallPublisher::now`].
#[derive(Clone)]
pub struct ToolCallPublisher {
    sender: broadcast::Sender<ToolCallEvent>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for ToolCallPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl ToolCallPublisher {
    /// Creates a publisher buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replaces the clock used to stamp events.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the current time on this publisher's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ToolCallEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event, returning how many subscribers received it.
    pub fn publish(&self, event: ToolCallEvent) -> usize {
        let stage = event.stage;
        let event_id = event.event_id;
        self.sender.send(event).unwrap_or_else(|_| {
            trace!(%stage, %event_id, "no subscribers; tool call event dropped");
            0
        })
    }
}
