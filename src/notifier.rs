//! Cross-view refresh signalling
//!
//! The shared "add" modal and the compose form publish a [`ResourceEvent`] after the server
//! confirms a creation. Mounted list views hold a [`Subscription`] and reload when an event for
//! their resource arrives. Dropping the subscription unsubscribes.

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

/// Something changed on the server that other views may want to reload for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceEvent {
    CareerAdded,
    ReferralAdded,
    EmailSent,
}

/// What a subscriber sees when it drains its queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Event(ResourceEvent),
    /// The subscriber fell behind and `n` events were dropped
    Missed(u64),
}

/// Handle shared by publishers and subscribers
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<ResourceEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Fire-and-forget; returns how many subscribers were reached
    pub fn publish(&self, event: ResourceEvent) -> usize {
        match self.sender.send(event) {
            Ok(count) => {
                debug!("📣 Published {:?} to {} subscriber(s)", event, count);
                count
            }
            Err(_) => {
                debug!("📣 Published {:?} with no subscribers", event);
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription; unsubscribes on drop
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ResourceEvent>,
}

impl Subscription {
    /// Non-blocking: next queued signal, if any
    pub fn try_next(&mut self) -> Option<Signal> {
        match self.receiver.try_recv() {
            Ok(event) => Some(Signal::Event(event)),
            Err(TryRecvError::Lagged(n)) => Some(Signal::Missed(n)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Drain everything currently queued
    pub fn drain(&mut self) -> Vec<Signal> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}
