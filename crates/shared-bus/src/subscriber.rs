//! # Subscriptions
//!
//! The subscriber side of the feed: delivery channels and the RAII handle
//! that keeps a registration alive.

use crate::publisher::FeedInner;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The feed was closed.
    #[error("Event feed closed")]
    Closed,

    /// A bounded channel was requested with zero capacity.
    #[error("Channel capacity must be greater than zero")]
    ZeroCapacity,
}

/// Outcome of offering one event to one delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Delivered,
    /// Bounded channel was full; the event was dropped for this subscriber.
    Dropped,
    /// The receiver is gone; the registration should be pruned.
    Disconnected,
}

/// Where a subscriber wants events delivered.
///
/// The variant fixes the backpressure policy for that subscriber:
///
/// - `Unbounded`: every event is queued; a stalled consumer grows its own
///   queue without affecting anyone else.
/// - `Bounded`: events are offered with `try_send`; when the queue is full the
///   event is dropped for that subscriber only, and the drop is reported in
///   the [`PublishReport`](crate::PublishReport), counted by the feed and
///   logged at `warn`.
///
/// Publishing never blocks on a subscriber.
#[derive(Debug)]
pub enum DeliveryChannel<T> {
    Unbounded(mpsc::UnboundedSender<T>),
    Bounded(mpsc::Sender<T>),
}

impl<T> DeliveryChannel<T> {
    pub(crate) fn offer(&self, event: T) -> Delivery {
        match self {
            DeliveryChannel::Unbounded(tx) => match tx.send(event) {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Disconnected,
            },
            DeliveryChannel::Bounded(tx) => match tx.try_send(event) {
                Ok(()) => Delivery::Delivered,
                Err(mpsc::error::TrySendError::Full(_)) => Delivery::Dropped,
                Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Disconnected,
            },
        }
    }

    /// Whether the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        match self {
            DeliveryChannel::Unbounded(tx) => tx.is_closed(),
            DeliveryChannel::Bounded(tx) => tx.is_closed(),
        }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, DeliveryChannel::Bounded(_))
    }
}

impl<T> From<mpsc::UnboundedSender<T>> for DeliveryChannel<T> {
    fn from(tx: mpsc::UnboundedSender<T>) -> Self {
        DeliveryChannel::Unbounded(tx)
    }
}

impl<T> From<mpsc::Sender<T>> for DeliveryChannel<T> {
    fn from(tx: mpsc::Sender<T>) -> Self {
        DeliveryChannel::Bounded(tx)
    }
}

/// A subscription handle.
///
/// Owned by the subscriber. The feed only holds a non-owning registration;
/// dropping the handle or calling [`Subscription::unsubscribe`] removes it.
/// Once either returns, no further event reaches the channel.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription<T> {
    id: u64,
    feed: Weak<FeedInner<T>>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(id: u64, feed: &Arc<FeedInner<T>>) -> Self {
        Self {
            id,
            feed: Arc::downgrade(feed),
        }
    }

    /// Registration id, unique within its feed.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the feed still holds this registration.
    ///
    /// False after the feed was closed or dropped, or after the receiver went
    /// away and a publish pruned it.
    pub fn is_active(&self) -> bool {
        self.feed
            .upgrade()
            .is_some_and(|feed| feed.is_registered(self.id))
    }

    /// Explicitly deregister. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let Some(feed) = self.feed.upgrade() else {
            debug!(id = self.id, "Subscription dropped after feed teardown");
            return;
        };
        if feed.deregister(self.id) {
            debug!(id = self.id, "Subscription dropped");
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
