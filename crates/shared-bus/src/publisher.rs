//! # Event Feed
//!
//! A one-to-many fan-out channel with a dynamic subscriber set.
//!
//! ## Concurrency
//!
//! The registry sits behind a reader/writer lock. `publish` holds the read
//! lock for the whole fan-out and only performs non-blocking sends, so it
//! never waits on a subscriber. `subscribe` and deregistration take the write
//! lock, which gives two guarantees:
//!
//! - a publish sees the registry either before or after a (de)registration,
//!   never half-updated;
//! - once deregistration returns, no in-flight publish can still deliver to
//!   that subscriber.
//!
//! A subscriber registered while a publish is running may or may not receive
//! that event; it never receives it twice.

use crate::subscriber::{Delivery, DeliveryChannel, Subscription, SubscriptionError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Result of a single publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers that accepted the event.
    pub delivered: usize,
    /// Bounded subscribers whose queue was full.
    pub dropped: usize,
    /// Subscribers whose receiver was gone; they have been pruned.
    pub disconnected: usize,
}

impl PublishReport {
    /// Whether every subscriber registered at publish time got the event.
    pub fn is_complete(&self) -> bool {
        self.dropped == 0 && self.disconnected == 0
    }
}

pub(crate) struct FeedInner<T> {
    subscribers: RwLock<HashMap<u64, DeliveryChannel<T>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
    events_published: AtomicU64,
    events_dropped: AtomicU64,
}

impl<T> FeedInner<T> {
    pub(crate) fn is_registered(&self, id: u64) -> bool {
        self.subscribers.read().contains_key(&id)
    }

    pub(crate) fn deregister(&self, id: u64) -> bool {
        self.subscribers.write().remove(&id).is_some()
    }
}

/// Fan-out event feed.
///
/// Cheap to clone; clones share the same subscriber set.
pub struct Feed<T> {
    inner: Arc<FeedInner<T>>,
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Feed<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FeedInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                closed: AtomicBool::new(false),
                events_published: AtomicU64::new(0),
                events_dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Register a delivery channel.
    ///
    /// The returned handle owns the registration.
    pub fn subscribe(
        &self,
        channel: impl Into<DeliveryChannel<T>>,
    ) -> Result<Subscription<T>, SubscriptionError> {
        let channel = channel.into();
        let bounded = channel.is_bounded();

        let id = {
            let mut subscribers = self.inner.subscribers.write();
            // Checked under the lock so a concurrent close() cannot miss us.
            if self.inner.closed.load(Ordering::Acquire) {
                return Err(SubscriptionError::Closed);
            }
            let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            subscribers.insert(id, channel);
            id
        };

        debug!(id, bounded, "New subscription created");
        Ok(Subscription::new(id, &self.inner))
    }

    /// Subscribe with a fresh unbounded channel.
    pub fn subscribe_unbounded(
        &self,
    ) -> Result<(Subscription<T>, mpsc::UnboundedReceiver<T>), SubscriptionError> {
        let (tx, rx) = mpsc::unbounded_channel();
        Ok((self.subscribe(tx)?, rx))
    }

    /// Subscribe with a fresh bounded (drop-on-full) channel.
    pub fn subscribe_bounded(
        &self,
        capacity: usize,
    ) -> Result<(Subscription<T>, mpsc::Receiver<T>), SubscriptionError> {
        if capacity == 0 {
            return Err(SubscriptionError::ZeroCapacity);
        }
        let (tx, rx) = mpsc::channel(capacity);
        Ok((self.subscribe(tx)?, rx))
    }

    /// Number of live registrations.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Total events published.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.inner.events_published.load(Ordering::Relaxed)
    }

    /// Total per-subscriber drops caused by full bounded queues.
    #[must_use]
    pub fn events_dropped(&self) -> u64 {
        self.inner.events_dropped.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Tear down the feed.
    ///
    /// Every registration is removed and its sender dropped, so receivers
    /// observe end-of-stream once drained. Later subscribes fail with
    /// [`SubscriptionError::Closed`]; later publishes reach nobody.
    pub fn close(&self) {
        let mut subscribers = self.inner.subscribers.write();
        self.inner.closed.store(true, Ordering::Release);
        let removed = subscribers.len();
        subscribers.clear();
        debug!(removed, "Event feed closed");
    }
}

impl<T: Clone> Feed<T> {
    /// Deliver `event` to every registered subscriber.
    pub fn publish(&self, event: T) -> PublishReport {
        self.inner.events_published.fetch_add(1, Ordering::Relaxed);

        let mut report = PublishReport::default();
        let mut gone = Vec::new();
        {
            let subscribers = self.inner.subscribers.read();
            for (id, channel) in subscribers.iter() {
                match channel.offer(event.clone()) {
                    Delivery::Delivered => report.delivered += 1,
                    Delivery::Dropped => {
                        report.dropped += 1;
                        warn!(id, "Subscriber queue full, event dropped");
                    }
                    Delivery::Disconnected => {
                        report.disconnected += 1;
                        gone.push(*id);
                    }
                }
            }
        }

        if report.dropped > 0 {
            self.inner
                .events_dropped
                .fetch_add(report.dropped as u64, Ordering::Relaxed);
        }

        if !gone.is_empty() {
            let mut subscribers = self.inner.subscribers.write();
            for id in &gone {
                subscribers.remove(id);
            }
            debug!(pruned = gone.len(), "Pruned disconnected subscribers");
        }

        if report.delivered == 0 && report.dropped == 0 {
            debug!("Event published with no live subscribers");
        }

        report
    }
}
