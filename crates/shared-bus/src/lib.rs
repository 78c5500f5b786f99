//! # Shared Bus - Fan-out Event Feed
//!
//! A typed one-to-many event feed used to hand finished artifacts (block
//! replicas) to any number of downstream consumers.
//!
//! ```text
//!                  ┌──────────────┐   subscribe(channel) ──→ Subscription
//!   publish() ───→ │     Feed     │ ──→ subscriber A (unbounded)
//!                  │  (registry)  │ ──→ subscriber B (bounded, drop-on-full)
//!                  └──────────────┘ ──→ ...
//! ```
//!
//! ## Rules
//!
//! - The feed is owned by the component producing events; there is no global
//!   hub.
//! - Subscribers own their [`Subscription`] handle; dropping it deregisters.
//! - Publishing never blocks on a subscriber. Backpressure policy is chosen
//!   per subscriber by its [`DeliveryChannel`] and drops are always reported.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::ReplicationEvent;
pub use publisher::{Feed, PublishReport};
pub use subscriber::{DeliveryChannel, Subscription, SubscriptionError};

/// Feed carrying block replication events.
pub type ReplicationFeed = Feed<ReplicationEvent>;

/// Subscription to a [`ReplicationFeed`].
pub type ReplicationSubscription = Subscription<ReplicationEvent>;

/// Default queue depth for bounded replication subscribers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
