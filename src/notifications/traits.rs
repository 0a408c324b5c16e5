//! Subscriber and Manager Traits
//!
//! Core traits for the pub/sub notification system that decouple the engine
//! from whatever renders or records its changes.

use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;

use crate::notifications::error::NotificationResult;
use crate::notifications::events::NotificationEvent;

/// Components that handle events
#[async_trait]
pub trait Subscriber<T>: Send + Sync
where
    T: NotificationEvent,
{
    /// Handle an incoming event
    async fn handle_event(&self, event: T) -> NotificationResult<()>;

    /// Get the subscriber identifier (must be unique)
    fn subscriber_id(&self) -> &str;

    /// Check if this subscriber should receive the event
    fn should_receive(&self, _event: &T) -> bool {
        true
    }
}

/// Generic notification manager
#[async_trait]
pub trait NotificationManager<T>: Send + Sync
where
    T: NotificationEvent,
{
    /// Subscribe a component to receive events
    async fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> NotificationResult<()>;

    /// Unsubscribe a component from receiving events
    async fn unsubscribe(&self, subscriber_id: &str) -> NotificationResult<()>;

    /// Publish an event to all subscribers
    async fn publish(&self, event: T) -> NotificationResult<()>;

    /// Publish a batch of events in order
    async fn publish_all(&self, events: Vec<T>) -> NotificationResult<()> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }

    /// Get the number of active subscribers
    async fn subscriber_count(&self) -> usize;

    /// Check if a subscriber exists
    async fn has_subscriber(&self, subscriber_id: &str) -> bool;

    /// Stop accepting subscriptions and events
    async fn shutdown(&self) -> NotificationResult<()>;

    /// Get delivery statistics
    async fn stats(&self) -> DeliveryStats;
}

/// Statistics about notification delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    /// Total events published
    pub events_published: u64,

    /// Total deliveries that succeeded
    pub events_delivered: u64,

    /// Deliveries skipped by a subscriber's `should_receive`
    pub events_filtered: u64,

    /// Total delivery failures, timeouts included
    pub delivery_failures: u64,

    /// Average delivery time in microseconds
    pub avg_delivery_time_us: u64,
}
