//! Async Notification Manager
//!
//! Central coordinator for the pub/sub notification system. Manages subscriber
//! registration, event routing and delivery statistics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::time::timeout;
use log::{debug, error, warn};

use crate::notifications::error::{NotificationError, NotificationResult};
use crate::notifications::events::NotificationEvent;
use crate::notifications::traits::{DeliveryStats, NotificationManager, Subscriber};

/// Default per-delivery timeout
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default subscriber limit
pub const DEFAULT_MAX_SUBSCRIBERS: usize = 1000;

enum Delivery {
    Delivered,
    Filtered,
}

/// Generic async notification manager
///
/// Clones share the same subscriber table and statistics.
pub struct AsyncNotificationManager<T>
where
    T: NotificationEvent,
{
    subscribers: Arc<RwLock<HashMap<String, Arc<dyn Subscriber<T>>>>>,
    global_stats: Arc<RwLock<DeliveryStats>>,
    default_timeout: Duration,
    shutdown: Arc<RwLock<bool>>,
    max_subscribers: Option<usize>,
}

impl<T> AsyncNotificationManager<T>
where
    T: NotificationEvent,
{
    /// Create a new notification manager
    pub fn new() -> Self {
        Self::with_config(DEFAULT_DELIVERY_TIMEOUT, Some(DEFAULT_MAX_SUBSCRIBERS))
    }

    /// Create a new notification manager with custom configuration
    pub fn with_config(default_timeout: Duration, max_subscribers: Option<usize>) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            global_stats: Arc::new(RwLock::new(DeliveryStats::default())),
            default_timeout,
            shutdown: Arc::new(RwLock::new(false)),
            max_subscribers,
        }
    }

    async fn is_shutting_down(&self) -> bool {
        *self.shutdown.read().await
    }

    /// Deliver an event to one subscriber with a timeout
    async fn deliver_to_subscriber(
        subscriber: &Arc<dyn Subscriber<T>>,
        event: &T,
        timeout_duration: Duration,
    ) -> NotificationResult<Delivery> {
        let subscriber_id = subscriber.subscriber_id();

        if !subscriber.should_receive(event) {
            debug!("Subscriber '{}' filtered out event", subscriber_id);
            return Ok(Delivery::Filtered);
        }

        let start_time = Instant::now();
        let delivery_result = timeout(timeout_duration, subscriber.handle_event(event.clone())).await;

        match delivery_result {
            Ok(Ok(())) => {
                debug!("Delivered event to '{}' in {:?}", subscriber_id, start_time.elapsed());
                Ok(Delivery::Delivered)
            }
            Ok(Err(e)) => {
                error!("Subscriber '{}' failed to process event: {}", subscriber_id, e);
                Err(NotificationError::delivery_failed(subscriber_id, e.to_string()))
            }
            Err(_) => {
                error!("Timeout delivering event to subscriber '{}'", subscriber_id);
                Err(NotificationError::timeout(
                    "event_delivery",
                    timeout_duration.as_millis() as u64,
                ))
            }
        }
    }

    /// List all subscriber IDs
    pub async fn list_subscribers(&self) -> Vec<String> {
        let subscribers = self.subscribers.read().await;
        let mut ids: Vec<String> = subscribers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Clear all statistics
    pub async fn clear_stats(&self) {
        *self.global_stats.write().await = DeliveryStats::default();
    }
}

#[async_trait::async_trait]
impl<T> NotificationManager<T> for AsyncNotificationManager<T>
where
    T: NotificationEvent,
{
    async fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> NotificationResult<()> {
        if self.is_shutting_down().await {
            return Err(NotificationError::SystemShutdown);
        }

        let subscriber_id = subscriber.subscriber_id().to_string();
        let mut subscribers = self.subscribers.write().await;

        if let Some(max) = self.max_subscribers {
            if subscribers.len() >= max {
                return Err(NotificationError::SubscriberLimitReached(max));
            }
        }

        if subscribers.contains_key(&subscriber_id) {
            return Err(NotificationError::subscriber_already_exists(subscriber_id));
        }

        subscribers.insert(subscriber_id.clone(), subscriber);
        debug!("Subscribed '{}' to notifications", subscriber_id);

        Ok(())
    }

    async fn unsubscribe(&self, subscriber_id: &str) -> NotificationResult<()> {
        let mut subscribers = self.subscribers.write().await;

        if subscribers.remove(subscriber_id).is_some() {
            debug!("Unsubscribed '{}' from notifications", subscriber_id);
            Ok(())
        } else {
            Err(NotificationError::subscriber_not_found(subscriber_id))
        }
    }

    async fn publish(&self, event: T) -> NotificationResult<()> {
        if self.is_shutting_down().await {
            return Err(NotificationError::SystemShutdown);
        }

        // The table lock is not held while handlers run
        let targets: Vec<Arc<dyn Subscriber<T>>> =
            self.subscribers.read().await.values().cloned().collect();

        let start_time = Instant::now();
        let mut delivered = 0u64;
        let mut filtered = 0u64;
        let mut failed = 0u64;

        for subscriber in &targets {
            match Self::deliver_to_subscriber(subscriber, &event, self.default_timeout).await {
                Ok(Delivery::Delivered) => delivered += 1,
                Ok(Delivery::Filtered) => filtered += 1,
                Err(e) => {
                    failed += 1;
                    warn!("Failed to deliver event to '{}': {}", subscriber.subscriber_id(), e);
                }
            }
        }

        let total_time = start_time.elapsed();
        let mut stats = self.global_stats.write().await;
        stats.events_published += 1;
        stats.events_delivered += delivered;
        stats.events_filtered += filtered;
        stats.delivery_failures += failed;
        if delivered > 0 {
            let avg_time = total_time.as_micros() as u64 / delivered;
            stats.avg_delivery_time_us = if stats.avg_delivery_time_us == 0 {
                avg_time
            } else {
                (stats.avg_delivery_time_us + avg_time) / 2
            };
        }

        debug!(
            "Published {:?} to {} subscribers ({} delivered, {} filtered, {} failed) in {:?}",
            event,
            targets.len(),
            delivered,
            filtered,
            failed,
            total_time
        );

        Ok(())
    }

    async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    async fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.read().await.contains_key(subscriber_id)
    }

    async fn shutdown(&self) -> NotificationResult<()> {
        debug!("Shutting down notification manager");
        *self.shutdown.write().await = true;

        let mut subscribers = self.subscribers.write().await;
        let subscriber_count = subscribers.len();
        subscribers.clear();

        debug!("Notification manager shutdown complete ({} subscribers removed)", subscriber_count);
        Ok(())
    }

    async fn stats(&self) -> DeliveryStats {
        self.global_stats.read().await.clone()
    }
}

impl<T> Default for AsyncNotificationManager<T>
where
    T: NotificationEvent,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AsyncNotificationManager<T>
where
    T: NotificationEvent,
{
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            global_stats: Arc::clone(&self.global_stats),
            default_timeout: self.default_timeout,
            shutdown: Arc::clone(&self.shutdown),
            max_subscribers: self.max_subscribers,
        }
    }
}
