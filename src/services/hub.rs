use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Availability change delivered to subscribers
#[derive(Debug, Clone)]
pub struct AvailabilityEvent {
    pub lot_id: String,
    pub is_available: bool,
    /// Flag value before the change, when the publisher knows it
    pub previous: Option<bool>,
}

/// Failure reported by a single subscriber; never escalates past the hub
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

/// Receives availability-change notifications
pub trait AvailabilitySubscriber: Send + Sync {
    fn name(&self) -> &str;
    fn on_availability_changed(&self, event: &AvailabilityEvent) -> Result<(), SubscriberError>;
}

/// Publish/subscribe registry for availability changes
///
/// Subscribers are identity-compared (same `Arc`), so subscribing twice
/// or unsubscribing a non-member is a no-op. Publishing iterates a
/// snapshot of the list, so concurrent (un)subscribes never corrupt the
/// fan-out.
#[derive(Default)]
pub struct NotificationHub {
    subscribers: Mutex<Vec<Arc<dyn AvailabilitySubscriber>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn AvailabilitySubscriber>) {
        let mut subscribers = self.lock();
        if !subscribers.iter().any(|s| Arc::ptr_eq(s, &subscriber)) {
            tracing::debug!(subscriber = subscriber.name(), "Subscriber registered");
            subscribers.push(subscriber);
        }
    }

    pub fn unsubscribe(&self, subscriber: &Arc<dyn AvailabilitySubscriber>) {
        self.lock().retain(|s| !Arc::ptr_eq(s, subscriber));
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Fan the event out to every current subscriber, in registration
    /// order; one failing subscriber never blocks the rest
    pub fn publish(&self, event: &AvailabilityEvent) {
        let snapshot: Vec<Arc<dyn AvailabilitySubscriber>> = self.lock().clone();
        tracing::info!(
            lot_id = %event.lot_id,
            is_available = event.is_available,
            subscribers = snapshot.len(),
            "Publishing availability change"
        );

        for subscriber in snapshot {
            if let Err(e) = subscriber.on_availability_changed(event) {
                tracing::warn!(
                    subscriber = subscriber.name(),
                    error = %e,
                    "Subscriber failed to handle availability change"
                );
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn AvailabilitySubscriber>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Logging subscriber standing in for a realtime UI push channel
#[derive(Debug, Default)]
pub struct RealtimePushSubscriber;

impl AvailabilitySubscriber for RealtimePushSubscriber {
    fn name(&self) -> &str {
        "realtime-push"
    }

    fn on_availability_changed(&self, event: &AvailabilityEvent) -> Result<(), SubscriberError> {
        tracing::info!(
            lot_id = %event.lot_id,
            is_available = event.is_available,
            "Pushing availability update to clients"
        );
        Ok(())
    }
}
