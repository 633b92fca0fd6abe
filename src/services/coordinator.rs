use crate::services::hub::{AvailabilityEvent, NotificationHub};
use crate::services::proxy::SearchProxy;
use std::sync::Arc;

/// Events the boundary layer may raise
///
/// A closed enumeration with a typed payload per kind; event kinds the
/// coordinator does not act on are observability hooks only.
#[derive(Debug, Clone)]
pub enum Event {
    AvailabilityChanged {
        lot_id: String,
        is_available: bool,
        previous: Option<bool>,
    },
    SearchRequested {
        latitude: f64,
        longitude: f64,
        identity: Option<String>,
    },
    RouteCalculated {
        lot_id: String,
        distance_km: f64,
    },
}

/// Routes boundary events to the right internal component
///
/// Keeps the HTTP layer ignorant of the wiring between the hub and the
/// proxy: an availability change fans out to subscribers first, then
/// drops the proxy cache.
pub struct Coordinator {
    hub: Arc<NotificationHub>,
    proxy: Arc<SearchProxy>,
}

impl Coordinator {
    pub fn new(hub: Arc<NotificationHub>, proxy: Arc<SearchProxy>) -> Self {
        Self { hub, proxy }
    }

    pub fn dispatch(&self, sender: &str, event: Event) {
        match event {
            Event::AvailabilityChanged {
                lot_id,
                is_available,
                previous,
            } => {
                tracing::info!(sender, lot_id = %lot_id, "Dispatching availability change");
                self.hub.publish(&AvailabilityEvent {
                    lot_id: lot_id.clone(),
                    is_available,
                    previous,
                });
                self.proxy.invalidate(Some(&lot_id));
            }
            Event::SearchRequested {
                latitude,
                longitude,
                identity,
            } => {
                tracing::info!(
                    sender,
                    latitude,
                    longitude,
                    identity = identity.as_deref().unwrap_or("anonymous"),
                    "Search requested"
                );
            }
            Event::RouteCalculated { lot_id, distance_km } => {
                tracing::info!(sender, lot_id = %lot_id, distance_km, "Route calculated");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::GeoAdapter;
    use crate::core::ranker::SearchFacade;
    use crate::models::{FilterSpec, Origin};
    use crate::services::hub::{AvailabilitySubscriber, SubscriberError};
    use crate::services::proxy::SearchOutcome;
    use crate::services::repository::InMemoryLotRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSubscriber {
        received: AtomicUsize,
    }

    impl AvailabilitySubscriber for CountingSubscriber {
        fn name(&self) -> &str {
            "counting"
        }

        fn on_availability_changed(&self, _event: &AvailabilityEvent) -> Result<(), SubscriberError> {
            self.received.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn coordinator() -> (
        Arc<InMemoryLotRepository>,
        Arc<NotificationHub>,
        Arc<SearchProxy>,
        Coordinator,
    ) {
        let repository = Arc::new(InMemoryLotRepository::with_seed_data());
        let facade = Arc::new(SearchFacade::new(
            repository.clone(),
            Arc::new(GeoAdapter::simulated(10)),
        ));
        let proxy = Arc::new(SearchProxy::new(
            facade,
            Duration::from_secs(30),
            Duration::from_secs(2),
        ));
        let hub = Arc::new(NotificationHub::new());
        let coordinator = Coordinator::new(hub.clone(), proxy.clone());
        (repository, hub, proxy, coordinator)
    }

    #[test]
    fn test_availability_change_reaches_subscribers() {
        let (_repository, hub, _proxy, coordinator) = coordinator();
        let subscriber = Arc::new(CountingSubscriber {
            received: AtomicUsize::new(0),
        });
        hub.subscribe(subscriber.clone());

        coordinator.dispatch(
            "api",
            Event::AvailabilityChanged {
                lot_id: "lot-1".to_string(),
                is_available: false,
                previous: Some(true),
            },
        );

        assert_eq!(subscriber.received.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_availability_change_invalidates_cache() {
        use crate::services::repository::LotRepository;

        let (repository, _hub, proxy, coordinator) = coordinator();
        let origin = Origin::new(3.4516, -76.5320);

        let before = proxy.find_nearest(origin, &FilterSpec::default(), None).unwrap();
        let SearchOutcome::Found(before) = before else {
            panic!("seed data should yield a result");
        };

        repository.set_availability(&before.id, false).unwrap();
        coordinator.dispatch(
            "api",
            Event::AvailabilityChanged {
                lot_id: before.id.clone(),
                is_available: false,
                previous: Some(true),
            },
        );

        // A stale cache entry would still return the now-closed lot
        let after = proxy.find_nearest(origin, &FilterSpec::default(), None).unwrap();
        match after {
            SearchOutcome::Found(after) => assert_ne!(after.id, before.id),
            SearchOutcome::NotFound => {}
            SearchOutcome::RateLimited { .. } => panic!("no identity supplied"),
        }
    }

    #[test]
    fn test_observability_events_change_nothing() {
        let (_repository, hub, _proxy, coordinator) = coordinator();
        let subscriber = Arc::new(CountingSubscriber {
            received: AtomicUsize::new(0),
        });
        hub.subscribe(subscriber.clone());

        coordinator.dispatch(
            "api",
            Event::SearchRequested {
                latitude: 3.4516,
                longitude: -76.5320,
                identity: None,
            },
        );
        coordinator.dispatch(
            "api",
            Event::RouteCalculated {
                lot_id: "lot-1".to_string(),
                distance_km: 1.2,
            },
        );

        assert_eq!(subscriber.received.load(Ordering::SeqCst), 0);
    }
}
