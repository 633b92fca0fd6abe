// Integration tests for parkfinder: the full pipeline from proxy to
// repository, plus the coordinator-driven invalidation flow.

use parkfinder::core::distance::GeoAdapter;
use parkfinder::core::ranker::SearchFacade;
use parkfinder::models::{FilterSpec, Lot, Origin};
use parkfinder::services::coordinator::{Coordinator, Event};
use parkfinder::services::hub::NotificationHub;
use parkfinder::services::proxy::{Clock, SearchOutcome, SearchProxy};
use parkfinder::services::repository::{InMemoryLotRepository, LotRepository, RepositoryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn test_lot(id: &str, name: &str, lat: f64, lng: f64, price: f64, available: bool) -> Lot {
    Lot {
        id: id.to_string(),
        name: name.to_string(),
        latitude: lat,
        longitude: lng,
        price_per_hour: price,
        is_available: available,
        capacity: 50,
        features: vec!["Vigilancia".to_string()],
        created_at: None,
    }
}

/// Searcher position used throughout; lots below are placed relative
/// to it
fn origin() -> Origin {
    Origin::new(3.4516, -76.5320)
}

struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        })
    }

    fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}

struct CountingRepository {
    inner: InMemoryLotRepository,
    fetches: AtomicUsize,
}

impl CountingRepository {
    fn new(lots: Vec<Lot>) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryLotRepository::new(lots),
            fetches: AtomicUsize::new(0),
        })
    }
}

impl LotRepository for CountingRepository {
    fn list_available(&self) -> Result<Vec<Lot>, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.list_available()
    }

    fn get(&self, id: &str) -> Result<Lot, RepositoryError> {
        self.inner.get(id)
    }

    fn set_availability(&self, id: &str, is_available: bool) -> Result<Lot, RepositoryError> {
        self.inner.set_availability(id, is_available)
    }
}

struct TestStack {
    repository: Arc<CountingRepository>,
    proxy: Arc<SearchProxy>,
    coordinator: Coordinator,
    clock: Arc<ManualClock>,
}

fn build_stack(lots: Vec<Lot>) -> TestStack {
    let repository = CountingRepository::new(lots);
    let clock = ManualClock::new();
    let facade = Arc::new(SearchFacade::new(
        repository.clone(),
        Arc::new(GeoAdapter::simulated(10)),
    ));
    let proxy = Arc::new(SearchProxy::with_clock(
        facade,
        Duration::from_secs(30),
        Duration::from_secs(2),
        clock.clone(),
    ));
    let hub = Arc::new(NotificationHub::new());
    let coordinator = Coordinator::new(hub, proxy.clone());

    TestStack {
        repository,
        proxy,
        coordinator,
        clock,
    }
}

/// Lot A ~1.0 km away at 3000/h, lot B ~0.5 km away at 6000/h
fn two_lot_fixture() -> Vec<Lot> {
    vec![
        test_lot("lot-a", "Lot A", 3.4606, -76.5320, 3000.0, true),
        test_lot("lot-b", "Lot B", 3.4561, -76.5320, 6000.0, true),
    ]
}

#[test]
fn test_price_filter_overrides_proximity() {
    let stack = build_stack(two_lot_fixture());

    let filters = FilterSpec {
        max_distance_km: None,
        max_price: Some(5000.0),
    };
    let outcome = stack.proxy.find_nearest(origin(), &filters, None).unwrap();

    // B is closer but excluded by price
    let SearchOutcome::Found(result) = outcome else {
        panic!("expected a result");
    };
    assert_eq!(result.id, "lot-a");
}

#[test]
fn test_nearest_wins_without_filters() {
    let stack = build_stack(two_lot_fixture());

    let outcome = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();
    let SearchOutcome::Found(result) = outcome else {
        panic!("expected a result");
    };
    assert_eq!(result.id, "lot-b");
    assert!(result.distance_km < 1.0);
}

#[test]
fn test_unavailable_lot_means_not_found() {
    let stack = build_stack(vec![test_lot(
        "closed",
        "Closed Lot",
        3.4561,
        -76.5320,
        3000.0,
        false,
    )]);

    let outcome = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();
    assert!(matches!(outcome, SearchOutcome::NotFound));
}

#[test]
fn test_result_shape_is_fully_enriched() {
    let stack = build_stack(two_lot_fixture());

    let outcome = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();
    let SearchOutcome::Found(result) = outcome else {
        panic!("expected a result");
    };

    assert_eq!(result.estimated_cost, result.price_per_hour * 2.0);
    assert!(result.rating >= 4.0 && result.rating <= 4.9);
    assert_eq!(result.reviews_count, 124);
    let route = result.route.expect("simulated directions always succeed");
    assert_eq!(route.waypoints.len(), 11);
    assert_eq!(result.estimated_time_minutes, Some(route.duration_minutes));
}

#[test]
fn test_repeated_search_is_served_from_cache() {
    let stack = build_stack(two_lot_fixture());

    let first = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();
    let second = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();

    assert_eq!(stack.repository.fetches.load(Ordering::SeqCst), 1);

    // Cached result is the same object, space label included
    let (SearchOutcome::Found(a), SearchOutcome::Found(b)) = (first, second) else {
        panic!("expected results");
    };
    assert_eq!(a.space, b.space);
}

#[test]
fn test_cache_expires_after_ttl() {
    let stack = build_stack(two_lot_fixture());

    stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();
    stack.clock.advance(Duration::from_secs(31));
    stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();

    assert_eq!(stack.repository.fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_rate_limited_identity_gets_retry_hint() {
    let stack = build_stack(two_lot_fixture());

    let first = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), Some("driver-7"))
        .unwrap();
    assert!(matches!(first, SearchOutcome::Found(_)));

    let second = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), Some("driver-7"))
        .unwrap();
    let SearchOutcome::RateLimited { retry_after_secs } = second else {
        panic!("expected rate limit");
    };
    assert_eq!(retry_after_secs, 2);
}

#[test]
fn test_availability_change_evicts_cached_result() {
    let stack = build_stack(two_lot_fixture());

    // Prime the cache with lot B as the winner
    let outcome = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();
    let SearchOutcome::Found(cached) = outcome else {
        panic!("expected a result");
    };
    assert_eq!(cached.id, "lot-b");

    // Close lot B and run the availability-changed flow
    stack.repository.set_availability("lot-b", false).unwrap();
    stack.coordinator.dispatch(
        "api",
        Event::AvailabilityChanged {
            lot_id: "lot-b".to_string(),
            is_available: false,
            previous: Some(true),
        },
    );

    // Still inside the TTL window, yet the stale entry must be gone
    let outcome = stack
        .proxy
        .find_nearest(origin(), &FilterSpec::default(), None)
        .unwrap();
    let SearchOutcome::Found(fresh) = outcome else {
        panic!("expected a result");
    };
    assert_eq!(fresh.id, "lot-a");
    assert_eq!(stack.repository.fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_filter_order_and_precision_collide_on_purpose() {
    let stack = build_stack(two_lot_fixture());

    stack
        .proxy
        .find_nearest(Origin::new(3.451602, -76.532003), &FilterSpec::default(), None)
        .unwrap();
    stack
        .proxy
        .find_nearest(Origin::new(3.451598, -76.531997), &FilterSpec::default(), None)
        .unwrap();

    assert_eq!(stack.repository.fetches.load(Ordering::SeqCst), 1);
}
