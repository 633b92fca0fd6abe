use crate::core::criteria::Criterion;
use crate::core::distance::DistanceProvider;
use crate::models::{FilterSpec, Lot, Origin, RankedResult, Route};
use crate::services::repository::{LotRepository, RepositoryError};
use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

/// Billing assumption for the estimated cost: a two-hour stay
const DEFAULT_PARKED_HOURS: f64 = 2.0;

/// Placeholder until a reviews service exists
const REVIEWS_COUNT_PLACEHOLDER: u32 = 124;

const SPACE_SECTIONS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Errors from the search pipeline
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("lot repository unavailable: {0}")]
    Upstream(#[from] RepositoryError),
}

/// Facade over the search pipeline
///
/// Orchestrates repository fetch, criteria filtering, distance
/// computation, minimum-distance selection and result enrichment behind
/// a single call.
pub struct SearchFacade {
    repository: Arc<dyn LotRepository>,
    provider: Arc<dyn DistanceProvider>,
}

impl SearchFacade {
    pub fn new(repository: Arc<dyn LotRepository>, provider: Arc<dyn DistanceProvider>) -> Self {
        Self {
            repository,
            provider,
        }
    }

    /// Find the nearest lot satisfying the filters
    ///
    /// Returns `Ok(None)` when no lot matches; repository failures
    /// propagate. Ties on distance go to the first lot in repository
    /// iteration order.
    pub fn find_nearest(
        &self,
        origin: Origin,
        filters: &FilterSpec,
    ) -> Result<Option<RankedResult>, SearchError> {
        let lots = self.repository.list_available()?;
        tracing::debug!(count = lots.len(), "Fetched available lots");

        let criteria = build_criteria(filters);
        let retained: Vec<&Lot> = lots
            .iter()
            .filter(|lot| criteria.matches(lot, origin, self.provider.as_ref()))
            .collect();
        tracing::debug!(count = retained.len(), "Lots after criteria filtering");

        let mut nearest: Option<(&Lot, f64)> = None;
        for lot in retained {
            let distance = self.provider.distance(origin, lot.position());
            let closer = match nearest {
                Some((_, best)) => distance < best,
                None => true,
            };
            if closer {
                nearest = Some((lot, distance));
            }
        }

        let Some((lot, distance)) = nearest else {
            return Ok(None);
        };
        tracing::info!(lot = %lot.name, distance_km = distance, "Selected nearest lot");

        let route = self.provider.route(origin, lot.position());
        Ok(Some(enrich(lot, distance, route)))
    }
}

fn build_criteria(filters: &FilterSpec) -> Criterion {
    let mut criteria = Criterion::all();
    criteria.push(Criterion::Available);
    if let Some(max_distance) = filters.max_distance_km {
        criteria.push(Criterion::MaxDistance(max_distance));
    }
    if let Some(max_price) = filters.max_price {
        criteria.push(Criterion::MaxPrice(max_price));
    }
    criteria
}

fn enrich(lot: &Lot, distance_km: f64, route: Option<Route>) -> RankedResult {
    let estimated_time_minutes = route.as_ref().map(|r| r.duration_minutes);

    RankedResult {
        id: lot.id.clone(),
        name: lot.name.clone(),
        latitude: lot.latitude,
        longitude: lot.longitude,
        distance_km: (distance_km * 100.0).round() / 100.0,
        price_per_hour: lot.price_per_hour,
        is_available: lot.is_available,
        features: lot.features.clone(),
        route,
        space: assign_space(),
        estimated_time_minutes,
        estimated_cost: lot.price_per_hour * DEFAULT_PARKED_HOURS,
        rating: rating_for(&lot.name),
        capacity: lot.capacity,
        reviews_count: REVIEWS_COUNT_PLACEHOLDER,
    }
}

/// Cosmetic rating in [4.0, 4.9], stable per lot name
fn rating_for(name: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    4.0 + (hasher.finish() % 10) as f64 / 10.0
}

/// Assign a space label; fresh on every call, never stable
fn assign_space() -> String {
    let mut rng = rand::thread_rng();
    let section = SPACE_SECTIONS[rng.gen_range(0..SPACE_SECTIONS.len())];
    format!("{}-{:02}", section, rng.gen_range(1..=25))
}
