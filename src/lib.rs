//! Parkfinder - nearest-parking search service
//!
//! This library implements the search-and-ranking pipeline behind the
//! parking finder: composable filter criteria, distance and route
//! computation, a caching/rate-limiting access proxy, and the
//! availability-change notification layer that keeps the cache honest.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{haversine_distance, Criterion, DistanceProvider, GeoAdapter, SearchFacade};
pub use models::{FilterSpec, Lot, Origin, RankedResult, SearchRequest};
pub use services::{Coordinator, NotificationHub, SearchOutcome, SearchProxy};
