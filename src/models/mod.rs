// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{FilterSpec, Lot, Origin, RankedResult, Route, SearchRecord, Waypoint};
pub use requests::{FilterRequest, SearchRequest, UpdateAvailabilityRequest};
pub use responses::{AvailabilityResponse, ErrorResponse, HealthResponse, RateLimitedResponse};
