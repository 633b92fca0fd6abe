// Core search pipeline exports
pub mod criteria;
pub mod distance;
pub mod ranker;

pub use criteria::{CombineOp, Criterion};
pub use distance::{haversine_distance, DistanceProvider, GeoAdapter, SimulatedDirections};
pub use ranker::{SearchError, SearchFacade};
