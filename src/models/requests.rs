use crate::models::domain::FilterSpec;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find the nearest available lot
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    #[validate(nested)]
    pub filters: Option<FilterRequest>,
    #[serde(default)]
    pub identity: Option<String>,
}

/// Optional constraints on the search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FilterRequest {
    #[serde(rename = "max_distance", default)]
    #[validate(range(exclusive_min = 0.0))]
    pub max_distance_km: Option<f64>,
    #[serde(rename = "max_price", default)]
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
}

impl From<&FilterRequest> for FilterSpec {
    fn from(req: &FilterRequest) -> Self {
        FilterSpec {
            max_distance_km: req.max_distance_km,
            max_price: req.max_price,
        }
    }
}

impl SearchRequest {
    /// Resolved filter set; absent filters mean no constraint
    pub fn filter_spec(&self) -> FilterSpec {
        self.filters.as_ref().map(FilterSpec::from).unwrap_or_default()
    }
}

/// Request to flip a lot's availability flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    #[serde(rename = "is_available")]
    pub is_available: bool,
}
