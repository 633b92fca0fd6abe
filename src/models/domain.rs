use serde::{Deserialize, Serialize};

/// A parking facility record, owned by the lot repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "pricePerHour")]
    pub price_per_hour: f64,
    #[serde(rename = "isAvailable", default = "default_true")]
    pub is_available: bool,
    pub capacity: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Lot {
    /// Coordinates of the lot as an origin-shaped point
    pub fn position(&self) -> Origin {
        Origin {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

fn default_true() -> bool {
    true
}

/// The searcher's coordinate pair, supplied per request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub lat: f64,
    pub lng: f64,
}

impl Origin {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Optional search constraints; an absent field means no constraint
/// on that dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "max_distance", default)]
    pub max_distance_km: Option<f64>,
    #[serde(rename = "max_price", default)]
    pub max_price: Option<f64>,
}

/// A point along a computed route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
}

/// Route estimate between the searcher and a lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub waypoints: Vec<Waypoint>,
}

/// The enriched search response for the selected lot
///
/// `space` is freshly assigned on every search and callers must not
/// assume it is stable across repeated calls for the same lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub price_per_hour: f64,
    pub is_available: bool,
    pub features: Vec<String>,
    pub route: Option<Route>,
    pub space: String,
    pub estimated_time_minutes: Option<f64>,
    pub estimated_cost: f64,
    pub rating: f64,
    pub capacity: u32,
    pub reviews_count: u32,
}

/// One recorded search, kept by the history sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "lotId")]
    pub lot_id: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
