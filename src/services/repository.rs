use crate::models::Lot;
use std::sync::RwLock;
use thiserror::Error;

/// Errors from the lot repository collaborator
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("lot not found: {0}")]
    NotFound(String),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// External row store holding the parking lots
///
/// Lots are created and destroyed by the store, never by the search
/// core; the only mutation exposed here is the availability flag.
/// `list_available` must return a stable iteration order so that
/// distance ties break deterministically.
pub trait LotRepository: Send + Sync {
    fn list_available(&self) -> Result<Vec<Lot>, RepositoryError>;
    fn get(&self, id: &str) -> Result<Lot, RepositoryError>;
    fn set_availability(&self, id: &str, is_available: bool) -> Result<Lot, RepositoryError>;
}

/// In-memory repository, insertion-ordered
pub struct InMemoryLotRepository {
    lots: RwLock<Vec<Lot>>,
}

impl InMemoryLotRepository {
    pub fn new(lots: Vec<Lot>) -> Self {
        Self {
            lots: RwLock::new(lots),
        }
    }

    /// Repository seeded with the standard fixture lots (Cali, Colombia)
    pub fn with_seed_data() -> Self {
        Self::new(seed_lots())
    }
}

impl LotRepository for InMemoryLotRepository {
    fn list_available(&self) -> Result<Vec<Lot>, RepositoryError> {
        let lots = self
            .lots
            .read()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        Ok(lots.iter().filter(|l| l.is_available).cloned().collect())
    }

    fn get(&self, id: &str) -> Result<Lot, RepositoryError> {
        let lots = self
            .lots
            .read()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        lots.iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn set_availability(&self, id: &str, is_available: bool) -> Result<Lot, RepositoryError> {
        let mut lots = self
            .lots
            .write()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let lot = lots
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        lot.is_available = is_available;
        Ok(lot.clone())
    }
}

fn seed_lot(name: &str, lat: f64, lng: f64, price: f64, available: bool, capacity: u32, features: &[&str]) -> Lot {
    Lot {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        latitude: lat,
        longitude: lng,
        price_per_hour: price,
        is_available: available,
        capacity,
        features: features.iter().map(|f| f.to_string()).collect(),
        created_at: Some(chrono::Utc::now()),
    }
}

/// Fixture lots used by the demo deployment
pub fn seed_lots() -> Vec<Lot> {
    vec![
        seed_lot("Parqueadero Norte", 3.4680, -76.5150, 4000.0, true, 50, &["Techado", "Vigilancia 24/7", "Cámaras"]),
        seed_lot("Parking Plaza Centro", 3.4650, -76.5180, 3500.0, true, 80, &["Techado", "Vigilancia", "Iluminación LED"]),
        seed_lot("Estacionamiento Premium", 3.4720, -76.5120, 5000.0, false, 30, &["Techado", "Vigilancia 24/7", "Cámaras", "Servicio de lavado"]),
        seed_lot("Parqueadero El Bosque", 3.4690, -76.5140, 3000.0, true, 100, &["Vigilancia", "Acceso controlado"]),
        seed_lot("Parking San Fernando", 3.4660, -76.5160, 3800.0, true, 60, &["Techado", "Cámaras", "App móvil"]),
    ]
}
