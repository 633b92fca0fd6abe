// Service exports
pub mod coordinator;
pub mod history;
pub mod hub;
pub mod proxy;
pub mod repository;

pub use coordinator::{Coordinator, Event};
pub use history::{HistorySink, InMemoryHistory};
pub use hub::{AvailabilityEvent, AvailabilitySubscriber, NotificationHub, RealtimePushSubscriber, SubscriberError};
pub use proxy::{Clock, SearchOutcome, SearchProxy, SystemClock};
pub use repository::{InMemoryLotRepository, LotRepository, RepositoryError};
