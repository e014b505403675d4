pub mod bootcamp;
pub mod config;
pub mod error;
pub mod geocoder;
pub mod query;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use geocoder::{build_geocoder, GeocodeResult, Geocoder};
pub use query::{FindQuery, QueryDescriptor};
pub use server::{create_router, create_ws_router, AppState};
pub use storage::{Collection, Document, StorageEngine};
