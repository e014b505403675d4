pub mod collection;
pub mod document;
pub mod engine;
pub mod geo;
pub mod schema;

pub use collection::Collection;
pub use document::Document;
pub use engine::StorageEngine;
pub use geo::{DistanceUnit, GeoPoint};
pub use schema::{SchemaValidationMode, SchemaValidator};
