use crate::geocoder::Geocoder;
use crate::storage::{Collection, DistanceUnit};
use axum::response::Json;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub bootcamps: Collection,
    pub geocoder: Arc<dyn Geocoder>,
    pub distance_unit: DistanceUnit,
}

impl AppState {
    pub fn new(bootcamps: Collection, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            bootcamps,
            geocoder,
            distance_unit: DistanceUnit::default(),
        }
    }

    pub fn with_distance_unit(mut self, unit: DistanceUnit) -> Self {
        self.distance_unit = unit;
        self
    }
}

/// Liveness probe
pub async fn health_check_handler() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
