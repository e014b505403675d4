//! Forward geocoding: postal codes and street addresses to coordinates.

pub mod mapquest;
pub mod openstreetmap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::storage::GeoPoint;

pub use mapquest::MapQuestGeocoder;
pub use openstreetmap::OpenStreetMapGeocoder;

/// User agent sent to geocoding providers
pub const USER_AGENT: &str = concat!("devcamper/", env!("CARGO_PKG_VERSION"));

/// One candidate location returned by a provider, best match first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country_code: Option<String>,
}

impl GeocodeResult {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-form query; an empty list means nothing matched
    async fn geocode(&self, query: &str) -> ApiResult<Vec<GeocodeResult>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GeocoderProvider {
    #[default]
    Mapquest,
    Openstreetmap,
}

#[derive(Debug, Clone, Default)]
pub struct GeocoderConfig {
    pub provider: GeocoderProvider,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Build the configured provider
pub fn build_geocoder(config: &GeocoderConfig) -> ApiResult<Arc<dyn Geocoder>> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    match config.provider {
        GeocoderProvider::Mapquest => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                ApiError::Internal("the mapquest geocoder requires an API key".to_string())
            })?;
            let mut geocoder = MapQuestGeocoder::new(client, api_key);
            if let Some(base_url) = &config.base_url {
                geocoder = geocoder.with_base_url(base_url);
            }
            Ok(Arc::new(geocoder))
        }
        GeocoderProvider::Openstreetmap => {
            let mut geocoder = OpenStreetMapGeocoder::new(client);
            if let Some(base_url) = &config.base_url {
                geocoder = geocoder.with_base_url(base_url);
            }
            Ok(Arc::new(geocoder))
        }
    }
}

/// Join the non-empty address parts with `separator`
pub(crate) fn join_address(parts: &[Option<&str>], separator: &str) -> Option<String> {
    let joined = parts
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    (!joined.is_empty()).then_some(joined)
}

pub(crate) fn endpoint(base_url: &str, path: &str, params: &[(&str, &str)]) -> ApiResult<url::Url> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), path);
    url::Url::parse_with_params(&raw, params)
        .map_err(|e| ApiError::Internal(format!("Invalid geocoder URL '{}': {}", raw, e)))
}
