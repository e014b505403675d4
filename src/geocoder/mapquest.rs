use async_trait::async_trait;
use serde::Deserialize;

use super::{endpoint, join_address, GeocodeResult, Geocoder};
use crate::error::{ApiError, ApiResult};

pub const DEFAULT_BASE_URL: &str = "https://www.mapquestapi.com";

/// MapQuest Geocoding API v1 client
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl MapQuestGeocoder {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    #[serde(default)]
    info: Option<Info>,
    #[serde(default)]
    results: Vec<AddressResult>,
}

#[derive(Debug, Deserialize)]
struct Info {
    statuscode: i64,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AddressResult {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    lat_lng: LatLng,
    street: Option<String>,
    /// City
    admin_area5: Option<String>,
    /// State
    admin_area3: Option<String>,
    /// Country
    admin_area1: Option<String>,
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<Location> for GeocodeResult {
    fn from(loc: Location) -> Self {
        let state_zip = join_address(&[loc.admin_area3.as_deref(), loc.postal_code.as_deref()], " ");
        let formatted_address = join_address(&[
            loc.street.as_deref(),
            loc.admin_area5.as_deref(),
            state_zip.as_deref(),
            loc.admin_area1.as_deref(),
        ], ", ");

        GeocodeResult {
            latitude: loc.lat_lng.lat,
            longitude: loc.lat_lng.lng,
            formatted_address,
            street: non_empty(loc.street),
            city: non_empty(loc.admin_area5),
            state: non_empty(loc.admin_area3),
            zipcode: non_empty(loc.postal_code),
            country_code: non_empty(loc.admin_area1),
        }
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> ApiResult<Vec<GeocodeResult>> {
        let url = endpoint(
            &self.base_url,
            "geocoding/v1/address",
            &[("key", self.api_key.as_str()), ("location", query)],
        )?;

        tracing::debug!(query = %query, "Geocoding with MapQuest");

        let response: AddressResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(info) = response.info {
            if info.statuscode != 0 {
                return Err(ApiError::Geocoding(format!(
                    "MapQuest status {}: {}",
                    info.statuscode,
                    info.messages.join("; ")
                )));
            }
        }

        Ok(response
            .results
            .into_iter()
            .flat_map(|r| r.locations)
            .map(GeocodeResult::from)
            .collect())
    }
}
