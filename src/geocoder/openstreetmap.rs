use async_trait::async_trait;
use serde::Deserialize;

use super::{endpoint, join_address, GeocodeResult, Geocoder};
use crate::error::{ApiError, ApiResult};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim search client
pub struct OpenStreetMapGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl OpenStreetMapGeocoder {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: Option<String>,
    #[serde(default)]
    address: Address,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country_code: Option<String>,
}

impl TryFrom<Place> for GeocodeResult {
    type Error = ApiError;

    fn try_from(place: Place) -> Result<Self, Self::Error> {
        let parse = |raw: &str| {
            raw.trim().parse::<f64>().map_err(|_| {
                ApiError::Geocoding(format!("Nominatim returned a bad coordinate '{}'", raw))
            })
        };
        let latitude = parse(&place.lat)?;
        let longitude = parse(&place.lon)?;

        let address = place.address;
        let street = match (address.house_number.as_deref(), address.road.as_deref()) {
            (Some(number), Some(road)) => Some(format!("{} {}", number, road)),
            (None, Some(road)) => Some(road.to_string()),
            _ => None,
        };
        let city = address.city.or(address.town).or(address.village);

        Ok(GeocodeResult {
            latitude,
            longitude,
            formatted_address: place.display_name.or_else(|| {
                join_address(
                    &[street.as_deref(), city.as_deref(), address.state.as_deref()],
                    ", ",
                )
            }),
            street,
            city,
            state: address.state,
            zipcode: address.postcode,
            country_code: address.country_code.map(|c| c.to_uppercase()),
        })
    }
}

#[async_trait]
impl Geocoder for OpenStreetMapGeocoder {
    async fn geocode(&self, query: &str) -> ApiResult<Vec<GeocodeResult>> {
        let url = endpoint(
            &self.base_url,
            "search",
            &[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "5"),
            ],
        )?;

        tracing::debug!(query = %query, "Geocoding with OpenStreetMap");

        let places: Vec<Place> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        places.into_iter().map(GeocodeResult::try_from).collect()
    }
}
