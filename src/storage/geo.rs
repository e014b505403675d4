use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Earth mean radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Earth mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Unit of the linear distance given to radius searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn earth_radius(self) -> f64 {
        match self {
            DistanceUnit::Miles => EARTH_RADIUS_MILES,
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
        }
    }

    /// Convert a linear distance into radians on the Earth's surface
    pub fn angular_radius(self, distance: f64) -> f64 {
        distance / self.earth_radius()
    }
}

/// A geographic point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geo point
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Parse geo point from JSON value
    /// Supports GeoJSON `{ "type": "Point", "coordinates": [lng, lat] }`,
    /// legacy `[lng, lat]` pairs and `{ "lat": .., "lng": .. }` objects
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(obj) = value.as_object() {
            if let Some(coordinates) = obj.get("coordinates") {
                return Self::from_pair(coordinates);
            }
            let lat = obj.get("lat").or(obj.get("latitude"))?.as_f64()?;
            let lon = obj
                .get("lon")
                .or(obj.get("lng"))
                .or(obj.get("longitude"))?
                .as_f64()?;
            return Some(Self::new(lat, lon));
        }

        Self::from_pair(value)
    }

    /// `[lng, lat]`, the coordinate order used by GeoJSON
    fn from_pair(value: &Value) -> Option<Self> {
        let arr = value.as_array()?;
        if arr.len() != 2 {
            return None;
        }
        let lon = arr[0].as_f64()?;
        let lat = arr[1].as_f64()?;
        Some(Self::new(lat, lon))
    }

    /// Render as a GeoJSON coordinate pair
    pub fn to_pair(&self) -> Value {
        serde_json::json!([self.lon, self.lat])
    }
}

/// Central angle between two points in radians (haversine formula)
pub fn central_angle(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1_rad = p1.lat.to_radians();
    let lat2_rad = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lon = (p2.lon - p1.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * a.sqrt().min(1.0).asin()
}

/// Whether `point` lies inside the spherical cap of `radius` radians around `center`
pub fn within_sphere(point: &GeoPoint, center: &GeoPoint, radius: f64) -> bool {
    central_angle(point, center) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_angular_radius_miles() {
        let radius = DistanceUnit::Miles.angular_radius(3963.0);
        assert!((radius - 1.0).abs() < 1e-12);

        let radius = DistanceUnit::Miles.angular_radius(10.0);
        assert!((radius - 10.0 / 3963.0).abs() < 1e-12);
    }

    #[test]
    fn test_angular_radius_km() {
        let radius = DistanceUnit::Kilometers.angular_radius(6378.1);
        assert!((radius - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_geojson_point() {
        let p = GeoPoint::from_value(&json!({
            "type": "Point",
            "coordinates": [-71.104028, 42.350846]
        }))
        .unwrap();
        assert_eq!(p.lat, 42.350846);
        assert_eq!(p.lon, -71.104028);
    }

    #[test]
    fn test_from_legacy_pair_and_object() {
        let p = GeoPoint::from_value(&json!([2.35, 48.85])).unwrap();
        assert_eq!(p, GeoPoint::new(48.85, 2.35));

        let p = GeoPoint::from_value(&json!({"lat": 48.85, "lng": 2.35})).unwrap();
        assert_eq!(p, GeoPoint::new(48.85, 2.35));

        assert!(GeoPoint::from_value(&json!("nowhere")).is_none());
        assert!(GeoPoint::from_value(&json!([1.0])).is_none());
    }

    #[test]
    fn test_distance_boston_to_worcester() {
        let boston = GeoPoint::new(42.3601, -71.0589);
        let worcester = GeoPoint::new(42.2626, -71.8023);
        let d = central_angle(&boston, &worcester) * DistanceUnit::Miles.earth_radius();
        assert!(d > 37.0 && d < 40.0, "got {}", d);
    }

    #[test]
    fn test_within_sphere() {
        let boston = GeoPoint::new(42.3601, -71.0589);
        let worcester = GeoPoint::new(42.2626, -71.8023);
        let radius_50mi = DistanceUnit::Miles.angular_radius(50.0);
        let radius_10mi = DistanceUnit::Miles.angular_radius(10.0);

        assert!(within_sphere(&worcester, &boston, radius_50mi));
        assert!(!within_sphere(&worcester, &boston, radius_10mi));
        assert!(within_sphere(&boston, &boston, 0.0));
    }
}
