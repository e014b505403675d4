//! The bootcamp resource: collection name, schema and create-time enrichment.

use serde_json::{json, Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::geocoder::{GeocodeResult, Geocoder};
use crate::storage::{Collection, SchemaValidationMode, SchemaValidator, StorageEngine};

pub const COLLECTION: &str = "bootcamps";

/// GeoJSON point used by radius searches
pub const LOCATION_FIELD: &str = "location";

/// Fields that must be unique across the collection
pub const UNIQUE_FIELDS: [&str; 1] = ["name"];

pub const CAREERS: [&str; 6] = [
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

const DEFAULT_PHOTO: &str = "no-photo.jpg";
const FLAG_FIELDS: [&str; 4] = ["housing", "jobAssistance", "jobGuarantee", "acceptGi"];

/// JSON Schema for stored bootcamp documents
pub fn schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string", "minLength": 1, "maxLength": 50},
            "slug": {"type": "string"},
            "description": {"type": "string", "maxLength": 500},
            "website": {"type": "string", "pattern": "^https?://"},
            "phone": {"type": "string", "maxLength": 20},
            "email": {"type": "string", "pattern": "^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$"},
            "address": {"type": "string"},
            "location": {
                "type": "object",
                "required": ["type", "coordinates"],
                "properties": {
                    "type": {"const": "Point"},
                    "coordinates": {
                        "type": "array",
                        "items": {"type": "number"},
                        "minItems": 2,
                        "maxItems": 2
                    },
                    "formattedAddress": {"type": "string"},
                    "street": {"type": "string"},
                    "city": {"type": "string"},
                    "state": {"type": "string"},
                    "zipcode": {"type": "string"},
                    "country": {"type": "string"}
                }
            },
            "careers": {"type": "array", "items": {"enum": CAREERS}},
            "averageRating": {"type": "number", "minimum": 1, "maximum": 10},
            "averageCost": {"type": "number"},
            "photo": {"type": "string"},
            "housing": {"type": "boolean"},
            "jobAssistance": {"type": "boolean"},
            "jobGuarantee": {"type": "boolean"},
            "acceptGi": {"type": "boolean"}
        }
    })
}

/// Open the bootcamp collection with its schema and unique fields attached
pub fn open_collection(
    engine: &StorageEngine,
    validation: SchemaValidationMode,
) -> ApiResult<Collection> {
    let validator = SchemaValidator::new(COLLECTION, &schema(), validation)?;
    tracing::debug!(mode = ?validator.mode(), "Bootcamp schema loaded");
    Ok(engine
        .collection(COLLECTION)?
        .with_schema(validator)
        .with_unique_fields(UNIQUE_FIELDS))
}

/// Fill in derived fields before a bootcamp is first stored:
/// slug from name, default photo and flags, and a GeoJSON location geocoded from `address`
pub async fn prepare_new(mut body: Value, geocoder: &dyn Geocoder) -> ApiResult<Value> {
    let Some(obj) = body.as_object_mut() else {
        return Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    };

    if let Some(name) = obj.get("name").and_then(Value::as_str) {
        let slug = slug::slugify(name);
        obj.insert("slug".to_string(), Value::String(slug));
    }

    obj.entry("photo")
        .or_insert_with(|| Value::String(DEFAULT_PHOTO.to_string()));
    for flag in FLAG_FIELDS {
        obj.entry(flag).or_insert(Value::Bool(false));
    }

    if let Some(address) = obj.get("address").and_then(Value::as_str).map(str::to_string) {
        let result = geocoder
            .geocode(&address)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::LocationNotFound(address.clone()))?;
        obj.insert(LOCATION_FIELD.to_string(), location_from(&result));
        // The geocoded location replaces the raw address
        obj.remove("address");
    }

    Ok(body)
}

/// GeoJSON point enriched with the provider's address breakdown
pub fn location_from(result: &GeocodeResult) -> Value {
    let mut location = Map::new();
    location.insert("type".to_string(), json!("Point"));
    location.insert(
        "coordinates".to_string(),
        json!([result.longitude, result.latitude]),
    );

    let parts = [
        ("formattedAddress", &result.formatted_address),
        ("street", &result.street),
        ("city", &result.city),
        ("state", &result.state),
        ("zipcode", &result.zipcode),
        ("country", &result.country_code),
    ];
    for (key, value) in parts {
        if let Some(value) = value {
            location.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    Value::Object(location)
}
