use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Document identifier field
pub const ID_FIELD: &str = "_id";
/// Creation timestamp field
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Represents a JSON document in a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Generated identifier (UUIDv7, time ordered)
    #[serde(rename = "_id")]
    pub id: String,

    /// Creation timestamp
    #[serde(rename = "createdAt", with = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// The actual document data
    #[serde(flatten)]
    pub data: Value,
}

impl Document {
    /// Create a new document with a generated id
    pub fn new(mut data: Value) -> Self {
        strip_system_fields(&mut data);
        Self {
            id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)).to_string(),
            created_at: Utc::now().trunc_subsecs(6),
            data,
        }
    }

    /// Merge top-level fields of `data` into the document; system fields are kept
    pub fn update(&mut self, mut data: Value) {
        strip_system_fields(&mut data);
        match data {
            Value::Object(new) if self.data.is_object() => {
                if let Some(existing) = self.data.as_object_mut() {
                    existing.extend(new);
                }
            }
            other => self.data = other,
        }
    }

    /// Convert to JSON value including metadata
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn strip_system_fields(data: &mut Value) {
    if let Some(obj) = data.as_object_mut() {
        obj.remove(ID_FIELD);
        obj.remove(CREATED_AT_FIELD);
    }
}

/// RFC 3339 with a fixed microsecond precision so that string order is time order
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
