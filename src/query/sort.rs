use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::value::{lookup, total_order};

/// Field holding the creation timestamp, the default sort key
pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// Ordered list of sort keys; an empty list keeps storage order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    keys: Vec<SortKey>,
}

impl Sort {
    /// Keep documents in storage order
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Newest first
    pub fn newest_first() -> Self {
        Self {
            keys: vec![SortKey::descending(CREATED_AT_FIELD)],
        }
    }

    /// Parse `name,-averageCost`; a missing or blank spec falls back to newest first
    pub fn parse(spec: Option<&str>) -> Self {
        let keys: Vec<SortKey> = spec
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| {
                if let Some(field) = s.strip_prefix('-') {
                    (!field.is_empty()).then(|| SortKey::descending(field))
                } else {
                    let field = s.strip_prefix('+').unwrap_or(s);
                    (!field.is_empty()).then(|| SortKey::ascending(field))
                }
            })
            .collect();

        if keys.is_empty() {
            Self::newest_first()
        } else {
            Self { keys }
        }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_unsorted(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for key in &self.keys {
            let ord = total_order(lookup(a, &key.field), lookup(b, &key.field));
            let ord = match key.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort
    pub fn apply(&self, docs: &mut [Value]) {
        if !self.is_unsorted() {
            docs.sort_by(|a, b| self.compare(a, b));
        }
    }

    /// Render as `{"field": 1 | -1}`
    pub fn to_document(&self) -> Value {
        let mut obj = Map::new();
        for key in &self.keys {
            let dir = match key.direction {
                Direction::Ascending => 1,
                Direction::Descending => -1,
            };
            obj.insert(key.field.clone(), Value::from(dir));
        }
        Value::Object(obj)
    }
}
