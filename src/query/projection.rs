use serde_json::{Map, Value};

use super::value::lookup;
use crate::error::{ApiError, ApiResult};

/// Field always returned by inclusion projections unless explicitly excluded
pub const ID_FIELD: &str = "_id";

/// Field selection parsed from `select=name,description`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Only the listed fields (and `_id` unless excluded)
    Include { fields: Vec<String>, with_id: bool },
    /// Everything except the listed fields
    Exclude(Vec<String>),
}

impl Projection {
    /// Parse a comma-separated field list; blank lists select everything
    pub fn parse(spec: &str) -> ApiResult<Option<Self>> {
        let entries: Vec<&str> = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if entries.is_empty() {
            return Ok(None);
        }

        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for entry in entries {
            match entry.strip_prefix('-') {
                Some(field) if !field.is_empty() => excluded.push(field.to_string()),
                Some(_) => {}
                None => included.push(entry.strip_prefix('+').unwrap_or(entry).to_string()),
            }
        }

        let excludes_only_id = excluded.iter().all(|f| f == ID_FIELD);
        if !included.is_empty() {
            if !excludes_only_id {
                return Err(ApiError::BadRequest(
                    "Cannot mix inclusion and exclusion in select".to_string(),
                ));
            }
            return Ok(Some(Projection::Include {
                fields: included,
                with_id: excluded.is_empty(),
            }));
        }

        if excluded.is_empty() {
            return Ok(None);
        }
        Ok(Some(Projection::Exclude(excluded)))
    }

    pub fn apply(&self, doc: Value) -> Value {
        match self {
            Projection::Include { fields, with_id } => {
                let mut out = Value::Object(Map::new());
                if *with_id {
                    if let Some(id) = doc.get(ID_FIELD) {
                        set_path(&mut out, ID_FIELD, id.clone());
                    }
                }
                for field in fields {
                    if let Some(v) = lookup(&doc, field) {
                        set_path(&mut out, field, v.clone());
                    }
                }
                out
            }
            Projection::Exclude(fields) => {
                let mut out = doc;
                for field in fields {
                    remove_path(&mut out, field);
                }
                out
            }
        }
    }
}

fn set_path(target: &mut Value, path: &str, value: Value) {
    let mut current = target;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Some(obj) = current.as_object_mut() else {
            return;
        };
        if segments.peek().is_none() {
            obj.insert(segment.to_string(), value);
            return;
        }
        current = obj
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn remove_path(target: &mut Value, path: &str) {
    match path.split_once('.') {
        None => {
            if let Some(obj) = target.as_object_mut() {
                obj.remove(path);
            }
        }
        Some((head, rest)) => {
            if let Some(child) = target.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "_id": "0192",
            "name": "Devworks",
            "description": "Full stack",
            "housing": true,
            "location": {"city": "Boston", "state": "MA"}
        })
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(Projection::parse("").unwrap(), None);
        assert_eq!(Projection::parse(" , ").unwrap(), None);
    }

    #[test]
    fn test_include_keeps_id() {
        let projection = Projection::parse("name,description").unwrap().unwrap();
        assert_eq!(
            projection.apply(doc()),
            json!({"_id": "0192", "name": "Devworks", "description": "Full stack"})
        );
    }

    #[test]
    fn test_include_without_id() {
        let projection = Projection::parse("name,-_id").unwrap().unwrap();
        assert_eq!(projection.apply(doc()), json!({"name": "Devworks"}));
    }

    #[test]
    fn test_include_nested_path() {
        let projection = Projection::parse("location.city").unwrap().unwrap();
        assert_eq!(
            projection.apply(doc()),
            json!({"_id": "0192", "location": {"city": "Boston"}})
        );
    }

    #[test]
    fn test_exclude() {
        let projection = Projection::parse("-description,-location.state")
            .unwrap()
            .unwrap();
        assert_eq!(
            projection.apply(doc()),
            json!({
                "_id": "0192",
                "name": "Devworks",
                "housing": true,
                "location": {"city": "Boston"}
            })
        );
    }

    #[test]
    fn test_mixed_is_rejected() {
        let err = Projection::parse("name,-description").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let projection = Projection::parse("name,photo").unwrap().unwrap();
        assert_eq!(
            projection.apply(doc()),
            json!({"_id": "0192", "name": "Devworks"})
        );
    }
}
