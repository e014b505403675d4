//! Query-string translation.
//!
//! Turns `?averageCost[lte]=10000&careers[in]=Business&select=name&sort=-name`
//! into a typed [`FindQuery`]. Bracketed keys follow the usual nested
//! query-string convention: `field[token]=value` builds a filter object for
//! `field`, and recognised comparison tokens are mapped to storage operators
//! through [`Operator`] instead of rewriting serialized text.

use serde_json::Value;

use super::filter::{Clause, Filter, Predicate};
use super::operator::Operator;
use super::projection::Projection;
use super::sort::Sort;
use super::FindQuery;
use crate::error::{ApiError, ApiResult};

/// Field-projection parameter
pub const SELECT_PARAM: &str = "select";
/// Sort-order parameter
pub const SORT_PARAM: &str = "sort";

/// Parameters consumed by the translator that never become filter fields
pub const RESERVED_PARAMS: [&str; 2] = [SELECT_PARAM, SORT_PARAM];

/// Parsed form of a list request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub filter: Filter,
    pub select: Option<Projection>,
    pub sort: Sort,
}

/// Value accumulated for one filter field before it becomes a predicate
enum Pending {
    Literal(Vec<String>),
    Object(Vec<(String, Vec<String>)>),
}

impl QueryDescriptor {
    /// Parse a raw (still percent-encoded) query string
    pub fn from_query_string(raw: &str) -> ApiResult<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
            .map_err(|e| ApiError::BadRequest(format!("Malformed query string: {}", e)))?;
        Self::from_pairs(pairs)
    }

    /// Build from decoded key/value pairs, in query-string order
    pub fn from_pairs<I>(pairs: I) -> ApiResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut select: Option<String> = None;
        let mut sort: Option<String> = None;
        let mut pending: Vec<(String, Pending)> = Vec::new();

        for (key, value) in pairs {
            let (field, path) = split_key(&key);

            if path.is_empty() && field == SELECT_PARAM {
                select = Some(value);
                continue;
            }
            if path.is_empty() && field == SORT_PARAM {
                sort = Some(value);
                continue;
            }
            if RESERVED_PARAMS.contains(&field) {
                // `select[x]=..` and friends are never filters either
                continue;
            }

            validate_field(field)?;

            let slot = match pending.iter().position(|(f, _)| f == field) {
                Some(i) => &mut pending[i].1,
                None => {
                    let initial = if path.is_empty() {
                        Pending::Literal(Vec::new())
                    } else {
                        Pending::Object(Vec::new())
                    };
                    pending.push((field.to_string(), initial));
                    let last = pending.len() - 1;
                    &mut pending[last].1
                }
            };

            match (slot, path.is_empty()) {
                (Pending::Literal(values), true) => values.push(value),
                (Pending::Object(entries), false) => {
                    let sub_key = path.join(".");
                    match entries.iter_mut().find(|(k, _)| *k == sub_key) {
                        Some((_, values)) => values.push(value),
                        None => entries.push((sub_key, vec![value])),
                    }
                }
                _ => {
                    return Err(ApiError::BadRequest(format!(
                        "Field '{}' cannot be both a value and an operator object",
                        field
                    )))
                }
            }
        }

        let mut filter = Filter::new();
        for (field, value) in pending {
            filter.push(field, into_predicate(value));
        }

        let select = match select {
            Some(spec) => Projection::parse(&spec)?,
            None => None,
        };

        Ok(Self {
            filter,
            select,
            sort: Sort::parse(sort.as_deref()),
        })
    }

    pub fn into_find_query(self) -> FindQuery {
        FindQuery {
            filter: self.filter,
            projection: self.select,
            sort: self.sort,
        }
    }
}

/// Split `a[b][c]` into `("a", ["b", "c"])`; keys without well-formed brackets are plain fields
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    if open == 0 || !key.ends_with(']') {
        return (key, Vec::new());
    }

    let field = &key[..open];
    let inner = &key[open + 1..key.len() - 1];
    let segments: Vec<&str> = inner.split("][").collect();
    if segments.iter().any(|s| s.contains('[') || s.contains(']')) {
        return (key, Vec::new());
    }
    // `tags[]=a` appends to a list rather than naming a sub-key
    if segments == [""] {
        return (field, Vec::new());
    }
    (field, segments)
}

fn validate_field(field: &str) -> ApiResult<()> {
    if field.is_empty() {
        return Err(ApiError::BadRequest("Empty filter field name".to_string()));
    }
    if field.starts_with('$') || field.split('.').any(|s| s.is_empty() || s.starts_with('$')) {
        return Err(ApiError::BadRequest(format!(
            "Invalid filter field '{}'",
            field
        )));
    }
    Ok(())
}

fn into_predicate(pending: Pending) -> Predicate {
    match pending {
        Pending::Literal(mut values) => {
            if values.len() == 1 {
                Predicate::Equals(Value::String(values.remove(0)))
            } else {
                Predicate::Equals(Value::Array(
                    values.into_iter().map(Value::String).collect(),
                ))
            }
        }
        Pending::Object(entries) => Predicate::Clauses(
            entries
                .into_iter()
                .map(|(key, values)| match Operator::from_token(&key) {
                    Some(Operator::In) => Clause::Compare(Operator::In, in_operand(values)),
                    Some(op) => Clause::Compare(op, last_value(values)),
                    None => Clause::Field(key, last_value(values)),
                })
                .collect(),
        ),
    }
}

/// `in` takes every repeated value, each possibly comma-separated
fn in_operand(values: Vec<String>) -> Value {
    Value::Array(
        values
            .iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
    )
}

/// Scalar operators keep the last occurrence
fn last_value(mut values: Vec<String>) -> Value {
    Value::String(values.pop().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::sort::SortKey;
    use serde_json::json;

    fn parse(raw: &str) -> QueryDescriptor {
        QueryDescriptor::from_query_string(raw).unwrap()
    }

    #[test]
    fn test_empty_query() {
        let q = parse("");
        assert!(q.filter.is_empty());
        assert_eq!(q.select, None);
        assert_eq!(q.sort, Sort::newest_first());
    }

    #[test]
    fn test_select_is_never_a_filter_field() {
        let q = parse("select=name,description&housing=true");
        assert!(!q.filter.contains_field("select"));
        assert!(q.filter.contains_field("housing"));
        assert_eq!(
            q.select,
            Some(Projection::Include {
                fields: vec!["name".to_string(), "description".to_string()],
                with_id: true,
            })
        );
        assert_eq!(q.filter.to_document(), json!({"housing": "true"}));
    }

    #[test]
    fn test_sort_is_never_a_filter_field() {
        let q = parse("sort=-name,averageCost");
        assert!(q.filter.is_empty());
        assert_eq!(
            q.sort.keys(),
            &[SortKey::descending("name"), SortKey::ascending("averageCost")]
        );
    }

    #[test]
    fn test_operator_tokens_are_prefixed() {
        let q = parse("averageCost%5Blte%5D=10000&averageRating[gt]=7&averageRating[lt]=9");
        assert_eq!(
            q.filter.to_document(),
            json!({
                "averageCost": {"$lte": "10000"},
                "averageRating": {"$gt": "7", "$lt": "9"}
            })
        );
    }

    #[test]
    fn test_all_tokens() {
        for op in Operator::ALL {
            let q = parse(&format!("field[{}]=1", op.token()));
            let doc = q.filter.to_document();
            let inner = doc["field"].as_object().unwrap();
            assert!(inner.contains_key(op.storage_operator()), "{:?}", doc);
            assert!(!inner.contains_key(op.token()));
        }
    }

    #[test]
    fn test_unknown_tokens_pass_through_unchanged() {
        let q = parse("location[city]=Boston&location[state]=MA");
        assert_eq!(
            q.filter.to_document(),
            json!({"location": {"city": "Boston", "state": "MA"}})
        );
    }

    #[test]
    fn test_token_words_inside_values_are_untouched() {
        let q = parse("name=gt&description=in%20the%20city");
        assert_eq!(
            q.filter.to_document(),
            json!({"name": "gt", "description": "in the city"})
        );
    }

    #[test]
    fn test_in_accepts_lists() {
        let q = parse("careers[in]=Business,UI%2FUX&careers[in]=Other");
        assert_eq!(
            q.filter.to_document(),
            json!({"careers": {"$in": ["Business", "UI/UX", "Other"]}})
        );
    }

    #[test]
    fn test_repeated_plain_keys_become_lists() {
        let q = parse("tags=a&tags=b&tags[]=c");
        assert_eq!(q.filter.to_document(), json!({"tags": ["a", "b", "c"]}));
    }

    #[test]
    fn test_nested_brackets_become_paths() {
        let q = parse("location[coordinates][0]=-71.1");
        assert_eq!(
            q.filter.to_document(),
            json!({"location": {"coordinates.0": "-71.1"}})
        );
    }

    #[test]
    fn test_rejects_dollar_fields() {
        let err = QueryDescriptor::from_query_string("%24where=1").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        let err = QueryDescriptor::from_query_string("a.%24b=1").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_rejects_mixed_forms() {
        let err = QueryDescriptor::from_query_string("cost=1&cost[gt]=0").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_malformed_brackets_are_plain_keys() {
        let q = parse("weird[gt=1");
        assert_eq!(q.filter.to_document(), json!({"weird[gt": "1"}));
    }

    #[test]
    fn test_into_find_query() {
        let query = parse("housing=true&select=name&sort=name").into_find_query();
        assert!(query.filter.contains_field("housing"));
        assert!(query.projection.is_some());
        assert_eq!(query.sort.keys(), &[SortKey::ascending("name")]);
    }
}
