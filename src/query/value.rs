//! Value helpers shared by filter evaluation and sorting.
//!
//! Query-string operands arrive as strings; they are cast to the type of the
//! stored value at comparison time, the way a schema-aware driver casts
//! `"10000"` to a number before comparing it with a numeric field.

use serde_json::Value;
use std::cmp::Ordering;

/// Resolve a dotted path (`location.city`, `careers.0`) inside a document
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Order a stored value against a query operand, casting the operand to the stored type.
/// Returns `None` when the two cannot be compared.
pub fn compare_coerced(stored: &Value, operand: &Value) -> Option<Ordering> {
    match (stored, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Number(a), Value::String(b)) => {
            a.as_f64()?.partial_cmp(&b.trim().parse::<f64>().ok()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::String(b)) => Some(a.cmp(&b.trim().parse::<bool>().ok()?)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Equality with operand casting; objects compare structurally
pub fn equals_coerced(stored: &Value, operand: &Value) -> bool {
    match (stored, operand) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equals_coerced(x, y))
        }
        (Value::Object(_), _) | (_, Value::Object(_)) => stored == operand,
        _ => compare_coerced(stored, operand) == Some(Ordering::Equal),
    }
}

/// Apply `predicate` to the value itself and, for arrays, to each element.
/// An array field matches when any of its elements matches.
pub fn any_element<F>(stored: &Value, predicate: F) -> bool
where
    F: Fn(&Value) -> bool,
{
    if predicate(stored) {
        return true;
    }
    match stored {
        Value::Array(items) => items.iter().any(predicate),
        _ => false,
    }
}

/// Rank of a value's type in the total sort order
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order used for sorting: missing/null < numbers < strings < objects < arrays < booleans
pub fn total_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            for (left, right) in x.iter().zip(y) {
                let ord = total_order(Some(left), Some(right));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Some(x @ Value::Object(_)), Some(y @ Value::Object(_))) => {
            x.to_string().cmp(&y.to_string())
        }
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_paths() {
        let doc = json!({
            "location": {"city": "Boston", "coordinates": [-71.1, 42.3]},
            "careers": ["Business", "UI/UX"]
        });
        assert_eq!(lookup(&doc, "location.city"), Some(&json!("Boston")));
        assert_eq!(lookup(&doc, "location.coordinates.1"), Some(&json!(42.3)));
        assert_eq!(lookup(&doc, "careers.0"), Some(&json!("Business")));
        assert_eq!(lookup(&doc, "location.zipcode"), None);
        assert_eq!(lookup(&doc, "careers.x"), None);
    }

    #[test]
    fn test_numeric_string_operands_are_cast() {
        assert_eq!(
            compare_coerced(&json!(10000), &json!("9000")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_coerced(&json!(8.5), &json!("8.5")),
            Some(Ordering::Equal)
        );
        assert_eq!(compare_coerced(&json!(5), &json!("five")), None);
    }

    #[test]
    fn test_boolean_string_operands_are_cast() {
        assert!(equals_coerced(&json!(true), &json!("true")));
        assert!(!equals_coerced(&json!(false), &json!("true")));
        assert!(!equals_coerced(&json!(false), &json!("yes")));
    }

    #[test]
    fn test_string_comparison_is_lexicographic() {
        assert_eq!(
            compare_coerced(&json!("2026-01-02"), &json!("2026-01-01")),
            Some(Ordering::Greater)
        );
        assert!(equals_coerced(&json!("Boston"), &json!("Boston")));
        assert!(!equals_coerced(&json!("Boston"), &json!("boston")));
    }

    #[test]
    fn test_any_element() {
        let careers = json!(["Business", "UI/UX"]);
        assert!(any_element(&careers, |v| equals_coerced(v, &json!("UI/UX"))));
        assert!(!any_element(&careers, |v| equals_coerced(v, &json!("Other"))));
        assert!(any_element(&json!(3), |v| equals_coerced(v, &json!("3"))));
    }

    #[test]
    fn test_total_order_type_ranks() {
        let null = json!(null);
        let num = json!(1);
        let text = json!("a");
        let flag = json!(true);
        assert_eq!(total_order(None, Some(&num)), Ordering::Less);
        assert_eq!(total_order(Some(&null), None), Ordering::Equal);
        assert_eq!(total_order(Some(&num), Some(&text)), Ordering::Less);
        assert_eq!(total_order(Some(&flag), Some(&text)), Ordering::Greater);
        assert_eq!(
            total_order(Some(&json!(2.5)), Some(&json!(10))),
            Ordering::Less
        );
        assert_eq!(
            total_order(Some(&json!([1, 2])), Some(&json!([1, 3]))),
            Ordering::Less
        );
    }
}
