//! Typed document filters.
//!
//! A [`Filter`] is a conjunction of per-field predicates. It can be evaluated
//! against a JSON document and rendered in the storage layer's operator
//! syntax (`{"averageCost": {"$lte": "10000"}}`) for logging and inspection.

use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::operator::Operator;
use super::value::{any_element, compare_coerced, equals_coerced, lookup};
use crate::storage::geo::{within_sphere, GeoPoint};

/// One entry of a bracketed filter object
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// A recognised comparison operator and its operand
    Compare(Operator, Value),
    /// Any other key, matched as a sub-path of the field
    Field(String, Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field=value`
    Equals(Value),
    /// `field[token]=value`, all clauses must hold
    Clauses(Vec<Clause>),
    /// Point stored in the field lies within `radius` radians of `center`
    WithinSphere { center: GeoPoint, radius: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<FieldFilter>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    pub fn push(&mut self, field: impl Into<String>, predicate: Predicate) {
        self.fields.push(FieldFilter {
            field: field.into(),
            predicate,
        });
    }

    pub fn equals(mut self, field: impl Into<String>, value: Value) -> Self {
        self.push(field, Predicate::Equals(value));
        self
    }

    pub fn compare(mut self, field: impl Into<String>, op: Operator, value: Value) -> Self {
        self.push(field, Predicate::Clauses(vec![Clause::Compare(op, value)]));
        self
    }

    pub fn within_sphere(mut self, field: impl Into<String>, center: GeoPoint, radius: f64) -> Self {
        self.push(field, Predicate::WithinSphere { center, radius });
        self
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, doc: &Value) -> bool {
        self.fields
            .iter()
            .all(|f| predicate_matches(&f.predicate, lookup(doc, &f.field)))
    }

    /// Render in storage operator syntax
    pub fn to_document(&self) -> Value {
        let mut root = Map::new();
        for f in &self.fields {
            root.insert(f.field.clone(), predicate_document(&f.predicate));
        }
        Value::Object(root)
    }
}

fn predicate_document(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::Equals(value) => value.clone(),
        Predicate::Clauses(clauses) => {
            let mut obj = Map::new();
            for clause in clauses {
                match clause {
                    Clause::Compare(op, value) => {
                        obj.insert(op.storage_operator().to_string(), value.clone())
                    }
                    Clause::Field(key, value) => obj.insert(key.clone(), value.clone()),
                };
            }
            Value::Object(obj)
        }
        Predicate::WithinSphere { center, radius } => serde_json::json!({
            "$geoWithin": { "$centerSphere": [center.to_pair(), radius] }
        }),
    }
}

fn predicate_matches(predicate: &Predicate, stored: Option<&Value>) -> bool {
    let Some(stored) = stored else {
        return false;
    };

    match predicate {
        Predicate::Equals(expected) => {
            equals_coerced(stored, expected) || any_element(stored, |v| equals_coerced(v, expected))
        }
        Predicate::Clauses(clauses) => clauses.iter().all(|c| clause_matches(c, stored)),
        Predicate::WithinSphere { center, radius } => GeoPoint::from_value(stored)
            .map(|point| within_sphere(&point, center, *radius))
            .unwrap_or(false),
    }
}

fn clause_matches(clause: &Clause, stored: &Value) -> bool {
    match clause {
        Clause::Compare(Operator::In, operand) => {
            let candidates: Vec<&Value> = match operand {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            any_element(stored, |v| candidates.iter().any(|c| equals_coerced(v, c)))
        }
        Clause::Compare(op, operand) => any_element(stored, |v| {
            match compare_coerced(v, operand) {
                Some(ord) => match op {
                    Operator::Gt => ord == Ordering::Greater,
                    Operator::Gte => ord != Ordering::Less,
                    Operator::Lt => ord == Ordering::Less,
                    Operator::Lte => ord != Ordering::Greater,
                    Operator::In => false,
                },
                None => false,
            }
        }),
        Clause::Field(path, expected) => lookup(stored, path)
            .map(|v| equals_coerced(v, expected) || any_element(v, |e| equals_coerced(e, expected)))
            .unwrap_or(false),
    }
}
