//! Column values and loosely typed inputs.

use crate::error::{RelayError, RelayResult};
use catalog_store::Sql;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single column value, as compared by filters and cursor bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Compare two non-null values of compatible kinds.
    ///
    /// Returns `None` when either side is NULL or the kinds cannot be compared,
    /// mirroring SQL where such a comparison is never true.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Bind this value as a typed placeholder.
    ///
    /// The cast pins the parameter type so the same value compares against
    /// `INTEGER`/`BIGINT` or `REAL`/`DOUBLE PRECISION` columns alike.
    pub(crate) fn push_to(&self, sql: &mut Sql) {
        match self {
            Value::Null => {
                sql.push("NULL");
            }
            Value::Int(v) => {
                sql.push_bind(*v).push("::BIGINT");
            }
            Value::Float(v) => {
                sql.push_bind(*v).push("::DOUBLE PRECISION");
            }
            Value::Text(v) => {
                sql.push_bind(v.clone()).push("::TEXT");
            }
            Value::Date(v) => {
                sql.push_bind(*v).push("::DATE");
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A number or id as it arrives from a client: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Loose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loose::Int(v) => write!(f, "{v}"),
            Loose::Float(v) => write!(f, "{v}"),
            Loose::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Loose {
    fn from(v: i64) -> Self {
        Loose::Int(v)
    }
}

impl From<&str> for Loose {
    fn from(v: &str) -> Self {
        Loose::Text(v.to_string())
    }
}

impl Loose {
    /// Coerce to an integer. Whole floats and numeric strings are accepted.
    pub fn to_i64(&self, field: &str) -> RelayResult<i64> {
        let parsed = match self {
            Loose::Int(v) => Some(*v),
            Loose::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                // Guard the cast; `as` saturates silently.
                (*v >= i64::MIN as f64 && *v < i64::MAX as f64).then_some(*v as i64)
            }
            Loose::Float(_) => None,
            Loose::Text(s) => s.trim().parse::<i64>().ok(),
        };
        parsed.ok_or_else(|| RelayError::invalid_value(field, format!("expected an integer, got {self}")))
    }

    /// Coerce to a row id (a non-negative integer).
    pub fn to_id(&self, field: &str) -> RelayResult<i64> {
        let id = self.to_i64(field)?;
        if id < 0 {
            return Err(RelayError::invalid_value(
                field,
                format!("expected a non-negative id, got {self}"),
            ));
        }
        Ok(id)
    }

    /// Coerce to a finite floating point number.
    pub fn to_f64(&self, field: &str) -> RelayResult<f64> {
        let parsed = match self {
            Loose::Int(v) => Some(*v as f64),
            Loose::Float(v) => Some(*v),
            Loose::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| RelayError::invalid_value(field, format!("expected a number, got {self}")))
    }
}

/// Coerce a list of loosely typed ids, failing on the first bad entry.
pub fn coerce_ids(values: &[Loose], field: &str) -> RelayResult<Vec<i64>> {
    values.iter().map(|v| v.to_id(field)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_never_compares() {
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Int(1).compare(&Value::Null), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn mixed_numbers_compare() {
        assert_eq!(Value::Int(2).compare(&Value::Float(1.5)), Some(Ordering::Greater));
        assert_eq!(Value::Float(88.0).compare(&Value::Int(88)), Some(Ordering::Equal));
        assert_eq!(Value::from("B").compare(&Value::Int(1)), None);
    }

    #[test]
    fn binds_with_type_casts() {
        let mut sql = Sql::new("x = ");
        Value::Int(3).push_to(&mut sql);
        sql.push(" AND y = ");
        Value::Null.push_to(&mut sql);
        sql.push(" AND z = ");
        Value::from("C").push_to(&mut sql);

        assert_eq!(sql.to_sql(), "x = $1::BIGINT AND y = NULL AND z = $2::TEXT");
        assert_eq!(sql.param_count(), 2);
    }

    #[test]
    fn loose_deserializes_numbers_and_strings() {
        let values: Vec<Loose> = serde_json::from_str(r#"[7, 1.5, "12"]"#).unwrap();
        assert_eq!(
            values,
            vec![Loose::Int(7), Loose::Float(1.5), Loose::Text("12".into())]
        );
    }

    #[test]
    fn coerces_ids() {
        assert_eq!(Loose::Int(7).to_id("makerId").unwrap(), 7);
        assert_eq!(Loose::from(" 12 ").to_id("makerId").unwrap(), 12);
        assert_eq!(Loose::Float(3.0).to_id("makerId").unwrap(), 3);

        let err = Loose::from("abc").to_id("performerIds").unwrap_err();
        assert_eq!(err.field(), Some("performerIds"));
        assert!(Loose::Int(-1).to_id("tagIds").is_err());
        assert!(Loose::Float(1.5).to_id("tagIds").is_err());
    }

    #[test]
    fn coerces_numbers() {
        assert_eq!(Loose::Int(88).to_f64("bust").unwrap(), 88.0);
        assert_eq!(Loose::from("60.5").to_f64("waist").unwrap(), 60.5);
        assert!(Loose::from("NaN").to_f64("hip").is_err());
        assert!(Loose::from("big").to_f64("hip").unwrap_err().is_invalid_filter_value());
    }

    #[test]
    fn coerce_ids_reports_first_failure() {
        let ids = coerce_ids(&[Loose::Int(1), Loose::from("2")], "tagIds").unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert!(coerce_ids(&[Loose::Int(1), Loose::from("x")], "tagIds").is_err());
    }
}
