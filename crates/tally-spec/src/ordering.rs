//! Result ordering.
//!
//! Provides [`Dir`] for sort direction and [`OrderBy`] for field-based ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::traits::Filterable;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Reverses `ordering` for `Desc`.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dir {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Dir::Asc),
            "desc" | "descending" => Ok(Dir::Desc),
            _ => Err(SpecError::InvalidArgument {
                reason: format!("unknown sort direction '{s}'"),
            }),
        }
    }
}

/// Sort key: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub dir: Dir,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            field: field.into(),
            dir,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Dir::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Dir::Desc)
    }

    /// Compares two field values under this ordering.
    ///
    /// Missing values go last in both directions, matching `NULLS LAST`.
    /// Returns `None` for a type mismatch or NaN.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
        match (a, b) {
            (Value::None, Value::None) => Some(Ordering::Equal),
            (Value::None, _) => Some(Ordering::Greater),
            (_, Value::None) => Some(Ordering::Less),
            _ => compare_values(a, b).map(|ord| self.dir.apply(ord)),
        }
    }
}

/// Compares two present values of the same type.
///
/// Returns `None` for mismatched types, `None` values, or NaN.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Compares two entities by a list of sort keys, first key first.
///
/// Keys that cannot be compared are treated as ties.
pub fn compare_by_orderings<E: Filterable>(a: &E, b: &E, orderings: &[OrderBy]) -> Ordering {
    for order_by in orderings {
        let left = a.field_value(&order_by.field);
        let right = b.field_value(&order_by.field);
        match order_by.compare(&left, &right) {
            Some(Ordering::Equal) | None => continue,
            Some(ordering) => return ordering,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Timestamp};

    #[test]
    fn dir_apply_and_parse() {
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!("DESC".parse::<Dir>().unwrap(), Dir::Desc);
        assert_eq!("ascending".parse::<Dir>().unwrap(), Dir::Asc);
        assert!("sideways".parse::<Dir>().is_err());
        assert_eq!(Dir::default(), Dir::Asc);
    }

    #[test]
    fn values_compare_within_type() {
        assert_eq!(
            compare_values(&Value::String("a"), &Value::String("b")),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values(
                &Value::Timestamp(Timestamp(2)),
                &Value::Timestamp(Timestamp(1))
            ),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_values(&Value::Bool(false), &Value::Bool(true)),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values(&Value::String("a"), &Value::Number(Number::I64(1))),
            None
        );
    }

    #[test]
    fn missing_values_sort_last_both_ways() {
        let some = Value::Number(Number::I64(1));
        for order in [OrderBy::asc("x"), OrderBy::desc("x")] {
            assert_eq!(order.compare(&Value::None, &some), Some(Ordering::Greater));
            assert_eq!(order.compare(&some, &Value::None), Some(Ordering::Less));
            assert_eq!(order.compare(&Value::None, &Value::None), Some(Ordering::Equal));
        }
    }

    #[test]
    fn tie_breaks_on_later_keys() {
        struct Item {
            name: &'static str,
            rank: i64,
        }

        impl Filterable for Item {
            fn field_value(&self, field: &str) -> Value<'_> {
                match field {
                    "name" => Value::String(self.name),
                    "rank" => Value::Number(Number::I64(self.rank)),
                    _ => Value::None,
                }
            }
        }

        let a = Item { name: "a", rank: 1 };
        let b = Item { name: "b", rank: 1 };
        let c = Item { name: "a", rank: 2 };
        let keys = [OrderBy::desc("rank"), OrderBy::asc("name")];

        assert_eq!(compare_by_orderings(&a, &b, &keys), Ordering::Less);
        assert_eq!(compare_by_orderings(&a, &c, &keys), Ordering::Greater);
        assert_eq!(compare_by_orderings(&a, &a, &keys), Ordering::Equal);
    }

    #[test]
    fn order_by_serde_defaults_to_asc() {
        let order: OrderBy = serde_json::from_str(r#"{"field":"amount"}"#).unwrap();
        assert_eq!(order, OrderBy::asc("amount"));
    }
}
