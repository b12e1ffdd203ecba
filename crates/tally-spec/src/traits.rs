//! Traits connecting domain types to the engine.
//!
//! [`Filterable`] is normally derived with `#[derive(Filterable)]`, which
//! also generates typed [`Field`](crate::Field) constants. Enum and date
//! types plug in through [`FilterEnum`] and [`FilterTimestamp`].

use crate::value::{Timestamp, Value};

/// An entity whose fields can be read by name.
///
/// # Derive Usage
///
/// ```
/// use tally_spec::{Filterable, Specification};
///
/// #[derive(Filterable)]
/// struct Transaction {
///     #[filter(String)]
///     category: String,
///     #[filter(Number)]
///     amount: i64,
/// }
///
/// let big_food = Transaction::CATEGORY.eq("Food") & Transaction::AMOUNT.gt(100);
/// let tx = Transaction { category: "Food".into(), amount: 150 };
/// assert!(big_food.is_satisfied_by(&tx));
/// assert_eq!(Transaction::filter_fields(), ["category", "amount"]);
/// ```
///
/// # Manual Implementation
///
/// ```
/// use tally_spec::{Filterable, Number, Value};
///
/// struct Budget {
///     name: String,
///     limit_cents: i64,
/// }
///
/// impl Filterable for Budget {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "limit_cents" => Value::Number(Number::I64(self.limit_cents)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Filterable {
    /// Returns the value of `field`, or [`Value::None`] if there is none.
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Names of every filterable field.
    ///
    /// Used to reject unknown fields when conditions are built from
    /// untrusted input. An empty slice disables that check.
    fn filter_fields() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }

    /// Returns `true` if `field` is known, or if the field list is empty.
    fn is_filter_field(field: &str) -> bool
    where
        Self: Sized,
    {
        let fields = Self::filter_fields();
        fields.is_empty() || fields.contains(&field)
    }
}

/// Maps an enum to stable `u32` discriminants.
///
/// Use explicit values rather than declaration order, since discriminants
/// end up persisted in stores and in serialized expressions.
///
/// ```
/// use tally_spec::FilterEnum;
///
/// #[derive(Clone, Copy)]
/// enum Kind {
///     Income,
///     Expense,
/// }
///
/// impl FilterEnum for Kind {
///     fn discriminant(&self) -> u32 {
///         match self {
///             Kind::Income => 0,
///             Kind::Expense => 1,
///         }
///     }
/// }
/// ```
pub trait FilterEnum {
    fn discriminant(&self) -> u32;
}

/// Converts a date/time type into a [`Timestamp`].
pub trait FilterTimestamp {
    fn filter_timestamp(&self) -> Timestamp;
}

impl FilterTimestamp for Timestamp {
    fn filter_timestamp(&self) -> Timestamp {
        *self
    }
}

impl FilterTimestamp for i64 {
    fn filter_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl FilterTimestamp for std::time::SystemTime {
    fn filter_timestamp(&self) -> Timestamp {
        match self.duration_since(std::time::UNIX_EPOCH) {
            Ok(after) => Timestamp(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => Timestamp(
                i64::try_from(before.duration().as_millis())
                    .map(|ms| -ms)
                    .unwrap_or(i64::MIN),
            ),
        }
    }
}

#[cfg(feature = "chrono")]
impl<Tz: chrono::TimeZone> FilterTimestamp for chrono::DateTime<Tz> {
    fn filter_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.timestamp_millis())
    }
}
