//! Procedural macros for tally-spec.
//!
//! - [`Filterable`] - Generate field access and typed field handles for an entity

mod attrs;
mod derive;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `tally_spec::Filterable` for a struct with named fields.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | Text field (Eq, Ne, Contains, StartsWith, EndsWith, Regex) |
/// | `Number` | Numeric field (Eq, Ne, Gt, Gte, Lt, Lte) |
/// | `Timestamp` | Time field (Eq, Ne, Before, After, Gt, Gte, Lt, Lte), requires `FilterTimestamp` |
/// | `Enum` | Enum field (Eq, Ne, In), requires `FilterEnum` |
/// | `Bool` | Boolean field (Eq, Ne, Is) |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Use a custom field name |
/// | `ty = "..."` | Kind given as a string, e.g. `ty = "enum"` |
///
/// Fields without a `#[filter(...)]` attribute are not filterable.
/// `Option<T>` fields read as `Value::None` when empty.
///
/// # Generated Code
///
/// 1. One `Field<Self, Kind>` constant per field, named in
///    SCREAMING_SNAKE_CASE (`occurred_at` becomes `Self::OCCURRED_AT`)
/// 2. `Filterable::field_value` and `Filterable::filter_fields`
///
/// # Example
///
/// ```ignore
/// use tally_spec::Filterable;
///
/// #[derive(Filterable)]
/// struct Goal {
///     #[filter(String)]
///     name: String,
///
///     #[filter(Number, rename = "target")]
///     target_cents: i64,
///
///     #[filter(Enum)]
///     status: GoalStatus,
///
///     #[filter(Timestamp)]
///     deadline: Option<DateTime<Utc>>,
///
///     notes: String, // not filterable
/// }
///
/// let spec = Goal::TARGET.gte(50_000) & !Goal::STATUS.eq(GoalStatus::Cancelled);
/// ```
#[proc_macro_derive(Filterable, attributes(filter))]
pub fn filterable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::filterable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
