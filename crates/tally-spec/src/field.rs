//! Typed field handles.
//!
//! `#[derive(Filterable)]` emits one [`Field`] constant per annotated field.
//! The second type parameter is a [`kind`] marker that decides which
//! operators are available, so `Transaction::AMOUNT.contains("x")` does not
//! compile instead of failing at runtime.

use std::fmt;
use std::marker::PhantomData;

use regex::Regex;

use crate::condition::{Condition, Operand};
use crate::error::Result;
use crate::op::Op;
use crate::ordering::{Dir, OrderBy};
use crate::spec::Specification;
use crate::traits::{FilterEnum, FilterTimestamp};
use crate::value::Number;

/// Field kind markers.
pub mod kind {
    use std::marker::PhantomData;

    /// String fields.
    pub enum Text {}
    /// Numeric fields.
    pub enum Number {}
    /// Timestamp fields.
    pub enum Time {}
    /// Boolean fields.
    pub enum Flag {}
    /// Enum fields of type `T`.
    pub struct Enum<T>(PhantomData<fn() -> T>);
}

/// Name of a filterable field of `E`, with kind `K`.
pub struct Field<E, K> {
    name: &'static str,
    marker: PhantomData<fn(&E) -> K>,
}

impl<E, K> Field<E, K> {
    /// Used by `#[derive(Filterable)]`. In a `const` item an empty name
    /// fails the build.
    #[doc(hidden)]
    pub const fn new(name: &'static str) -> Self {
        assert!(!name.is_empty(), "field name must not be empty");
        Field {
            name,
            marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.name, Dir::Asc)
    }

    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.name, Dir::Desc)
    }

    fn spec(&self, op: Op, operand: Operand) -> Specification<E> {
        Specification::leaf(Condition::trusted(self.name, op, operand))
    }
}

impl<E, K> Clone for Field<E, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, K> Copy for Field<E, K> {}

impl<E, K> fmt::Debug for Field<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self.name)
    }
}

impl<E> Field<E, kind::Text> {
    pub fn eq(&self, value: impl Into<String>) -> Specification<E> {
        self.spec(Op::Eq, Operand::String(value.into()))
    }

    pub fn ne(&self, value: impl Into<String>) -> Specification<E> {
        self.spec(Op::Ne, Operand::String(value.into()))
    }

    pub fn contains(&self, value: impl Into<String>) -> Specification<E> {
        self.spec(Op::Contains, Operand::String(value.into()))
    }

    pub fn starts_with(&self, value: impl Into<String>) -> Specification<E> {
        self.spec(Op::StartsWith, Operand::String(value.into()))
    }

    pub fn ends_with(&self, value: impl Into<String>) -> Specification<E> {
        self.spec(Op::EndsWith, Operand::String(value.into()))
    }

    /// Regex match. Fails only if the pattern does not compile.
    pub fn matches(&self, pattern: &str) -> Result<Specification<E>> {
        Ok(self.spec(Op::Regex, Operand::Regex(Regex::new(pattern)?)))
    }
}

impl<E> Field<E, kind::Number> {
    pub fn eq(&self, value: impl Into<Number>) -> Specification<E> {
        self.spec(Op::Eq, Operand::Number(value.into()))
    }

    pub fn ne(&self, value: impl Into<Number>) -> Specification<E> {
        self.spec(Op::Ne, Operand::Number(value.into()))
    }

    pub fn gt(&self, value: impl Into<Number>) -> Specification<E> {
        self.spec(Op::Gt, Operand::Number(value.into()))
    }

    pub fn gte(&self, value: impl Into<Number>) -> Specification<E> {
        self.spec(Op::Gte, Operand::Number(value.into()))
    }

    pub fn lt(&self, value: impl Into<Number>) -> Specification<E> {
        self.spec(Op::Lt, Operand::Number(value.into()))
    }

    pub fn lte(&self, value: impl Into<Number>) -> Specification<E> {
        self.spec(Op::Lte, Operand::Number(value.into()))
    }

    /// Inclusive range, `low <= field <= high`.
    pub fn between(&self, low: impl Into<Number>, high: impl Into<Number>) -> Specification<E> {
        self.gte(low).and(self.lte(high))
    }
}

impl<E> Field<E, kind::Time> {
    pub fn eq(&self, at: &impl FilterTimestamp) -> Specification<E> {
        self.spec(Op::Eq, Operand::Timestamp(at.filter_timestamp()))
    }

    pub fn ne(&self, at: &impl FilterTimestamp) -> Specification<E> {
        self.spec(Op::Ne, Operand::Timestamp(at.filter_timestamp()))
    }

    /// Strictly earlier than `at`.
    pub fn before(&self, at: &impl FilterTimestamp) -> Specification<E> {
        self.spec(Op::Before, Operand::Timestamp(at.filter_timestamp()))
    }

    /// Strictly later than `at`.
    pub fn after(&self, at: &impl FilterTimestamp) -> Specification<E> {
        self.spec(Op::After, Operand::Timestamp(at.filter_timestamp()))
    }

    pub fn on_or_before(&self, at: &impl FilterTimestamp) -> Specification<E> {
        self.spec(Op::Lte, Operand::Timestamp(at.filter_timestamp()))
    }

    pub fn on_or_after(&self, at: &impl FilterTimestamp) -> Specification<E> {
        self.spec(Op::Gte, Operand::Timestamp(at.filter_timestamp()))
    }
}

impl<E, T: FilterEnum> Field<E, kind::Enum<T>> {
    pub fn eq(&self, value: T) -> Specification<E> {
        self.spec(Op::Eq, Operand::Enum(value.discriminant()))
    }

    pub fn ne(&self, value: T) -> Specification<E> {
        self.spec(Op::Ne, Operand::Enum(value.discriminant()))
    }

    /// Membership test. An empty set matches nothing.
    pub fn one_of(&self, values: impl IntoIterator<Item = T>) -> Specification<E> {
        let set = values.into_iter().map(|v| v.discriminant()).collect();
        self.spec(Op::In, Operand::EnumSet(set))
    }
}

impl<E> Field<E, kind::Flag> {
    pub fn is(&self, value: bool) -> Specification<E> {
        self.spec(Op::Is, Operand::Bool(value))
    }

    pub fn is_true(&self) -> Specification<E> {
        self.is(true)
    }

    pub fn is_false(&self) -> Specification<E> {
        self.is(false)
    }
}
