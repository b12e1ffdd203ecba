//! Comparison operators used by conditions.
//!
//! Operators are grouped by the operand types they accept. The grouping is
//! enforced when a [`Condition`](crate::Condition) is built, so an invalid
//! combination never reaches evaluation or translation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Comparison operator of a condition.
///
/// - **Universal**: `Eq`, `Ne`
/// - **String**: `StartsWith`, `EndsWith`, `Contains`, `Regex`
/// - **Ordered** (numbers, timestamps): `Gt`, `Gte`, `Lt`, `Lte`
/// - **Timestamp aliases**: `Before` (`Lt`), `After` (`Gt`)
/// - **Enum sets**: `In`
/// - **Bool alias**: `Is` (`Eq`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Eq,
    Ne,
    StartsWith,
    EndsWith,
    Contains,
    Regex,
    Gt,
    Gte,
    Lt,
    Lte,
    Before,
    After,
    In,
    Is,
}

impl Op {
    /// Every operator, in declaration order.
    pub const ALL: [Op; 14] = [
        Op::Eq,
        Op::Ne,
        Op::StartsWith,
        Op::EndsWith,
        Op::Contains,
        Op::Regex,
        Op::Gt,
        Op::Gte,
        Op::Lt,
        Op::Lte,
        Op::Before,
        Op::After,
        Op::In,
        Op::Is,
    ];

    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            Op::Eq | Op::Ne | Op::StartsWith | Op::EndsWith | Op::Contains | Op::Regex
        )
    }

    pub fn is_number_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::Gt | Op::Gte | Op::Lt | Op::Lte)
    }

    pub fn is_timestamp_op(self) -> bool {
        self.is_number_op() || matches!(self, Op::Before | Op::After)
    }

    /// Valid for a single enum discriminant. `In` takes a set instead.
    pub fn is_enum_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne)
    }

    pub fn is_bool_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::Is)
    }

    /// Resolves aliases: `Before -> Lt`, `After -> Gt`, `Is -> Eq`.
    pub fn normalize(self) -> Op {
        match self {
            Op::Before => Op::Lt,
            Op::After => Op::Gt,
            Op::Is => Op::Eq,
            other => other,
        }
    }

    /// Evaluates an ordered comparison of `field` against the operand.
    ///
    /// Non-ordering operators always yield `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self.normalize() {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::StartsWith => "startswith",
            Op::EndsWith => "endswith",
            Op::Contains => "contains",
            Op::Regex => "regex",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Before => "before",
            Op::After => "after",
            Op::In => "in",
            Op::Is => "is",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Op::ALL
            .into_iter()
            .find(|op| op.as_str() == wanted)
            .ok_or_else(|| SpecError::invalid(format!("unknown operator '{s}'")))
    }
}
