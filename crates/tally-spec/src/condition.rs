//! Declarative leaf conditions.
//!
//! A [`Condition`] is a field name, an operator and an owned operand. It is
//! validated when built, so every condition that exists can be both
//! evaluated in memory and lowered by a translation layer.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecError};
use crate::op::Op;
use crate::traits::Filterable;
use crate::value::{Number, Timestamp, Value};

/// A single `field op operand` test.
///
/// ```
/// use tally_spec::{Condition, Op, Operand};
///
/// let cond = Condition::new("category", Op::Eq, "Food").unwrap();
/// assert_eq!(cond.to_string(), r#"category eq "Food""#);
///
/// // Ordered operators make no sense on booleans.
/// assert!(Condition::new("reconciled", Op::Gt, true).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConditionRepr")]
pub struct Condition {
    field: String,
    op: Op,
    operand: Operand,
}

#[derive(Deserialize)]
struct ConditionRepr {
    field: String,
    op: Op,
    operand: Operand,
}

impl TryFrom<ConditionRepr> for Condition {
    type Error = SpecError;

    fn try_from(repr: ConditionRepr) -> Result<Self> {
        Condition::new(repr.field, repr.op, repr.operand)
    }
}

impl Condition {
    /// Builds a validated condition.
    ///
    /// A string operand combined with [`Op::Regex`] is compiled here.
    pub fn new(field: impl Into<String>, op: Op, operand: impl Into<Operand>) -> Result<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(SpecError::invalid("condition field name is empty"));
        }

        let operand = match (op, operand.into()) {
            (Op::Regex, Operand::String(pattern)) => Operand::Regex(Regex::new(&pattern)?),
            (_, operand) => operand,
        };
        if !operand.accepts(op) {
            return Err(SpecError::InvalidOperatorForType {
                op: op.as_str(),
                operand_type: operand.type_name(),
            });
        }

        Ok(Condition { field, op, operand })
    }

    /// Builds a condition whose operator/operand pairing is known valid.
    pub(crate) fn trusted(field: &str, op: Op, operand: Operand) -> Self {
        debug_assert!(!field.is_empty(), "empty field name");
        debug_assert!(operand.accepts(op), "{op} on {}", operand.type_name());
        Condition {
            field: field.to_string(),
            op,
            operand,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Tests the condition against an entity.
    pub fn evaluate<E: Filterable + ?Sized>(&self, entity: &E) -> bool {
        self.matches(&entity.field_value(&self.field))
    }

    /// Tests the condition against an already extracted field value.
    ///
    /// A missing value never matches, not even for `ne`. Neither does a
    /// value of a different type than the operand.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        match (&self.operand, value) {
            (Operand::String(operand), Value::String(s)) => self.match_string(s, operand),
            (Operand::Regex(regex), Value::String(s)) => regex.is_match(s),
            (Operand::Number(operand), Value::Number(n)) => n
                .compare(*operand)
                .is_some_and(|ord| self.op.eval_ordering(ord)),
            (Operand::Timestamp(operand), Value::Timestamp(t)) => {
                self.op.eval_ordering(t.cmp(operand))
            }
            (Operand::Enum(operand), Value::Enum(d)) => self.match_eq(d == operand),
            (Operand::EnumSet(set), Value::Enum(d)) => set.contains(d),
            (Operand::Bool(operand), Value::Bool(b)) => self.match_eq(b == operand),
            _ => false,
        }
    }

    fn match_string(&self, field: &str, operand: &str) -> bool {
        match self.op.normalize() {
            Op::Eq => field == operand,
            Op::Ne => field != operand,
            Op::StartsWith => field.starts_with(operand),
            Op::EndsWith => field.ends_with(operand),
            Op::Contains => field.contains(operand),
            _ => false,
        }
    }

    fn match_eq(&self, equal: bool) -> bool {
        match self.op.normalize() {
            Op::Eq => equal,
            Op::Ne => !equal,
            _ => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.operand)
    }
}

/// Owned right-hand side of a condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    /// Single enum discriminant.
    Enum(u32),
    /// Discriminant set for [`Op::In`].
    EnumSet(Vec<u32>),
    Bool(bool),
    /// Compiled pattern; serialized as its source text.
    Regex(#[serde(with = "regex_pattern")] Regex),
}

impl Operand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::String(_) => "string",
            Operand::Number(_) => "number",
            Operand::Timestamp(_) => "timestamp",
            Operand::Enum(_) => "enum",
            Operand::EnumSet(_) => "enum set",
            Operand::Bool(_) => "bool",
            Operand::Regex(_) => "regex",
        }
    }

    /// Returns `true` if `op` can be applied to this operand.
    pub fn accepts(&self, op: Op) -> bool {
        match self {
            Operand::String(_) => op.is_string_op() && op != Op::Regex,
            Operand::Regex(_) => op == Op::Regex,
            Operand::Number(_) => op.is_number_op(),
            Operand::Timestamp(_) => op.is_timestamp_op(),
            Operand::Enum(_) => op.is_enum_op(),
            Operand::EnumSet(_) => op == Op::In,
            Operand::Bool(_) => op.is_bool_op(),
        }
    }
}

impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::String(a), Operand::String(b)) => a == b,
            (Operand::Number(a), Operand::Number(b)) => a == b,
            (Operand::Timestamp(a), Operand::Timestamp(b)) => a == b,
            (Operand::Enum(a), Operand::Enum(b)) => a == b,
            (Operand::EnumSet(a), Operand::EnumSet(b)) => a == b,
            (Operand::Bool(a), Operand::Bool(b)) => a == b,
            (Operand::Regex(a), Operand::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::String(s) => write!(f, "{s:?}"),
            Operand::Number(Number::I64(n)) => write!(f, "{n}"),
            Operand::Number(Number::U64(n)) => write!(f, "{n}"),
            Operand::Number(Number::F64(n)) => write!(f, "{n}"),
            Operand::Timestamp(t) => write!(f, "@{}", t.as_millis()),
            Operand::Enum(d) => write!(f, "#{d}"),
            Operand::EnumSet(set) => {
                f.write_str("[")?;
                for (i, d) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "#{d}")?;
                }
                f.write_str("]")
            }
            Operand::Bool(b) => write!(f, "{b}"),
            Operand::Regex(r) => write!(f, "/{}/", r.as_str()),
        }
    }
}

mod regex_pattern {
    use regex::Regex;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(regex: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(regex.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Regex, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Regex::new(&pattern).map_err(D::Error::custom)
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<Timestamp> for Operand {
    fn from(t: Timestamp) -> Self {
        Operand::Timestamp(t)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl From<Regex> for Operand {
    fn from(r: Regex) -> Self {
        Operand::Regex(r)
    }
}

impl From<Vec<u32>> for Operand {
    fn from(set: Vec<u32>) -> Self {
        Operand::EnumSet(set)
    }
}

macro_rules! operand_from_number {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Operand {
                fn from(n: $t) -> Self {
                    Operand::Number(Number::from(n))
                }
            }
        )+
    };
}

operand_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
