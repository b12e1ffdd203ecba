//! Structural, translatable form of a specification.
//!
//! [`Expression<E>`] is what translation layers consume: a plain data tree
//! of constants, conditions and logical connectives. It carries no
//! closures, so it can be compared, serialized and lowered into store
//! queries. The entity type is kept as a phantom so an expression built for
//! transactions cannot be evaluated against goals by mistake.

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::traits::Filterable;

/// Untyped expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Constant(bool),
    Condition(Condition),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// Evaluates against any filterable item.
    pub fn evaluate<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        match self {
            Expr::Constant(value) => *value,
            Expr::Condition(condition) => condition.evaluate(item),
            Expr::And(a, b) => a.evaluate(item) && b.evaluate(item),
            Expr::Or(a, b) => a.evaluate(item) || b.evaluate(item),
            Expr::Not(inner) => !inner.evaluate(item),
        }
    }

    /// Visits every condition, left to right.
    pub fn for_each_condition<'a>(&'a self, visit: &mut impl FnMut(&'a Condition)) {
        match self {
            Expr::Constant(_) => {}
            Expr::Condition(condition) => visit(condition),
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.for_each_condition(visit);
                b.for_each_condition(visit);
            }
            Expr::Not(inner) => inner.for_each_condition(visit),
        }
    }

    /// Folds constants and double negations away.
    ///
    /// The result is logically equivalent to `self`; conditions keep their
    /// relative order.
    pub fn simplified(&self) -> Expr {
        match self {
            Expr::Constant(_) | Expr::Condition(_) => self.clone(),
            Expr::And(a, b) => match (a.simplified(), b.simplified()) {
                (Expr::Constant(false), _) | (_, Expr::Constant(false)) => Expr::Constant(false),
                (Expr::Constant(true), other) | (other, Expr::Constant(true)) => other,
                (a, b) => Expr::And(Box::new(a), Box::new(b)),
            },
            Expr::Or(a, b) => match (a.simplified(), b.simplified()) {
                (Expr::Constant(true), _) | (_, Expr::Constant(true)) => Expr::Constant(true),
                (Expr::Constant(false), other) | (other, Expr::Constant(false)) => other,
                (a, b) => Expr::Or(Box::new(a), Box::new(b)),
            },
            Expr::Not(inner) => match inner.simplified() {
                Expr::Constant(value) => Expr::Constant(!value),
                Expr::Not(double) => *double,
                other => Expr::Not(Box::new(other)),
            },
        }
    }

    fn depth(&self) -> usize {
        match self {
            Expr::Constant(_) | Expr::Condition(_) => 1,
            Expr::And(a, b) | Expr::Or(a, b) => 1 + a.depth().max(b.depth()),
            Expr::Not(inner) => 1 + inner.depth(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(true) => f.write_str("TRUE"),
            Expr::Constant(false) => f.write_str("FALSE"),
            Expr::Condition(condition) => write!(f, "{condition}"),
            Expr::And(a, b) => write!(f, "({a} AND {b})"),
            Expr::Or(a, b) => write!(f, "({a} OR {b})"),
            Expr::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

/// An [`Expr`] tied to the entity type it was built for.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Expression<E> {
    root: Expr,
    #[serde(skip)]
    entity: PhantomData<fn(&E)>,
}

impl<E> Expression<E> {
    pub(crate) fn new(root: Expr) -> Self {
        Expression {
            root,
            entity: PhantomData,
        }
    }

    /// Wraps an untyped tree, e.g. one received over the wire.
    pub fn from_expr(root: Expr) -> Self {
        Self::new(root)
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    pub fn into_expr(self) -> Expr {
        self.root
    }

    /// Distinct field names referenced by the expression, sorted.
    pub fn fields(&self) -> BTreeSet<&str> {
        let mut fields = BTreeSet::new();
        self.root
            .for_each_condition(&mut |condition| {
                fields.insert(condition.field());
            });
        fields
    }

    /// Every condition in left-to-right order.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.root.for_each_condition(&mut |condition| out.push(condition));
        out
    }

    /// Longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Constant-folded copy, see [`Expr::simplified`].
    pub fn simplified(&self) -> Self {
        Self::new(self.root.simplified())
    }
}

impl<E: Filterable> Expression<E> {
    pub fn evaluate(&self, entity: &E) -> bool {
        self.root.evaluate(entity)
    }
}

impl<E> Clone for Expression<E> {
    fn clone(&self) -> Self {
        Self::new(self.root.clone())
    }
}

impl<E> PartialEq for Expression<E> {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl<E> fmt::Debug for Expression<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.root).finish()
    }
}

impl<E> fmt::Display for Expression<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Op;
    use crate::value::{Number, Value};

    struct Row {
        amount: i64,
        payee: Option<String>,
    }

    impl Filterable for Row {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "amount" => Value::Number(Number::I64(self.amount)),
                "payee" => self.payee.as_deref().map_or(Value::None, Value::String),
                _ => Value::None,
            }
        }
    }

    fn cond(field: &str, op: Op, operand: impl Into<crate::Operand>) -> Expr {
        Expr::Condition(Condition::new(field, op, operand).unwrap())
    }

    fn and(a: Expr, b: Expr) -> Expr {
        Expr::And(Box::new(a), Box::new(b))
    }

    fn or(a: Expr, b: Expr) -> Expr {
        Expr::Or(Box::new(a), Box::new(b))
    }

    fn not(a: Expr) -> Expr {
        Expr::Not(Box::new(a))
    }

    #[test]
    fn evaluates_tree() {
        let row = Row {
            amount: 40,
            payee: None,
        };
        let expr = or(cond("amount", Op::Gt, 100), not(cond("payee", Op::Eq, "Landlord")));
        // The payee is missing, so the inner condition fails and NOT flips it.
        assert!(expr.evaluate(&row));
    }

    #[test]
    fn simplify_folds_constants() {
        let c = cond("amount", Op::Gt, 1);
        assert_eq!(and(Expr::Constant(true), c.clone()).simplified(), c);
        assert_eq!(
            and(c.clone(), Expr::Constant(false)).simplified(),
            Expr::Constant(false)
        );
        assert_eq!(or(Expr::Constant(false), c.clone()).simplified(), c);
        assert_eq!(
            or(c.clone(), Expr::Constant(true)).simplified(),
            Expr::Constant(true)
        );
        assert_eq!(not(not(c.clone())).simplified(), c);
        assert_eq!(not(Expr::Constant(true)).simplified(), Expr::Constant(false));
    }

    #[test]
    fn fields_are_distinct_and_sorted() {
        let expr: Expression<Row> = Expression::from_expr(and(
            cond("payee", Op::StartsWith, "A"),
            or(cond("amount", Op::Lt, 0), cond("payee", Op::Ne, "B")),
        ));
        assert_eq!(expr.fields().into_iter().collect::<Vec<_>>(), ["amount", "payee"]);
        assert_eq!(expr.conditions().len(), 3);
        assert_eq!(expr.depth(), 3);
    }

    #[test]
    fn serde_roundtrip_keeps_structure() {
        let expr: Expression<Row> =
            Expression::from_expr(and(cond("amount", Op::Gte, 10), not(Expr::Constant(false))));
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["and"][0]["condition"]["field"], "amount");
        let back: Expression<Row> = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn display_matches_specification_format() {
        let expr = and(cond("amount", Op::Gt, 5), not(cond("payee", Op::Eq, "x")));
        assert_eq!(expr.to_string(), r#"(amount gt 5 AND NOT payee eq "x")"#);
    }
}
