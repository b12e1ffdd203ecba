//! The composable specification tree.
//!
//! A [`Specification`] is an immutable predicate over an entity type `E`.
//! Leaves are either declarative [`Condition`]s, named closures, or
//! constants; inner nodes are AND, OR and NOT. Composing never mutates the
//! operands: it allocates one new node pointing at the shared subtrees.
//!
//! ```
//! use tally_spec::{Filterable, Specification};
//!
//! #[derive(Filterable)]
//! struct Transaction {
//!     #[filter(String)]
//!     category: String,
//!     #[filter(Number)]
//!     amount: i64,
//! }
//!
//! let food = Transaction::CATEGORY.eq("Food");
//! let large = Transaction::AMOUNT.gt(100);
//! let spec = food.clone().and(large);
//!
//! assert!(spec.is_satisfied_by(&Transaction { category: "Food".into(), amount: 150 }));
//! assert!(!spec.is_satisfied_by(&Transaction { category: "Food".into(), amount: 50 }));
//!
//! // `food` is untouched by the composition.
//! assert!(food.is_satisfied_by(&Transaction { category: "Food".into(), amount: 50 }));
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use crate::condition::{Condition, Operand};
use crate::error::{Result, SpecError};
use crate::expr::{Expr, Expression};
use crate::op::Op;
use crate::traits::Filterable;

type PredicateFn<E> = dyn Fn(&E) -> bool + Send + Sync;

/// An immutable, composable predicate over `E`.
///
/// Cloning is cheap: it bumps a reference count.
pub struct Specification<E> {
    root: Arc<Node<E>>,
}

enum Node<E> {
    Constant(bool),
    Condition(Condition),
    Predicate {
        name: String,
        test: Arc<PredicateFn<E>>,
    },
    And(Specification<E>, Specification<E>),
    Or(Specification<E>, Specification<E>),
    Not(Specification<E>),
}

impl<E> Specification<E> {
    fn from_node(node: Node<E>) -> Self {
        Specification {
            root: Arc::new(node),
        }
    }

    /// Wraps a declarative condition.
    pub fn leaf(condition: Condition) -> Self {
        Self::from_node(Node::Condition(condition))
    }

    /// Wraps a named closure.
    ///
    /// Closure leaves evaluate in memory like any other leaf, but
    /// [`to_expression`](Self::to_expression) rejects them with
    /// [`SpecError::UnsupportedPredicate`]. Keep them out of
    /// specifications that must be pushed down to a store.
    pub fn predicate<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::from_node(Node::Predicate {
            name: name.into(),
            test: Arc::new(test),
        })
    }

    /// Matches every entity. Identity of [`and`](Self::and).
    pub fn everything() -> Self {
        Self::from_node(Node::Constant(true))
    }

    /// Matches no entity. Identity of [`or`](Self::or).
    pub fn nothing() -> Self {
        Self::from_node(Node::Constant(false))
    }

    /// Conjunction. The right side is only evaluated if the left holds.
    pub fn and(self, other: Specification<E>) -> Self {
        Self::from_node(Node::And(self, other))
    }

    /// Disjunction. The right side is only evaluated if the left fails.
    pub fn or(self, other: Specification<E>) -> Self {
        Self::from_node(Node::Or(self, other))
    }

    /// Negation.
    pub fn negate(self) -> Self {
        Self::from_node(Node::Not(self))
    }

    /// Folds with AND into a balanced tree. An empty input yields
    /// [`everything`](Self::everything).
    ///
    /// Leaves keep their left-to-right order, so short-circuiting and
    /// translation errors behave as with a chain of [`and`](Self::and),
    /// but the depth grows with the logarithm of the input length. Prefer
    /// this over chaining for large inputs: evaluation, translation and
    /// lowering all recurse once per level.
    pub fn all_of<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = Specification<E>>,
    {
        balanced(specs.into_iter().collect(), Specification::and)
            .unwrap_or_else(Self::everything)
    }

    /// Folds with OR into a balanced tree. An empty input yields
    /// [`nothing`](Self::nothing).
    pub fn any_of<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = Specification<E>>,
    {
        balanced(specs.into_iter().collect(), Specification::or)
            .unwrap_or_else(Self::nothing)
    }

    /// ANDs `other` in if present.
    pub fn and_maybe(self, other: Option<Specification<E>>) -> Self {
        match other {
            Some(other) => self.and(other),
            None => self,
        }
    }

    /// Returns `true` if this is a bare `everything()` leaf.
    pub fn is_everything(&self) -> bool {
        matches!(*self.root, Node::Constant(true))
    }

    /// Returns `true` if every leaf is declarative, i.e. translation succeeds.
    pub fn is_translatable(&self) -> bool {
        match &*self.root {
            Node::Constant(_) | Node::Condition(_) => true,
            Node::Predicate { .. } => false,
            Node::And(a, b) | Node::Or(a, b) => a.is_translatable() && b.is_translatable(),
            Node::Not(inner) => inner.is_translatable(),
        }
    }

    /// Length of the longest root-to-leaf path. A single leaf has depth 1.
    pub fn depth(&self) -> usize {
        match &*self.root {
            Node::Constant(_) | Node::Condition(_) | Node::Predicate { .. } => 1,
            Node::And(a, b) | Node::Or(a, b) => 1 + a.depth().max(b.depth()),
            Node::Not(inner) => 1 + inner.depth(),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match &*self.root {
            Node::Constant(_) | Node::Condition(_) | Node::Predicate { .. } => 1,
            Node::And(a, b) | Node::Or(a, b) => 1 + a.node_count() + b.node_count(),
            Node::Not(inner) => 1 + inner.node_count(),
        }
    }

    /// Translates the tree into its structural [`Expression`].
    ///
    /// The translation mirrors the tree exactly: node kinds and operand
    /// order are preserved. It fails on the first closure leaf found in
    /// left-to-right order.
    pub fn to_expression(&self) -> Result<Expression<E>> {
        let expr = self.lower()?;
        tracing::trace!(%expr, "translated specification");
        Ok(Expression::new(expr))
    }

    fn lower(&self) -> Result<Expr> {
        Ok(match &*self.root {
            Node::Constant(value) => Expr::Constant(*value),
            Node::Condition(condition) => Expr::Condition(condition.clone()),
            Node::Predicate { name, .. } => {
                return Err(SpecError::UnsupportedPredicate { name: name.clone() })
            }
            Node::And(a, b) => Expr::And(Box::new(a.lower()?), Box::new(b.lower()?)),
            Node::Or(a, b) => Expr::Or(Box::new(a.lower()?), Box::new(b.lower()?)),
            Node::Not(inner) => Expr::Not(Box::new(inner.lower()?)),
        })
    }
}

impl<E: Filterable> Specification<E> {
    /// Builds a condition leaf from untrusted parts.
    ///
    /// On top of [`Condition::new`] validation, the field must be one of
    /// [`Filterable::filter_fields`] when `E` declares them.
    ///
    /// ```
    /// use tally_spec::{Filterable, Op, Specification, SpecError};
    ///
    /// #[derive(Filterable)]
    /// struct Goal {
    ///     #[filter(Number)]
    ///     target_cents: i64,
    /// }
    ///
    /// assert!(Specification::<Goal>::condition("target_cents", Op::Gte, 5_000).is_ok());
    /// assert!(matches!(
    ///     Specification::<Goal>::condition("target", Op::Gte, 5_000),
    ///     Err(SpecError::InvalidArgument { .. })
    /// ));
    /// ```
    pub fn condition(field: &str, op: Op, operand: impl Into<Operand>) -> Result<Self> {
        if !E::is_filter_field(field) {
            return Err(SpecError::invalid(format!("unknown field '{field}'")));
        }
        Ok(Self::leaf(Condition::new(field, op, operand)?))
    }
}

impl<E: Filterable> Specification<E> {
    /// Evaluates the specification against one entity.
    pub fn is_satisfied_by(&self, entity: &E) -> bool {
        match &*self.root {
            Node::Constant(value) => *value,
            Node::Condition(condition) => condition.evaluate(entity),
            Node::Predicate { test, .. } => test(entity),
            Node::And(a, b) => a.is_satisfied_by(entity) && b.is_satisfied_by(entity),
            Node::Or(a, b) => a.is_satisfied_by(entity) || b.is_satisfied_by(entity),
            Node::Not(inner) => !inner.is_satisfied_by(entity),
        }
    }

    /// References to the matching items, in input order.
    pub fn filter<'a>(&self, items: &'a [E]) -> Vec<&'a E> {
        items
            .iter()
            .filter(|item| self.is_satisfied_by(item))
            .collect()
    }

    pub fn filter_cloned(&self, items: &[E]) -> Vec<E>
    where
        E: Clone,
    {
        self.filter(items).into_iter().cloned().collect()
    }

    /// Keeps only matching items.
    pub fn filter_mut(&self, items: &mut Vec<E>) {
        items.retain(|item| self.is_satisfied_by(item));
    }

    pub fn count(&self, items: &[E]) -> usize {
        items
            .iter()
            .filter(|item| self.is_satisfied_by(item))
            .count()
    }

    pub fn any(&self, items: &[E]) -> bool {
        items.iter().any(|item| self.is_satisfied_by(item))
    }

    pub fn all(&self, items: &[E]) -> bool {
        items.iter().all(|item| self.is_satisfied_by(item))
    }

    pub fn find<'a>(&self, items: &'a [E]) -> Option<&'a E> {
        items.iter().find(|item| self.is_satisfied_by(item))
    }

    pub fn position(&self, items: &[E]) -> Option<usize> {
        items.iter().position(|item| self.is_satisfied_by(item))
    }
}

/// Joins neighbours pairwise until one tree is left.
fn balanced<E>(
    mut level: Vec<Specification<E>>,
    join: fn(Specification<E>, Specification<E>) -> Specification<E>,
) -> Option<Specification<E>> {
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut specs = level.into_iter();
        while let Some(left) = specs.next() {
            next.push(match specs.next() {
                Some(right) => join(left, right),
                None => left,
            });
        }
        level = next;
    }
    level.pop()
}

// Dropping a long `and`/`or` chain would otherwise recurse once per level.
impl<E> Drop for Specification<E> {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(&mut self.root, &mut pending);
        while let Some(mut spec) = pending.pop() {
            detach_children(&mut spec.root, &mut pending);
        }
    }
}

/// Moves the children of a uniquely owned inner node onto `pending`.
fn detach_children<E>(root: &mut Arc<Node<E>>, pending: &mut Vec<Specification<E>>) {
    let Some(node) = Arc::get_mut(root) else {
        return;
    };
    if !matches!(node, Node::And(..) | Node::Or(..) | Node::Not(_)) {
        return;
    }
    match std::mem::replace(node, Node::Constant(true)) {
        Node::And(a, b) | Node::Or(a, b) => {
            pending.push(a);
            pending.push(b);
        }
        Node::Not(inner) => pending.push(inner),
        Node::Constant(_) | Node::Condition(_) | Node::Predicate { .. } => {}
    }
}

impl<E> Clone for Specification<E> {
    fn clone(&self) -> Self {
        Specification {
            root: Arc::clone(&self.root),
        }
    }
}

impl<E> Default for Specification<E> {
    fn default() -> Self {
        Self::everything()
    }
}

impl<E> From<Condition> for Specification<E> {
    fn from(condition: Condition) -> Self {
        Self::leaf(condition)
    }
}

impl<E> BitAnd for Specification<E> {
    type Output = Specification<E>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<E> BitOr for Specification<E> {
    type Output = Specification<E>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<E> Not for Specification<E> {
    type Output = Specification<E>;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl<E> fmt::Display for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.root {
            Node::Constant(true) => f.write_str("TRUE"),
            Node::Constant(false) => f.write_str("FALSE"),
            Node::Condition(condition) => write!(f, "{condition}"),
            Node::Predicate { name, .. } => write!(f, "<{name}>"),
            Node::And(a, b) => write!(f, "({a} AND {b})"),
            Node::Or(a, b) => write!(f, "({a} OR {b})"),
            Node::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

impl<E> fmt::Debug for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Specification")
            .field(&format_args!("{self}"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Value};

    #[derive(Debug, Clone, PartialEq)]
    struct Tx {
        category: String,
        amount: i64,
    }

    impl Filterable for Tx {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "category" => Value::String(&self.category),
                "amount" => Value::Number(Number::I64(self.amount)),
                _ => Value::None,
            }
        }

        fn filter_fields() -> &'static [&'static str] {
            &["category", "amount"]
        }
    }

    fn tx(category: &str, amount: i64) -> Tx {
        Tx {
            category: category.to_string(),
            amount,
        }
    }

    fn amount_over(n: i64) -> Specification<Tx> {
        Specification::condition("amount", Op::Gt, n).unwrap()
    }

    fn category(name: &str) -> Specification<Tx> {
        Specification::condition("category", Op::Eq, name).unwrap()
    }

    #[test]
    fn leaf_evaluates_condition() {
        let spec = amount_over(100);
        assert!(spec.is_satisfied_by(&tx("Food", 150)));
        assert!(!spec.is_satisfied_by(&tx("Food", 50)));
    }

    #[test]
    fn and_or_not() {
        let food_and_large = category("Food").and(amount_over(100));
        assert!(food_and_large.is_satisfied_by(&tx("Food", 150)));
        assert!(!food_and_large.is_satisfied_by(&tx("Food", 50)));

        let food_or_rent = category("Food") | category("Rent");
        assert!(food_or_rent.is_satisfied_by(&tx("Rent", 1)));
        assert!(!food_or_rent.is_satisfied_by(&tx("Travel", 1)));

        let not_food = !category("Food");
        assert!(not_food.is_satisfied_by(&tx("Travel", 1)));
    }

    #[test]
    fn and_short_circuits() {
        let exploding = Specification::predicate("unreachable", |_: &Tx| {
            panic!("right operand evaluated")
        });
        let spec = Specification::nothing().and(exploding.clone());
        assert!(!spec.is_satisfied_by(&tx("Food", 1)));

        let spec = Specification::everything().or(exploding);
        assert!(spec.is_satisfied_by(&tx("Food", 1)));
    }

    #[test]
    fn folds_have_identities() {
        assert!(Specification::<Tx>::all_of([]).is_everything());
        assert!(!Specification::<Tx>::any_of([]).is_satisfied_by(&tx("Food", 1)));

        let any = Specification::any_of([category("Food"), category("Rent")]);
        assert!(any.is_satisfied_by(&tx("Rent", 0)));
        assert_eq!(any.node_count(), 3);
    }

    #[test]
    fn folds_stay_shallow() {
        let spec = Specification::<Tx>::any_of((0..20_000).map(|n| amount_over(n).negate()));
        assert!(spec.depth() <= 17, "depth {}", spec.depth());
        assert!(spec.is_satisfied_by(&tx("Food", 5)));
        assert!(!spec.is_satisfied_by(&tx("Food", 50_000)));
        assert!(spec.to_expression().is_ok());
        assert!(!spec.to_string().is_empty());

        let all = Specification::<Tx>::all_of((0..10_000).map(amount_over));
        assert!(all.depth() <= 15);
        assert!(all.is_satisfied_by(&tx("Food", 10_000)));
        assert!(!all.is_satisfied_by(&tx("Food", 9_999)));
    }

    #[test]
    fn folds_keep_leaf_order() {
        let spec = Specification::<Tx>::all_of([
            category("Food"),
            Specification::predicate("first", |_: &Tx| true),
            amount_over(1),
            Specification::predicate("second", |_: &Tx| true),
        ]);
        assert!(matches!(
            spec.to_expression(),
            Err(SpecError::UnsupportedPredicate { name }) if name == "first"
        ));
        assert_eq!(
            Specification::<Tx>::all_of([category("A"), category("B"), category("C"), category("D")])
                .to_string(),
            r#"((category eq "A" AND category eq "B") AND (category eq "C" AND category eq "D"))"#
        );
    }

    #[test]
    fn dropping_a_long_chain_does_not_recurse() {
        let mut chain = Specification::<Tx>::nothing();
        for n in 0..200_000 {
            chain = chain.or(amount_over(n));
        }
        let shared = chain.clone();
        drop(chain);
        assert!(matches!(*shared.root, Node::Or(..)));
        drop(shared);
    }

    #[test]
    fn and_maybe_skips_none() {
        let spec = category("Food").and_maybe(None);
        assert_eq!(spec.node_count(), 1);
        let spec = spec.and_maybe(Some(amount_over(10)));
        assert_eq!(spec.node_count(), 3);
    }

    #[test]
    fn predicate_blocks_translation() {
        let spec = category("Food").and(Specification::predicate("is_weekend", |_: &Tx| true));
        assert!(spec.is_satisfied_by(&tx("Food", 1)));
        assert!(!spec.is_translatable());
        match spec.to_expression() {
            Err(SpecError::UnsupportedPredicate { name }) => assert_eq!(name, "is_weekend"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn condition_rejects_unknown_field() {
        let err = Specification::<Tx>::condition("merchant", Op::Eq, "x").unwrap_err();
        assert!(matches!(err, SpecError::InvalidArgument { .. }));
    }

    #[test]
    fn display_shows_tree() {
        let spec = (category("Food") & amount_over(100)) | !category("Rent");
        assert_eq!(
            spec.to_string(),
            r#"((category eq "Food" AND amount gt 100) OR NOT category eq "Rent")"#
        );
    }

    #[test]
    fn collection_helpers() {
        let items = vec![tx("Food", 150), tx("Rent", 900), tx("Food", 20)];
        let food = category("Food");

        assert_eq!(food.filter(&items).len(), 2);
        assert_eq!(food.count(&items), 2);
        assert!(food.any(&items));
        assert!(!food.all(&items));
        assert_eq!(food.position(&items), Some(0));
        assert_eq!(amount_over(500).find(&items), Some(&items[1]));

        let mut owned = items.clone();
        food.filter_mut(&mut owned);
        assert_eq!(owned, food.filter_cloned(&items));
    }

    #[test]
    fn specifications_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Specification<Tx>>();

        let spec = category("Food") & amount_over(100);
        let handle = {
            let spec = spec.clone();
            std::thread::spawn(move || spec.is_satisfied_by(&tx("Food", 101)))
        };
        assert!(handle.join().unwrap());
        assert!(!spec.is_satisfied_by(&tx("Food", 100)));
    }
}
