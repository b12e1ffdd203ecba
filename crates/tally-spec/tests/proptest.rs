//! Property-based tests for the combinator laws.

use proptest::prelude::*;
use tally_spec::{Condition, Filterable, Number, Op, Query, Specification, Value};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone)]
struct Item {
    amount: i64,
    category: String,
    note: Option<String>,
    flagged: bool,
}

impl Filterable for Item {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "amount" => Value::Number(Number::I64(self.amount)),
            "category" => Value::String(&self.category),
            "note" => self.note.as_deref().map_or(Value::None, Value::String),
            "flagged" => Value::Bool(self.flagged),
            _ => Value::None,
        }
    }

    fn filter_fields() -> &'static [&'static str] {
        &["amount", "category", "note", "flagged"]
    }
}

const CATEGORIES: [&str; 4] = ["Food", "Rent", "Travel", "Fees"];

fn item_strategy() -> impl Strategy<Value = Item> {
    (
        -50i64..50,
        prop::sample::select(CATEGORIES.to_vec()),
        prop::option::of("[a-c]{0,3}"),
        any::<bool>(),
    )
        .prop_map(|(amount, category, note, flagged)| Item {
            amount,
            category: category.to_string(),
            note,
            flagged,
        })
}

fn number_op() -> impl Strategy<Value = Op> {
    prop::sample::select(vec![Op::Eq, Op::Ne, Op::Gt, Op::Gte, Op::Lt, Op::Lte])
}

fn condition_strategy() -> BoxedStrategy<Condition> {
    prop_oneof![
        (number_op(), -50i64..50).prop_map(|(op, n)| Condition::new("amount", op, n).unwrap()),
        (number_op(), 0u64..50).prop_map(|(op, n)| Condition::new("amount", op, n).unwrap()),
        // Halves print and parse back exactly.
        (number_op(), -100i32..100)
            .prop_map(|(op, n)| Condition::new("amount", op, f64::from(n) / 2.0).unwrap()),
        (
            prop::sample::select(vec![Op::Eq, Op::Ne, Op::StartsWith, Op::EndsWith]),
            prop::sample::select(CATEGORIES.to_vec())
        )
            .prop_map(|(op, c)| Condition::new("category", op, c).unwrap()),
        (prop::sample::select(vec![Op::Contains, Op::Ne]), "[a-c]{0,2}")
            .prop_map(|(op, s)| Condition::new("note", op, s).unwrap()),
        any::<bool>().prop_map(|b| Condition::new("flagged", Op::Is, b).unwrap()),
    ]
    .boxed()
}

fn declarative_leaf() -> BoxedStrategy<Specification<Item>> {
    prop_oneof![
        4 => condition_strategy().prop_map(Specification::leaf),
        1 => Just(Specification::everything()),
        1 => Just(Specification::nothing()),
    ]
    .boxed()
}

fn any_leaf() -> BoxedStrategy<Specification<Item>> {
    prop_oneof![
        5 => declarative_leaf(),
        1 => Just(Specification::predicate("even_amount", |i: &Item| i.amount % 2 == 0)),
    ]
    .boxed()
}

fn tree(leaf: BoxedStrategy<Specification<Item>>) -> BoxedStrategy<Specification<Item>> {
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.and(b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.or(b)),
            inner.prop_map(Specification::negate),
        ]
    })
    .boxed()
}

fn spec() -> BoxedStrategy<Specification<Item>> {
    tree(any_leaf())
}

fn translatable_spec() -> BoxedStrategy<Specification<Item>> {
    tree(declarative_leaf())
}

// ============================================================================
// Combinator laws
// ============================================================================

proptest! {
    /// A leaf is satisfied exactly when its condition holds.
    #[test]
    fn leaf_law(condition in condition_strategy(), x in item_strategy()) {
        let spec = Specification::<Item>::leaf(condition.clone());
        prop_assert_eq!(spec.is_satisfied_by(&x), condition.evaluate(&x));
    }

    #[test]
    fn and_law(a in spec(), b in spec(), x in item_strategy()) {
        let expected = a.is_satisfied_by(&x) && b.is_satisfied_by(&x);
        prop_assert_eq!(a.and(b).is_satisfied_by(&x), expected);
    }

    #[test]
    fn or_law(a in spec(), b in spec(), x in item_strategy()) {
        let expected = a.is_satisfied_by(&x) || b.is_satisfied_by(&x);
        prop_assert_eq!(a.or(b).is_satisfied_by(&x), expected);
    }

    #[test]
    fn negate_law(a in spec(), x in item_strategy()) {
        prop_assert_eq!(a.clone().negate().is_satisfied_by(&x), !a.is_satisfied_by(&x));
    }

    #[test]
    fn commutativity(a in spec(), b in spec(), x in item_strategy()) {
        prop_assert_eq!(
            a.clone().and(b.clone()).is_satisfied_by(&x),
            b.clone().and(a.clone()).is_satisfied_by(&x)
        );
        prop_assert_eq!(
            a.clone().or(b.clone()).is_satisfied_by(&x),
            b.or(a).is_satisfied_by(&x)
        );
    }

    #[test]
    fn associativity(a in spec(), b in spec(), c in spec(), x in item_strategy()) {
        prop_assert_eq!(
            a.clone().and(b.clone()).and(c.clone()).is_satisfied_by(&x),
            a.clone().and(b.clone().and(c.clone())).is_satisfied_by(&x)
        );
        prop_assert_eq!(
            a.clone().or(b.clone()).or(c.clone()).is_satisfied_by(&x),
            a.or(b.or(c)).is_satisfied_by(&x)
        );
    }

    #[test]
    fn distributivity(a in spec(), b in spec(), c in spec(), x in item_strategy()) {
        let left = a.clone().and(b.clone().or(c.clone()));
        let right = a.clone().and(b).or(a.and(c));
        prop_assert_eq!(left.is_satisfied_by(&x), right.is_satisfied_by(&x));
    }

    #[test]
    fn de_morgan(a in spec(), b in spec(), x in item_strategy()) {
        let left = !(a.clone() & b.clone());
        let right = !a | !b;
        prop_assert_eq!(left.is_satisfied_by(&x), right.is_satisfied_by(&x));
    }

    #[test]
    fn identities(a in spec(), x in item_strategy()) {
        let expected = a.is_satisfied_by(&x);
        prop_assert_eq!(a.clone().and(Specification::everything()).is_satisfied_by(&x), expected);
        prop_assert_eq!(a.clone().or(Specification::nothing()).is_satisfied_by(&x), expected);
        prop_assert!(!a.clone().and(Specification::nothing()).is_satisfied_by(&x));
        prop_assert!(a.or(Specification::everything()).is_satisfied_by(&x));
    }

    /// Composing never changes the operands.
    #[test]
    fn composition_leaves_operands_untouched(
        a in spec(),
        b in spec(),
        items in prop::collection::vec(item_strategy(), 0..20),
    ) {
        let rendered = (a.to_string(), b.to_string());
        let before: Vec<_> = items.iter().map(|x| (a.is_satisfied_by(x), b.is_satisfied_by(x))).collect();

        let _combined = (a.clone() & b.clone()) | !a.clone();

        let after: Vec<_> = items.iter().map(|x| (a.is_satisfied_by(x), b.is_satisfied_by(x))).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(rendered, (a.to_string(), b.to_string()));
    }
}

// ============================================================================
// Translation laws
// ============================================================================

proptest! {
    #[test]
    fn declarative_trees_always_translate(a in translatable_spec()) {
        prop_assert!(a.is_translatable());
        prop_assert!(a.to_expression().is_ok());
    }

    #[test]
    fn translation_is_deterministic(a in translatable_spec()) {
        prop_assert_eq!(a.to_expression().unwrap(), a.to_expression().unwrap());
    }

    #[test]
    fn translation_succeeds_iff_no_closure(a in spec()) {
        prop_assert_eq!(a.to_expression().is_ok(), a.is_translatable());
    }

    /// The expression and the specification agree on every item.
    #[test]
    fn expression_agrees_with_specification(a in translatable_spec(), x in item_strategy()) {
        let expr = a.to_expression().unwrap();
        prop_assert_eq!(expr.evaluate(&x), a.is_satisfied_by(&x));
        prop_assert_eq!(expr.to_string(), a.to_string());
    }

    #[test]
    fn simplified_preserves_meaning(a in translatable_spec(), x in item_strategy()) {
        let expr = a.to_expression().unwrap();
        let simple = expr.simplified();
        prop_assert_eq!(simple.evaluate(&x), expr.evaluate(&x));
        prop_assert!(simple.depth() <= expr.depth());
    }

    #[test]
    fn expression_survives_json(a in translatable_spec(), x in item_strategy()) {
        let expr = a.to_expression().unwrap();
        let json = serde_json::to_string(&expr).unwrap();
        let back: tally_spec::Expression<Item> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&back, &expr);
        prop_assert_eq!(back.evaluate(&x), a.is_satisfied_by(&x));
    }
}

// ============================================================================
// Query properties
// ============================================================================

proptest! {
    #[test]
    fn query_never_grows_collection(
        a in spec(),
        items in prop::collection::vec(item_strategy(), 0..50),
    ) {
        let query = Query::new().matching(a.clone());
        let results = query.filter(&items);
        prop_assert!(results.len() <= items.len());
        prop_assert_eq!(results.len(), a.count(&items));
    }

    #[test]
    fn ordering_is_a_permutation(
        items in prop::collection::vec(item_strategy(), 0..50),
        desc in any::<bool>(),
    ) {
        let query = if desc {
            Query::new().order_desc("amount")
        } else {
            Query::new().order_asc("amount")
        };
        let sorted: Vec<i64> = query.filter(&items).iter().map(|i| i.amount).collect();
        prop_assert_eq!(sorted.len(), items.len());
        for pair in sorted.windows(2) {
            if desc {
                prop_assert!(pair[0] >= pair[1]);
            } else {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }

    #[test]
    fn offset_and_limit_window(
        items in prop::collection::vec(item_strategy(), 0..50),
        offset in 0usize..60,
        limit in 0usize..20,
    ) {
        let results = Query::new().offset(offset).limit(limit).filter(&items);
        let expected = items.len().saturating_sub(offset).min(limit);
        prop_assert_eq!(results.len(), expected);
    }
}
