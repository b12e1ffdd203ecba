//! Filter forms.
//!
//! Plain structs describing what a user asked for, typically filled from
//! command-line flags or a JSON body. Each turns into a single
//! [`Specification`]. Unset fields add nothing; an empty form matches
//! everything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_spec::{Specification, SpecError};

use crate::model::{Goal, GoalStatus, Transaction, TransactionKind, TransactionStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionFilter {
    /// Exact category name.
    pub category: Option<String>,
    /// Substring of the description.
    pub search: Option<String>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub kind: Option<TransactionKind>,
    /// Any of these statuses. Empty means any status.
    pub statuses: Vec<TransactionStatus>,
    /// Inclusive lower bound.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub until: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    pub fn is_empty(&self) -> bool {
        *self == TransactionFilter::default()
    }

    pub fn to_specification(&self) -> Result<Specification<Transaction>, SpecError> {
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(SpecError::InvalidArgument {
                    reason: format!("min amount {min} is greater than max amount {max}"),
                });
            }
        }
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(SpecError::InvalidArgument {
                    reason: format!("since {since} is after until {until}"),
                });
            }
        }

        let mut parts = Vec::new();
        if let Some(category) = &self.category {
            parts.push(Transaction::CATEGORY.eq(category.as_str()));
        }
        if let Some(search) = &self.search {
            parts.push(Transaction::DESCRIPTION.contains(search.as_str()));
        }
        if let Some(min) = self.min_amount {
            parts.push(Transaction::AMOUNT.gte(min));
        }
        if let Some(max) = self.max_amount {
            parts.push(Transaction::AMOUNT.lte(max));
        }
        if let Some(kind) = self.kind {
            parts.push(Transaction::KIND.eq(kind));
        }
        if !self.statuses.is_empty() {
            parts.push(Transaction::STATUS.one_of(self.statuses.iter().copied()));
        }
        if let Some(since) = &self.since {
            parts.push(Transaction::OCCURRED_AT.on_or_after(since));
        }
        if let Some(until) = &self.until {
            parts.push(Transaction::OCCURRED_AT.before(until));
        }

        Ok(Specification::all_of(parts))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalFilter {
    /// Substring of the goal name.
    pub name: Option<String>,
    pub statuses: Vec<GoalStatus>,
    pub min_target: Option<i64>,
    /// Deadline strictly before this instant. Goals without one never match.
    pub due_before: Option<DateTime<Utc>>,
    /// Saved amount has reached the target.
    pub reached: Option<bool>,
}

impl GoalFilter {
    pub fn is_empty(&self) -> bool {
        *self == GoalFilter::default()
    }

    /// Builds the goal specification.
    ///
    /// `reached` compares two fields of the same goal, which no condition
    /// can express, so it becomes a closure leaf. Such a specification
    /// evaluates in memory but does not translate.
    pub fn to_specification(&self) -> Specification<Goal> {
        let mut parts = Vec::new();
        if let Some(name) = &self.name {
            parts.push(Goal::NAME.contains(name.as_str()));
        }
        if !self.statuses.is_empty() {
            parts.push(Goal::STATUS.one_of(self.statuses.iter().copied()));
        }
        if let Some(min) = self.min_target {
            parts.push(Goal::TARGET.gte(min));
        }
        if let Some(due) = &self.due_before {
            parts.push(Goal::DEADLINE.before(due));
        }
        if let Some(reached) = self.reached {
            let spec = Specification::predicate("goal_reached", Goal::is_reached);
            parts.push(if reached { spec } else { !spec });
        }
        Specification::all_of(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(id: i64, category: &str, amount_cents: i64, day: u32) -> Transaction {
        Transaction {
            id,
            description: format!("entry {id}"),
            category: category.into(),
            amount_cents,
            kind: if amount_cents < 0 {
                TransactionKind::Expense
            } else {
                TransactionKind::Income
            },
            status: TransactionStatus::Completed,
            occurred_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            note: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = TransactionFilter::default();
        assert!(filter.is_empty());
        assert!(filter.to_specification().unwrap().is_everything());
    }

    #[test]
    fn combines_every_set_field() {
        let filter = TransactionFilter {
            category: Some("Food".into()),
            max_amount: Some(-1_000),
            ..Default::default()
        };
        let spec = filter.to_specification().unwrap();
        assert!(spec.is_satisfied_by(&tx(1, "Food", -4_500, 1)));
        assert!(!spec.is_satisfied_by(&tx(2, "Food", -500, 1)));
        assert!(!spec.is_satisfied_by(&tx(3, "Rent", -90_000, 1)));
        assert_eq!(spec.to_string(), r#"(category eq "Food" AND amount lte -1000)"#);
    }

    #[test]
    fn until_is_exclusive() {
        let filter = TransactionFilter {
            since: Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
            until: Some(Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap()),
            ..Default::default()
        };
        let spec = filter.to_specification().unwrap();
        let kept: Vec<_> = [tx(1, "A", 1, 1), tx(2, "A", 1, 2), tx(3, "A", 1, 3)]
            .iter()
            .filter(|t| spec.is_satisfied_by(t))
            .map(|t| t.id)
            .collect();
        assert_eq!(kept, [2]);
    }

    #[test]
    fn rejects_inverted_ranges() {
        let filter = TransactionFilter {
            min_amount: Some(10),
            max_amount: Some(5),
            ..Default::default()
        };
        assert!(matches!(
            filter.to_specification(),
            Err(SpecError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn statuses_accept_any_listed() {
        let filter: TransactionFilter =
            serde_json::from_str(r#"{"statuses":["pending","on_hold"]}"#).unwrap();
        let spec = filter.to_specification().unwrap();
        let mut t = tx(1, "A", 1, 1);
        assert!(!spec.is_satisfied_by(&t));
        t.status = TransactionStatus::OnHold;
        assert!(spec.is_satisfied_by(&t));
    }

    #[test]
    fn reached_goals_stay_in_memory() {
        let goal = |saved_cents| Goal {
            id: 1,
            name: "Laptop".into(),
            target_cents: 100_000,
            saved_cents,
            status: GoalStatus::InProgress,
            deadline: None,
        };
        let filter = GoalFilter {
            reached: Some(false),
            ..Default::default()
        };
        let spec = filter.to_specification();
        assert!(spec.is_satisfied_by(&goal(10_000)));
        assert!(!spec.is_satisfied_by(&goal(100_000)));
        assert!(!spec.is_translatable());

        let declarative = GoalFilter {
            min_target: Some(50_000),
            ..Default::default()
        };
        assert!(declarative.to_specification().is_translatable());
    }

    #[test]
    fn unsigned_targets_survive_json() {
        let expr = Goal::TARGET.gte(1_000u32).to_expression().unwrap();
        let json = serde_json::to_string(&expr).unwrap();
        let back: tally_spec::Expression<Goal> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn goals_without_deadline_are_not_due() {
        let filter = GoalFilter {
            due_before: Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let goal = Goal {
            id: 1,
            name: "Someday".into(),
            target_cents: 1,
            saved_cents: 0,
            status: GoalStatus::InProgress,
            deadline: None,
        };
        assert!(!filter.to_specification().is_satisfied_by(&goal));
    }
}
