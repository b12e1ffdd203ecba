//! # Domain Model
//!
//! Ledger entities and their status enums. Every entity derives
//! [`Filterable`], so `Transaction::AMOUNT`, `Goal::STATUS` and friends are
//! available as typed field handles.
//!
//! ## Persisted Discriminants
//!
//! Enums are stored as integers. The numbers below are part of the on-disk
//! format and of serialized filters; never renumber a variant.
//!
//! | Enum | Variants |
//! |------|----------|
//! | [`TransactionKind`] | income = 0, expense = 1, transfer = 2 |
//! | [`TransactionStatus`] | pending = 0, completed = 1, on_hold = 2, cancelled = 3 |
//! | [`GoalStatus`] | in_progress = 0, completed = 1, on_hold = 2, cancelled = 3 |
//!
//! ## Money
//!
//! Amounts are integer cents. Expenses are negative, income positive.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_spec::{FilterEnum, Filterable};

macro_rules! ledger_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $discriminant:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn from_discriminant(discriminant: u32) -> Option<Self> {
                match discriminant {
                    $($discriminant => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FilterEnum for $name {
            fn discriminant(&self) -> u32 {
                match self {
                    $($name::$variant => $discriminant),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let known: Vec<_> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown value '{s}', expected one of: {}", known.join(", "))
                    })
            }
        }
    };
}

ledger_enum! {
    /// Direction of a transaction.
    TransactionKind {
        Income = 0 => "income",
        Expense = 1 => "expense",
        Transfer = 2 => "transfer",
    }
}

ledger_enum! {
    TransactionStatus {
        Pending = 0 => "pending",
        Completed = 1 => "completed",
        OnHold = 2 => "on_hold",
        Cancelled = 3 => "cancelled",
    }
}

ledger_enum! {
    GoalStatus {
        InProgress = 0 => "in_progress",
        Completed = 1 => "completed",
        OnHold = 2 => "on_hold",
        Cancelled = 3 => "cancelled",
    }
}

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Filterable)]
pub struct Transaction {
    #[filter(Number)]
    pub id: i64,

    #[filter(String)]
    pub description: String,

    /// Category name, see [`Category`].
    #[filter(String)]
    pub category: String,

    #[filter(Number, rename = "amount")]
    pub amount_cents: i64,

    #[filter(Enum)]
    pub kind: TransactionKind,

    #[filter(Enum)]
    pub status: TransactionStatus,

    #[filter(Timestamp)]
    pub occurred_at: DateTime<Utc>,

    #[filter(String)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Filterable)]
pub struct Category {
    #[filter(Number)]
    pub id: i64,

    #[filter(String)]
    pub name: String,

    /// Parent category id; `None` for top-level categories.
    #[filter(Number)]
    pub parent: Option<i64>,
}

/// A savings goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Filterable)]
pub struct Goal {
    #[filter(Number)]
    pub id: i64,

    #[filter(String)]
    pub name: String,

    #[filter(Number, rename = "target")]
    pub target_cents: i64,

    #[filter(Number, rename = "saved")]
    pub saved_cents: i64,

    #[filter(Enum)]
    pub status: GoalStatus,

    #[filter(Timestamp)]
    pub deadline: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn is_reached(&self) -> bool {
        self.saved_cents >= self.target_cents
    }

    /// Saved fraction of the target, capped at 1.0.
    pub fn progress(&self) -> f64 {
        if self.target_cents <= 0 {
            return 1.0;
        }
        (self.saved_cents as f64 / self.target_cents as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_spec::Value;

    #[test]
    fn discriminants_round_trip() {
        for status in TransactionStatus::ALL {
            assert_eq!(
                TransactionStatus::from_discriminant(status.discriminant()),
                Some(*status)
            );
        }
        assert_eq!(TransactionKind::from_discriminant(9), None);
        assert_eq!(GoalStatus::InProgress.discriminant(), 0);
        assert_eq!(TransactionStatus::Cancelled.discriminant(), 3);
    }

    #[test]
    fn parses_labels_loosely() {
        assert_eq!("On-Hold".parse::<TransactionStatus>(), Ok(TransactionStatus::OnHold));
        assert_eq!("in progress".parse::<GoalStatus>(), Ok(GoalStatus::InProgress));
        let err = "refunded".parse::<TransactionStatus>().unwrap_err();
        assert!(err.contains("pending, completed, on_hold, cancelled"));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&TransactionStatus::OnHold).unwrap();
        assert_eq!(json, r#""on_hold""#);
    }

    #[test]
    fn transaction_exposes_fields() {
        let tx = Transaction {
            id: 7,
            description: "Groceries".into(),
            category: "Food".into(),
            amount_cents: -8_250,
            kind: TransactionKind::Expense,
            status: TransactionStatus::Completed,
            occurred_at: DateTime::from_timestamp(1_709_280_000, 0).unwrap(),
            note: None,
        };
        assert_eq!(tx.field_value("amount"), Value::Number((-8_250i64).into()));
        assert_eq!(tx.field_value("kind"), Value::Enum(1));
        assert_eq!(tx.field_value("note"), Value::None);
        assert_eq!(
            Transaction::filter_fields(),
            ["id", "description", "category", "amount", "kind", "status", "occurred_at", "note"]
        );
    }

    #[test]
    fn goal_progress() {
        let goal = Goal {
            id: 1,
            name: "Bike".into(),
            target_cents: 80_000,
            saved_cents: 20_000,
            status: GoalStatus::InProgress,
            deadline: None,
        };
        assert_eq!(goal.progress(), 0.25);
        assert!(!goal.is_reached());
    }
}
