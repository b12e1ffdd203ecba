//! Deterministic sample data for `tally-ledger seed` and tests.
//!
//! One month of activity, March 2024, with a few entries left pending, on
//! hold or cancelled so status filters have something to find.

use chrono::{DateTime, Utc};

use crate::model::{
    Category, Goal, GoalStatus, Transaction, TransactionKind, TransactionStatus,
};

/// 2024-03-01T00:00:00Z
const MARCH_2024: i64 = 1_709_251_200;

fn at_secs(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Day of March 2024 at the given hour, UTC.
fn march(day: i64, hour: i64) -> DateTime<Utc> {
    at_secs(MARCH_2024 + (day - 1) * 86_400 + hour * 3_600)
}

pub fn categories() -> Vec<Category> {
    let category = |id, name: &str, parent| Category {
        id,
        name: name.to_string(),
        parent,
    };
    vec![
        category(1, "Income", None),
        category(2, "Housing", None),
        category(3, "Food", None),
        category(4, "Travel", None),
        category(5, "Utilities", Some(2)),
        category(6, "Savings", None),
        category(7, "Fun", None),
        category(8, "Health", None),
    ]
}

pub fn transactions() -> Vec<Transaction> {
    use TransactionKind::{Expense, Income, Transfer};
    use TransactionStatus::{Cancelled, Completed, OnHold, Pending};

    let tx = |id,
              description: &str,
              category: &str,
              amount_cents,
              kind,
              status,
              occurred_at,
              note: Option<&str>| Transaction {
        id,
        description: description.to_string(),
        category: category.to_string(),
        amount_cents,
        kind,
        status,
        occurred_at,
        note: note.map(str::to_string),
    };

    vec![
        tx(1, "Salary", "Income", 420_000, Income, Completed, march(1, 9), Some("March payroll")),
        tx(2, "Rent", "Housing", -150_000, Expense, Completed, march(1, 10), None),
        tx(3, "Weekly groceries", "Food", -8_250, Expense, Completed, march(2, 11), Some("market")),
        tx(4, "Coffee", "Food", -450, Expense, Completed, march(3, 8), None),
        tx(5, "Train ticket", "Travel", -3_900, Expense, Completed, march(4, 7), Some("commute")),
        tx(6, "Electricity bill", "Utilities", -6_420, Expense, Pending, march(5, 12), None),
        tx(7, "Transfer to savings", "Savings", -50_000, Transfer, Completed, march(6, 9), Some("bike fund")),
        tx(8, "Restaurant dinner", "Food", -6_300, Expense, Completed, march(8, 20), Some("birthday")),
        tx(9, "Freelance invoice", "Income", 85_000, Income, Pending, march(10, 15), None),
        tx(10, "Concert tickets", "Fun", -12_000, Expense, OnHold, march(12, 18), None),
        tx(11, "Weekly groceries", "Food", -9_100, Expense, Completed, march(9, 11), None),
        tx(12, "Refund", "Food", 1_200, Income, Completed, march(13, 14), Some("returned item")),
        tx(13, "Gym membership", "Health", -4_500, Expense, Cancelled, march(15, 6), None),
        tx(14, "Book", "Fun", -2_300, Expense, Completed, march(18, 16), Some("novel")),
        tx(15, "Interest", "Income", 1_050, Income, Completed, march(31, 23), None),
    ]
}

pub fn goals() -> Vec<Goal> {
    let goal = |id, name: &str, target_cents, saved_cents, status, deadline| Goal {
        id,
        name: name.to_string(),
        target_cents,
        saved_cents,
        status,
        deadline,
    };
    vec![
        goal(1, "Bike", 80_000, 50_000, GoalStatus::InProgress, Some(at_secs(1_717_200_000))),
        goal(2, "Emergency fund", 500_000, 500_000, GoalStatus::Completed, None),
        goal(3, "Summer trip", 250_000, 20_000, GoalStatus::OnHold, Some(at_secs(1_733_011_200))),
        goal(4, "Laptop", 150_000, 0, GoalStatus::Cancelled, None),
    ]
}
