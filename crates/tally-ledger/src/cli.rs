use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tally_ledger::{
    sample, GoalFilter, GoalStatus, SqliteLedger, Transaction, TransactionFilter,
    TransactionKind, TransactionRepository, TransactionStatus,
};
use tally_spec::{Dir, Filterable, OrderBy, Query};

#[derive(Parser, Debug)]
#[command(name = "tally-ledger", version)]
#[command(about = "Query a personal ledger with composable filters", long_about = None)]
pub struct Cli {
    /// Ledger database file
    #[arg(long, global = true, env = "TALLY_DB", default_value = "tally.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the sample month of transactions
    Seed {
        /// Delete existing transactions first
        #[arg(long)]
        reset: bool,
    },

    /// List transactions
    #[command(alias = "ls")]
    List(ListArgs),

    /// List sample savings goals
    Goals(GoalArgs),

    /// Print the fields usable in filters and --order-by
    Fields,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Field to order by
    #[arg(long, default_value = "occurred_at")]
    pub order_by: String,

    /// Order descending
    #[arg(long)]
    pub desc: bool,

    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long)]
    pub offset: Option<usize>,

    /// Print the SQL instead of running it
    #[arg(long)]
    pub explain: bool,

    /// Print only the number of matches
    #[arg(long, conflicts_with = "explain")]
    pub count: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Exact category name
    #[arg(long)]
    pub category: Option<String>,

    /// Text contained in the description
    #[arg(short, long)]
    pub search: Option<String>,

    /// Minimum amount in cents (expenses are negative)
    #[arg(long, allow_hyphen_values = true)]
    pub min_amount: Option<i64>,

    /// Maximum amount in cents
    #[arg(long, allow_hyphen_values = true)]
    pub max_amount: Option<i64>,

    #[arg(long)]
    pub kind: Option<TransactionKind>,

    /// One or more statuses, comma separated
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<TransactionStatus>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<TransactionFilter> {
        let until = match self.until {
            Some(day) => {
                let next = day.succ_opt().context("--until is out of range")?;
                Some(midnight(next)?)
            }
            None => None,
        };
        Ok(TransactionFilter {
            category: self.category.clone(),
            search: self.search.clone(),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            kind: self.kind,
            statuses: self.statuses.clone(),
            since: self.since.map(midnight).transpose()?,
            until,
        })
    }
}

#[derive(Args, Debug)]
pub struct GoalArgs {
    /// Text contained in the goal name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<GoalStatus>,

    /// Minimum target in cents
    #[arg(long)]
    pub min_target: Option<i64>,

    /// Deadline before this day (YYYY-MM-DD)
    #[arg(long)]
    pub due_before: Option<NaiveDate>,

    /// Only goals whose target is reached
    #[arg(long, conflicts_with = "unreached")]
    pub reached: bool,

    /// Only goals still short of their target
    #[arg(long)]
    pub unreached: bool,
}

impl GoalArgs {
    pub fn to_filter(&self) -> Result<GoalFilter> {
        let reached = match (self.reached, self.unreached) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Ok(GoalFilter {
            name: self.name.clone(),
            statuses: self.statuses.clone(),
            min_target: self.min_target,
            due_before: self.due_before.map(midnight).transpose()?,
            reached,
        })
    }
}

fn midnight(day: NaiveDate) -> Result<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .with_context(|| format!("invalid date {day}"))
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Seed { reset } => seed(&cli.db, reset),
        Commands::List(args) => list(&cli.db, &args),
        Commands::Goals(args) => goals(&args),
        Commands::Fields => {
            for field in Transaction::filter_fields() {
                println!("{field}");
            }
            Ok(())
        }
    }
}

fn seed(db: &Path, reset: bool) -> Result<()> {
    let mut ledger = SqliteLedger::open(db)
        .with_context(|| format!("failed to open {}", db.display()))?;
    if reset {
        let removed = ledger.clear()?;
        tracing::info!(removed, "cleared ledger");
    }
    let transactions = sample::transactions();
    ledger
        .add_all(&transactions)
        .context("ledger already holds sample data, pass --reset to reload it")?;
    println!("Seeded {} transactions into {}", transactions.len(), db.display());
    Ok(())
}

fn list(db: &Path, args: &ListArgs) -> Result<()> {
    if !Transaction::is_filter_field(&args.order_by) {
        bail!(
            "cannot order by '{}', expected one of: {}",
            args.order_by,
            Transaction::filter_fields().join(", ")
        );
    }

    let spec = args.filter.to_filter()?.to_specification()?;
    let dir = if args.desc { Dir::Desc } else { Dir::Asc };
    let mut query = Query::new()
        .matching(spec)
        .order_by(OrderBy::new(args.order_by.as_str(), dir));
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = args.offset {
        query = query.offset(offset);
    }

    let ledger = SqliteLedger::open(db)
        .with_context(|| format!("failed to open {}", db.display()))?;

    if args.explain {
        let (sql, params) = ledger.explain(&query)?;
        println!("{sql}");
        for (i, param) in params.iter().enumerate() {
            println!("  ?{} = {param}", i + 1);
        }
        return Ok(());
    }

    if args.count {
        println!("{}", ledger.count(query.specification())?);
        return Ok(());
    }

    let found = ledger.find(&query)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    if found.is_empty() {
        println!("No matching transactions.");
        return Ok(());
    }
    for t in &found {
        println!(
            "{:>4}  {}  {:<10} {:<9} {:>12}  {}",
            t.id,
            t.occurred_at.format("%Y-%m-%d"),
            t.category,
            t.status,
            format_cents(t.amount_cents),
            t.description
        );
    }
    Ok(())
}

fn goals(args: &GoalArgs) -> Result<()> {
    let spec = args.to_filter()?.to_specification();
    let goals = sample::goals();
    let found = spec.filter(&goals);
    if found.is_empty() {
        println!("No matching goals.");
    }
    for goal in found {
        println!(
            "{:>4}  {:<16} {:<12} {:>12} / {:>12}  {:>3.0}%",
            goal.id,
            goal.name,
            goal.status,
            format_cents(goal.saved_cents),
            format_cents(goal.target_cents),
            goal.progress() * 100.0
        );
    }
    Ok(())
}

/// `-8250` renders as `-82.50`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_cents() {
        assert_eq!(format_cents(-8_250), "-82.50");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(420_000), "4200.00");
    }

    #[test]
    fn parses_list_flags() {
        let cli = Cli::try_parse_from([
            "tally-ledger",
            "--db",
            "x.db",
            "ls",
            "--max-amount",
            "-1000",
            "--status",
            "pending,on_hold",
            "--until",
            "2024-03-05",
            "--desc",
        ])
        .unwrap();
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.filter.max_amount, Some(-1_000));
        assert_eq!(
            args.filter.statuses,
            [TransactionStatus::Pending, TransactionStatus::OnHold]
        );

        let filter = args.filter.to_filter().unwrap();
        assert_eq!(
            filter.until.unwrap().to_rfc3339(),
            "2024-03-06T00:00:00+00:00"
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["tally-ledger", "list", "--kind", "gift"]).is_err());
    }
}
