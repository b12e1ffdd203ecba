//! Expression lowering.
//!
//! Every node kind has one SQL shape:
//!
//! | Node | SQL |
//! |------|-----|
//! | `TRUE` / `FALSE` | `TRUE` / `FALSE` |
//! | `a AND b` | `(a AND b)` |
//! | `a OR b` | `(a OR b)` |
//! | `NOT a` | `NOT COALESCE((a), FALSE)` |
//! | condition | a comparison on the mapped column |
//!
//! A NULL column makes a comparison NULL, which `WHERE` treats as false.
//! In memory a missing value fails the condition, so both sides already
//! agree, except under negation: `NOT NULL` is still NULL. The `COALESCE`
//! pins the operand of `NOT` to false first, so `NOT (note = 'x')` keeps
//! the rows where `note` is NULL, exactly as the in-memory evaluation does.
//!
//! Parentheses nest as deep as the tree. SQLite refuses expressions nested
//! past 1000 levels, so long lists should be built with
//! [`Specification::any_of`] or [`Specification::all_of`], which keep the
//! depth logarithmic, rather than by chaining `or`/`and` by hand.

use tally_spec::{
    Condition, Dir, Expr, Expression, Number, Op, Operand, OrderBy, Query, QueryPlan,
    Specification,
};

use crate::error::{Result, SqlError};
use crate::options::{Dialect, SqlOptions};
use crate::value::SqlValue;

/// A lowered boolean condition, ready to follow `WHERE`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

/// Everything after `SELECT … FROM …`: filter, ordering and paging.
///
/// `sql` is empty or starts with a space, so it can be appended directly.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlTail {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Lowers a translated expression.
pub fn lower_expression<E>(expression: &Expression<E>, options: &SqlOptions) -> Result<SqlFilter> {
    let mut lowerer = Lowerer::new(options);
    let clause = lowerer.expr(expression.root())?;
    tracing::debug!(
        dialect = %options.dialect,
        %clause,
        params = lowerer.params.len(),
        "lowered expression"
    );
    Ok(SqlFilter {
        clause,
        params: lowerer.params,
    })
}

/// Translates and lowers a specification.
///
/// Fails with [`SqlError::Spec`] if the specification holds a closure leaf.
pub fn lower_specification<E>(spec: &Specification<E>, options: &SqlOptions) -> Result<SqlFilter> {
    lower_expression(&spec.to_expression()?, options)
}

/// Lowers a full plan: `WHERE`, `ORDER BY`, `LIMIT` and `OFFSET`.
///
/// A filter that is the bare constant `TRUE` emits no `WHERE`.
/// Placeholders are numbered across the whole tail.
pub fn lower_plan<E>(plan: &QueryPlan<E>, options: &SqlOptions) -> Result<SqlTail> {
    let mut lowerer = Lowerer::new(options);
    let mut sql = String::new();

    if !matches!(plan.filter.root(), Expr::Constant(true)) {
        let clause = lowerer.expr(plan.filter.root())?;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }

    if !plan.orderings.is_empty() {
        let keys = plan
            .orderings
            .iter()
            .map(|order| lowerer.order_key(order))
            .collect::<Result<Vec<_>>>()?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));
    }

    match (plan.limit, plan.offset) {
        (None, None) => {}
        (limit, offset) => {
            match limit {
                Some(limit) => {
                    let p = lowerer.bind(SqlValue::Integer(to_i64(limit)));
                    sql.push_str(&format!(" LIMIT {p}"));
                }
                // SQLite only accepts OFFSET after a LIMIT.
                None if options.dialect == Dialect::Sqlite => sql.push_str(" LIMIT -1"),
                None => {}
            }
            if let Some(offset) = offset {
                let p = lowerer.bind(SqlValue::Integer(to_i64(offset)));
                sql.push_str(&format!(" OFFSET {p}"));
            }
        }
    }

    tracing::debug!(
        dialect = %options.dialect,
        %sql,
        params = lowerer.params.len(),
        "lowered query plan"
    );
    Ok(SqlTail {
        sql,
        params: lowerer.params,
    })
}

/// Plans and lowers a query in one step.
pub fn lower_query<E>(query: &Query<E>, options: &SqlOptions) -> Result<SqlTail> {
    lower_plan(&query.plan()?, options)
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

struct Lowerer<'o> {
    options: &'o SqlOptions,
    params: Vec<SqlValue>,
}

impl<'o> Lowerer<'o> {
    fn new(options: &'o SqlOptions) -> Self {
        Lowerer {
            options,
            params: Vec::new(),
        }
    }

    fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    /// Records a parameter and returns its placeholder.
    fn bind(&mut self, value: SqlValue) -> String {
        self.params.push(value);
        match self.dialect() {
            Dialect::Sqlite => "?".to_string(),
            Dialect::Postgres => format!("${}", self.params.len()),
        }
    }

    /// Placeholder used as a text function argument. PostgreSQL cannot
    /// infer the type of `length($1)` on its own.
    fn bind_text(&mut self, text: &str) -> String {
        let placeholder = self.bind(SqlValue::Text(text.to_string()));
        match self.dialect() {
            Dialect::Sqlite => placeholder,
            Dialect::Postgres => format!("{placeholder}::text"),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<String> {
        Ok(match expr {
            Expr::Constant(true) => "TRUE".to_string(),
            Expr::Constant(false) => "FALSE".to_string(),
            Expr::Condition(condition) => self.condition(condition)?,
            Expr::And(a, b) => format!("({} AND {})", self.expr(a)?, self.expr(b)?),
            Expr::Or(a, b) => format!("({} OR {})", self.expr(a)?, self.expr(b)?),
            Expr::Not(inner) => format!("NOT COALESCE(({}), FALSE)", self.expr(inner)?),
        })
    }

    fn condition(&mut self, condition: &Condition) -> Result<String> {
        let column = self.options.column_for(condition.field())?;
        let op = condition.op();

        match condition.operand() {
            Operand::String(text) => self.text_condition(&column, op, text),
            Operand::Regex(regex) => match self.dialect() {
                Dialect::Postgres => {
                    let p = self.bind_text(regex.as_str());
                    Ok(format!("{column} ~ {p}"))
                }
                dialect => Err(SqlError::UnsupportedOperator {
                    op: op.as_str(),
                    dialect,
                }),
            },
            Operand::EnumSet(set) if set.is_empty() => Ok("FALSE".to_string()),
            Operand::EnumSet(set) => {
                let placeholders = set
                    .iter()
                    .map(|d| self.bind(SqlValue::Integer(i64::from(*d))))
                    .collect::<Vec<_>>();
                Ok(format!("{column} IN ({})", placeholders.join(", ")))
            }
            Operand::Number(n) => self.compare(&column, op, number_value(*n)),
            Operand::Timestamp(t) => self.compare(&column, op, SqlValue::Integer(t.as_millis())),
            Operand::Enum(d) => self.compare(&column, op, SqlValue::Integer(i64::from(*d))),
            Operand::Bool(b) => {
                let value = match self.dialect() {
                    Dialect::Sqlite => SqlValue::Integer(i64::from(*b)),
                    Dialect::Postgres => SqlValue::Bool(*b),
                };
                self.compare(&column, op, value)
            }
        }
    }

    fn text_condition(&mut self, column: &str, op: Op, text: &str) -> Result<String> {
        let find = match self.dialect() {
            Dialect::Sqlite => "instr",
            Dialect::Postgres => "strpos",
        };
        Ok(match op {
            Op::Contains => {
                let p = self.bind_text(text);
                format!("{find}({column}, {p}) > 0")
            }
            Op::StartsWith => {
                let p = self.bind_text(text);
                format!("{find}({column}, {p}) = 1")
            }
            Op::EndsWith => {
                let len = self.bind_text(text);
                let p = self.bind_text(text);
                format!("substr({column}, length({column}) - length({len}) + 1) = {p}")
            }
            _ => return self.compare(column, op, SqlValue::Text(text.to_string())),
        })
    }

    fn compare(&mut self, column: &str, op: Op, value: SqlValue) -> Result<String> {
        let symbol = comparison_symbol(op).ok_or(SqlError::UnsupportedOperator {
            op: op.as_str(),
            dialect: self.dialect(),
        })?;
        let p = self.bind(value);
        Ok(format!("{column} {symbol} {p}"))
    }

    fn order_key(&mut self, order: &OrderBy) -> Result<String> {
        let column = self.options.column_for(&order.field)?;
        let dir = match order.dir {
            Dir::Asc => "ASC",
            Dir::Desc => "DESC",
        };
        Ok(format!("{column} {dir} NULLS LAST"))
    }
}

fn comparison_symbol(op: Op) -> Option<&'static str> {
    match op.normalize() {
        Op::Eq => Some("="),
        Op::Ne => Some("<>"),
        Op::Gt => Some(">"),
        Op::Gte => Some(">="),
        Op::Lt => Some("<"),
        Op::Lte => Some("<="),
        _ => None,
    }
}

fn number_value(n: Number) -> SqlValue {
    match n {
        Number::I64(n) => SqlValue::Integer(n),
        Number::U64(n) => match i64::try_from(n) {
            Ok(n) => SqlValue::Integer(n),
            Err(_) => SqlValue::Real(n as f64),
        },
        Number::F64(n) => SqlValue::Real(n),
    }
}
