//! SQL SELECT builder for catalog queries
//!
//! Collects joins, predicates, ordering and paging, then renders a single
//! parameterized SQLite statement. Values are bound in the order their
//! placeholders appear in the rendered SQL (join conditions first, then the
//! WHERE clause), so callers never manage placeholder indices themselves.

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Row, Sqlite, SqlitePool};

/// Represents a SQL value that can be bound to a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Int(i64),
    Float(f64),
}

impl SqlValue {
    /// Bind this value to the next placeholder of a sqlx query
    pub fn bind_to_query<'q>(
        &'q self,
        query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::String(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::String(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

/// Comparison operator used in WHERE and JOIN ... ON conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lte,
    Gte,
    Like,
    In,
}

impl Op {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Lte => "<=",
            Op::Gte => ">=",
            Op::Like => "LIKE",
            Op::In => "IN",
        }
    }
}

/// `%value%` for a LIKE condition, matching backslash, `%` and `_` in `value` literally
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Another column (rendered verbatim)
    Column(String),
    /// A single bound value
    Value(SqlValue),
    /// A bound list, rendered as `(?, ?, ...)`
    List(Vec<SqlValue>),
}

/// Reference a column on the right-hand side of a condition
pub fn col(name: impl Into<String>) -> Operand {
    Operand::Column(name.into())
}

impl From<SqlValue> for Operand {
    fn from(value: SqlValue) -> Self {
        Operand::Value(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Value(value.into())
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Value(value.into())
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Value(value.into())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Value(value.into())
    }
}

impl From<Vec<i64>> for Operand {
    fn from(values: Vec<i64>) -> Self {
        Operand::List(values.into_iter().map(SqlValue::Int).collect())
    }
}

/// A single `column op operand` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    op: Op,
    operand: Operand,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: Op, operand: impl Into<Operand>) -> Self {
        Self {
            column: column.into(),
            op,
            operand: operand.into(),
        }
    }

    fn render(&self, values: &mut Vec<SqlValue>) -> String {
        match &self.operand {
            Operand::Column(other) => format!("{} {} {}", self.column, self.op.to_sql(), other),
            Operand::Value(value) => {
                values.push(value.clone());
                match self.op {
                    Op::Like => format!("{} LIKE ? ESCAPE '\\'", self.column),
                    op => format!("{} {} ?", self.column, op.to_sql()),
                }
            }
            // An empty IN list can never match
            Operand::List(list) if list.is_empty() => "1 = 0".to_string(),
            Operand::List(list) => {
                values.extend(list.iter().cloned());
                let placeholders = vec!["?"; list.len()].join(", ");
                format!("{} {} ({})", self.column, self.op.to_sql(), placeholders)
            }
        }
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Convert to SQL order string
    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }

    /// Parse the exact strings `ASC` / `DESC`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ASC" => Some(OrderDirection::Asc),
            "DESC" => Some(OrderDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    Inner,
}

impl JoinKind {
    fn to_sql(&self) -> &'static str {
        match self {
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Inner => "INNER JOIN",
        }
    }
}

/// A joined table with its ON conditions
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    table: String,
    alias: String,
    conditions: Vec<Condition>,
}

impl Join {
    /// Add the first ON condition
    pub fn on(&mut self, column: impl Into<String>, op: Op, operand: impl Into<Operand>) -> &mut Self {
        self.conditions.push(Condition::new(column, op, operand));
        self
    }

    /// Add another ON condition (combined with AND)
    pub fn and(&mut self, column: impl Into<String>, op: Op, operand: impl Into<Operand>) -> &mut Self {
        self.on(column, op, operand)
    }
}

/// A query builder for SELECT statements.
///
/// Builder methods take `&mut self` so filters can augment a query in place;
/// `Clone` branches a copy (e.g. for a count query) before paging is applied.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: String,
    columns: Vec<String>,
    distinct: bool,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    order_by: Vec<String>,
    /// (offset, limit)
    paging: Option<(i64, i64)>,
}

impl SelectQuery {
    /// Start a `SELECT ... FROM table` query
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            paging: None,
        }
    }

    /// Add an expression to the select list (defaults to `*` when empty)
    pub fn select(&mut self, expr: impl Into<String>) -> &mut Self {
        self.columns.push(expr.into());
        self
    }

    /// Only return distinct rows
    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    #[cfg(test)]
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn left_join(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Join {
        self.push_join(JoinKind::Left, table.into(), alias.into())
    }

    pub fn inner_join(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Join {
        self.push_join(JoinKind::Inner, table.into(), alias.into())
    }

    fn push_join(&mut self, kind: JoinKind, table: String, alias: String) -> &mut Join {
        let index = self.joins.len();
        self.joins.push(Join {
            kind,
            table,
            alias,
            conditions: Vec::new(),
        });
        &mut self.joins[index]
    }

    /// Aliases of every joined table, in join order
    #[cfg(test)]
    pub fn join_aliases(&self) -> Vec<&str> {
        self.joins.iter().map(|j| j.alias.as_str()).collect()
    }

    /// Add a WHERE condition (combined with AND)
    pub fn and_where(
        &mut self,
        column: impl Into<String>,
        op: Op,
        operand: impl Into<Operand>,
    ) -> &mut Self {
        self.conditions.push(Condition::new(column, op, operand));
        self
    }

    /// Append an ORDER BY term
    pub fn order_by(&mut self, column: impl Into<String>, direction: OrderDirection) -> &mut Self {
        self.order_by
            .push(format!("{} {}", column.into(), direction.to_sql()));
        self
    }

    /// Apply offset/limit paging
    pub fn limit(&mut self, offset: i64, limit: i64) -> &mut Self {
        self.paging = Some((offset, limit));
        self
    }

    /// Branch a `COUNT(column) AS total` query sharing every join and predicate.
    ///
    /// Ordering and paging do not affect a count and are dropped. Distinct
    /// queries count distinct values of `column`.
    pub fn count_query(&self, column: &str) -> SelectQuery {
        let mut count = self.clone();
        let expr = if self.distinct {
            format!("COUNT(DISTINCT {}) AS total", column)
        } else {
            format!("COUNT({}) AS total", column)
        };
        count.columns = vec![expr];
        count.distinct = false;
        count.order_by.clear();
        count.paging = None;
        count
    }

    /// Render the SQL string and the values to bind, in placeholder order
    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut values = Vec::new();
        let mut sql = String::from("SELECT ");

        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        for join in &self.joins {
            sql.push_str(&format!(" {} {} {}", join.kind.to_sql(), join.table, join.alias));
            if !join.conditions.is_empty() {
                let conditions: Vec<String> =
                    join.conditions.iter().map(|c| c.render(&mut values)).collect();
                sql.push_str(" ON ");
                sql.push_str(&conditions.join(" AND "));
            }
        }

        if !self.conditions.is_empty() {
            let conditions: Vec<String> =
                self.conditions.iter().map(|c| c.render(&mut values)).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if let Some((offset, limit)) = self.paging {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        }

        (sql, values)
    }

    async fn fetch_rows(&self, pool: &SqlitePool) -> Result<Vec<SqliteRow>, sqlx::Error> {
        let (sql, values) = self.to_sql();
        tracing::debug!(sql = %sql, binds = values.len(), "Executing catalog query");

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = value.bind_to_query(query);
        }

        query.fetch_all(pool).await
    }

    /// Execute the query and decode every row
    pub async fn execute<R>(&self, pool: &SqlitePool) -> Result<Vec<R>, sqlx::Error>
    where
        R: for<'r> FromRow<'r, SqliteRow>,
    {
        let rows = self.fetch_rows(pool).await?;
        rows.iter().map(|row| R::from_row(row)).collect()
    }

    /// Execute the query and decode the first row, if any
    pub async fn load<R>(&self, pool: &SqlitePool) -> Result<Option<R>, sqlx::Error>
    where
        R: for<'r> FromRow<'r, SqliteRow>,
    {
        let (sql, values) = self.to_sql();
        tracing::debug!(sql = %sql, binds = values.len(), "Executing catalog query (one)");

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = value.bind_to_query(query);
        }

        match query.fetch_optional(pool).await? {
            Some(row) => Ok(Some(R::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Execute a query built by [`count_query`](Self::count_query) and read `total`
    pub async fn fetch_total(&self, pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let rows = self.fetch_rows(pool).await?;
        match rows.first() {
            Some(row) => row.try_get::<i64, _>("total"),
            None => Ok(0),
        }
    }
}
