//! SQL-first dynamic builder.
//!
//! `Sql` composes a statement from raw fragments and bound values without the
//! caller tracking placeholder indices by hand: every [`Sql::push_bind`] adds a
//! placeholder, and `$1, $2, ...` are numbered when the statement is rendered.
//!
//! # Example
//!
//! ```ignore
//! use catalog_store::sql;
//!
//! let mut q = sql("SELECT id, title FROM items WHERE TRUE");
//! if let Some(publisher_id) = publisher_id {
//!     q.push(" AND publisher_id = ").push_bind(publisher_id);
//! }
//! q.push(" ORDER BY id ASC").limit(21);
//!
//! let items: Vec<Item> = q.fetch_all_as(&conn).await?;
//! ```

use crate::client::GenericClient;
use crate::error::{StoreError, StoreResult};
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

#[derive(Debug)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A SQL-first, parameter-safe dynamic SQL builder.
///
/// SQL pieces and parameters are stored separately; placeholders are generated
/// in order when the statement is rendered with [`Sql::to_sql`].
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Arc<dyn ToSql + Sync + Send>>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.parts.push(SqlPart::Param);
        self.params.push(Arc::new(value));
        self
    }

    /// Append another `Sql` fragment, consuming it.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        self.parts.append(&mut other.parts);
        self.params.append(&mut other.params);
        self
    }

    /// Append `LIMIT $n` with a bound parameter.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.push(" LIMIT ").push_bind(n)
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let mut idx: usize = 0;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    let _ = write!(&mut out, "${idx}");
                }
            }
        }
        out
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn validate(&self) -> StoreResult<()> {
        let placeholders = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();
        if placeholders != self.params.len() {
            return Err(StoreError::validation(format!(
                "Sql: {placeholders} placeholders but {} params",
                self.params.len()
            )));
        }
        Ok(())
    }

    /// Execute the built SQL and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> StoreResult<Vec<Row>> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query(&sql, &params).await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> StoreResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> StoreResult<Option<T>> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        let row = conn.query_opt(&sql, &params).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and return the first column of exactly one row.
    ///
    /// # Example
    /// ```ignore
    /// let total: i64 = sql("SELECT COUNT(*) FROM items").fetch_scalar_one(&client).await?;
    /// ```
    pub async fn fetch_scalar_one<T>(&self, conn: &impl GenericClient) -> StoreResult<T>
    where
        T: for<'b> FromSql<'b> + Send + Sync,
    {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        let row = conn.query_one(&sql, &params).await?;
        row.try_get(0).map_err(|e| StoreError::decode("0", e.to_string()))
    }

    /// Check if the SELECT statement built so far yields any row.
    ///
    /// Wraps the statement in `SELECT EXISTS(...)`.
    pub async fn exists(&self, conn: &impl GenericClient) -> StoreResult<bool> {
        self.validate()?;
        let inner_sql = self.to_sql();
        if !is_select(&inner_sql) {
            return Err(StoreError::validation(
                "exists() only works with SELECT statements",
            ));
        }

        let wrapped_sql = format!("SELECT EXISTS({inner_sql})");
        let params = self.params_ref();
        let row = conn.query_one(&wrapped_sql, &params).await?;
        row.try_get(0).map_err(|e| StoreError::decode("0", e.to_string()))
    }
}

fn is_select(sql: &str) -> bool {
    let head = sql.trim_start().trim_start_matches('(');
    head.get(..6)
        .is_some_and(|kw| kw.eq_ignore_ascii_case("select"))
        || head.get(..4).is_some_and(|kw| kw.eq_ignore_ascii_case("with"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = sql("SELECT * FROM items WHERE a = ");
        q.push_bind(1_i64).push(" AND b = ").push_bind("x");

        assert_eq!(q.to_sql(), "SELECT * FROM items WHERE a = $1 AND b = $2");
        assert_eq!(q.param_count(), 2);
    }

    #[test]
    fn can_compose_fragments() {
        let mut w = Sql::empty();
        w.push(" WHERE id = ").push_bind(42_i64);

        let mut q = sql("SELECT * FROM items");
        q.push_sql(w);

        assert_eq!(q.to_sql(), "SELECT * FROM items WHERE id = $1");
        assert_eq!(q.params_ref().len(), 1);
    }

    #[test]
    fn fragments_keep_numbering_after_merge() {
        let mut head = sql("SELECT * FROM items WHERE a = ");
        head.push_bind(1_i64);

        let mut tail = Sql::empty();
        tail.push(" AND b = ").push_bind(2_i64);
        head.push_sql(tail);
        head.limit(10);

        assert_eq!(
            head.to_sql(),
            "SELECT * FROM items WHERE a = $1 AND b = $2 LIMIT $3"
        );
        assert_eq!(head.param_count(), 3);
    }

    #[test]
    fn empty_push_is_noop() {
        let mut q = Sql::empty();
        q.push("");
        assert_eq!(q.to_sql(), "");
    }

    #[test]
    fn validate_counts_placeholders() {
        let mut q = sql("SELECT 1 WHERE x = ");
        q.push_bind(1_i64);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn recognises_select_statements() {
        assert!(is_select("SELECT 1"));
        assert!(is_select("  select id FROM items"));
        assert!(is_select("(SELECT 1)"));
        assert!(is_select("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(!is_select("DELETE FROM items"));
        assert!(!is_select("SEL"));
    }
}
