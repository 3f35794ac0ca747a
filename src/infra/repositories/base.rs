//! Shared plumbing for repository implementations.
//!
//! Every store is generic over a [`DbHandle`], so one implementation
//! serves both the pooled connection and a borrowed transaction.

use chrono::{NaiveDate, NaiveTime};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, EntityTrait,
    FromQueryResult, PaginatorTrait, Select, Statement,
};

use crate::domain::{BucketCount, BucketUnit};
use crate::errors::AppResult;
use crate::types::PaginationParams;

/// Something a store can run queries against.
pub trait DbHandle: Send + Sync {
    type Conn: ConnectionTrait + Send + Sync;

    fn conn(&self) -> &Self::Conn;
}

impl DbHandle for DatabaseConnection {
    type Conn = DatabaseConnection;

    fn conn(&self) -> &DatabaseConnection {
        self
    }
}

impl<'a> DbHandle for &'a DatabaseTransaction {
    type Conn = DatabaseTransaction;

    fn conn(&self) -> &DatabaseTransaction {
        self
    }
}

const LIKE_ESCAPE: char = '\\';

/// Case-folded `%term%` pattern with LIKE wildcards in `term` escaped
pub fn contains_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(&term.to_lowercase()))).escape(LIKE_ESCAPE)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Fetch one page of `select` together with the total row count.
pub async fn fetch_page<E, C>(
    select: Select<E>,
    conn: &C,
    params: &PaginationParams,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let paginator = select.paginate(conn, params.limit().max(1));
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(params.page.saturating_sub(1)).await?;
    Ok((rows, total))
}

#[derive(Debug, FromQueryResult)]
struct BucketRow {
    bucket: NaiveDate,
    value: i64,
}

/// Run a bucketed aggregate.
///
/// `sql` must select `bucket` (a date) and `value` (a bigint), taking the
/// `date_trunc` field as `$1` and the lower timestamp bound as `$2`.
pub async fn bucket_counts<C: ConnectionTrait>(
    conn: &C,
    sql: &str,
    unit: BucketUnit,
    since: NaiveDate,
) -> AppResult<Vec<BucketCount>> {
    let since = since.and_time(NaiveTime::MIN).and_utc();
    let rows = BucketRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [unit.as_sql().into(), since.into()],
    ))
    .all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| BucketCount {
            bucket: row.bucket,
            value: row.value,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, Expr, PostgresQueryBuilder, Query};

    fn where_clause(term: &str) -> String {
        Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("listings"))
            .and_where(Expr::col(Alias::new("city")).like(contains_pattern(term)))
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("porto"), "porto");
    }

    #[test]
    fn test_contains_pattern_declares_escape() {
        let sql = where_clause("50%_off");
        assert!(sql.contains("ESCAPE"), "{}", sql);
    }

    #[test]
    fn test_contains_pattern_lowercases() {
        let sql = where_clause("Lisbon");
        assert!(sql.contains("'%lisbon%'"), "{}", sql);
    }
}
