//! Read-only aggregation queries for the admin reports.

use sqlx::PgPool;

use super::RepositoryError;

/// Completed job-history count per employee.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct EmployeeProductivity {
    pub employee_name: String,
    pub completed_jobs: i64,
}

/// An item's total approved requested quantity next to its remaining
/// stock.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TopItem {
    pub item_name: String,
    pub remaining_quantity: i32,
    pub total_requested: i64,
}

/// Completed-job count per time bucket.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: i64,
}

/// A `date_trunc` bucket size for the completed-jobs trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPeriod {
    Day,
    Month,
    Year,
}

impl TrendPeriod {
    /// Parse the query-string value. Anything but the three known
    /// periods is rejected before it gets near the SQL.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    const fn trunc_unit(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    const fn label_format(self) -> &'static str {
        match self {
            Self::Day => "YYYY-MM-DD",
            Self::Month => "YYYY-MM",
            Self::Year => "YYYY",
        }
    }
}

/// Completed job-history entries per employee over the last 30 days,
/// most productive first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn employee_productivity(
    pool: &PgPool,
) -> Result<Vec<EmployeeProductivity>, RepositoryError> {
    let rows = sqlx::query_as::<_, EmployeeProductivity>(
        r"
        SELECT u.name AS employee_name, COUNT(h.id) AS completed_jobs
        FROM job_history h
        INNER JOIN users u ON u.id = h.employee_id
        WHERE h.completed_at >= NOW() - INTERVAL '30 days'
        GROUP BY u.name
        ORDER BY COUNT(h.id) DESC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The five most-requested items among approved requests, with the
/// stock each has left.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn top_items(pool: &PgPool) -> Result<Vec<TopItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, TopItem>(
        r"
        SELECT i.name AS item_name, i.quantity AS remaining_quantity,
               SUM(r.quantity) AS total_requested
        FROM inventory_requests r
        INNER JOIN inventory_items i ON i.id = r.item_id
        WHERE r.status = 'approved'
        GROUP BY i.name, i.quantity
        ORDER BY SUM(r.quantity) DESC
        LIMIT 5
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Completed-job counts bucketed by day, month or year.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn completed_jobs_trend(
    pool: &PgPool,
    period: TrendPeriod,
) -> Result<Vec<TrendPoint>, RepositoryError> {
    let rows = sqlx::query_as::<_, TrendPoint>(
        r"
        SELECT TO_CHAR(DATE_TRUNC($1, completed_at), $2) AS date,
               COUNT(id) AS count
        FROM job_history
        GROUP BY DATE_TRUNC($1, completed_at)
        ORDER BY DATE_TRUNC($1, completed_at)
        ",
    )
    .bind(period.trunc_unit())
    .bind(period.label_format())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_period_parses_known_values() {
        assert_eq!(TrendPeriod::parse("day"), Some(TrendPeriod::Day));
        assert_eq!(TrendPeriod::parse("month"), Some(TrendPeriod::Month));
        assert_eq!(TrendPeriod::parse("year"), Some(TrendPeriod::Year));
    }

    #[test]
    fn trend_period_rejects_everything_else() {
        assert_eq!(TrendPeriod::parse("week"), None);
        assert_eq!(TrendPeriod::parse(""), None);
        assert_eq!(TrendPeriod::parse("day; DROP TABLE jobs"), None);
    }
}
