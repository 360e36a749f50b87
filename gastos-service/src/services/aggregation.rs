//! Expense totals grouped by a fixed set of keys.

use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::{AggregateBucket, AggregatePage, GroupBy, Pagination, Row};
use crate::query::{Column, ExpenseFilter, SqlQuery, WhereClause, EXPENSES_TABLE};
use crate::services::normalize::to_f64;
use crate::services::store::ExpenseStore;

/// Parsed request for `GET /api/v1/gastos/aggregate`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateQuery {
    pub group_by: GroupBy,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub pagination: Pagination,
}

/// Static grouping-key mapping; request text never selects a column.
pub fn group_column(group_by: GroupBy) -> Column {
    match group_by {
        GroupBy::Politician => Column::PoliticianName,
        GroupBy::Party => Column::Party,
        GroupBy::State => Column::State,
        GroupBy::Category => Column::Description,
    }
}

pub fn aggregate_query(request: &AggregateQuery) -> SqlQuery {
    let column = group_column(request.group_by);

    let mut clause = WhereClause::new();
    clause.not_null(column);
    ExpenseFilter::years(request.year_from, request.year_to).apply(&mut clause);

    let mut query = SqlQuery::new("SELECT ");
    query
        .push_column(column)
        .push(" AS key, COALESCE(SUM(")
        .push(Column::DocumentValue.select_expr())
        .push("), 0) AS total FROM ")
        .push(EXPENSES_TABLE)
        .push_where(&clause)
        .push(" GROUP BY ")
        .push_column(column)
        .push(" ORDER BY total DESC, key")
        .push_page(&request.pagination);
    query
}

fn bucket_from_row(row: &Row) -> Result<AggregateBucket, AppError> {
    let key = row
        .get("key")
        .and_then(|v| v.to_text())
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Aggregate row without key")))?;
    let total = row
        .get("total")
        .and_then(to_f64)
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Aggregate row without total")))?;
    Ok(AggregateBucket { key, total })
}

#[derive(Clone)]
pub struct AggregationService {
    store: Arc<dyn ExpenseStore>,
}

impl AggregationService {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self { store }
    }

    /// Totals per key, highest first.
    #[instrument(skip(self), fields(group_by = request.group_by.as_str()))]
    pub async fn aggregate(&self, request: AggregateQuery) -> Result<AggregatePage, AppError> {
        let query = aggregate_query(&request);
        let rows = self.store.fetch_rows("aggregate_expenses", query).await?;

        let results = rows
            .iter()
            .map(bucket_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        info!(returned = results.len(), "Expenses aggregated");

        Ok(AggregatePage {
            page: request.pagination.page,
            page_size: request.pagination.page_size,
            results,
        })
    }
}
