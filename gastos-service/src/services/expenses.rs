//! Expense listing by politician.

use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::{ExpensePage, Identifier, Pagination};
use crate::query::{Column, ExpenseFilter, Projection, SqlQuery, WhereClause};
use crate::services::normalize::{normalize_row, shape_expense};
use crate::services::store::ExpenseStore;

/// Columns returned for each expense, with their output names.
pub const EXPENSE_PROJECTION: [Projection; 20] = [
    Projection::new(Column::Year, "ano"),
    Projection::new(Column::Month, "mes"),
    Projection::new(Column::PoliticianId, "idecadastro"),
    Projection::new(Column::Cpf, "cpf"),
    Projection::new(Column::PoliticianName, "nome"),
    Projection::new(Column::Party, "partido"),
    Projection::new(Column::State, "uf"),
    Projection::new(Column::Description, "categoria"),
    Projection::new(Column::Supplier, "fornecedor"),
    Projection::new(Column::SupplierDocument, "cnpj_cpf"),
    Projection::new(Column::DocumentId, "documento_id"),
    Projection::new(Column::DocumentType, "tipo_documento"),
    Projection::new(Column::IssueDate, "data"),
    Projection::new(Column::DocumentValue, "valor"),
    Projection::new(Column::NetValue, "valor_liquido"),
    Projection::new(Column::ChargebackValue, "valor_glosa"),
    Projection::new(Column::ReimbursementNumber, "num_ressarcimento"),
    Projection::new(Column::LotNumber, "lote"),
    Projection::new(Column::Installment, "parcela"),
    Projection::new(Column::DocumentUrl, "url"),
];

/// Parsed request for `GET /api/v1/gastos/politico/{id}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoliticianExpensesQuery {
    pub identifier: Identifier,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub category: Option<String>,
    pub pagination: Pagination,
}

impl PoliticianExpensesQuery {
    pub fn filter(&self) -> ExpenseFilter {
        ExpenseFilter {
            identifier: Some(self.identifier.clone()),
            year_from: self.year_from,
            year_to: self.year_to,
            category: self.category.clone(),
        }
    }
}

/// Newest first; the document id keeps the order total so pages partition it.
pub fn list_query(clause: &WhereClause, pagination: &Pagination) -> SqlQuery {
    let mut query = SqlQuery::select(&EXPENSE_PROJECTION, false);
    query
        .push_where(clause)
        .push(" ORDER BY ")
        .push_column(Column::IssueDate)
        .push(" DESC NULLS LAST, ")
        .push_column(Column::DocumentId)
        .push(" DESC NULLS LAST")
        .push_page(pagination);
    query
}

pub fn count_query(clause: &WhereClause) -> SqlQuery {
    let mut query = SqlQuery::count();
    query.push_where(clause);
    query
}

#[derive(Clone)]
pub struct ExpenseService {
    store: Arc<dyn ExpenseStore>,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self { store }
    }

    /// One page of a politician's expenses plus the unpaginated total.
    ///
    /// The count and the page run as two statements with the same
    /// predicates; either failing fails the whole request.
    #[instrument(skip(self), fields(id_kind = ?request.identifier.kind()))]
    pub async fn list_by_politician(
        &self,
        request: PoliticianExpensesQuery,
    ) -> Result<ExpensePage, AppError> {
        let clause = request.filter().where_clause();
        let count = count_query(&clause);
        let page = list_query(&clause, &request.pagination);

        let (total, rows) = tokio::try_join!(
            self.store.fetch_count("count_politician_expenses", count),
            self.store.fetch_rows("list_politician_expenses", page),
        )?;

        let results: Vec<_> = rows
            .into_iter()
            .map(|row| shape_expense(normalize_row(row)))
            .collect();

        info!(total = total, returned = results.len(), "Politician expenses listed");

        Ok(ExpensePage {
            page: request.pagination.page,
            page_size: request.pagination.page_size,
            total,
            results,
        })
    }
}
