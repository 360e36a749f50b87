//! Politician directory, derived from distinct expense rows.

use service_core::error::AppError;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::{Pagination, PoliticianEntry, PoliticianPage, Row};
use crate::query::{Column, Projection, SqlQuery, WhereClause};
use crate::services::store::ExpenseStore;

pub const DIRECTORY_PROJECTION: [Projection; 5] = [
    Projection::new(Column::PoliticianName, "nome"),
    Projection::new(Column::Cpf, "cpf"),
    Projection::new(Column::PoliticianId, "idecadastro"),
    Projection::new(Column::Party, "partido"),
    Projection::new(Column::State, "uf"),
];

/// Parsed request for `GET /api/v1/politicos/`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoliticianListQuery {
    pub name: Option<String>,
    pub pagination: Pagination,
}

pub fn directory_query(request: &PoliticianListQuery) -> SqlQuery {
    let mut clause = WhereClause::new();
    if let Some(name) = request.name.as_deref().map(str::trim) {
        if !name.is_empty() {
            clause.starts_with(Column::PoliticianName, "nome_pattern", name);
        }
    }

    let mut query = SqlQuery::select(&DIRECTORY_PROJECTION, true);
    query
        .push_where(&clause)
        .push(" ORDER BY nome, idecadastro, cpf, partido, uf")
        .push_page(&request.pagination);
    query
}

fn entry_from_row(row: &Row) -> PoliticianEntry {
    let text = |name: &str| row.get(name).and_then(|v| v.to_text());
    PoliticianEntry {
        nome: text("nome"),
        cpf: text("cpf"),
        idecadastro: text("idecadastro"),
        partido: text("partido"),
        uf: text("uf"),
    }
}

#[derive(Clone)]
pub struct PoliticianDirectory {
    store: Arc<dyn ExpenseStore>,
}

impl PoliticianDirectory {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, request: PoliticianListQuery) -> Result<PoliticianPage, AppError> {
        let query = directory_query(&request);
        let rows = self.store.fetch_rows("list_politicians", query).await?;
        let results: Vec<_> = rows.iter().map(entry_from_row).collect();

        info!(returned = results.len(), "Politicians listed");

        Ok(PoliticianPage {
            page: request.pagination.page,
            per_page: request.pagination.page_size,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParam;

    fn request(name: Option<&str>) -> PoliticianListQuery {
        PoliticianListQuery {
            name: name.map(str::to_string),
            pagination: Pagination::new(1, 50).unwrap(),
        }
    }

    #[test]
    fn no_name_lists_everyone_alphabetically() {
        let query = directory_query(&request(None));
        assert_eq!(
            query.sql(),
            "SELECT DISTINCT txnomeparlamentar AS nome, cpf, idecadastro, sgpartido AS partido, \
             sguf AS uf FROM gastos_parlamentares ORDER BY nome, idecadastro, cpf, partido, uf \
             LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn blank_name_adds_no_predicate() {
        let query = directory_query(&request(Some("   ")));
        assert!(!query.sql().contains("WHERE"));
    }

    #[test]
    fn name_is_a_lowercase_prefix() {
        let query = directory_query(&request(Some(" Tiri ")));
        assert!(query
            .sql()
            .contains("FROM gastos_parlamentares WHERE LOWER(txnomeparlamentar) LIKE $1 ORDER BY"));
        assert_eq!(
            query.param("nome_pattern"),
            Some(&QueryParam::Text("tiri%".into()))
        );
    }

    #[test]
    fn numeric_identifiers_render_as_text() {
        let row = Row::default()
            .with("nome", "TIRIRICA")
            .with("cpf", crate::models::SqlValue::Null)
            .with("idecadastro", 160976i64)
            .with("partido", "PL")
            .with("uf", "SP");
        let entry = entry_from_row(&row);
        assert_eq!(entry.idecadastro.as_deref(), Some("160976"));
        assert_eq!(entry.cpf, None);
    }
}
