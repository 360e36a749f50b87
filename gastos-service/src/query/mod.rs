//! Parameterized SQL assembly for the expense table.
//!
//! Statement text is built only from `&'static str` fragments and the
//! closed [`Column`] set. Request values never reach the SQL text: they are
//! bound through `sqlx::QueryBuilder` and also kept as named [`BoundParam`]s.

mod filter;

pub use filter::{escape_like, ExpenseFilter, WhereClause};

use sqlx::{Postgres, QueryBuilder};
use std::fmt;

use crate::models::Pagination;

pub const EXPENSES_TABLE: &str = "gastos_parlamentares";

/// Columns of `gastos_parlamentares` the service reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Year,
    Month,
    PoliticianId,
    Cpf,
    PoliticianName,
    Party,
    State,
    Description,
    Supplier,
    SupplierDocument,
    DocumentId,
    DocumentType,
    IssueDate,
    DocumentValue,
    NetValue,
    ChargebackValue,
    ReimbursementNumber,
    LotNumber,
    Installment,
    DocumentUrl,
}

impl Column {
    pub const fn name(self) -> &'static str {
        match self {
            Column::Year => "ano",
            Column::Month => "mes",
            Column::PoliticianId => "idecadastro",
            Column::Cpf => "cpf",
            Column::PoliticianName => "txnomeparlamentar",
            Column::Party => "sgpartido",
            Column::State => "sguf",
            Column::Description => "txtdescricao",
            Column::Supplier => "txtfornecedor",
            Column::SupplierDocument => "txtcnpjcpf",
            Column::DocumentId => "idedocumento",
            Column::DocumentType => "indtipodocumento",
            Column::IssueDate => "datemissao",
            Column::DocumentValue => "vlrdocumento",
            Column::NetValue => "vlrliquido",
            Column::ChargebackValue => "vlrglosa",
            Column::ReimbursementNumber => "numressarcimento",
            Column::LotNumber => "numlote",
            Column::Installment => "numparcela",
            Column::DocumentUrl => "urldocumento",
        }
    }

    /// Expression used when the column is projected. Monetary columns are
    /// cast so every row decodes as NUMERIC whatever the storage type.
    pub const fn select_expr(self) -> &'static str {
        match self {
            Column::DocumentValue => "CAST(vlrdocumento AS NUMERIC)",
            Column::NetValue => "CAST(vlrliquido AS NUMERIC)",
            Column::ChargebackValue => "CAST(vlrglosa AS NUMERIC)",
            other => other.name(),
        }
    }

    /// Lowercased text form, for case-insensitive comparisons on columns
    /// that may be stored as numbers.
    pub const fn lower_text_expr(self) -> &'static str {
        match self {
            Column::PoliticianId => "LOWER(CAST(idecadastro AS TEXT))",
            Column::Cpf => "LOWER(CAST(cpf AS TEXT))",
            Column::PoliticianName => "LOWER(txnomeparlamentar)",
            Column::Description => "LOWER(txtdescricao)",
            other => other.name(),
        }
    }
}

/// A typed bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Int(i64),
    Text(String),
}

/// A bind value plus the name it is logged under.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    pub name: &'static str,
    pub value: QueryParam,
}

/// Projected column with its output alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub column: Column,
    pub alias: &'static str,
}

impl Projection {
    pub const fn new(column: Column, alias: &'static str) -> Self {
        Self { column, alias }
    }
}

/// Statement under construction.
///
/// Wraps a `QueryBuilder` and keeps each bound value under the name it is
/// logged with, so callers can inspect what a statement will send.
pub struct SqlQuery {
    builder: QueryBuilder<'static, Postgres>,
    params: Vec<BoundParam>,
}

impl SqlQuery {
    pub fn new(head: &'static str) -> Self {
        Self {
            builder: QueryBuilder::new(head),
            params: Vec::new(),
        }
    }

    /// `SELECT [DISTINCT] <expr> AS <alias>, ... FROM gastos_parlamentares`
    pub fn select(columns: &[Projection], distinct: bool) -> Self {
        let mut query = Self::new(if distinct { "SELECT DISTINCT " } else { "SELECT " });
        {
            let mut projected = query.builder.separated(", ");
            for projection in columns {
                projected.push(projection.column.select_expr());
                if projection.alias != projection.column.name() {
                    projected
                        .push_unseparated(" AS ")
                        .push_unseparated(projection.alias);
                }
            }
        }
        query.push(" FROM ").push(EXPENSES_TABLE);
        query
    }

    /// `SELECT COUNT(*) FROM gastos_parlamentares`
    pub fn count() -> Self {
        let mut query = Self::new("SELECT COUNT(*) FROM ");
        query.push(EXPENSES_TABLE);
        query
    }

    pub fn push(&mut self, fragment: &'static str) -> &mut Self {
        self.builder.push(fragment);
        self
    }

    pub fn push_column(&mut self, column: Column) -> &mut Self {
        self.push(column.name())
    }

    /// Bind a value and record it under `name`.
    pub fn push_bind(&mut self, name: &'static str, value: QueryParam) -> &mut Self {
        match &value {
            QueryParam::Int(v) => self.builder.push_bind(*v),
            QueryParam::Text(v) => self.builder.push_bind(v.clone()),
        };
        self.params.push(BoundParam { name, value });
        self
    }

    /// Append ` WHERE p1 AND p2 ...`; nothing when the clause is empty.
    pub fn push_where(&mut self, clause: &WhereClause) -> &mut Self {
        clause.render_into(&mut self.builder, &mut self.params);
        self
    }

    /// Append ` LIMIT <limit> OFFSET <offset>`.
    pub fn push_page(&mut self, page: &Pagination) -> &mut Self {
        self.push(" LIMIT ")
            .push_bind("limit", QueryParam::Int(page.limit()))
            .push(" OFFSET ")
            .push_bind("offset", QueryParam::Int(page.offset()))
    }

    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub fn params(&self) -> &[BoundParam] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&QueryParam> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// The underlying builder, for `build()` at execution time.
    pub fn builder_mut(&mut self) -> &mut QueryBuilder<'static, Postgres> {
        &mut self.builder
    }
}

impl fmt::Debug for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlQuery")
            .field("sql", &self.sql())
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_aliases_only_renamed_columns() {
        let query = SqlQuery::select(
            &[
                Projection::new(Column::PoliticianName, "nome"),
                Projection::new(Column::Cpf, "cpf"),
                Projection::new(Column::DocumentValue, "valor"),
            ],
            false,
        );
        assert_eq!(
            query.sql(),
            "SELECT txnomeparlamentar AS nome, cpf, CAST(vlrdocumento AS NUMERIC) AS valor FROM gastos_parlamentares"
        );
        assert!(query.params().is_empty());
    }

    #[test]
    fn distinct_select() {
        let query = SqlQuery::select(&[Projection::new(Column::State, "uf")], true);
        assert_eq!(query.sql(), "SELECT DISTINCT sguf AS uf FROM gastos_parlamentares");
    }

    #[test]
    fn placeholders_are_numbered_in_bind_order() {
        let mut query = SqlQuery::count();
        query
            .push(" WHERE ano >= ")
            .push_bind("ano_from", QueryParam::Int(2020))
            .push(" AND ano <= ")
            .push_bind("ano_to", QueryParam::Int(2021));
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM gastos_parlamentares WHERE ano >= $1 AND ano <= $2"
        );
        assert_eq!(query.param("ano_to"), Some(&QueryParam::Int(2021)));
    }

    #[test]
    fn page_binds_limit_and_offset() {
        let mut query = SqlQuery::count();
        query.push_page(&Pagination::new(3, 25).unwrap());
        assert!(query.sql().ends_with(" LIMIT $1 OFFSET $2"));
        assert_eq!(query.param("limit"), Some(&QueryParam::Int(25)));
        assert_eq!(query.param("offset"), Some(&QueryParam::Int(50)));
    }
}
