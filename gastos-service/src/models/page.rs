use serde::Serialize;

/// A normalized expense row, ready for serialization.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Envelope for `GET /api/v1/gastos/politico/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ExpensePage {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub results: Vec<Record>,
}

/// One aggregation bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateBucket {
    pub key: String,
    pub total: f64,
}

/// Envelope for `GET /api/v1/gastos/aggregate`.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatePage {
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<AggregateBucket>,
}

/// Politician directory entry, projected from the expense table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoliticianEntry {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub idecadastro: Option<String>,
    pub partido: Option<String>,
    pub uf: Option<String>,
}

/// Envelope for `GET /api/v1/politicos/`.
#[derive(Debug, Clone, Serialize)]
pub struct PoliticianPage {
    pub page: u32,
    pub per_page: u32,
    pub results: Vec<PoliticianEntry>,
}
