pub mod aggregation;
pub mod database;
pub mod expenses;
pub mod metrics;
pub mod normalize;
pub mod politicians;
pub mod store;

pub use aggregation::{AggregateQuery, AggregationService};
pub use database::Database;
pub use expenses::{ExpenseService, PoliticianExpensesQuery};
pub use metrics::{get_metrics, init_metrics, record_error, record_http_request};
pub use politicians::{PoliticianDirectory, PoliticianListQuery};
pub use store::ExpenseStore;
