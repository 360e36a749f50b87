pub mod gastos;
pub mod health;
pub mod params;
pub mod politicos;

pub use gastos::{aggregate, list_by_politician};
pub use health::{health_check, metrics_handler, readiness_check};
pub use politicos::list_politicians;
