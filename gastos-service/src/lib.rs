//! Read-only query API over the `gastos_parlamentares` expense table.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod query;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState};
