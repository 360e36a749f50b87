//! Domain models for gastos-service.

mod group_by;
mod identifier;
mod page;
mod pagination;
mod row;

pub use group_by::GroupBy;
pub use identifier::{Identifier, IdentifierKind};
pub use page::{AggregateBucket, AggregatePage, ExpensePage, PoliticianEntry, PoliticianPage, Record};
pub use pagination::Pagination;
pub use row::{Row, SqlValue};
