use serde::Serialize;
use service_core::error::AppError;

/// Stateless page window, derived from the request on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE: u32 = 1;

    /// Both values are 1-based and must be at least 1.
    pub fn new(page: u32, page_size: u32) -> Result<Self, AppError> {
        if page == 0 {
            return Err(AppError::ClientInput("page must be >= 1".to_string()));
        }
        if page_size == 0 {
            return Err(AppError::ClientInput("page_size must be >= 1".to_string()));
        }
        Ok(Self { page, page_size })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1).saturating_mul(i64::from(self.page_size))
    }
}
