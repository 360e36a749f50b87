//! Query-string parsing into typed request structs.
//!
//! Every field arrives as raw text so that malformed values surface as
//! JSON `ClientInput` errors instead of extractor rejections.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use serde::Deserialize;
use service_core::error::AppError;

use crate::config::ApiConfig;
use crate::models::{GroupBy, Identifier, IdentifierKind, Pagination};
use crate::services::{AggregateQuery, PoliticianExpensesQuery, PoliticianListQuery};

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseParams {
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub categoria: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub id_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AggregateParams {
    pub group_by: Option<String>,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PoliticianParams {
    pub nome: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Path counterpart of [`extract`]; undecodable segments are client input.
pub fn extract_path<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| AppError::ClientInput(rejection.body_text()))
}

/// Unwrap the extractor result, reporting rejections as client input errors.
pub fn extract<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::ClientInput(rejection.body_text()))
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an optional integer that must be at least 1.
fn positive(name: &str, raw: Option<&str>) -> Result<Option<u32>, AppError> {
    let Some(raw) = present(raw) else {
        return Ok(None);
    };
    let value: i64 = raw
        .parse()
        .map_err(|_| AppError::ClientInput(format!("{} must be an integer", name)))?;
    if value < 1 {
        return Err(AppError::ClientInput(format!("{} must be >= 1", name)));
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| AppError::ClientInput(format!("{} is too large", name)))
}

pub fn year(name: &str, raw: Option<&str>) -> Result<Option<i32>, AppError> {
    present(raw)
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| AppError::ClientInput(format!("{} must be an integer", name)))
        })
        .transpose()
}

/// Build the page window; `size_name` is the wire name of the size field.
pub fn pagination(
    page: Option<&str>,
    size: Option<&str>,
    size_name: &str,
    api: &ApiConfig,
) -> Result<Pagination, AppError> {
    let page = positive("page", page)?.unwrap_or(Pagination::DEFAULT_PAGE);
    let size = positive(size_name, size)?.unwrap_or(api.default_page_size);
    if size > api.max_page_size {
        return Err(AppError::ClientInput(format!(
            "{} must be <= {}",
            size_name, api.max_page_size
        )));
    }
    Pagination::new(page, size)
}

impl ExpenseParams {
    pub fn into_query(self, id: &str, api: &ApiConfig) -> Result<PoliticianExpensesQuery, AppError> {
        let kind = match present(self.id_type.as_deref()) {
            Some(raw) => raw.parse::<IdentifierKind>()?,
            None => IdentifierKind::default(),
        };
        Ok(PoliticianExpensesQuery {
            identifier: Identifier::new(kind, id)?,
            year_from: year("year_from", self.year_from.as_deref())?,
            year_to: year("year_to", self.year_to.as_deref())?,
            category: present(self.categoria.as_deref()).map(str::to_string),
            pagination: pagination(
                self.page.as_deref(),
                self.page_size.as_deref(),
                "page_size",
                api,
            )?,
        })
    }
}

impl AggregateParams {
    /// `group_by` is checked before anything else.
    pub fn into_query(self, api: &ApiConfig) -> Result<AggregateQuery, AppError> {
        let group_by = match self.group_by.as_deref() {
            Some(raw) => raw.parse::<GroupBy>()?,
            None => GroupBy::default(),
        };
        Ok(AggregateQuery {
            group_by,
            year_from: year("year_from", self.year_from.as_deref())?,
            year_to: year("year_to", self.year_to.as_deref())?,
            pagination: pagination(
                self.page.as_deref(),
                self.page_size.as_deref(),
                "page_size",
                api,
            )?,
        })
    }
}

impl PoliticianParams {
    pub fn into_query(self, api: &ApiConfig) -> Result<PoliticianListQuery, AppError> {
        Ok(PoliticianListQuery {
            name: present(self.nome.as_deref()).map(str::to_string),
            pagination: pagination(
                self.page.as_deref(),
                self.per_page.as_deref(),
                "per_page",
                api,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ApiConfig {
        ApiConfig::default()
    }

    #[test]
    fn pagination_defaults() {
        let page = pagination(None, None, "page_size", &api()).unwrap();
        assert_eq!(page, Pagination::new(1, 50).unwrap());

        let page = pagination(Some(""), Some(" "), "page_size", &api()).unwrap();
        assert_eq!(page.page, 1);
    }

    #[test]
    fn pagination_rejects_garbage_and_zero() {
        for (page, size) in [(Some("abc"), None), (Some("0"), None), (None, Some("-5"))] {
            assert!(matches!(
                pagination(page, size, "page_size", &api()),
                Err(AppError::ClientInput(_))
            ));
        }
    }

    #[test]
    fn page_size_above_max_is_rejected() {
        let err = pagination(None, Some("1001"), "page_size", &api()).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: page_size must be <= 1000");
        assert!(pagination(None, Some("1000"), "page_size", &api()).is_ok());
    }

    #[test]
    fn years_must_be_integers() {
        assert_eq!(year("year_from", Some("2020")).unwrap(), Some(2020));
        assert_eq!(year("year_from", Some("")).unwrap(), None);
        assert!(year("year_from", Some("2020.5")).is_err());
    }

    #[test]
    fn invalid_group_by_wins_over_bad_page() {
        let params = AggregateParams {
            group_by: Some("invalid".into()),
            page: Some("abc".into()),
            ..Default::default()
        };
        let err = params.into_query(&api()).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter(ref msg) if msg == "invalid group_by"));
    }

    #[test]
    fn expense_params_default_to_cpf() {
        let query = ExpenseParams::default()
            .into_query(" ABC123 ", &api())
            .unwrap();
        assert_eq!(query.identifier.kind(), IdentifierKind::Cpf);
        assert_eq!(query.identifier.value(), "abc123");
        assert_eq!(query.pagination.page_size, 50);
    }

    #[test]
    fn unknown_id_type_is_invalid_parameter() {
        let params = ExpenseParams {
            id_type: Some("passport".into()),
            ..Default::default()
        };
        assert!(matches!(
            params.into_query("123", &api()),
            Err(AppError::InvalidParameter(_))
        ));
    }

    #[test]
    fn directory_uses_per_page() {
        let query = PoliticianParams {
            per_page: Some("10".into()),
            ..Default::default()
        }
        .into_query(&api())
        .unwrap();
        assert_eq!(query.pagination.page_size, 10);

        let err = PoliticianParams {
            per_page: Some("x".into()),
            ..Default::default()
        }
        .into_query(&api())
        .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: per_page must be an integer");
    }
}
