use service_core::error::AppError;
use std::str::FromStr;

/// Dimension an aggregation groups by.
///
/// Wire names follow the Portuguese API (`politico`, `partido`, `uf`,
/// `categoria`); the English names are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Politician,
    Party,
    State,
    Category,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Politician => "politico",
            GroupBy::Party => "partido",
            GroupBy::State => "uf",
            GroupBy::Category => "categoria",
        }
    }
}

impl FromStr for GroupBy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "politico" | "politician" => Ok(GroupBy::Politician),
            "partido" | "party" => Ok(GroupBy::Party),
            "uf" | "state" => Ok(GroupBy::State),
            "categoria" | "category" => Ok(GroupBy::Category),
            _ => Err(AppError::InvalidParameter("invalid group_by".to_string())),
        }
    }
}
