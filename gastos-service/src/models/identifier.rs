use service_core::error::AppError;
use std::str::FromStr;

/// Which identifier column a politician lookup matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierKind {
    #[default]
    Cpf,
    PoliticianId,
}

impl FromStr for IdentifierKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpf" => Ok(Self::Cpf),
            "idecadastro" | "id" => Ok(Self::PoliticianId),
            _ => Err(AppError::InvalidParameter("invalid id_type".to_string())),
        }
    }
}

/// A politician identifier, normalized for case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    kind: IdentifierKind,
    value: String,
}

impl Identifier {
    pub fn new(kind: IdentifierKind, raw: &str) -> Result<Self, AppError> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Err(AppError::ClientInput(
                "politician identifier must not be empty".to_string(),
            ));
        }
        Ok(Self { kind, value })
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// Trimmed, lowercased value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_trimmed_and_lowercased() {
        let id = Identifier::new(IdentifierKind::Cpf, "  AB12 ").unwrap();
        assert_eq!(id.value(), "ab12");
        assert_eq!(
            id,
            Identifier::new(IdentifierKind::Cpf, "ab12").unwrap()
        );
    }

    #[test]
    fn blank_identifier_is_rejected() {
        assert!(matches!(
            Identifier::new(IdentifierKind::PoliticianId, "   "),
            Err(AppError::ClientInput(_))
        ));
    }

    #[test]
    fn kind_parses_known_names() {
        assert_eq!("cpf".parse::<IdentifierKind>().unwrap(), IdentifierKind::Cpf);
        assert_eq!(
            "IDECADASTRO".parse::<IdentifierKind>().unwrap(),
            IdentifierKind::PoliticianId
        );
        assert!(matches!(
            "email".parse::<IdentifierKind>(),
            Err(AppError::InvalidParameter(_))
        ));
    }
}
