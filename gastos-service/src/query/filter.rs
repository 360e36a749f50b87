use sqlx::{Postgres, QueryBuilder};

use super::{BoundParam, Column, QueryParam};
use crate::models::{Identifier, IdentifierKind};

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// `LOWER(col) = <value>`, value already lowercased.
    EqualsIgnoreCase {
        column: Column,
        param: &'static str,
        value: String,
    },
    AtLeast {
        column: Column,
        param: &'static str,
        value: i64,
    },
    AtMost {
        column: Column,
        param: &'static str,
        value: i64,
    },
    /// `LOWER(col) LIKE <pattern>` with an already-built pattern.
    LikeIgnoreCase {
        column: Column,
        param: &'static str,
        pattern: String,
    },
    NotNull(Column),
}

/// Conjunction of independent predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals_ignore_case(&mut self, column: Column, param: &'static str, value: &str) -> &mut Self {
        self.predicates.push(Predicate::EqualsIgnoreCase {
            column,
            param,
            value: value.to_lowercase(),
        });
        self
    }

    /// Inclusive lower bound.
    pub fn at_least(&mut self, column: Column, param: &'static str, value: i64) -> &mut Self {
        self.predicates.push(Predicate::AtLeast {
            column,
            param,
            value,
        });
        self
    }

    /// Inclusive upper bound.
    pub fn at_most(&mut self, column: Column, param: &'static str, value: i64) -> &mut Self {
        self.predicates.push(Predicate::AtMost {
            column,
            param,
            value,
        });
        self
    }

    /// Case-insensitive substring match; `term` is matched literally.
    pub fn contains(&mut self, column: Column, param: &'static str, term: &str) -> &mut Self {
        self.predicates.push(Predicate::LikeIgnoreCase {
            column,
            param,
            pattern: format!("%{}%", escape_like(&term.to_lowercase())),
        });
        self
    }

    /// Case-insensitive prefix match; `term` is matched literally.
    pub fn starts_with(&mut self, column: Column, param: &'static str, term: &str) -> &mut Self {
        self.predicates.push(Predicate::LikeIgnoreCase {
            column,
            param,
            pattern: format!("{}%", escape_like(&term.to_lowercase())),
        });
        self
    }

    pub fn not_null(&mut self, column: Column) -> &mut Self {
        self.predicates.push(Predicate::NotNull(column));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Append ` WHERE p1 AND p2 ...` to `builder`, recording each bound
    /// value in `params`.
    pub(super) fn render_into(
        &self,
        builder: &mut QueryBuilder<'static, Postgres>,
        params: &mut Vec<BoundParam>,
    ) {
        if self.is_empty() {
            return;
        }
        builder.push(" WHERE ");
        let mut conditions = builder.separated(" AND ");
        for predicate in &self.predicates {
            let (name, value) = match predicate {
                Predicate::EqualsIgnoreCase {
                    column,
                    param,
                    value,
                } => {
                    conditions
                        .push(column.lower_text_expr())
                        .push_unseparated(" = ")
                        .push_bind_unseparated(value.clone());
                    (*param, QueryParam::Text(value.clone()))
                }
                Predicate::AtLeast {
                    column,
                    param,
                    value,
                } => {
                    conditions
                        .push(column.name())
                        .push_unseparated(" >= ")
                        .push_bind_unseparated(*value);
                    (*param, QueryParam::Int(*value))
                }
                Predicate::AtMost {
                    column,
                    param,
                    value,
                } => {
                    conditions
                        .push(column.name())
                        .push_unseparated(" <= ")
                        .push_bind_unseparated(*value);
                    (*param, QueryParam::Int(*value))
                }
                Predicate::LikeIgnoreCase {
                    column,
                    param,
                    pattern,
                } => {
                    conditions
                        .push(column.lower_text_expr())
                        .push_unseparated(" LIKE ")
                        .push_bind_unseparated(pattern.clone());
                    (*param, QueryParam::Text(pattern.clone()))
                }
                Predicate::NotNull(column) => {
                    conditions.push(column.name()).push_unseparated(" IS NOT NULL");
                    continue;
                }
            };
            params.push(BoundParam { name, value });
        }
    }
}

/// Escape LIKE metacharacters so user text matches literally under the
/// default `\` escape character.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Optional expense filters shared by the listing and the aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub identifier: Option<Identifier>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub category: Option<String>,
}

impl ExpenseFilter {
    pub fn for_politician(identifier: Identifier) -> Self {
        Self {
            identifier: Some(identifier),
            ..Self::default()
        }
    }

    pub fn years(year_from: Option<i32>, year_to: Option<i32>) -> Self {
        Self {
            year_from,
            year_to,
            ..Self::default()
        }
    }

    /// Absent filters add no predicate.
    pub fn where_clause(&self) -> WhereClause {
        let mut clause = WhereClause::new();
        self.apply(&mut clause);
        clause
    }

    /// Append this filter's predicates to an existing clause.
    pub fn apply(&self, clause: &mut WhereClause) {
        if let Some(identifier) = &self.identifier {
            let (column, param) = match identifier.kind() {
                IdentifierKind::Cpf => (Column::Cpf, "cpf"),
                IdentifierKind::PoliticianId => (Column::PoliticianId, "idecadastro"),
            };
            clause.equals_ignore_case(column, param, identifier.value());
        }
        if let Some(year_from) = self.year_from {
            clause.at_least(Column::Year, "ano_from", i64::from(year_from));
        }
        if let Some(year_to) = self.year_to {
            clause.at_most(Column::Year, "ano_to", i64::from(year_to));
        }
        if let Some(category) = self.category.as_deref().map(str::trim) {
            if !category.is_empty() {
                clause.contains(Column::Description, "categoria", category);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqlQuery;

    fn render(clause: &WhereClause) -> SqlQuery {
        let mut query = SqlQuery::count();
        query.push_where(clause);
        query
    }

    #[test]
    fn empty_filter_renders_no_where() {
        let query = render(&ExpenseFilter::default().where_clause());
        assert_eq!(query.sql(), "SELECT COUNT(*) FROM gastos_parlamentares");
        assert!(query.params().is_empty());
    }

    #[test]
    fn identifier_only() {
        let filter = ExpenseFilter::for_politician(
            Identifier::new(IdentifierKind::Cpf, "AB12").unwrap(),
        );
        let query = render(&filter.where_clause());
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM gastos_parlamentares WHERE LOWER(CAST(cpf AS TEXT)) = $1"
        );
        assert_eq!(query.param("cpf"), Some(&QueryParam::Text("ab12".into())));
    }

    #[test]
    fn politician_id_uses_its_own_column() {
        let filter = ExpenseFilter::for_politician(
            Identifier::new(IdentifierKind::PoliticianId, "12345").unwrap(),
        );
        let query = render(&filter.where_clause());
        assert!(query
            .sql()
            .ends_with("WHERE LOWER(CAST(idecadastro AS TEXT)) = $1"));
    }

    #[test]
    fn all_filters_are_anded_in_order() {
        let filter = ExpenseFilter {
            identifier: Some(Identifier::new(IdentifierKind::Cpf, "123").unwrap()),
            year_from: Some(2020),
            year_to: Some(2021),
            category: Some("Saude".into()),
        };
        let query = render(&filter.where_clause());
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM gastos_parlamentares WHERE LOWER(CAST(cpf AS TEXT)) = $1 \
             AND ano >= $2 AND ano <= $3 AND LOWER(txtdescricao) LIKE $4"
        );
        let names: Vec<&str> = query.params().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["cpf", "ano_from", "ano_to", "categoria"]);
        assert_eq!(
            query.param("categoria"),
            Some(&QueryParam::Text("%saude%".into()))
        );
    }

    #[test]
    fn only_upper_year_bound() {
        let query = render(&ExpenseFilter::years(None, Some(2019)).where_clause());
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM gastos_parlamentares WHERE ano <= $1"
        );
        assert_eq!(query.param("ano_to"), Some(&QueryParam::Int(2019)));
    }

    #[test]
    fn blank_category_is_ignored() {
        let filter = ExpenseFilter {
            category: Some("   ".into()),
            ..ExpenseFilter::default()
        };
        assert!(filter.where_clause().is_empty());
    }

    #[test]
    fn user_input_never_reaches_sql_text() {
        let filter = ExpenseFilter {
            identifier: Some(
                Identifier::new(IdentifierKind::Cpf, "1' OR '1'='1").unwrap(),
            ),
            category: Some("x'; DROP TABLE gastos_parlamentares; --".into()),
            ..ExpenseFilter::default()
        };
        let query = render(&filter.where_clause());
        assert!(!query.sql().contains("DROP"));
        assert!(!query.sql().contains('\''));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");

        let mut clause = WhereClause::new();
        clause.starts_with(Column::PoliticianName, "nome_pattern", "Jo_");
        let query = render(&clause);
        assert_eq!(
            query.param("nome_pattern"),
            Some(&QueryParam::Text("jo\\_%".into()))
        );
    }

    #[test]
    fn not_null_predicate_renders_without_params() {
        let mut clause = WhereClause::new();
        clause.not_null(Column::State);
        ExpenseFilter::years(Some(2020), None).apply(&mut clause);
        let query = render(&clause);
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM gastos_parlamentares WHERE sguf IS NOT NULL AND ano >= $1"
        );
        assert_eq!(query.params().len(), 1);
    }
}
