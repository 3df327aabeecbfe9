use serde::{Deserialize, Serialize};

use super::{FormMode, Values};

/// Declarative rule evaluated against the current mode and values.
///
/// Conditions stand in for `visible_when` / `required_when` predicates so a
/// schema stays plain data and can be loaded from a document:
///
/// ```json
/// { "equals": { "field": "leadRemark", "value": "Lost" } }
/// { "all": [ { "filled": "pipeline" }, { "not": { "in_mode": "quick" } } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    Never,
    Filled(String),
    Empty(String),
    Equals {
        field: String,
        value: String,
    },
    NotEquals {
        field: String,
        value: String,
    },
    OneOf {
        field: String,
        values: Vec<String>,
    },
    InMode(FormMode),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn never() -> Self {
        Condition::Never
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn filled(field: impl Into<String>) -> Self {
        Condition::Filled(field.into())
    }

    pub fn evaluate(&self, mode: FormMode, values: &Values) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Filled(field) => values.get(field).is_some_and(|value| !value.is_blank()),
            Condition::Empty(field) => values.get(field).is_none_or(|value| value.is_blank()),
            Condition::Equals { field, value } => values
                .get(field)
                .is_some_and(|current| current.matches_literal(value)),
            Condition::NotEquals { field, value } => !values
                .get(field)
                .is_some_and(|current| current.matches_literal(value)),
            Condition::OneOf {
                field,
                values: accepted,
            } => values
                .get(field)
                .is_some_and(|current| accepted.iter().any(|item| current.matches_literal(item))),
            Condition::InMode(expected) => mode == *expected,
            Condition::All(conditions) => conditions.iter().all(|c| c.evaluate(mode, values)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(mode, values)),
            Condition::Not(inner) => !inner.evaluate(mode, values),
        }
    }

    /// Field keys this rule reads.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut acc = Vec::new();
        self.collect_fields(&mut acc);
        acc
    }

    fn collect_fields<'a>(&'a self, acc: &mut Vec<&'a str>) {
        match self {
            Condition::Always | Condition::Never | Condition::InMode(_) => {}
            Condition::Filled(field) | Condition::Empty(field) => acc.push(field),
            Condition::Equals { field, .. }
            | Condition::NotEquals { field, .. }
            | Condition::OneOf { field, .. } => acc.push(field),
            Condition::All(conditions) | Condition::Any(conditions) => {
                for condition in conditions {
                    condition.collect_fields(acc);
                }
            }
            Condition::Not(inner) => inner.collect_fields(acc),
        }
    }
}
