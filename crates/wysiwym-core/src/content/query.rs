//! Aggregate query values: typed values joined by a boolean combinator.

use super::value::ValueKind;
use crate::types::WysiwymError;
use serde::{Deserialize, Serialize};

/// How the members of a query value combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    #[default]
    And,
    Or,
    Not,
    Optional,
}

impl Combinator {
    /// Conjunction used between members.
    #[must_use]
    pub fn conjunction(&self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or | Combinator::Optional => "or",
            Combinator::Not => "nor",
        }
    }
}

/// One member of a query value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedValue {
    pub kind: ValueKind,
    pub text: String,
}

impl TypedValue {
    #[must_use]
    pub fn new(kind: ValueKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Ordered typed values under one combinator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryValue {
    #[serde(default)]
    values: Vec<TypedValue>,
    #[serde(default)]
    combinator: Combinator,
}

impl QueryValue {
    #[must_use]
    pub fn new(combinator: Combinator) -> Self {
        Self {
            values: Vec::new(),
            combinator,
        }
    }

    #[must_use]
    pub fn with(mut self, value: TypedValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn push(&mut self, value: TypedValue) {
        self.values.push(value);
    }

    /// Remove the member at `index`.
    pub fn remove(&mut self, index: usize) -> Result<TypedValue, WysiwymError> {
        if index >= self.values.len() {
            return Err(WysiwymError::InvalidValue(format!(
                "query member {index} of {}",
                self.values.len()
            )));
        }
        Ok(self.values.remove(index))
    }

    #[must_use]
    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    #[must_use]
    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn set_combinator(&mut self, combinator: Combinator) {
        self.combinator = combinator;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Member texts in order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.values.iter().map(|v| v.text.clone()).collect()
    }

    /// Members joined with the combinator's conjunction.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        let labels = self.labels();
        let (last, init) = labels.split_last()?;
        let word = self.combinator.conjunction();
        let body = if init.is_empty() {
            last.clone()
        } else {
            format!("{} {word} {last}", init.join(", "))
        };
        Some(match self.combinator {
            Combinator::Not if init.is_empty() => format!("not {body}"),
            Combinator::Not => format!("neither {body}"),
            Combinator::Optional => format!("possibly {body}"),
            Combinator::And | Combinator::Or => body,
        })
    }
}
