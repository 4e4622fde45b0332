//! Configured vote types.
use crate::errors::AssociationError;
use associations_shared::types::{VoteKind, VoteKindChoice};
use std::collections::BTreeSet;

const MAX_CODE_LEN: usize = 50;

/// Ordered catalog of vote types. Votes of any other type are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteKindCatalog {
    choices: Vec<VoteKindChoice>,
}

impl VoteKindCatalog {
    /// Builds a catalog, keeping the given order.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for empty, overlong or duplicated codes.
    pub fn new(choices: Vec<VoteKindChoice>) -> Result<Self, AssociationError> {
        let mut seen = BTreeSet::new();
        for choice in choices.iter() {
            let code = choice.code.as_str();
            if code.is_empty() || code.len() > MAX_CODE_LEN {
                return Err(AssociationError::validation(format!(
                    "vote kind code must be 1 to {MAX_CODE_LEN} characters: {code:?}"
                )));
            }
            if !seen.insert(code.to_string()) {
                return Err(AssociationError::validation(format!(
                    "vote kind {code} is declared twice"
                )));
            }
        }
        Ok(Self { choices })
    }

    /// Parses `code:Name,code:Name`. A missing name defaults to the code.
    pub fn parse(raw: &str) -> Result<Self, AssociationError> {
        let choices = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (code, name) = entry.split_once(':').unwrap_or((entry, entry));
                VoteKindChoice {
                    code: VoteKind::new(code.trim()),
                    name: name.trim().to_string(),
                }
            })
            .collect();
        Self::new(choices)
    }

    /// Lists the choices, optionally only the one with the given code.
    pub fn list(&self, code_filter: Option<&str>) -> Vec<VoteKindChoice> {
        self.choices
            .iter()
            .filter(|choice| code_filter.is_none_or(|code| choice.code.as_str() == code))
            .cloned()
            .collect()
    }

    pub fn contains(&self, kind: &VoteKind) -> bool {
        self.choices.iter().any(|choice| &choice.code == kind)
    }

    /// Display name of a vote type.
    pub fn label(&self, kind: &VoteKind) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| &choice.code == kind)
            .map(|choice| choice.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}
