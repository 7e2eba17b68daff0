use thiserror::Error;

use crate::inventory::LookupError;
use crate::rules::RulesError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("restock worklist was already confirmed for this run")]
    RestockAlreadyConfirmed,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in CLI payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_invariant",
            Self::Integration(_) => "inventory_lookup",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The run could not be completed. Check report inputs and try again.",
            Self::Integration(_) => {
                "Inventory data is temporarily unavailable. Please retry shortly."
            }
            Self::Configuration(_) => "Scoring rules are invalid. No suggestions were produced.",
        }
    }
}

impl From<RulesError> for ApplicationError {
    fn from(value: RulesError) -> Self {
        Self::Configuration(value.to_string())
    }
}

impl From<LookupError> for ApplicationError {
    fn from(value: LookupError) -> Self {
        Self::Integration(value.to_string())
    }
}
