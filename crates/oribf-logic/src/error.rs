//! Fatal generation errors.
//!
//! Any of these aborts the run: a seed that cannot be built consistently is
//! never handed to the host. An atom that is merely unsatisfied is not an
//! error; it is an ordinary `false`.

use thiserror::Error;

use crate::options::ConfigError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Goal/threshold combination or world shape is structurally invalid.
    #[error("invalid configuration: {}", join(.0))]
    Configuration(Vec<ConfigError>),

    /// The rule table cannot be parsed or violates its own invariants.
    #[error("invalid rule table: {0}")]
    InvalidRuleTable(String),

    #[error("region {region} referenced by {referenced_by} is never declared")]
    UnresolvedRegion {
        region: String,
        referenced_by: String,
    },

    #[error("unknown requirement {atom} at {access_point}")]
    UnknownAtom { atom: String, access_point: String },

    #[error("no location named {0}")]
    UnknownLocation(String),

    #[error("location {0} already holds a locked item")]
    LockedLocation(String),

    #[error("{requested} relics requested but only {available} areas can host one")]
    InsufficientAreas { requested: u32, available: u32 },
}

impl GenerationError {
    pub fn config(err: ConfigError) -> Self {
        Self::Configuration(vec![err])
    }

    pub fn rule_table(msg: impl Into<String>) -> Self {
        Self::InvalidRuleTable(msg.into())
    }
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
