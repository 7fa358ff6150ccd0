//! Opt-in transaction capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A capability a transaction must load before using it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    /// `validate`, `validate_schema` and `validation_contract`.
    Validation,
    /// `perform_later` and `set` through a transaction job queue.
    PerformLater,
    /// Rescue of raised persistence errors.
    Rescues,
}

impl Extension {
    /// The configuration name of the extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::PerformLater => "perform_later",
            Self::Rescues => "rescues",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
