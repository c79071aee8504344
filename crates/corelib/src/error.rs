//! Error taxonomy shared by every Caustic crate.

use std::error::Error as StdError;

use thiserror::Error;

/// What exactly was wrong with a configuration value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigurationKind {
    /// The value is syntactically fine but not one we recognize.
    InvalidValue,
}

#[derive(Debug, Error)]
pub enum CausticError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error ({kind:?}): {message}")]
    Configuration {
        kind: ConfigurationKind,
        message: String,
    },

    /// A loader rejected its input. `line` is `None` when the failure
    /// happened after the line-by-line pass.
    #[error("Malformed input{}", .line.as_ref().map(|l| format!(" for line \"{l}\"")).unwrap_or_default())]
    MalformedInput {
        line: Option<String>,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("Illegal state: {0}")]
    IllegalState(String),
}

impl CausticError {
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::Configuration {
            kind: ConfigurationKind::InvalidValue,
            message: message.into(),
        }
    }

    pub fn malformed(
        line: Option<&str>,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self::MalformedInput {
            line: line.map(str::to_owned),
            source: source.into(),
        }
    }

    /// Offending line of a [`CausticError::MalformedInput`], if any.
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::MalformedInput { line, .. } => line.as_deref(),
            _ => None,
        }
    }
}

pub type CausticResult<T> = Result<T, CausticError>;
