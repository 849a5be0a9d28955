//! Structured error types shared across Twiss crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`TwissError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (sampler names, paths, counts).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the Twiss engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum TwissError {
    /// Malformed or empty particle input.
    #[error("input error: {0}")]
    Input(ErrorInfo),
    /// Unknown particle species or missing rest mass.
    #[error("species error: {0}")]
    Species(ErrorInfo),
    /// Sampler lookup and accumulator consistency errors.
    #[error("sampler error: {0}")]
    Sampler(ErrorInfo),
    /// Invalid analysis configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Randomness and seeding errors.
    #[error("rng error: {0}")]
    Rng(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl TwissError {
    /// Malformed or empty particle input.
    pub fn input(code: impl Into<String>, message: impl Into<String>) -> Self {
        TwissError::Input(ErrorInfo::new(code, message))
    }

    /// Unknown species or missing rest mass.
    pub fn species(code: impl Into<String>, message: impl Into<String>) -> Self {
        TwissError::Species(ErrorInfo::new(code, message))
    }

    /// Sampler lookup or accumulator mismatch.
    pub fn sampler(code: impl Into<String>, message: impl Into<String>) -> Self {
        TwissError::Sampler(ErrorInfo::new(code, message))
    }

    /// Invalid configuration.
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        TwissError::Config(ErrorInfo::new(code, message))
    }

    /// Randomness or seeding failure.
    pub fn rng(code: impl Into<String>, message: impl Into<String>) -> Self {
        TwissError::Rng(ErrorInfo::new(code, message))
    }

    /// Serialization or export failure.
    pub fn serde(code: impl Into<String>, message: impl Into<String>) -> Self {
        TwissError::Serde(ErrorInfo::new(code, message))
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            TwissError::Input(info)
            | TwissError::Species(info)
            | TwissError::Sampler(info)
            | TwissError::Config(info)
            | TwissError::Rng(info)
            | TwissError::Serde(info) => info,
        }
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            TwissError::Input(info)
            | TwissError::Species(info)
            | TwissError::Sampler(info)
            | TwissError::Config(info)
            | TwissError::Rng(info)
            | TwissError::Serde(info) => info,
        }
    }

    /// Adds a context entry, keeping the family.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info_mut().context.insert(key.into(), value.into());
        self
    }

    /// Sets the remediation hint, keeping the family.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.info_mut().hint = Some(hint.into());
        self
    }
}
