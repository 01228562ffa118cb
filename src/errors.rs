//! Harness error handling.
//!
//! Configuration mistakes fail fast with their own variants. Verification
//! diagnostics never surface one at a time: they are collected and raised as a
//! single [`HarnessError::VerificationFailure`].

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Error type returned by a mapper's `setup`, `map`, or `cleanup`.
pub type MapperError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The lifecycle phase in which a mapper failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperPhase {
    Setup,
    Map,
    Cleanup,
}

impl MapperPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapperPhase::Setup => "setup",
            MapperPhase::Map => "map",
            MapperPhase::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for MapperPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure mode surfaced by a [`crate::MapDriver`].
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("{message}")]
    #[diagnostic(
        code(mapunit::input::invalid_argument),
        help("use `clear_input()` to fall back to the default input record")
    )]
    InvalidArgument { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(mapunit::driver::invalid_state),
        help("supply a mapper with `for_mapper`, `set_mapper`, or `with_mapper`")
    )]
    InvalidState { message: String },

    #[error("{message}")]
    #[diagnostic(code(mapunit::verify::failed))]
    VerificationFailure {
        message: String,
        /// One rendered line per diagnostic, in report order.
        details: Vec<String>,
    },

    #[error("mapper failed during {phase}: {source}")]
    #[diagnostic(code(mapunit::mapper::failed))]
    Mapper {
        phase: MapperPhase,
        #[source]
        source: MapperError,
    },
}

impl HarnessError {
    pub fn null_input() -> Self {
        HarnessError::InvalidArgument {
            message: "null input record in set_input()".to_string(),
        }
    }

    pub fn no_mapper() -> Self {
        HarnessError::InvalidState {
            message: "No mapper was provided".to_string(),
        }
    }

    pub fn mapper(phase: MapperPhase, source: MapperError) -> Self {
        HarnessError::Mapper { phase, source }
    }

    /// Number of diagnostics carried by a verification failure, zero otherwise.
    pub fn diagnostic_count(&self) -> usize {
        match self {
            HarnessError::VerificationFailure { details, .. } => details.len(),
            _ => 0,
        }
    }

    pub fn is_verification_failure(&self) -> bool {
        matches!(self, HarnessError::VerificationFailure { .. })
    }
}
