//! Centralised error hierarchy for the static (pre-evaluation) phases of the
//! interpreter.
//!
//! The scanner, parser, and resolver all convert their failure modes into one
//! of the variants defined here.  This enables a uniform `Result<T>` alias
//! throughout the front end and ergonomic inter-operation with `anyhow`,
//! while still preserving the source line for diagnostics.
//!
//! Runtime failures are a separate category (see `interpreter::RuntimeError`)
//! and are never folded into this type: a syntax diagnostic suppresses
//! evaluation, a runtime error aborts it.
//!
//! The module **does not** print diagnostics itself.

use thiserror::Error;

use log::info;

/// Canonical diagnostic type for the scan/parse/resolve phases.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Static-analysis or resolution failure (e.g. early-binding errors).
    #[error("[line {line}] Error: {message}")]
    Resolve { message: String, line: usize },
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        LoxError::Parse { message, line }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", line, message);

        LoxError::Resolve { message, line }
    }
}

/// Crate-wide `Result` alias for the front-end phases.
pub type Result<T> = std::result::Result<T, LoxError>;
