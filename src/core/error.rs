//! Error handling for ktmpl
//!
//! This module provides the error type shared by every stage of the rendering
//! pipeline and the user-friendly reporting used by the CLI. The error system is
//! designed around two principles:
//! 1. **Strongly-typed errors** so callers can react to a precise failure mode
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! Every [`KtmplError`] variant belongs to exactly one [`ErrorCategory`]:
//! - **Configuration**: [`KtmplError::InvalidDelimiter`], [`KtmplError::DelimiterMismatch`],
//!   [`KtmplError::ConfigError`]
//! - **Asset not found**: [`KtmplError::AssetNotFound`], [`KtmplError::AssetReadFailed`]
//! - **No assets matched**: [`KtmplError::NoAssetsMatched`]
//! - **Render**: [`KtmplError::RenderFailed`], [`KtmplError::InvalidEncoding`]
//! - **Decode**: [`KtmplError::DecodeFailed`]
//!
//! A document without a `kind` is deliberately absent from this list: the
//! structuring layer keeps such documents instead of failing.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ktmpl_cli::core::{KtmplError, user_friendly_error};
//!
//! let error = KtmplError::AssetNotFound {
//!     name: "manifests/deployment.yaml".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Result alias used by the library API.
pub type Result<T> = std::result::Result<T, KtmplError>;

/// The main error type for ktmpl operations.
///
/// Processing is fail-fast: the first error raised while reading, rendering or
/// decoding any asset aborts the whole batch and is returned to the caller.
/// Nothing in this crate retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KtmplError {
    /// The delimiter regular expression does not compile.
    #[error("Invalid document delimiter regex '{pattern}': {reason}")]
    InvalidDelimiter {
        /// The offending pattern
        pattern: String,
        /// Compiler message from the regex crate
        reason: String,
    },

    /// The delimiter regex does not match its canonical literal exactly once.
    ///
    /// The regex and the literal describe the same separator: one is used to
    /// split rendered payloads, the other to join documents back together. If
    /// they disagree, split and join stop being inverse operations.
    #[error("Regexp delimiter {pattern} is not perfectly matching delimiter string {literal:?}")]
    DelimiterMismatch {
        /// The delimiter regex
        pattern: String,
        /// The canonical literal form
        literal: String,
    },

    /// Configuration file or option problems.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The asset reader has no asset with this name.
    #[error("Asset '{name}' not found")]
    AssetNotFound {
        /// Requested asset name
        name: String,
    },

    /// The asset exists but could not be read.
    #[error("Failed to read asset '{name}': {reason}")]
    AssetReadFailed {
        /// Requested asset name
        name: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// No asset name survived the path, exclusion and recursion filters.
    #[error(
        "No asset found in path \"{path}\" with excluded {excluded:?} and recursive {recursive}"
    )]
    NoAssetsMatched {
        /// The queried directory
        path: String,
        /// Names that were excluded
        excluded: Vec<String>,
        /// Whether subdirectories were searched
        recursive: bool,
    },

    /// Template parsing or execution failed.
    ///
    /// This includes a missing key when the missing-key policy is `error`.
    #[error("Failed to render template '{template}': {message}")]
    RenderFailed {
        /// Asset name, or `<bytes>` for anonymous payloads
        template: String,
        /// Cleaned-up message from the template engine
        message: String,
    },

    /// Asset content is not valid UTF-8 and cannot be handed to the template engine.
    #[error("Asset '{name}' is not valid UTF-8")]
    InvalidEncoding {
        /// Asset name
        name: String,
    },

    /// A document could not be converted to JSON or decoded into an object.
    #[error("Failed to decode document: {reason}")]
    DecodeFailed {
        /// Why decoding failed
        reason: String,
    },
}

/// Coarse classification of [`KtmplError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    AssetNotFound,
    NoAssetsMatched,
    Render,
    Decode,
}

impl KtmplError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidDelimiter {
                ..
            }
            | Self::DelimiterMismatch {
                ..
            }
            | Self::ConfigError {
                ..
            } => ErrorCategory::Configuration,
            Self::AssetNotFound {
                ..
            }
            | Self::AssetReadFailed {
                ..
            } => ErrorCategory::AssetNotFound,
            Self::NoAssetsMatched {
                ..
            } => ErrorCategory::NoAssetsMatched,
            Self::RenderFailed {
                ..
            }
            | Self::InvalidEncoding {
                ..
            } => ErrorCategory::Render,
            Self::DecodeFailed {
                ..
            } => ErrorCategory::Decode,
        }
    }

    /// Shorthand for building a [`KtmplError::DecodeFailed`].
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for KtmplError {
    fn from(error: serde_json::Error) -> Self {
        Self::decode(error.to_string())
    }
}

impl From<serde_yaml::Error> for KtmplError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::decode(error.to_string())
    }
}

/// Error wrapper carrying user-facing details and a suggestion.
///
/// Used by the CLI to turn any failure into a short colored report on stderr.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: KtmplError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: KtmplError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Known [`KtmplError`]s anywhere in the `anyhow` chain get tailored details
/// and suggestions. Anything else is wrapped as a configuration error carrying
/// the full chain as its message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ktmpl_error) = error.chain().find_map(|e| e.downcast_ref::<KtmplError>()) {
        let ctx = create_error_context(ktmpl_error.clone());
        let outer = error.to_string();
        if outer != ktmpl_error.to_string() && ctx.details.is_none() {
            return ctx.with_details(outer);
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(KtmplError::ConfigError {
            message: io_error.to_string(),
        })
        .with_suggestion("Check that the file or directory exists and the path is correct");
    }

    let message = error.chain().map(ToString::to_string).collect::<Vec<_>>().join(": ");
    ErrorContext::new(KtmplError::ConfigError {
        message,
    })
}

fn create_error_context(error: KtmplError) -> ErrorContext {
    match &error {
        KtmplError::InvalidDelimiter {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Fix the delimiter pattern; the default is (?m)^-{3}$"),
        KtmplError::DelimiterMismatch {
            ..
        } => ErrorContext::new(error)
            .with_details(
                "The delimiter regex must match the delimiter string exactly once, \
                 excluding its trailing newline",
            )
            .with_suggestion("Use matching values, e.g. (?m)^-{3}$ with \"---\\n\""),
        KtmplError::ConfigError {
            ..
        } => ErrorContext::new(error),
        KtmplError::AssetNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'ktmpl list' to see which assets are available"),
        KtmplError::AssetReadFailed {
            ..
        } => ErrorContext::new(error).with_suggestion("Check the file permissions"),
        KtmplError::NoAssetsMatched {
            ..
        } => ErrorContext::new(error)
            .with_details("Asset paths are matched against their parent directory")
            .with_suggestion("Pass --recursive to include subdirectories, or check --exclude"),
        KtmplError::RenderFailed {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Check the template syntax and that every referenced value is provided",
        ),
        KtmplError::InvalidEncoding {
            ..
        } => ErrorContext::new(error).with_suggestion("Templates must be UTF-8 text files"),
        KtmplError::DecodeFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that every rendered document is a YAML mapping"),
    }
}
