//! Core types for ktmpl
//!
//! This module holds the error taxonomy shared by every pipeline stage:
//! - [`KtmplError`] - Enumerated failures of reading, rendering and decoding
//! - [`ErrorCategory`] - Coarse grouping used by callers that only care about the class
//! - [`ErrorContext`] - User-friendly wrapper with details and suggestions for the CLI
//! - [`user_friendly_error`] - Convert any `anyhow::Error` into an [`ErrorContext`]
//!
//! # Examples
//!
//! ```rust
//! use ktmpl_cli::core::{ErrorCategory, KtmplError};
//!
//! let error = KtmplError::decode("expected a mapping");
//! assert_eq!(error.category(), ErrorCategory::Decode);
//! ```

pub mod error;

pub use error::{ErrorCategory, ErrorContext, KtmplError, Result, user_friendly_error};
