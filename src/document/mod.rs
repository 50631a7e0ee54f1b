//! Splitting and joining multi-document payloads.
//!
//! A rendered asset may contain several manifests separated by a delimiter
//! line (`---` by default). The [`Delimiter`] pairs the regular expression
//! used to split payloads with the canonical literal used to join documents,
//! and guarantees at construction that the two agree.

use regex::Regex;

use crate::constants::{KUBERNETES_YAMLS_DELIMITER, KUBERNETES_YAMLS_DELIMITER_STRING};
use crate::core::{KtmplError, Result};

/// A validated document delimiter.
#[derive(Debug, Clone)]
pub struct Delimiter {
    regex: Regex,
    literal: String,
}

impl Delimiter {
    /// Compile `pattern` and check it against `literal`.
    ///
    /// The pattern must match `literal` exactly once, and the match must be
    /// the literal without its trailing newline.
    ///
    /// # Errors
    ///
    /// - [`KtmplError::InvalidDelimiter`] if the pattern does not compile
    /// - [`KtmplError::DelimiterMismatch`] if pattern and literal disagree
    pub fn new(pattern: &str, literal: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| KtmplError::InvalidDelimiter {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let expected = literal.strip_suffix('\n').unwrap_or(literal);
        let matches: Vec<&str> = regex.find_iter(literal).map(|m| m.as_str()).collect();
        if matches.len() != 1 || matches[0] != expected {
            return Err(KtmplError::DelimiterMismatch {
                pattern: pattern.to_string(),
                literal: literal.to_string(),
            });
        }

        Ok(Self {
            regex,
            literal: literal.to_string(),
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    #[must_use]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Split a payload into its non-blank documents. See [`split_documents`].
    #[must_use]
    pub fn split(&self, payload: &str) -> Vec<String> {
        split_documents(payload, &self.regex)
    }

    /// Join documents with the canonical literal. See [`join_documents`].
    pub fn join<S: AsRef<str>>(&self, documents: &[S]) -> String {
        join_documents(documents, &self.literal)
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self {
            regex: Regex::new(KUBERNETES_YAMLS_DELIMITER).expect("default delimiter compiles"),
            literal: KUBERNETES_YAMLS_DELIMITER_STRING.to_string(),
        }
    }
}

/// Split `payload` on every match of `delimiter`.
///
/// For each fragment:
/// 1. fragments that follow a match lose one leading `\n`, the end of the
///    delimiter line
/// 2. one trailing `\n` is removed
/// 3. the fragment is dropped when nothing but whitespace remains
///
/// Retained fragments keep their inner and other surrounding whitespace. The
/// result preserves input order; a payload without any delimiter yields one
/// fragment, or none when it is blank.
pub fn split_documents(payload: &str, delimiter: &Regex) -> Vec<String> {
    delimiter
        .split(payload)
        .enumerate()
        .filter_map(|(i, fragment)| {
            let fragment = if i > 0 {
                fragment.strip_prefix('\n').unwrap_or(fragment)
            } else {
                fragment
            };
            let fragment = fragment.strip_suffix('\n').unwrap_or(fragment);
            if fragment.trim().is_empty() {
                None
            } else {
                Some(fragment.to_string())
            }
        })
        .collect()
}

/// Join documents into one payload separated by `literal`.
///
/// A newline is appended to any non-final document that lacks one, so the
/// literal always starts on its own line.
pub fn join_documents<S: AsRef<str>>(documents: &[S], literal: &str) -> String {
    let mut out = String::new();
    for (i, doc) in documents.iter().enumerate() {
        let doc = doc.as_ref();
        if i > 0 {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(literal);
        }
        out.push_str(doc);
    }
    out
}
