//! Template rendering engine with Tera.
//!
//! [`TemplateRenderer`] renders one asset at a time against a JSON value
//! tree. Every render uses a fresh Tera instance with the function table of
//! the [`RenderContext`] installed, so nothing leaks between assets.
//!
//! # Missing keys
//!
//! The template is parsed once. Under the lenient policies every variable
//! the template visibly reads is given the policy's placeholder up front
//! (see [`variables`](super::variables)). Anything the scan cannot see, such
//! as a subscript, is handled after the fact: the renderer catches the
//! `Variable ... not found` failure, injects the placeholder at that path and
//! renders again, until the template renders or a key cannot be substituted.
//!
//! Under `error`, bare condition identifiers (`{% if enabled %}`) are
//! rewritten so that an undefined one fails when its branch is evaluated,
//! instead of reading as false.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use strsim::levenshtein;
use tera::{Context as TeraContext, Tera};
use tracing::{debug, trace};

use super::context::RenderContext;
use super::variables::{
    DEFINED_CONDITION_TEST, defined_condition, require_defined_conditions, value_references,
};
use crate::constants::MAX_MISSING_KEY_PASSES;
use crate::core::{KtmplError, Result};

/// Suggestions must be within this share of the missing name's length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Nesting limit when listing the available variables for suggestions.
const SUGGESTION_DEPTH: usize = 4;

/// Name of the single template each render registers; Tera's own one-off
/// name, so error messages read the same as `render_str` ones.
const TEMPLATE_NAME: &str = "__tera_one_off";

static MISSING_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Variable `([^`]+)` not found").expect("missing variable pattern compiles")
});

/// Renders manifest templates with a fixed [`RenderContext`].
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    context: RenderContext,
}

impl TemplateRenderer {
    pub fn new(context: RenderContext) -> Self {
        Self {
            context,
        }
    }

    #[must_use]
    pub const fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Render `content` and apply the blank check.
    ///
    /// Returns `None` when the output is empty once one trailing newline and
    /// then all surrounding whitespace are removed. Otherwise the untrimmed
    /// output is returned.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::RenderFailed`] for syntax errors, failing
    /// filters, values that are not a mapping, and missing keys the policy
    /// does not tolerate.
    pub fn render(&self, template: &str, content: &str, values: &Value) -> Result<Option<String>> {
        let rendered = self.render_text(template, content, values)?;
        let trimmed = rendered.strip_suffix('\n').unwrap_or(&rendered);
        if trimmed.trim().is_empty() {
            debug!("Template {} rendered to nothing", template);
            return Ok(None);
        }
        Ok(Some(rendered))
    }

    /// Render `content` without the blank check.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    pub fn render_text(&self, template: &str, content: &str, values: &Value) -> Result<String> {
        let mut data = match values {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) => values.clone(),
            _ => {
                return Err(KtmplError::RenderFailed {
                    template: template.to_string(),
                    message: "template values must be a mapping".to_string(),
                });
            }
        };

        let policy = self.context.missing_key();
        let mut tera = Tera::default();
        self.context.functions().install(&mut tera);
        trace!("Rendering {}:\n{}", template, content);
        tera.add_raw_template(TEMPLATE_NAME, content).map_err(|e| KtmplError::RenderFailed {
            template: template.to_string(),
            message: format_tera_error(&e),
        })?;

        if policy.placeholder().is_none() {
            tera.register_tester(DEFINED_CONDITION_TEST, defined_condition);
        }
        if let Some(parsed) = tera.templates.get_mut(TEMPLATE_NAME) {
            match policy.placeholder() {
                Some(placeholder) => {
                    let injected = value_references(&parsed.ast)
                        .iter()
                        .filter(|path| inject_placeholder(&mut data, path, placeholder))
                        .count();
                    if injected > 0 {
                        debug!(
                            "Substituted {:?} for {} missing key(s) in {}",
                            placeholder, injected, template
                        );
                    }
                }
                None => require_defined_conditions(&mut parsed.ast),
            }
        }

        let mut substituted = HashSet::new();
        for _ in 0..MAX_MISSING_KEY_PASSES {
            let tera_context =
                TeraContext::from_value(data.clone()).map_err(|e| KtmplError::RenderFailed {
                    template: template.to_string(),
                    message: format_tera_error(&e),
                })?;

            let error = match tera.render(TEMPLATE_NAME, &tera_context) {
                Ok(rendered) => return Ok(rendered),
                Err(e) => e,
            };

            let Some(variable) = missing_variable(&error) else {
                return Err(KtmplError::RenderFailed {
                    template: template.to_string(),
                    message: format_tera_error(&error),
                });
            };
            let Some(placeholder) = policy.placeholder() else {
                return Err(missing_key_error(template, &variable, &data));
            };
            if !substituted.insert(variable.clone())
                || !inject_placeholder(&mut data, &variable, placeholder)
            {
                return Err(KtmplError::RenderFailed {
                    template: template.to_string(),
                    message: format!(
                        "missing key `{variable}` cannot be substituted under missingkey={policy}"
                    ),
                });
            }
            debug!("Substituted {:?} for missing key `{}` in {}", placeholder, variable, template);
        }

        Err(KtmplError::RenderFailed {
            template: template.to_string(),
            message: format!(
                "gave up after substituting {MAX_MISSING_KEY_PASSES} missing keys under missingkey={policy}"
            ),
        })
    }
}

/// Name of the undefined variable behind a Tera failure, if that is the cause.
fn missing_variable(error: &tera::Error) -> Option<String> {
    use std::error::Error;

    let mut current: Option<&dyn Error> = Some(error);
    while let Some(err) = current {
        if let Some(caps) = MISSING_VARIABLE.captures(&err.to_string()) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
        current = err.source();
    }
    None
}

/// Set `placeholder` at the dotted `path`, creating intermediate mappings.
///
/// Fails when a segment is not a plain identifier, when the walk runs into a
/// non-mapping value, or when the key already exists.
fn inject_placeholder(data: &mut Value, path: &str, placeholder: &str) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    let is_ident = |s: &&str| {
        let mut chars = s.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    if !segments.iter().all(is_ident) {
        return false;
    }

    let Some((last, parents)) = segments.split_last() else {
        return false;
    };
    let mut current = data;
    for segment in parents {
        let Value::Object(map) = current else {
            return false;
        };
        current = map.entry((*segment).to_string()).or_insert_with(|| Value::Object(Map::new()));
    }
    match current {
        Value::Object(map) if !map.contains_key(*last) => {
            map.insert((*last).to_string(), Value::String(placeholder.to_string()));
            true
        }
        _ => false,
    }
}

fn missing_key_error(template: &str, variable: &str, data: &Value) -> KtmplError {
    let mut available = Vec::new();
    collect_paths(data, "", 0, &mut available);
    let suggestions = find_similar_variables(variable, &available);

    let mut message = format!("map has no entry for key `{variable}`");
    if !suggestions.is_empty() {
        message.push_str(&format!(" (did you mean {}?)", suggestions.join(", ")));
    }
    KtmplError::RenderFailed {
        template: template.to_string(),
        message,
    }
}

fn collect_paths(value: &Value, prefix: &str, depth: usize, out: &mut Vec<String>) {
    let Value::Object(map) = value else {
        return;
    };
    if depth >= SUGGESTION_DEPTH {
        return;
    }
    for (key, child) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        collect_paths(child, &path, depth + 1, out);
        out.push(path);
    }
}

/// Closest names by Levenshtein distance, at most three.
fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> =
        available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();
    scored.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));
    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(var, _)| format!("`{var}`"))
        .collect()
}

/// Flatten a Tera error chain into one readable message.
///
/// Tera names one-off templates `__tera_one_off`; those mentions are dropped
/// because the caller reports the asset name itself.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut all_messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        all_messages.push(err.to_string());
        current = err.source();
    }

    let messages: Vec<String> = all_messages
        .into_iter()
        .map(|msg| {
            msg.replace("while rendering '__tera_one_off'", "")
                .replace("Failed to render '__tera_one_off'", "")
                .replace("Failed to parse '__tera_one_off'", "")
                .replace("'__tera_one_off'", "template")
                .trim()
                .to_string()
        })
        .filter(|msg| !msg.is_empty())
        .collect();

    if messages.is_empty() {
        "template syntax error".to_string()
    } else {
        messages.join(": ")
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
