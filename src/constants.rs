//! Global constants used throughout the ktmpl codebase.
//!
//! Defaults for the document delimiter, the helpers partial and the template
//! engine live here so that the processor, the CLI and the tests agree on them.

/// Default regular expression separating documents in a rendered payload:
/// a line made of exactly three dashes.
pub const KUBERNETES_YAMLS_DELIMITER: &str = "(?m)^-{3}$";

/// Canonical literal form of [`KUBERNETES_YAMLS_DELIMITER`], used when joining
/// documents back into one payload.
pub const KUBERNETES_YAMLS_DELIMITER_STRING: &str = "---\n";

/// File name of the partial that is prefixed to every sibling asset.
pub const HELPERS_FILE_NAME: &str = "_helpers.tpl";

/// Text substituted for a missing key under the `invalid` and `default` policies.
pub const NO_VALUE_PLACEHOLDER: &str = "<no value>";

/// Upper bound on placeholder injections while rendering one template.
///
/// Variables a template visibly reads are substituted before the first
/// pass; each pass then resolves one key the scan could not see (a
/// subscript, for instance), so this caps only those.
pub const MAX_MISSING_KEY_PASSES: usize = 256;

/// Name reported in errors for payloads rendered without an asset name.
pub const ANONYMOUS_TEMPLATE_NAME: &str = "<bytes>";
