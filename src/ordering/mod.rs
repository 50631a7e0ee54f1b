//! Kind-based ordering of rendered resources.
//!
//! Resources are applied (or deleted) in an order derived only from their
//! `kind`, with `namespace` and `name` as deterministic tie-breaks. No
//! cross-object dependency analysis takes place.
//!
//! # Weights
//!
//! Every policy carries an ordered [`KindsOrder`]. A resource whose kind sits at
//! index `i` of the list gets weight `i`. Unlisted kinds get the policy's
//! default weight:
//!
//! | Mode            | Default weight | Effect                          |
//! |-----------------|----------------|---------------------------------|
//! | `create-update` | `len(list)`    | custom kinds are applied last   |
//! | `delete`        | `-1`           | custom kinds are deleted first  |
//!
//! # Example
//!
//! ```rust
//! use ktmpl_cli::ordering::{KindsOrder, OrderingPolicy, SortMode};
//!
//! let kinds = KindsOrder::default_create_update();
//! let policy = OrderingPolicy::new(SortMode::CreateUpdate, &kinds);
//! assert_eq!(policy.weight("Namespace"), 0);
//! assert_eq!(policy.weight("MyCustomKind"), kinds.len() as i64);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Built-in create/update order.
///
/// Cluster-scoped prerequisites and policy objects come first, then storage,
/// RBAC and the service accounts it grants to, services and finally
/// workloads and their front doors.
pub const DEFAULT_CREATE_UPDATE_KINDS_ORDER: &[&str] = &[
    "Namespace",
    "NetworkPolicy",
    "ResourceQuota",
    "LimitRange",
    "PodSecurityPolicy",
    "PodDisruptionBudget",
    "Secret",
    "SecretList",
    "ConfigMap",
    "StorageClass",
    "PersistentVolume",
    "PersistentVolumeClaim",
    "CustomResourceDefinition",
    "ClusterRole",
    "ClusterRoleList",
    "ClusterRoleBinding",
    "ClusterRoleBindingList",
    "Role",
    "RoleList",
    "RoleBinding",
    "RoleBindingList",
    "ServiceAccount",
    "Service",
    "DaemonSet",
    "Pod",
    "ReplicationController",
    "ReplicaSet",
    "Deployment",
    "HorizontalPodAutoscaler",
    "StatefulSet",
    "Job",
    "CronJob",
    "Ingress",
    "APIService",
];

/// Which rollout the order is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Create or update: prerequisites first, unknown kinds last.
    #[default]
    CreateUpdate,
    /// Teardown: unknown kinds first, prerequisites last.
    Delete,
}

impl SortMode {
    /// The textual name used in configuration files and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateUpdate => "create-update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create-update" => Ok(Self::CreateUpdate),
            "delete" => Ok(Self::Delete),
            other => Err(format!(
                "unknown sort mode '{other}', expected 'create-update' or 'delete'"
            )),
        }
    }
}

/// An ordered list of kind names defining relative precedence.
///
/// Lists are expected to be free of duplicates. If a kind appears twice the
/// first occurrence decides its weight.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindsOrder(Vec<String>);

impl KindsOrder {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(kinds.into_iter().map(Into::into).collect())
    }

    /// The built-in create/update order.
    #[must_use]
    pub fn default_create_update() -> Self {
        Self::new(DEFAULT_CREATE_UPDATE_KINDS_ORDER.iter().copied())
    }

    /// The built-in delete order: the exact reverse of the create/update order.
    #[must_use]
    pub fn default_delete() -> Self {
        Self::new(DEFAULT_CREATE_UPDATE_KINDS_ORDER.iter().rev().copied())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Kinds that appear more than once, in order of their second appearance.
    #[must_use]
    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for kind in self.iter() {
            if !seen.insert(kind) && !dups.contains(&kind) {
                dups.push(kind);
            }
        }
        dups
    }
}

impl From<Vec<String>> for KindsOrder {
    fn from(kinds: Vec<String>) -> Self {
        Self(kinds)
    }
}

/// Anything the ordering engine can place in a sequence.
pub trait KindedResource {
    fn kind(&self) -> &str;
    fn namespace(&self) -> &str;
    fn name(&self) -> &str;
}

/// A sort mode bound to its kind list.
///
/// Kind lookups go through an index built once at construction, so computing
/// a weight does not rescan the list.
#[derive(Debug, Clone)]
pub struct OrderingPolicy<'a> {
    mode: SortMode,
    index: HashMap<&'a str, i64>,
    default_weight: i64,
}

impl<'a> OrderingPolicy<'a> {
    pub fn new(mode: SortMode, kinds: &'a KindsOrder) -> Self {
        let mut index = HashMap::with_capacity(kinds.len());
        for (i, kind) in kinds.iter().enumerate() {
            // First match wins.
            index.entry(kind).or_insert(i as i64);
        }
        let default_weight = match mode {
            SortMode::CreateUpdate => kinds.len() as i64,
            SortMode::Delete => -1,
        };
        Self {
            mode,
            index,
            default_weight,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> SortMode {
        self.mode
    }

    /// Weight assigned to kinds absent from the list.
    #[must_use]
    pub const fn default_weight(&self) -> i64 {
        self.default_weight
    }

    /// Weight of a kind under this policy; lower sorts earlier.
    #[must_use]
    pub fn weight(&self, kind: &str) -> i64 {
        self.index.get(kind).copied().unwrap_or(self.default_weight)
    }

    /// Total order: weight, then namespace, then name.
    pub fn compare<T: KindedResource>(&self, a: &T, b: &T) -> Ordering {
        self.weight(a.kind())
            .cmp(&self.weight(b.kind()))
            .then_with(|| a.namespace().cmp(b.namespace()))
            .then_with(|| a.name().cmp(b.name()))
    }

    /// Sorts resources in place.
    pub fn sort<T: KindedResource>(&self, resources: &mut [T]) {
        resources.sort_by(|a, b| self.compare(a, b));
    }
}
