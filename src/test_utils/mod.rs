//! Shared helpers for unit and integration tests.
//!
//! Enabled for the crate's own tests and, through the `test-utils` feature,
//! for the integration test target.

use std::path::Path;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::asset::MemoryAssetReader;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays
/// off. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=ktmpl_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

pub const SERVICE_ACCOUNT_YAML: &str = "\
apiVersion: v1
kind: ServiceAccount
metadata:
  name: {{ BootstrapServiceAccountName }}
  namespace: {{ ManagedClusterNamespace }}
";

pub const CLUSTER_ROLE_YAML: &str = "\
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: {{ ManagedClusterName }}:bootstrap
rules:
- apiGroups: [\"certificates.k8s.io\"]
  resources: [\"certificatesigningrequests\"]
  verbs: [\"create\", \"get\", \"list\", \"watch\"]
";

pub const CLUSTER_ROLE_BINDING_YAML: &str = "\
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: {{ ManagedClusterName }}:bootstrap
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: ClusterRole
  name: {{ ManagedClusterName }}:bootstrap
subjects:
- kind: ServiceAccount
  name: {{ BootstrapServiceAccountName }}
  namespace: {{ ManagedClusterNamespace }}
";

/// Values matching the placeholders of the RBAC fixtures.
#[must_use]
pub fn rbac_values() -> serde_json::Value {
    serde_json::json!({
        "ManagedClusterName": "mymanagedcluster",
        "ManagedClusterNamespace": "mymanagedclusterNS",
        "BootstrapServiceAccountName": "mymanagedcluster",
    })
}

/// The three RBAC fixtures under `test/`, one object per asset.
#[must_use]
pub fn rbac_reader() -> MemoryAssetReader {
    MemoryAssetReader::new()
        .with_asset("test/clusterrolebinding.yaml", CLUSTER_ROLE_BINDING_YAML)
        .with_asset("test/clusterrole.yaml", CLUSTER_ROLE_YAML)
        .with_asset("test/serviceaccount.yaml", SERVICE_ACCOUNT_YAML)
}

/// Write the RBAC fixtures below `root/test` on disk.
///
/// # Errors
///
/// Returns any I/O error from creating the files.
pub fn write_rbac_fixtures(root: &Path) -> std::io::Result<()> {
    let dir = root.join("test");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("clusterrolebinding.yaml"), CLUSTER_ROLE_BINDING_YAML)?;
    std::fs::write(dir.join("clusterrole.yaml"), CLUSTER_ROLE_YAML)?;
    std::fs::write(dir.join("serviceaccount.yaml"), SERVICE_ACCOUNT_YAML)?;
    Ok(())
}
