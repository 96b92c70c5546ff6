//! Embedded cluster configuration
//!
//! The cluster table and the kubeconfig files it points at are bundled into
//! the binary at build time from the `configs/` directory. Registries consume
//! them through the [`ConfigSource`] trait so tests can substitute an
//! in-memory file set.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Read-only source of cluster configuration
///
/// Supplies the cluster name -> kubeconfig path table and the raw bytes for
/// any path the table names. Every path in the table must be readable; a
/// table entry pointing at a missing file is a startup error, not a
/// per-lookup one.
pub trait ConfigSource {
    /// Raw bytes of the configuration file at `path`
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Cluster name -> kubeconfig path table
    fn cluster_table(&self) -> Result<BTreeMap<String, String>>;
}

/// Cluster name -> kubeconfig path table, embedded as JSON
const CLUSTER_TABLE: &str = include_str!("../../configs/clusters.json");

/// Embedded kubeconfig files, keyed by the paths the table refers to
const EMBEDDED_FILES: &[(&str, &str)] = &[
    (
        "kubeconfigs/prod.yaml",
        include_str!("../../configs/kubeconfigs/prod.yaml"),
    ),
    (
        "kubeconfigs/staging.yaml",
        include_str!("../../configs/kubeconfigs/staging.yaml"),
    ),
];

/// The build-time embedded configuration set under `configs/`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedConfigs;

impl ConfigSource for EmbeddedConfigs {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        EMBEDDED_FILES
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, contents)| contents.as_bytes().to_vec())
            .ok_or_else(|| Error::config_read(path, "not present in embedded configuration"))
    }

    fn cluster_table(&self) -> Result<BTreeMap<String, String>> {
        serde_json::from_str(CLUSTER_TABLE).map_err(|e| Error::table(e.to_string()))
    }
}
