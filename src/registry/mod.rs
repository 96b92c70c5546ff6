//! Cluster client registries
//!
//! A registry eagerly builds one live client per configured cluster during
//! initialization and is a read-only lookup table afterwards. Initialization
//! is all-or-nothing: a single broken table entry fails the whole registry,
//! because a misconfigured cluster is an operator error that needs attention,
//! not graceful degradation. There is no lazy construction, no retry, and no
//! cache invalidation.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use tracing::info;

use crate::client::ClientFactory;
use crate::config::ConfigSource;
use crate::identity;
use crate::resolver::{CredentialChain, CredentialOrigin};
use crate::{Error, Result};

/// Parse raw kubeconfig bytes into client settings
///
/// `context` names the cluster (or credential source) the bytes belong to
/// and appears in error messages.
pub async fn parse_kubeconfig(bytes: &[u8], context: &str) -> Result<Config> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::kubeconfig(context, format!("invalid kubeconfig UTF-8: {e}")))?;

    let kubeconfig: Kubeconfig = serde_yaml::from_str(text)
        .map_err(|e| Error::kubeconfig(context, format!("invalid kubeconfig YAML: {e}")))?;

    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| Error::kubeconfig(context, e.to_string()))
}

/// Name -> client registry for one control-plane API
///
/// Built once from the cluster table, then queried many times. Lookups need
/// no locking: nothing writes after initialization.
#[derive(Debug)]
pub struct ClusterRegistry<H> {
    clients: HashMap<String, H>,
    paths: BTreeMap<String, String>,
}

impl<H> ClusterRegistry<H> {
    /// Build one client per cluster table entry
    ///
    /// Reads the table from `source`, then for every entry fetches the
    /// kubeconfig bytes, parses them, and hands the result to `factory`.
    /// The first failure aborts the whole build; no partially populated
    /// registry is ever returned.
    pub async fn init<S, F>(source: &S, factory: &F) -> Result<Self>
    where
        S: ConfigSource,
        F: ClientFactory<Handle = H>,
    {
        let paths = source.cluster_table()?;
        let mut clients = HashMap::with_capacity(paths.len());

        for (cluster, path) in &paths {
            let bytes = source.read_file(path)?;
            let config = parse_kubeconfig(&bytes, cluster).await?;
            let handle = factory.build(config).await?;
            info!(
                cluster = %cluster,
                api = factory.api_kind(),
                "cluster client ready"
            );
            clients.insert(cluster.clone(), handle);
        }

        Ok(Self { clients, paths })
    }

    /// The client for `cluster`, or an error naming the missing cluster
    pub fn get(&self, cluster: &str) -> Result<&H> {
        self.clients.get(cluster).ok_or_else(|| Error::ClusterNotFound {
            cluster: cluster.to_string(),
        })
    }

    /// Configured cluster names, in table order
    pub fn clusters(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// The kubeconfig path a cluster was built from, for diagnostics
    pub fn path(&self, cluster: &str) -> Option<&str> {
        self.paths.get(cluster).map(String::as_str)
    }

    /// Number of configured clusters
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the table was empty
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// The single client for the cluster this process runs against
///
/// Composes the credential fallback chain, the in-cluster identity check,
/// and client construction. Once built it cannot fail: `get` hands out the
/// one cached handle.
#[derive(Debug)]
pub struct LocalCluster<H> {
    handle: H,
    origin: CredentialOrigin,
}

impl<H> LocalCluster<H> {
    /// Resolve credentials, verify the identity, and build the client
    ///
    /// The identity check runs only for configs discovered in-cluster that
    /// carry a token file; kubeconfig files picked up from disk or the flag
    /// are operator-supplied and skip it.
    pub async fn init<F>(chain: &CredentialChain, factory: &F) -> Result<Self>
    where
        F: ClientFactory<Handle = H>,
    {
        let resolved = chain.resolve().await?;

        if resolved.origin == CredentialOrigin::InCluster {
            if let Some(token_file) = &resolved.config.auth_info.token_file {
                identity::verify_service_account(Path::new(token_file))?;
            }
        }

        let handle = factory.build(resolved.config).await?;
        info!(api = factory.api_kind(), "local cluster client ready");

        Ok(Self {
            handle,
            origin: resolved.origin,
        })
    }

    /// The cached client handle
    pub fn get(&self) -> &H {
        &self.handle
    }

    /// Where the credentials behind this client came from
    pub fn origin(&self) -> CredentialOrigin {
        self.origin
    }
}
