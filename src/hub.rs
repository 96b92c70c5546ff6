//! Bootstrap root owning every control-plane client
//!
//! One [`ClientHub`] is constructed at process start and passed by reference
//! to everything that needs cluster access. It is immutable after
//! construction and torn down at process exit, so there is no hidden global
//! state and no locking around lookups.

use std::path::PathBuf;

use kube::Client;

use crate::client::{HelmClient, HelmClientFactory, KubeClientFactory};
use crate::config::ConfigSource;
use crate::registry::{ClusterRegistry, LocalCluster};
use crate::resolver::CredentialChain;
use crate::Result;

/// Startup options for the hub
#[derive(Debug, Clone, Default)]
pub struct HubOptions {
    /// Fallback kubeconfig path from the `--kubeconfig` flag, if given
    pub kubeconfig: Option<PathBuf>,
}

/// Every client the application can ask for, built once at startup
pub struct ClientHub {
    local: LocalCluster<Client>,
    kube: ClusterRegistry<Client>,
    helm: ClusterRegistry<HelmClient>,
}

impl ClientHub {
    /// Build all clients, failing fast on the first unrecoverable error
    ///
    /// The local cluster client is resolved and verified first, then one
    /// Kubernetes and one Helm client per entry of the embedded cluster
    /// table. Initialization is strictly sequential; nothing is served until
    /// it completes.
    pub async fn init<S: ConfigSource>(source: &S, options: HubOptions) -> Result<Self> {
        let chain = CredentialChain::standard(options.kubeconfig);
        let local = LocalCluster::init(&chain, &KubeClientFactory).await?;
        let kube = ClusterRegistry::init(source, &KubeClientFactory).await?;
        let helm = ClusterRegistry::init(source, &HelmClientFactory).await?;

        Ok(Self { local, kube, helm })
    }

    /// The client for the cluster this process runs against
    pub fn local(&self) -> &Client {
        self.local.get()
    }

    /// Kubernetes clients for the configured remote clusters
    pub fn kube(&self) -> &ClusterRegistry<Client> {
        &self.kube
    }

    /// Helm release-storage clients for the configured remote clusters
    pub fn helm(&self) -> &ClusterRegistry<HelmClient> {
        &self.helm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddedConfigs;

    #[tokio::test]
    async fn test_hub_init_end_to_end() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        // Local resolution depends on the environment: inside a cluster or
        // on a machine with a kubeconfig it succeeds, otherwise it fails
        // before the registries are touched. Both outcomes are correct.
        match ClientHub::init(&EmbeddedConfigs, HubOptions::default()).await {
            Ok(hub) => {
                assert_eq!(hub.kube().len(), hub.helm().len());
                assert!(hub.kube().get("prod").is_ok());
                assert!(hub.helm().get("staging").is_ok());
                assert!(hub.kube().get("dev").is_err());
            }
            Err(err) => assert!(err.is_fatal()),
        }
    }
}
