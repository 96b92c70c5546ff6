//! Helm release-storage client handle
//!
//! Helm v3 keeps release state in Secrets of type `helm.sh/release.v1`,
//! labelled `owner=helm`, in the namespace the release was installed into.
//! The handle here addresses that storage through the Kubernetes API; it is
//! a connection handle, not a Helm implementation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ListParams};
use kube::{Client, Config};

use super::ClientFactory;
use crate::Result;

/// Secret type used by Helm v3 release storage
pub const RELEASE_SECRET_TYPE: &str = "helm.sh/release.v1";

/// Label selector matching Helm-owned release secrets
pub const RELEASE_LABEL_SELECTOR: &str = "owner=helm";

/// Client handle for one cluster's Helm release storage
#[derive(Clone)]
pub struct HelmClient {
    client: Client,
    default_namespace: String,
}

impl HelmClient {
    /// Wrap a Kubernetes client, releases default to `default_namespace`
    pub fn new(client: Client, default_namespace: impl Into<String>) -> Self {
        Self {
            client,
            default_namespace: default_namespace.into(),
        }
    }

    /// Namespace used when a release operation names none
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// API handle over the release secrets of `namespace`
    pub fn releases(&self, namespace: Option<&str>) -> Api<Secret> {
        Api::namespaced(
            self.client.clone(),
            namespace.unwrap_or(&self.default_namespace),
        )
    }

    /// List parameters that select only Helm release secrets
    pub fn release_params() -> ListParams {
        ListParams::default()
            .labels(RELEASE_LABEL_SELECTOR)
            .fields(&format!("type={RELEASE_SECRET_TYPE}"))
    }

    /// Names of the releases installed in `namespace`
    ///
    /// Release names are read from the `name` label Helm stamps on each
    /// revision secret; revisions collapse to one entry per release.
    pub async fn list_release_names(&self, namespace: Option<&str>) -> Result<Vec<String>> {
        let secrets = self
            .releases(namespace)
            .list(&Self::release_params())
            .await?;

        let names: BTreeSet<String> = secrets
            .items
            .into_iter()
            .filter_map(|secret| {
                secret
                    .metadata
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.get("name"))
                    .cloned()
            })
            .collect();

        Ok(names.into_iter().collect())
    }
}

/// Factory for Helm release-storage clients
pub struct HelmClientFactory;

#[async_trait]
impl ClientFactory for HelmClientFactory {
    type Handle = HelmClient;

    fn api_kind(&self) -> &'static str {
        "helm"
    }

    async fn build(&self, config: Config) -> Result<HelmClient> {
        let namespace = config.default_namespace.clone();
        let client = Client::try_from(config)?;
        Ok(HelmClient::new(client, namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_crypto() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    }

    #[tokio::test]
    async fn test_factory_carries_kubeconfig_namespace() {
        init_crypto();

        let mut config = Config::new("https://192.0.2.1:6443".parse().unwrap());
        config.default_namespace = "deployments".to_string();

        let helm = HelmClientFactory.build(config).await.unwrap();
        assert_eq!(helm.default_namespace(), "deployments");
    }

    #[tokio::test]
    async fn test_releases_fall_back_to_default_namespace() {
        init_crypto();

        let config = Config::new("https://192.0.2.1:6443".parse().unwrap());
        let helm = HelmClientFactory.build(config).await.unwrap();

        // Explicit namespace wins; None falls back to the handle default
        let _explicit = helm.releases(Some("monitoring"));
        let _default = helm.releases(None);
        assert_eq!(helm.default_namespace(), "default");
    }

    #[test]
    fn test_release_params_select_helm_storage() {
        let params = HelmClient::release_params();
        assert_eq!(params.label_selector.as_deref(), Some(RELEASE_LABEL_SELECTOR));
        assert_eq!(
            params.field_selector.as_deref(),
            Some("type=helm.sh/release.v1")
        );
    }
}
