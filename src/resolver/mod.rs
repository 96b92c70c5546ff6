//! Credential resolution for the cluster this process runs against
//!
//! Sources are tried in a fixed priority order, first success wins:
//! in-cluster discovery, `./.kube/config`, `$HOME/.kube/config`, then the
//! `--kubeconfig` flag. A source failing to produce a config falls through to
//! the next source with a warning; the final source's failure is terminal.
//! No client can be built without credentials, so the caller treats that
//! terminal error as fatal to startup.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use tracing::{info, warn};

use crate::{Error, Result, KUBECONFIG_RELATIVE_PATH};

/// Where a resolved config came from
///
/// In-cluster configs carry an ambient service account identity and get the
/// [`crate::identity`] check; file-based configs are operator-supplied and
/// skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    /// Discovered from the pod environment
    InCluster,
    /// Loaded from a kubeconfig file
    File,
}

/// One strategy for locating the local cluster's credentials
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Short name used in fallback log messages
    fn name(&self) -> &'static str;

    /// Where a config produced by this source comes from
    fn origin(&self) -> CredentialOrigin;

    /// Produce a parsed client config, or an error to fall through on
    async fn try_resolve(&self) -> Result<Config>;
}

/// Credentials produced by a [`CredentialChain`]
#[derive(Debug)]
pub struct ResolvedCredentials {
    /// Parsed connection settings, ready for client construction
    pub config: Config,
    /// The kind of source that produced them
    pub origin: CredentialOrigin,
}

/// In-cluster discovery from the pod's service account environment
pub struct InClusterSource;

#[async_trait]
impl CredentialSource for InClusterSource {
    fn name(&self) -> &'static str {
        "in-cluster"
    }

    fn origin(&self) -> CredentialOrigin {
        CredentialOrigin::InCluster
    }

    async fn try_resolve(&self) -> Result<Config> {
        Config::incluster()
            .map_err(|e| Error::resolution(format!("in-cluster discovery failed: {e}")))
    }
}

/// Kubeconfig at a fixed path, probed as-is
pub struct FileSource {
    name: &'static str,
    path: PathBuf,
}

impl FileSource {
    /// `./.kube/config`, relative to the current working directory
    pub fn working_dir() -> Self {
        Self {
            name: "workspace kubeconfig",
            path: PathBuf::from(KUBECONFIG_RELATIVE_PATH),
        }
    }
}

#[async_trait]
impl CredentialSource for FileSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn origin(&self) -> CredentialOrigin {
        CredentialOrigin::File
    }

    async fn try_resolve(&self) -> Result<Config> {
        load_kubeconfig(&self.path, self.name).await
    }
}

/// `$HOME/.kube/config`
///
/// The home directory is resolved at lookup time; an unresolvable home
/// directory fails this source like any unreadable file would.
pub struct HomeSource;

#[async_trait]
impl CredentialSource for HomeSource {
    fn name(&self) -> &'static str {
        "home kubeconfig"
    }

    fn origin(&self) -> CredentialOrigin {
        CredentialOrigin::File
    }

    async fn try_resolve(&self) -> Result<Config> {
        let home = home::home_dir()
            .ok_or_else(|| Error::resolution("home directory could not be determined"))?;
        load_kubeconfig(&home.join(KUBECONFIG_RELATIVE_PATH), self.name()).await
    }
}

/// Kubeconfig path supplied via the `--kubeconfig` flag
///
/// The last resort: if the flag was never set there is nothing left to try
/// and resolution fails outright.
pub struct FlagSource {
    path: Option<PathBuf>,
}

impl FlagSource {
    /// Create from the parsed flag value, if any
    pub fn new(path: Option<PathBuf>) -> Self {
        // An empty path means the flag was passed without a usable value
        let path = path.filter(|p| !p.as_os_str().is_empty());
        Self { path }
    }
}

#[async_trait]
impl CredentialSource for FlagSource {
    fn name(&self) -> &'static str {
        "kubeconfig flag"
    }

    fn origin(&self) -> CredentialOrigin {
        CredentialOrigin::File
    }

    async fn try_resolve(&self) -> Result<Config> {
        match &self.path {
            Some(path) => load_kubeconfig(path, self.name()).await,
            None => Err(Error::resolution("kubeconfig flag is not set")),
        }
    }
}

/// Read and parse a kubeconfig file into client settings
async fn load_kubeconfig(path: &Path, context: &str) -> Result<Config> {
    let kubeconfig = Kubeconfig::read_from(path)
        .map_err(|e| Error::kubeconfig(context, format!("failed to read {}: {e}", path.display())))?;
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| Error::kubeconfig(context, format!("failed to load {}: {e}", path.display())))
}

/// The ordered fallback chain over credential sources
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    /// The standard order: in-cluster, workspace, home, then the flag
    pub fn standard(flag_path: Option<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(InClusterSource),
            Box::new(FileSource::working_dir()),
            Box::new(HomeSource),
            Box::new(FlagSource::new(flag_path)),
        ])
    }

    /// Build a chain from an explicit source list, tried in order
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// Try each source in order and return the first config produced
    ///
    /// Sources that fail before the last one are logged and skipped; the
    /// last source's error is returned as-is. Nothing from a failed source
    /// is carried into the next attempt.
    pub async fn resolve(&self) -> Result<ResolvedCredentials> {
        let last = self.sources.len().checked_sub(1);
        for (index, source) in self.sources.iter().enumerate() {
            match source.try_resolve().await {
                Ok(config) => {
                    info!(source = source.name(), "local cluster credentials resolved");
                    return Ok(ResolvedCredentials {
                        config,
                        origin: source.origin(),
                    });
                }
                Err(err) if Some(index) != last => {
                    warn!(
                        source = source.name(),
                        error = %err,
                        "credential source failed, falling back"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Err(Error::resolution("no credential sources configured"))
    }
}
