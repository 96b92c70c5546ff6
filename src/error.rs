//! Error types for client bootstrap
//!
//! Startup errors are unrecoverable by design: a client this layer cannot
//! build is unusable to every downstream caller, so failures surface
//! immediately instead of at first use. The binary decides what "fatal"
//! means; the library only reports the error kind.

use thiserror::Error;

/// Main error type for bootstrap operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes client error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// An embedded configuration file could not be read
    #[error("config read error for {path}: {message}")]
    ConfigRead {
        /// Path of the embedded file
        path: String,
        /// Description of what failed
        message: String,
    },

    /// The cluster name -> path table could not be parsed
    #[error("cluster table error: {0}")]
    Table(String),

    /// Kubeconfig bytes could not be turned into client settings
    #[error("kubeconfig error for {context}: {message}")]
    Kubeconfig {
        /// Cluster name or credential source the kubeconfig belongs to
        context: String,
        /// Description of what failed
        message: String,
    },

    /// Every credential source was exhausted without producing a config
    #[error("credential resolution failed: {0}")]
    Resolution(String),

    /// The in-cluster service account token was unreadable or malformed
    #[error("identity error: {0}")]
    Identity(String),

    /// The in-cluster identity is the ambient `default` service account
    #[error("service account {subject:?} is the ambient default and may not carry the intended permissions")]
    DefaultServiceAccount {
        /// The rejected token subject
        subject: String,
    },

    /// Lookup of a cluster name that was never configured
    #[error("cluster {cluster:?} not found, can't get client")]
    ClusterNotFound {
        /// The requested cluster name
        cluster: String,
    },
}

impl Error {
    /// Create a config read error for an embedded path
    pub fn config_read(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ConfigRead {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a cluster table error
    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }

    /// Create a kubeconfig error with cluster or source context
    pub fn kubeconfig(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Kubeconfig {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Create a credential resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create an identity error
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    /// Whether this error is unrecoverable at startup
    ///
    /// Everything except a failed lookup is fatal: either no client can be
    /// built at all, or a configured cluster entry is broken and partial
    /// initialization is not allowed. `ClusterNotFound` is the one error a
    /// caller may see after init and can handle (e.g. skip that cluster).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::ClusterNotFound { .. })
    }
}
