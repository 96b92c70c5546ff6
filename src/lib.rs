//! Berth - multi-cluster control-plane client bootstrap
//!
//! Berth resolves, verifies, and caches connections to the control planes an
//! application talks to: the Kubernetes API and Helm release storage. The rest
//! of the application asks for "the client for cluster X" and never learns how
//! that client was constructed.
//!
//! # Architecture
//!
//! Everything happens once, at process start:
//! - the local cluster's credentials are resolved through a fixed fallback
//!   chain (in-cluster discovery, then kubeconfig files, then a CLI flag)
//! - in-cluster identities are checked against the ambient `default` service
//!   account before any client is built
//! - one client per configured remote cluster is built eagerly from the
//!   embedded kubeconfig set, per control-plane API
//!
//! After initialization every registry is a read-only lookup table; the only
//! error a caller can see is "cluster not found".
//!
//! # Modules
//!
//! - [`config`] - embedded cluster table and kubeconfig files
//! - [`resolver`] - ordered credential fallback chain for the local cluster
//! - [`identity`] - service account verification for in-cluster credentials
//! - [`client`] - client construction per control-plane API (Kubernetes, Helm)
//! - [`registry`] - name -> client registries (multi-cluster and local)
//! - [`hub`] - the bootstrap root owning every registry
//! - [`error`] - error types

#![deny(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod hub;
pub mod identity;
pub mod registry;
pub mod resolver;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Kubeconfig location probed relative to the working directory and `$HOME`
pub const KUBECONFIG_RELATIVE_PATH: &str = ".kube/config";
