//! Berth - multi-cluster control-plane client bootstrap

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use berth::config::EmbeddedConfigs;
use berth::hub::{ClientHub, HubOptions};

/// Resolve, verify, and cache clients for every configured control plane
#[derive(Parser, Debug)]
#[command(name = "berth", version, about, long_about = None)]
struct Cli {
    /// Absolute path to a fallback kubeconfig file
    ///
    /// Consulted only when in-cluster discovery and the workspace and home
    /// kubeconfig files all fail to produce credentials.
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // TLS backs every client this process builds; without a working crypto
    // provider nothing below can operate.
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!("CRITICAL: failed to install crypto provider: {e:?}");
        std::process::exit(1);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("starting client bootstrap...");

    let hub = match ClientHub::init(
        &EmbeddedConfigs,
        HubOptions {
            kubeconfig: cli.kubeconfig,
        },
    )
    .await
    {
        Ok(hub) => hub,
        Err(e) => {
            // Every bootstrap error is unrecoverable here: a client that
            // cannot be built would fail 100% of its callers later anyway.
            tracing::error!(error = %e, "client bootstrap failed, exiting");
            std::process::exit(1);
        }
    };

    let clusters: Vec<&str> = hub.kube().clusters().collect();
    tracing::info!(
        clusters = ?clusters,
        kube = hub.kube().len(),
        helm = hub.helm().len(),
        "all cluster clients ready"
    );

    // Probe the local API server as a startup health signal; failures here
    // are runtime conditions, not bootstrap errors.
    match hub.local().apiserver_version().await {
        Ok(version) => {
            tracing::info!(version = %version.git_version, "local API server reachable");
        }
        Err(e) => {
            tracing::warn!(error = %e, "local API server not reachable");
        }
    }

    Ok(())
}
