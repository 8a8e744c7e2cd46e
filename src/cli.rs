//! CLI command definitions for indexer-ops
//!
//! This module contains all the clap-based command definitions and argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "idxops")]
#[command(about = "Deploy the TLS proxy and event detector of the indexer stack", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the nginx TLS proxy
    Proxy {
        #[command(subcommand)]
        subcommand: ProxyCommands,
    },
    /// Manage the event detector container
    Detector {
        #[command(subcommand)]
        subcommand: DetectorCommands,
    },
    /// Inspect indexer-ops configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ProxyCommands {
    /// Generate nginx.conf and a self-signed certificate, then start the proxy
    Up {
        #[arg(value_name = "CONTAINER_NAME")]
        name: String,
        /// HTTP upstream, inserted verbatim into proxy_pass
        #[arg(value_name = "UPSTREAM_URL")]
        upstream: String,
        /// Host port bound to the proxy's 443
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory receiving nginx.conf, cert.pem and key.pem
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// nginx image
        #[arg(long)]
        image: Option<String>,
        /// Remove an existing container with the same name first
        #[arg(long)]
        replace: bool,
    },
    /// Remove the proxy container
    Down {
        #[arg(value_name = "CONTAINER_NAME")]
        name: String,
    },
    /// Show proxy status
    Status {
        #[arg(value_name = "CONTAINER_NAME")]
        name: String,
    },
    /// Show proxy logs
    Logs {
        #[arg(value_name = "CONTAINER_NAME")]
        name: String,
        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },
}

#[derive(Subcommand)]
pub enum DetectorCommands {
    /// Build the detector image and replace the running container
    Deploy {
        #[arg(value_name = "CONTAINER_NAME")]
        name: String,
        /// PostgreSQL connection string, passed as ION_INDEXER_PG_DSN
        #[arg(value_name = "POSTGRES_DSN")]
        dsn: String,
        /// Dockerfile to build
        #[arg(short = 'f', long)]
        dockerfile: Option<PathBuf>,
        /// Build context directory
        #[arg(long)]
        context: Option<PathBuf>,
        /// Image tag
        #[arg(long)]
        image: Option<String>,
        /// Network to attach the container to
        #[arg(long)]
        network: Option<String>,
    },
    /// Remove the detector container
    Remove {
        #[arg(value_name = "CONTAINER_NAME")]
        name: String,
    },
    /// Show detector status
    Status {
        #[arg(value_name = "CONTAINER_NAME")]
        name: String,
    },
    /// Show detector logs
    Logs {
        #[arg(value_name = "CONTAINER_NAME")]
        name: String,
        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the path of config.toml
    Path,
}

/// Usage errors exit with 1; help and version output exit with 0
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}
