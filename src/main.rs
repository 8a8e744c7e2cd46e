//! indexer-ops (idxops) - deployment CLI for the indexer stack
//!
//! Bootstraps the nginx TLS proxy in front of the indexer API and
//! (re)deploys the event detector container against PostgreSQL.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod config;
mod detector;
mod docker;
mod proxy;

use cli::{Cli, Commands, ConfigCommands, DetectorCommands, ProxyCommands};
use detector::launcher::DeployOptions;
use docker::Docker;
use proxy::manager::UpOptions;

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = cli::usage_exit_code(&err);
            let _ = err.print();
            process::exit(code);
        }
    };

    // Ensure configuration directory exists on startup
    config::ensure_config_dir()?;
    let config = config::load_config()?;
    let docker = Docker::from_config(&config)?;

    match cli.command {
        Commands::Proxy { subcommand } => match subcommand {
            ProxyCommands::Up {
                name,
                upstream,
                port,
                out_dir,
                image,
                replace,
            } => {
                let options = UpOptions {
                    out_dir,
                    port,
                    image,
                    replace,
                };
                proxy::manager::up(&config, &docker, &name, &upstream, &options)?;
            }
            ProxyCommands::Down { name } => {
                proxy::manager::down(&docker, &name)?;
            }
            ProxyCommands::Status { name } => {
                proxy::manager::status(&docker, &name)?;
            }
            ProxyCommands::Logs { name, follow } => {
                proxy::manager::logs(&docker, &name, follow)?;
            }
        },
        Commands::Detector { subcommand } => match subcommand {
            DetectorCommands::Deploy {
                name,
                dsn,
                dockerfile,
                context,
                image,
                network,
            } => {
                let options = DeployOptions {
                    dockerfile,
                    context,
                    image,
                    network,
                };
                detector::launcher::deploy(&config, &docker, &name, &dsn, &options)?;
            }
            DetectorCommands::Remove { name } => {
                detector::launcher::remove(&docker, &name)?;
            }
            DetectorCommands::Status { name } => {
                detector::launcher::status(&docker, &name)?;
            }
            DetectorCommands::Logs { name, follow } => {
                detector::launcher::logs(&docker, &name, follow)?;
            }
        },
        Commands::Config { subcommand } => match subcommand {
            ConfigCommands::Show => {
                let rendered =
                    toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
                print!("{}", rendered);
            }
            ConfigCommands::Path => {
                println!("{}", config::get_config_path()?.display());
            }
        },
    }

    Ok(())
}
