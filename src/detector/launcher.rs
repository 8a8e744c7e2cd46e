//! Event detector deployment
//!
//! `deploy` walks build -> remove existing -> run and stops at the first
//! failing step.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use super::{DETECTOR_SERVICE, DSN_ENV, PROGRESS_ENV, dsn::mask_password, is_reserved_env};
use crate::{
    config::{Config, DetectorSettings},
    docker::{Docker, RunSpec, inspect},
};

/// Per-invocation overrides for `detector deploy`
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub dockerfile: Option<PathBuf>,
    pub context: Option<PathBuf>,
    pub image: Option<String>,
    pub network: Option<String>,
}

fn run_spec(
    name: &str,
    dsn: &str,
    settings: &DetectorSettings,
    image: &str,
    network: Option<&str>,
) -> RunSpec {
    let mut spec = RunSpec::new(name, image)
        .restart(Some(settings.restart.as_str()))
        .env(DSN_ENV, dsn);

    for (key, value) in PROGRESS_ENV {
        spec = spec.env(key, value);
    }

    for (key, value) in settings.env.iter().filter(|(key, _)| !is_reserved_env(key)) {
        spec = spec.env(key, value);
    }

    spec.network(network)
        .service(DETECTOR_SERVICE)
        .entrypoint(&settings.entrypoint)
        .args(std::iter::once(settings.script.clone()).chain(settings.args.iter().cloned()))
}

/// Build the image and (re)create the detector container
pub fn deploy(
    config: &Config,
    docker: &Docker,
    name: &str,
    dsn: &str,
    options: &DeployOptions,
) -> Result<()> {
    let settings = &config.detector;
    let image = options.image.as_deref().unwrap_or(&settings.image);
    let dockerfile = options.dockerfile.as_ref().unwrap_or(&settings.dockerfile);
    let context = options.context.as_ref().unwrap_or(&settings.context);
    let network = options.network.as_deref().or(settings.network.as_deref());

    println!(
        "{} {}",
        "Deploying event detector".blue(),
        name.bright_white()
    );
    println!("  Database: {}", mask_password(dsn));
    println!();

    for key in settings.env.keys().filter(|key| is_reserved_env(key)) {
        println!(
            "{} Ignoring {} from [detector.env]; it is set by indexer-ops",
            "⚠".yellow(),
            key.bright_white()
        );
    }

    docker.build(image, dockerfile, context)?;

    if docker.container_exists(name)? {
        docker.remove_force(name)?;
    } else {
        println!(
            "{} No existing container named {}",
            "ℹ".blue(),
            name.bright_white()
        );
    }

    docker.run(&run_spec(name, dsn, settings, image, network))?;

    println!("{}", "✓ Event detector started".green());
    println!();
    println!(
        "View logs: {}",
        format!("idxops detector logs {} -f", name).bright_white()
    );

    Ok(())
}

/// Force-remove the detector container
pub fn remove(docker: &Docker, name: &str) -> Result<()> {
    if !docker.container_exists(name)? {
        println!(
            "{} Detector container {} not found",
            "⚠".yellow(),
            name.bright_white()
        );
        return Ok(());
    }

    docker.remove_force(name)?;

    println!("{} Detector {} removed", "✓".green(), name.bright_white());

    Ok(())
}

/// Show detector container status
pub fn status(docker: &Docker, name: &str) -> Result<()> {
    println!("{} {}", "Event Detector Status:".blue(), name.bright_white());
    println!();

    let Some(state) = docker.inspect(name)? else {
        println!("  Status: {}", "Not found".red());
        println!();
        println!(
            "Deploy it with: {}",
            format!("idxops detector deploy {} <POSTGRES_DSN>", name).bright_white()
        );
        return Ok(());
    };

    inspect::print_summary(&state);
    if let Some(dsn) = state.env_var(DSN_ENV) {
        println!("  Database: {}", mask_password(dsn));
    }

    Ok(())
}

/// Show detector container logs
pub fn logs(docker: &Docker, name: &str, follow: bool) -> Result<()> {
    if !docker.container_exists(name)? {
        println!(
            "{} Detector container {} not found",
            "⚠".yellow(),
            name.bright_white()
        );
        return Ok(());
    }

    if !docker.is_running(name)? {
        println!(
            "{} Detector container {} is not running, showing its last logs",
            "⚠".yellow(),
            name.bright_white()
        );
    }

    docker.logs(name, follow)
}
