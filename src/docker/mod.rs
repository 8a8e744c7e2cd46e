//! Docker operations module
//!
//! This module wraps the container runtime CLI:
//! - Image builds
//! - Container run / remove / logs
//! - Container inspection

pub mod inspect;
pub mod run;

use std::{
    path::Path,
    process::{Command, Output},
};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;

pub use inspect::ContainerState;
pub use run::RunSpec;

/// Handle to the container runtime command (`docker`, `sudo docker`, `podman`, ...)
#[derive(Debug, Clone)]
pub struct Docker {
    program: String,
    leading_args: Vec<String>,
}

impl Docker {
    /// Create a handle from a command line such as `["sudo", "docker"]`
    pub fn new(command: &[String]) -> Result<Self> {
        let Some((program, leading_args)) = command.split_first() else {
            anyhow::bail!("Container runtime command is empty. Check [docker] command in config.toml");
        };

        Ok(Self {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.docker.command)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        self.command()
            .args(args)
            .output()
            .context(format!("Failed to run {} {}", self.program, args.join(" ")))
    }

    /// Build an image from a Dockerfile
    pub fn build(&self, tag: &str, dockerfile: &Path, context: &Path) -> Result<()> {
        println!(
            "{} Building image {} from {}...",
            "ℹ".blue(),
            tag.bright_white(),
            dockerfile.display()
        );

        let status = self
            .command()
            .arg("build")
            .args(["-t", tag])
            .arg("-f")
            .arg(dockerfile)
            .arg(context)
            .status()
            .context("Failed to run image build")?;

        if !status.success() {
            anyhow::bail!("Failed to build image {} ({})", tag, status);
        }

        println!("{} Image {} built", "✓".green(), tag.bright_white());

        Ok(())
    }

    /// Start a container described by `spec`
    pub fn run(&self, spec: &RunSpec) -> Result<()> {
        println!(
            "{} Starting container {}...",
            "ℹ".blue(),
            spec.name.bright_white()
        );

        let status = self
            .command()
            .args(spec.to_args())
            .status()
            .context("Failed to start container")?;

        if !status.success() {
            anyhow::bail!("Failed to start container {} ({})", spec.name, status);
        }

        Ok(())
    }

    /// Names of containers matching `name` exactly; stopped ones only with `all`
    fn matching_names(&self, name: &str, all: bool) -> Result<Vec<String>> {
        let filter = format!("name=^{}$", name);
        let mut args = vec!["ps"];
        if all {
            args.push("-a");
        }
        args.extend(["--filter", filter.as_str(), "--format", "{{.Names}}"]);

        let output = self.output(&args)?;

        if !output.status.success() {
            anyhow::bail!(
                "Failed to list containers: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().trim_start_matches('/'))
            .filter(|line| *line == name)
            .map(|line| line.to_string())
            .collect())
    }

    /// Check if a container exists (running or stopped)
    pub fn container_exists(&self, name: &str) -> Result<bool> {
        Ok(!self.matching_names(name, true)?.is_empty())
    }

    /// Check if a container is running
    pub fn is_running(&self, name: &str) -> Result<bool> {
        Ok(!self.matching_names(name, false)?.is_empty())
    }

    /// Force-remove a container together with its filesystem layer
    pub fn remove_force(&self, name: &str) -> Result<()> {
        println!(
            "{} Removing existing container {}...",
            "ℹ".blue(),
            name.bright_white()
        );

        let status = self
            .command()
            .args(["rm", "-f", name])
            .status()
            .context("Failed to remove container")?;

        if !status.success() {
            anyhow::bail!("Failed to remove existing container {} ({})", name, status);
        }

        Ok(())
    }

    /// Stream container logs to the terminal
    pub fn logs(&self, name: &str, follow: bool) -> Result<()> {
        let mut args = vec!["logs"];
        if follow {
            args.push("-f");
        }
        args.push(name);

        let status = self
            .command()
            .args(&args)
            .status()
            .context("Failed to show logs")?;

        if !status.success() {
            anyhow::bail!("Failed to show logs for {}", name);
        }

        Ok(())
    }

    /// Inspect a container, `None` when it does not exist
    pub fn inspect(&self, name: &str) -> Result<Option<ContainerState>> {
        let output = self.output(&["inspect", "--type", "container", name])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.to_lowercase().contains("no such") {
                return Ok(None);
            }
            anyhow::bail!("Failed to inspect container {}: {}", name, stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        inspect::parse(&stdout)
    }
}
