//! Parsing of `docker inspect` output

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use colored::Colorize;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectEntry {
    name: String,
    #[serde(default)]
    restart_count: u32,
    state: StateSection,
    config: ConfigSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StateSection {
    status: String,
    running: bool,
    #[serde(default)]
    exit_code: i64,
    #[serde(default)]
    error: String,
    #[serde(default)]
    started_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConfigSection {
    image: String,
    #[serde(default)]
    env: Option<Vec<String>>,
}

/// State of a single container as reported by the runtime
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerState {
    pub name: String,
    pub image: String,
    pub status: String,
    pub running: bool,
    pub exit_code: i64,
    pub error: Option<String>,
    pub restart_count: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub env: Vec<String>,
}

impl ContainerState {
    /// Value of an environment variable set on the container
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.iter().find_map(|entry| {
            entry
                .split_once('=')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }
}

/// Print the common status lines for a container
pub fn print_summary(state: &ContainerState) {
    let status = if state.running {
        state.status.green()
    } else {
        state.status.red()
    };

    println!("  Name:     {}", state.name);
    println!("  Status:   {}", status);
    println!("  Image:    {}", state.image);
    match state.started_at {
        Some(started) => println!("  Started:  {}", started.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("  Started:  never"),
    }
    println!("  Restarts: {}", state.restart_count);
    if !state.running {
        println!("  Exit:     {}", state.exit_code);
    }
    if let Some(error) = &state.error {
        println!("  Error:    {}", error.yellow());
    }
}

/// Docker reports never-started containers as 0001-01-01T00:00:00Z
fn parse_started_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .filter(|dt| dt.year() > 1)
}

/// Parse the JSON array printed by `docker inspect`
pub fn parse(json: &str) -> Result<Option<ContainerState>> {
    let entries: Vec<InspectEntry> =
        serde_json::from_str(json).context("Failed to parse inspect output")?;

    let Some(entry) = entries.into_iter().next() else {
        return Ok(None);
    };

    Ok(Some(ContainerState {
        name: entry.name.trim_start_matches('/').to_string(),
        image: entry.config.image,
        status: entry.state.status,
        running: entry.state.running,
        exit_code: entry.state.exit_code,
        error: Some(entry.state.error).filter(|e| !e.is_empty()),
        restart_count: entry.restart_count,
        started_at: parse_started_at(&entry.state.started_at),
        env: entry.config.env.unwrap_or_default(),
    }))
}
