use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the configuration directory path
/// Checks INDEXER_OPS_DIR environment variable first,
/// then defaults to ~/.indexer-ops
pub fn get_config_dir() -> Result<PathBuf> {
    if let Ok(custom_dir) = env::var("INDEXER_OPS_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }

    let home_dir = dirs::home_dir().context("Failed to get home directory")?;

    Ok(home_dir.join(".indexer-ops"))
}

/// Get the path of config.toml
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Ensure the configuration directory exists and holds a config.toml
pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    let config_file = config_dir.join(CONFIG_FILE_NAME);
    if !config_file.exists() {
        create_default_config(&config_file)?;
    }

    Ok(config_dir)
}

const DEFAULT_CONFIG: &str = r#"# Configuration for indexer-ops

[docker]
# Container runtime command. Extra leading elements are passed before every
# subcommand, e.g. ["sudo", "docker"] or ["podman"].
command = ["docker"]

[proxy]
# nginx image used for TLS termination
image = "nginx:latest"

# Host port bound to the container's 443
host_port = 443

# Self-signed certificate parameters
common_name = "localhost"
cert_days = 365
key_bits = 2048

# openssl binary used to generate the key pair
openssl = "openssl"

# Optional restart policy for the proxy container
# restart = "unless-stopped"

[detector]
# Image tag built from the Dockerfile
image = "ton-index-event-detector"
dockerfile = "Dockerfile"
context = "."

# Entrypoint override and the script it runs
entrypoint = "python3"
script = "event_detector.py"
args = ["--verbose"]

restart = "unless-stopped"

# Optional network to attach the container to
# network = "host"

# Extra environment passed to the container. ION_INDEXER_PG_DSN,
# TQDM_NCOLS=0 and TQDM_POSITION=-1 are always set and cannot be overridden.
# [detector.env]
# LOG_LEVEL = "debug"
"#;

fn create_default_config(config_path: &Path) -> Result<()> {
    fs::write(config_path, DEFAULT_CONFIG).context("Failed to write default config file")?;

    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub docker: DockerSettings,
    #[serde(default)]
    pub proxy: ProxySettings,
    #[serde(default)]
    pub detector: DetectorSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DockerSettings {
    /// Program followed by leading arguments
    pub command: Vec<String>,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            command: vec!["docker".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxySettings {
    pub image: String,
    pub host_port: u16,
    pub common_name: String,
    pub cert_days: u32,
    pub key_bits: u32,
    pub openssl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            image: "nginx:latest".to_string(),
            host_port: 443,
            common_name: "localhost".to_string(),
            cert_days: 365,
            key_bits: 2048,
            openssl: "openssl".to_string(),
            restart: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorSettings {
    pub image: String,
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    pub entrypoint: String,
    pub script: String,
    pub args: Vec<String>,
    pub restart: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Extra variables, added after the fixed detector environment
    pub env: BTreeMap<String, String>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            image: "ton-index-event-detector".to_string(),
            dockerfile: PathBuf::from("Dockerfile"),
            context: PathBuf::from("."),
            entrypoint: "python3".to_string(),
            script: "event_detector.py".to_string(),
            args: vec!["--verbose".to_string()],
            restart: "unless-stopped".to_string(),
            network: None,
            env: BTreeMap::new(),
        }
    }
}

/// Load configuration from config.toml in the configuration directory
pub fn load_config() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Ok(Config::default());
    }

    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read {} from {:?}", CONFIG_FILE_NAME, path))?;

    toml::from_str(&content).context(format!("Failed to parse {:?}", path))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_default_config_file_matches_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[docker]
command = ["sudo", "docker"]

[proxy]
host_port = 8443
"#,
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();

        assert_eq!(config.docker.command, vec!["sudo", "docker"]);
        assert_eq!(config.proxy.host_port, 8443);
        assert_eq!(config.proxy.common_name, "localhost");
        assert_eq!(config.proxy.cert_days, 365);
        assert_eq!(config.detector, DetectorSettings::default());
    }

    #[test]
    fn test_detector_defaults() {
        let settings = DetectorSettings::default();
        assert!(settings.env.is_empty());
        assert_eq!(settings.restart, "unless-stopped");
        assert_eq!(settings.args, vec!["--verbose"]);
    }

    #[test]
    fn test_detector_env_table_holds_extras() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[detector.env]
EXTRA = "1"
"#,
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();

        assert_eq!(config.detector.env.len(), 1);
        assert_eq!(config.detector.env.get("EXTRA"), Some(&"1".to_string()));
        assert_eq!(config.detector.image, "ton-index-event-detector");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[proxy]
upstream = "http://example:8080"
"#,
        );

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("unknown field"), "{err_msg}");
    }

    #[test]
    fn test_create_default_config_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        create_default_config(&path).unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.proxy.image, "nginx:latest");
    }
}
