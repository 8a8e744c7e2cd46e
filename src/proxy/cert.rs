//! Self-signed certificate generation
//!
//! A fresh key pair is generated with openssl on every call; nothing is reused.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::ProxySettings;

pub const CERT_FILE: &str = "cert.pem";
pub const KEY_FILE: &str = "key.pem";

/// Generated certificate and private key
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Parameters for a self-signed certificate
#[derive(Debug, Clone)]
pub struct CertRequest {
    pub openssl: String,
    pub common_name: String,
    pub days: u32,
    pub key_bits: u32,
}

impl CertRequest {
    pub fn from_settings(settings: &ProxySettings) -> Self {
        Self {
            openssl: settings.openssl.clone(),
            common_name: settings.common_name.clone(),
            days: settings.cert_days,
            key_bits: settings.key_bits,
        }
    }

    fn args(&self, cert: &Path, key: &Path) -> Vec<String> {
        vec![
            "req".to_string(),
            "-x509".to_string(),
            "-newkey".to_string(),
            format!("rsa:{}", self.key_bits),
            "-nodes".to_string(),
            "-keyout".to_string(),
            key.display().to_string(),
            "-out".to_string(),
            cert.display().to_string(),
            "-days".to_string(),
            self.days.to_string(),
            "-subj".to_string(),
            format!("/CN={}", self.common_name),
        ]
    }

    /// Generate cert.pem and key.pem in `dir`, overwriting existing files
    pub fn generate(&self, dir: &Path) -> Result<KeyPair> {
        println!(
            "{} Generating self-signed certificate for {} ({} days)...",
            "ℹ".blue(),
            self.common_name.bright_white(),
            self.days
        );

        let pair = KeyPair {
            cert: dir.join(CERT_FILE),
            key: dir.join(KEY_FILE),
        };

        let output = Command::new(&self.openssl)
            .args(self.args(&pair.cert, &pair.key))
            .output()
            .context(format!(
                "Failed to run {}. Make sure openssl is installed.",
                self.openssl
            ))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Certificate generation failed: {}", error.trim());
        }

        println!(
            "{} Certificate generated: {} and {}",
            "✓".green(),
            pair.cert.display(),
            pair.key.display()
        );

        Ok(pair)
    }
}
