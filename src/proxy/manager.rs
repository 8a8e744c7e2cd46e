use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;

use super::{
    PROXY_SERVICE,
    cert::{CertRequest, KeyPair},
    nginx,
};
use crate::{
    config::Config,
    docker::{Docker, RunSpec, inspect},
};

/// Per-invocation overrides for `proxy up`
#[derive(Debug, Clone)]
pub struct UpOptions {
    pub out_dir: PathBuf,
    pub port: Option<u16>,
    pub image: Option<String>,
    /// Force-remove an existing container with the same name first
    pub replace: bool,
}

impl Default for UpOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            port: None,
            image: None,
            replace: false,
        }
    }
}

fn run_spec(
    name: &str,
    image: &str,
    host_port: u16,
    restart: Option<&str>,
    config_file: &Path,
    pair: &KeyPair,
) -> RunSpec {
    RunSpec::new(name, image)
        .restart(restart)
        .publish(host_port, nginx::TLS_PORT)
        .mount_ro(config_file.to_path_buf(), nginx::CONTAINER_CONFIG_PATH)
        .mount_ro(pair.cert.clone(), nginx::CONTAINER_CERT_PATH)
        .mount_ro(pair.key.clone(), nginx::CONTAINER_KEY_PATH)
        .service(PROXY_SERVICE)
}

/// Generate nginx.conf and a fresh key pair, then start the proxy container
pub fn up(
    config: &Config,
    docker: &Docker,
    name: &str,
    upstream: &str,
    options: &UpOptions,
) -> Result<()> {
    let settings = &config.proxy;
    let host_port = options.port.unwrap_or(settings.host_port);
    let image = options.image.as_deref().unwrap_or(&settings.image);

    println!(
        "{} {} -> {}",
        "Bootstrapping TLS proxy".blue(),
        format!("https://localhost:{}", host_port).bright_white(),
        upstream.bright_white()
    );

    fs::create_dir_all(&options.out_dir).context("Failed to create output directory")?;
    // Bind mounts need absolute host paths
    let out_dir = options
        .out_dir
        .canonicalize()
        .context(format!("Failed to resolve {:?}", options.out_dir))?;

    let config_file = nginx::write(&out_dir, upstream)?;
    let pair = CertRequest::from_settings(settings).generate(&out_dir)?;

    if options.replace && docker.container_exists(name)? {
        docker.remove_force(name)?;
    }

    let spec = run_spec(
        name,
        image,
        host_port,
        settings.restart.as_deref(),
        &config_file,
        &pair,
    );
    docker.run(&spec)?;

    println!("{}", "✓ Proxy started".green());
    println!();
    println!("  Container: {}", name.bright_white());
    println!("  Listening: https://localhost:{}", host_port);
    println!("  Upstream:  {}", upstream);

    Ok(())
}

/// Force-remove the proxy container
pub fn down(docker: &Docker, name: &str) -> Result<()> {
    if !docker.container_exists(name)? {
        println!(
            "{} Proxy container {} not found",
            "⚠".yellow(),
            name.bright_white()
        );
        return Ok(());
    }

    docker.remove_force(name)?;

    println!("{} Proxy {} removed", "✓".green(), name.bright_white());

    Ok(())
}

/// Show proxy container status
pub fn status(docker: &Docker, name: &str) -> Result<()> {
    println!("{} {}", "Proxy Status:".blue(), name.bright_white());
    println!();

    match docker.inspect(name)? {
        Some(state) => inspect::print_summary(&state),
        None => {
            println!("  Status: {}", "Not found".red());
            println!();
            println!(
                "Start it with: {}",
                format!("idxops proxy up {} <UPSTREAM_URL>", name).bright_white()
            );
        }
    }

    Ok(())
}

/// Show proxy container logs
pub fn logs(docker: &Docker, name: &str, follow: bool) -> Result<()> {
    if !docker.container_exists(name)? {
        println!(
            "{} Proxy container {} not found",
            "⚠".yellow(),
            name.bright_white()
        );
        return Ok(());
    }

    if !docker.is_running(name)? {
        println!(
            "{} Proxy container {} is not running, showing its last logs",
            "⚠".yellow(),
            name.bright_white()
        );
    }

    docker.logs(name, follow)
}

#[cfg(test)]
mod tests {
    use std::process::Command;

    use super::*;
    use crate::docker::testing::FakeDocker;

    fn openssl_available() -> bool {
        Command::new("openssl")
            .arg("version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_run_spec_binds_generated_files() {
        let pair = KeyPair {
            cert: PathBuf::from("/work/cert.pem"),
            key: PathBuf::from("/work/key.pem"),
        };
        let spec = run_spec(
            "proxy1",
            "nginx:latest",
            443,
            None,
            Path::new("/work/nginx.conf"),
            &pair,
        );

        let args = spec.to_args().join(" ");
        assert!(args.starts_with("run -d --name proxy1 -p 443:443"));
        assert!(args.contains("-v /work/nginx.conf:/etc/nginx/nginx.conf:ro"));
        assert!(args.contains("-v /work/cert.pem:/etc/nginx/cert.pem:ro"));
        assert!(args.contains("-v /work/key.pem:/etc/nginx/key.pem:ro"));
        assert!(!args.contains("--restart"));
        assert!(args.ends_with("nginx:latest"));
    }

    #[test]
    fn test_up_does_not_touch_existing_container_by_default() {
        if !openssl_available() {
            eprintln!("openssl not available, skipping");
            return;
        }

        let fake = FakeDocker::new(&["proxy1"], None);
        let out = fake.dir.path().join("proxy");
        let options = UpOptions {
            out_dir: out.clone(),
            ..UpOptions::default()
        };

        up(
            &Config::default(),
            &fake.docker(),
            "proxy1",
            "http://example:8080",
            &options,
        )
        .unwrap();

        let conf = fs::read_to_string(out.join(nginx::CONFIG_FILE)).unwrap();
        assert!(conf.contains("proxy_pass http://example:8080;"));
        assert!(out.join("cert.pem").exists());
        assert!(out.join("key.pem").exists());

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("run -d --name proxy1 -p 443:443"));
    }

    #[test]
    fn test_up_with_replace_removes_first() {
        if !openssl_available() {
            eprintln!("openssl not available, skipping");
            return;
        }

        let fake = FakeDocker::new(&["proxy1"], None);
        let options = UpOptions {
            out_dir: fake.dir.path().to_path_buf(),
            port: Some(8443),
            replace: true,
            ..UpOptions::default()
        };

        up(
            &Config::default(),
            &fake.docker(),
            "proxy1",
            "http://example:8080",
            &options,
        )
        .unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("ps -a"));
        assert_eq!(calls[1], "rm -f proxy1");
        assert!(calls[2].starts_with("run -d --name proxy1 -p 8443:443"));
    }

    #[test]
    fn test_down_missing_container_is_noop() {
        let fake = FakeDocker::new(&[], None);
        down(&fake.docker(), "proxy1").unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("ps -a"));
    }

    #[test]
    fn test_logs_checks_running_state() {
        let fake = FakeDocker::new(&["proxy1"], None);

        logs(&fake.docker(), "proxy1", true).unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], "ps --filter name=^proxy1$ --format {{.Names}}");
        assert_eq!(calls[2], "logs -f proxy1");
    }
}
