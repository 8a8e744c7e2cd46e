//! nginx configuration generation for the TLS proxy

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;

/// Generated configuration file name
pub const CONFIG_FILE: &str = "nginx.conf";

/// Paths inside the nginx container
pub const CONTAINER_CONFIG_PATH: &str = "/etc/nginx/nginx.conf";
pub const CONTAINER_CERT_PATH: &str = "/etc/nginx/cert.pem";
pub const CONTAINER_KEY_PATH: &str = "/etc/nginx/key.pem";

/// Port nginx listens on inside the container
pub const TLS_PORT: u16 = 443;

/// Render a reverse-proxy config terminating TLS and forwarding to `upstream`.
///
/// The upstream is inserted verbatim.
pub fn render(upstream: &str, generated_at: DateTime<Local>) -> String {
    format!(
        r#"# Auto-generated by indexer-ops at {timestamp}
# Upstream: {upstream}

events {{}}

http {{
    server {{
        listen {port} ssl;
        server_name _;

        ssl_certificate     {cert};
        ssl_certificate_key {key};

        location / {{
            proxy_pass {upstream};
            proxy_set_header Host $host;
            proxy_set_header X-Real-IP $remote_addr;
            proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
            proxy_set_header X-Forwarded-Proto $scheme;
        }}
    }}
}}
"#,
        timestamp = generated_at.format("%Y-%m-%d %H:%M:%S"),
        upstream = upstream,
        port = TLS_PORT,
        cert = CONTAINER_CERT_PATH,
        key = CONTAINER_KEY_PATH,
    )
}

/// Write nginx.conf into `dir`, replacing any previous file
pub fn write(dir: &Path, upstream: &str) -> Result<PathBuf> {
    println!("{} Generating {}...", "ℹ".blue(), CONFIG_FILE);

    let path = dir.join(CONFIG_FILE);
    fs::write(&path, render(upstream, Local::now()))
        .context(format!("Failed to write {:?}", path))?;

    println!("{} Generated {:?}", "✓".green(), path);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_render_contains_upstream() {
        let conf = render("http://example:8080", fixed_time());

        assert!(conf.contains("proxy_pass http://example:8080;"));
        assert!(conf.contains("listen 443 ssl;"));
        assert!(conf.contains("ssl_certificate     /etc/nginx/cert.pem;"));
        assert!(conf.contains("ssl_certificate_key /etc/nginx/key.pem;"));
        assert!(conf.contains("2026-10-16 12:00:00"));
    }

    #[test]
    fn test_render_forwards_headers() {
        let conf = render("http://api:8081", fixed_time());

        for header in ["Host", "X-Real-IP", "X-Forwarded-For", "X-Forwarded-Proto"] {
            assert!(
                conf.contains(&format!("proxy_set_header {} ", header)),
                "missing {header}"
            );
        }
    }

    #[test]
    fn test_upstream_is_not_escaped() {
        let conf = render("http://example:8080/api; # raw", fixed_time());
        assert!(conf.contains("proxy_pass http://example:8080/api; # raw;"));
    }

    #[test]
    fn test_write_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();

        write(dir.path(), "http://first:1").unwrap();
        let path = write(dir.path(), "http://second:2").unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("proxy_pass http://second:2;"));
        assert!(!content.contains("first"));
    }
}
