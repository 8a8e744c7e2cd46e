//! TLS reverse proxy module
//!
//! This module bootstraps an nginx container terminating HTTPS in front of
//! a plain HTTP upstream:
//! - nginx.conf generation
//! - Self-signed certificate generation
//! - Container lifecycle (up, down, status, logs)

pub mod cert;
pub mod manager;
pub mod nginx;

/// Service label value for proxy containers
pub const PROXY_SERVICE: &str = "proxy";
