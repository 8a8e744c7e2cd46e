//! Event detector deployment module
//!
//! The detector is an opaque image built from a local Dockerfile. This module
//! only manages its container: build, replace, status and logs.

pub mod dsn;
pub mod launcher;

/// Environment variable carrying the PostgreSQL connection string
pub const DSN_ENV: &str = "ION_INDEXER_PG_DSN";

/// Progress-bar tuning always passed to the detector
pub const PROGRESS_ENV: &[(&str, &str)] = &[("TQDM_NCOLS", "0"), ("TQDM_POSITION", "-1")];

/// Variables set by indexer-ops itself; `[detector.env]` cannot override them
pub fn is_reserved_env(key: &str) -> bool {
    key == DSN_ENV || PROGRESS_ENV.iter().any(|(reserved, _)| *reserved == key)
}

/// Service label value for detector containers
pub const DETECTOR_SERVICE: &str = "event-detector";
