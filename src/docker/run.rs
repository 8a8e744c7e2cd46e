//! `docker run` argument construction

use std::path::PathBuf;

/// Label marking containers started by indexer-ops
pub const SERVICE_LABEL: &str = "com.indexer-ops.service";

/// Description of a detached container to start
#[derive(Debug, Clone, PartialEq)]
pub struct RunSpec {
    pub name: String,
    pub image: String,
    pub restart: Option<String>,
    /// (host port, container port)
    pub ports: Vec<(u16, u16)>,
    /// Read-only bind mounts: (host path, container path)
    pub mounts: Vec<(PathBuf, String)>,
    pub env: Vec<(String, String)>,
    pub network: Option<String>,
    pub entrypoint: Option<String>,
    pub labels: Vec<(String, String)>,
    /// Arguments after the image name
    pub command: Vec<String>,
}

impl RunSpec {
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            restart: None,
            ports: Vec::new(),
            mounts: Vec::new(),
            env: Vec::new(),
            network: None,
            entrypoint: None,
            labels: Vec::new(),
            command: Vec::new(),
        }
    }

    pub fn service(mut self, service: &str) -> Self {
        self.labels
            .push((SERVICE_LABEL.to_string(), service.to_string()));
        self
    }

    pub fn restart(mut self, policy: Option<&str>) -> Self {
        self.restart = policy.map(|p| p.to_string());
        self
    }

    pub fn publish(mut self, host: u16, container: u16) -> Self {
        self.ports.push((host, container));
        self
    }

    pub fn mount_ro(mut self, host: PathBuf, container: &str) -> Self {
        self.mounts.push((host, container.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn network(mut self, network: Option<&str>) -> Self {
        self.network = network.map(|n| n.to_string());
        self
    }

    pub fn entrypoint(mut self, entrypoint: &str) -> Self {
        self.entrypoint = Some(entrypoint.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments for the runtime, starting with `run`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];

        if let Some(policy) = &self.restart {
            args.push("--restart".to_string());
            args.push(policy.clone());
        }

        for (host, container) in &self.ports {
            args.push("-p".to_string());
            args.push(format!("{}:{}", host, container));
        }

        for (host, container) in &self.mounts {
            args.push("-v".to_string());
            args.push(format!("{}:{}:ro", host.display(), container));
        }

        for (key, value) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }

        if let Some(network) = &self.network {
            args.push("--network".to_string());
            args.push(network.clone());
        }

        for (key, value) in &self.labels {
            args.push("--label".to_string());
            args.push(format!("{}={}", key, value));
        }

        if let Some(entrypoint) = &self.entrypoint {
            args.push("--entrypoint".to_string());
            args.push(entrypoint.clone());
        }

        args.push(self.image.clone());
        args.extend(self.command.iter().cloned());

        args
    }
}
