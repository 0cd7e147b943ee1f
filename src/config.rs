//! Server configuration.
//!
//! Built once at startup from defaults, an optional YAML file, and then
//! command-line flags (each also readable from a `SPIDEY_*` variable).
//! The result is shared read-only with every worker.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// How accepted connections are scheduled onto workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    /// One connection at a time; the acceptor waits for each worker
    Single,
    /// Every connection gets its own detached worker
    Forking,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub root: PathBuf,
    pub mime_types_path: PathBuf,
    pub default_mime_type: String,
    pub mode: ConcurrencyMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9898,
            root: PathBuf::from("www"),
            mime_types_path: PathBuf::from("/etc/mime.types"),
            default_mime_type: "text/plain".to_string(),
            mode: ConcurrencyMode::Forking,
        }
    }
}

/// Command-line flags. Anything left unset keeps the file/default value.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "spidey", version, about = "Simple forking HTTP/1.0 server with CGI support")]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, env = "SPIDEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Concurrency mode
    #[arg(short = 'c', long, value_enum, ignore_case = true, env = "SPIDEY_MODE")]
    pub mode: Option<ConcurrencyMode>,

    /// Path to the mime.types file
    #[arg(short = 'm', long = "mime-types", env = "SPIDEY_MIME_TYPES")]
    pub mime_types_path: Option<PathBuf>,

    /// Content type for unknown extensions
    #[arg(short = 'M', long = "default-mime-type", env = "SPIDEY_DEFAULT_MIME_TYPE")]
    pub default_mime_type: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, env = "SPIDEY_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "SPIDEY_HOST")]
    pub host: Option<String>,

    /// Document root
    #[arg(short = 'r', long, env = "SPIDEY_ROOT")]
    pub root: Option<PathBuf>,
}

impl Config {
    /// Reads a YAML config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Builds the effective configuration for the given flags.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut cfg = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        cfg.apply(cli);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Overlays every flag that was given.
    pub fn apply(&mut self, cli: &Cli) {
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(path) = &cli.mime_types_path {
            self.mime_types_path = path.clone();
        }
        if let Some(default_type) = &cli.default_mime_type {
            self.default_mime_type = default_type.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(root) = &cli.root {
            self.root = root.clone();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be between 1 and 65535");
        }
        if self.default_mime_type.trim().is_empty() {
            anyhow::bail!("default mime type must not be empty");
        }
        Ok(())
    }

    /// Address to bind, as `host:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Canonical absolute path of the document root.
    pub fn canonical_root(&self) -> anyhow::Result<PathBuf> {
        std::fs::canonicalize(&self.root).with_context(|| {
            format!("root directory {} could not be resolved", self.root.display())
        })
    }
}
