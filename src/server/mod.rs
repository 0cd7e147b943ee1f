//! Connection acceptance and worker isolation.
//!
//! - **`listener`**: The acceptor loop; never touches request data
//! - **`worker`**: Runs one connection in its own task, containing panics

pub mod listener;
pub mod worker;

use std::path::PathBuf;

use crate::config::Config;
use crate::http::mime::MimeTypes;

/// Read-only state every worker receives.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub config: Config,
    /// Canonical document root
    pub root: PathBuf,
    pub mime: MimeTypes,
}

impl ServerContext {
    /// Resolves the document root and loads the mime table.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let root = config.canonical_root()?;
        let mime = MimeTypes::load(&config.mime_types_path, &config.default_mime_type);
        Ok(Self { config, root, mime })
    }
}
