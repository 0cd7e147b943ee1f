//! MIME type lookup from an `/etc/mime.types`-style table.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

/// Fallback table used when the configured mime.types file is unreadable.
const BUILTIN_TYPES: &[&str] = &[
    "text/html               html htm",
    "text/css                css",
    "text/plain              txt text",
    "text/javascript         js mjs",
    "application/json        json",
    "application/pdf         pdf",
    "application/xml         xml",
    "image/png               png",
    "image/jpeg              jpeg jpg",
    "image/gif               gif",
    "image/svg+xml           svg",
    "image/x-icon            ico",
];

#[derive(Debug, Clone)]
pub struct MimeTypes {
    types: HashMap<String, String>,
    default_type: String,
}

impl MimeTypes {
    /// Creates an empty table that answers every lookup with `default_type`.
    pub fn new(default_type: impl Into<String>) -> Self {
        Self {
            types: HashMap::new(),
            default_type: default_type.into(),
        }
    }

    /// Creates a table from the built-in extension map.
    pub fn builtin(default_type: impl Into<String>) -> Self {
        let mut table = Self::new(default_type);
        for line in BUILTIN_TYPES {
            table.add_line(line);
        }
        table
    }

    /// Reads a mime.types file.
    pub fn from_file(path: &Path, default_type: impl Into<String>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::parse(&contents, default_type))
    }

    /// Reads `path`, falling back to the built-in table if it can't be read.
    pub fn load(path: &Path, default_type: &str) -> Self {
        match Self::from_file(path, default_type) {
            Ok(table) => {
                tracing::debug!(path = %path.display(), entries = table.len(), "Loaded mime types");
                table
            }
            Err(e) => {
                tracing::warn!(error = %e, "Using built-in mime types");
                Self::builtin(default_type)
            }
        }
    }

    pub fn parse(contents: &str, default_type: impl Into<String>) -> Self {
        let mut table = Self::new(default_type);
        for line in contents.lines() {
            table.add_line(line);
        }
        table
    }

    /// Adds one `type ext ext ...` line; blank lines and comments are skipped.
    fn add_line(&mut self, line: &str) {
        let mut fields = line.split_whitespace();
        let Some(mime) = fields.next() else {
            return;
        };
        if mime.starts_with('#') {
            return;
        }
        for ext in fields {
            self.types.insert(ext.to_ascii_lowercase(), mime.to_string());
        }
    }

    /// Returns the content type for `path`, judged by its final extension.
    pub fn lookup(&self, path: &Path) -> &str {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.types.get(&ext.to_ascii_lowercase()))
            .unwrap_or(&self.default_type)
    }

    pub fn default_type(&self) -> &str {
        &self.default_type
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
