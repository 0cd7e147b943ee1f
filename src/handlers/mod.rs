//! Content handlers.
//!
//! A resolved request is served by exactly one of:
//!
//! - **`static_file`**: streams a readable file verbatim
//! - **`browse`**: renders an HTML listing of a directory
//! - **`cgi`**: runs an executable and relays its stdout
//!
//! `resolve` decides which one applies and `error` turns any failure into a
//! status-coded HTML page.

pub mod browse;
pub mod cgi;
pub mod error;
pub mod resolve;
pub mod static_file;

pub use error::{respond_error, ServeError};
pub use resolve::{classify, resolve_path, Resource};
