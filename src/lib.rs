//! Spidey - a small forking HTTP/1.0 server.
//!
//! Serves static files, lists directories, and runs CGI scripts from a
//! document root, one isolated worker per accepted connection.

pub mod config;
pub mod handlers;
pub mod http;
pub mod server;
