//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.0 side of the server: one request and
//! one response per connection, after which the connection is closed.
//!
//! # Architecture
//!
//! - **`connection`**: Drives a single exchange through its state machine
//! - **`parser`**: Parses the request line and headers from a byte buffer
//! - **`request`**: HTTP request representation
//! - **`response`**: Status codes and buffered responses with a builder
//! - **`writer`**: Serializes and writes responses to the client
//! - **`mime`**: MIME type lookup from a mime.types table
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Parsing   │ ← Read request line and headers
//!        └──────┬──────┘
//!               │ Request parsed
//!               ▼
//!        ┌─────────────┐
//!        │  Resolving  │ ← Map URI under the document root
//!        └──────┬──────┘
//!               │ Path and resource kind known
//!               ▼
//!        ┌─────────────┐
//!        │ Dispatching │ ← Static file, directory listing, or CGI
//!        └──────┬──────┘
//!               │ Handler finished
//!               ▼
//!        ┌─────────────┐
//!        │ Responding  │ ← Flush and log method/URI/status
//!        └──────┬──────┘
//!               ▼
//!            Closed
//! ```
//!
//! A failure in any state moves to `ErrorResponding`, which writes a single
//! error page (unless the response was already started) and then continues
//! to `Responding`.

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
