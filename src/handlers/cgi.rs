//! CGI execution.
//!
//! The script runs as a child process with the request exported through its
//! environment. Whatever it prints on stdout, headers included, is relayed to
//! the client untouched. Variables are set on the child's `Command` only, so
//! nothing leaks into the server's environment or into other requests. The
//! child starts from an empty environment: apart from the CGI variables it
//! only inherits `PATH`.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

use crate::handlers::error::ServeError;
use crate::http::request::Request;
use crate::http::response::StatusCode;

const SERVER_SOFTWARE: &str = concat!("spidey/", env!("CARGO_PKG_VERSION"));

/// Server variables passed through to scripts.
const INHERITED_VARS: &[&str] = &["PATH"];

/// Server-side values exported alongside the request.
#[derive(Debug, Clone, Copy)]
pub struct CgiContext<'a> {
    pub document_root: &'a Path,
    pub server_port: u16,
}

/// Builds the variables exported to a CGI script.
///
/// Absent request fields export as empty strings. Every header becomes
/// `HTTP_<NAME>`; when a header repeats, the last value wins.
pub fn cgi_environment(
    request: &Request,
    script: &Path,
    ctx: CgiContext<'_>,
) -> Vec<(String, String)> {
    let mut env = vec![
        ("DOCUMENT_ROOT".to_string(), ctx.document_root.display().to_string()),
        ("GATEWAY_INTERFACE".to_string(), "CGI/1.1".to_string()),
        ("QUERY_STRING".to_string(), request.query.clone().unwrap_or_default()),
        ("REMOTE_ADDR".to_string(), request.peer_host.clone()),
        ("REMOTE_PORT".to_string(), request.peer_port.clone()),
        ("REQUEST_METHOD".to_string(), request.method.clone()),
        ("REQUEST_URI".to_string(), request.uri.clone()),
        ("SCRIPT_FILENAME".to_string(), script.display().to_string()),
        ("SERVER_PORT".to_string(), ctx.server_port.to_string()),
        ("SERVER_PROTOCOL".to_string(), request.protocol().to_string()),
        ("SERVER_SOFTWARE".to_string(), SERVER_SOFTWARE.to_string()),
    ];

    env.extend(
        request
            .headers
            .iter()
            .map(|h| (header_env_name(&h.name), h.value.clone())),
    );

    env
}

fn inherited_environment() -> impl Iterator<Item = (&'static str, String)> {
    INHERITED_VARS
        .iter()
        .filter_map(|&name| std::env::var(name).ok().map(|value| (name, value)))
}

/// `User-Agent` becomes `HTTP_USER_AGENT`; anything not alphanumeric maps to `_`.
pub fn header_env_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 5);
    out.push_str("HTTP_");
    out.extend(name.chars().map(|c| {
        if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        }
    }));
    out
}

/// Runs `script` and copies its stdout to the client.
///
/// Only a failure to start the script is an error the client can still see.
/// The exit status is logged; by then the output has already been sent.
pub async fn serve_cgi<W>(
    stream: &mut W,
    request: &Request,
    script: &Path,
    ctx: CgiContext<'_>,
) -> Result<StatusCode, ServeError>
where
    W: AsyncWrite + Unpin,
{
    let mut command = Command::new(script);
    command
        .env_clear()
        .envs(inherited_environment())
        .envs(cgi_environment(request, script, ctx))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    if let Some(dir) = script.parent() {
        command.current_dir(dir);
    }

    let mut child = command
        .spawn()
        .map_err(|e| ServeError::internal("spawning CGI script", e))?;
    tracing::debug!(script = %script.display(), pid = child.id(), "Spawned CGI script");

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| ServeError::Internal("CGI stdout not captured".to_string()))?;

    let copied = tokio::io::copy(&mut stdout, stream).await;
    let copied = match copied {
        Ok(n) => n,
        Err(e) => {
            if let Err(kill_err) = child.kill().await {
                tracing::debug!(error = %kill_err, "Failed to kill CGI script");
            }
            return Err(ServeError::internal("relaying CGI output", e));
        }
    };

    stream
        .flush()
        .await
        .map_err(|e| ServeError::internal("flushing response", e))?;

    match child.wait().await {
        Ok(status) if status.success() => {
            tracing::debug!(script = %script.display(), bytes = copied, "CGI script finished");
        }
        Ok(status) => {
            tracing::warn!(
                script = %script.display(),
                %status,
                bytes = copied,
                "CGI script exited unsuccessfully"
            );
        }
        Err(e) => {
            tracing::warn!(script = %script.display(), error = %e, "Failed to reap CGI script");
        }
    }

    Ok(StatusCode::Ok)
}
