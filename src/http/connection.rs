use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::handlers::cgi::{self, CgiContext};
use crate::handlers::error::{respond_error, ServeError};
use crate::handlers::resolve::{classify, resolve_path, Resource};
use crate::handlers::{browse, static_file};
use crate::http::parser::{parse_request_head, ParseError};
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::TrackedWriter;
use crate::server::ServerContext;

/// Drives one accepted connection through a single request/response exchange.
pub struct Connection<S> {
    stream: TrackedWriter<S>,
    peer: SocketAddr,
    ctx: Arc<ServerContext>,
    buffer: BytesMut,
    eof: bool,
    state: ConnectionState,
}

pub enum ConnectionState {
    Parsing,
    Resolving(Request),
    Dispatching(Request, Resource),
    ErrorResponding(Option<Request>, ServeError),
    Responding(Option<Request>, StatusCode),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, ctx: Arc<ServerContext>) -> Self {
        Self {
            stream: TrackedWriter::new(stream),
            peer,
            ctx,
            buffer: BytesMut::with_capacity(4096),
            eof: false,
            state: ConnectionState::Parsing,
        }
    }

    /// Runs the exchange to completion and closes the connection.
    ///
    /// Returns the status that was logged for the request.
    pub async fn run(mut self) -> StatusCode {
        let mut outcome = StatusCode::InternalServerError;

        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Parsing => match self.read_request().await {
                    Ok(mut req) => {
                        req.set_peer(self.peer);
                        tracing::debug!(
                            method = %req.method,
                            uri = %req.uri,
                            query = ?req.query,
                            headers = req.headers.len(),
                            "Parsed request"
                        );
                        for h in &req.headers {
                            tracing::debug!(name = %h.name, value = %h.value, "Request header");
                        }
                        ConnectionState::Resolving(req)
                    }
                    Err(e) => ConnectionState::ErrorResponding(None, e),
                },

                ConnectionState::Resolving(mut req) => {
                    match self.resolve(&req).await {
                        Ok((path, kind)) => {
                            tracing::debug!(path = %path.display(), ?kind, "Resolved request path");
                            req.path = Some(path);
                            ConnectionState::Dispatching(req, kind)
                        }
                        Err(e) => ConnectionState::ErrorResponding(Some(req), e),
                    }
                }

                ConnectionState::Dispatching(req, kind) => match self.dispatch(&req, kind).await {
                    Ok(status) => ConnectionState::Responding(Some(req), status),
                    Err(e) => ConnectionState::ErrorResponding(Some(req), e),
                },

                ConnectionState::ErrorResponding(req, err) => {
                    let status = err.status();
                    let (method, uri) = describe(req.as_ref());

                    if status == StatusCode::InternalServerError {
                        tracing::error!(
                            method,
                            uri,
                            status = status.as_u16(),
                            error = %err,
                            "Request failed"
                        );
                    } else {
                        tracing::debug!(
                            method,
                            uri,
                            status = status.as_u16(),
                            error = %err,
                            "Request failed"
                        );
                    }

                    if self.stream.is_committed() {
                        tracing::warn!(
                            method,
                            uri,
                            bytes = self.stream.bytes_written(),
                            "Response already started, closing without error page"
                        );
                    } else {
                        respond_error(&mut self.stream, status).await;
                    }

                    ConnectionState::Responding(req, status)
                }

                ConnectionState::Responding(req, status) => {
                    if let Err(e) = self.stream.flush().await {
                        tracing::debug!(error = %e, "Failed to flush connection");
                    }

                    let (method, uri) = describe(req.as_ref());
                    tracing::info!(
                        peer = %self.peer,
                        method,
                        uri,
                        status = status.as_u16(),
                        "{}",
                        status.reason_phrase()
                    );

                    outcome = status;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => {
                    break;
                }
            };
        }

        let mut stream = self.stream.into_inner();
        if let Err(e) = stream.shutdown().await {
            tracing::debug!(error = %e, "Failed to shut down connection");
        }

        outcome
    }

    /// Reads until a full request head is buffered or the peer stops sending.
    pub async fn read_request(&mut self) -> Result<Request, ServeError> {
        loop {
            match parse_request_head(&self.buffer, self.eof) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(request);
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Err(e.into()),
            }

            let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;
            if n == 0 {
                self.eof = true;
            }
        }
    }

    async fn resolve(&self, req: &Request) -> Result<(std::path::PathBuf, Resource), ServeError> {
        let path = resolve_path(&self.ctx.root, &req.uri).await?;
        let kind = classify(&path).await?;
        Ok((path, kind))
    }

    async fn dispatch(&mut self, req: &Request, kind: Resource) -> Result<StatusCode, ServeError> {
        let path = req
            .path
            .as_deref()
            .ok_or_else(|| ServeError::Internal("dispatching unresolved request".to_string()))?;

        match kind {
            Resource::Directory => browse::serve_listing(&mut self.stream, path, &req.uri).await,
            Resource::Executable => {
                let ctx = CgiContext {
                    document_root: &self.ctx.root,
                    server_port: self.ctx.config.port,
                };
                cgi::serve_cgi(&mut self.stream, req, path, ctx).await
            }
            Resource::Readable => {
                static_file::serve_file(&mut self.stream, path, &self.ctx.mime).await
            }
        }
    }
}

fn describe(req: Option<&Request>) -> (&str, &str) {
    match req {
        Some(req) => (req.method.as_str(), req.uri.as_str()),
        None => ("-", "-"),
    }
}
