use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::handlers::error::ServeError;
use crate::http::mime::MimeTypes;
use crate::http::response::StatusCode;
use crate::http::writer::write_head;

/// Chunk size used when streaming file contents
const BUFFER_SIZE: usize = 8192;

/// Streams a regular file to the client behind a `200 OK` head.
///
/// No Content-Length is sent; the body ends when the connection closes.
/// The file may vanish between classification and open, which is reported
/// as `NotFound`. A failed write aborts the rest of the stream.
pub async fn serve_file<W>(
    stream: &mut W,
    path: &Path,
    mime: &MimeTypes,
) -> Result<StatusCode, ServeError>
where
    W: AsyncWrite + Unpin,
{
    let mut file = File::open(path)
        .await
        .map_err(|e| ServeError::NotFound(format!("{}: {e}", path.display())))?;

    let content_type = mime.lookup(path);
    tracing::debug!(path = %path.display(), content_type, "Serving file");

    write_head(stream, StatusCode::Ok, &[("Content-Type", content_type)])
        .await
        .map_err(|e| ServeError::internal("writing response head", e))?;

    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let n = file
            .read(&mut buffer)
            .await
            .map_err(|e| ServeError::internal("reading file", e))?;
        if n == 0 {
            break;
        }

        stream
            .write_all(&buffer[..n])
            .await
            .map_err(|e| ServeError::internal("writing file chunk", e))?;
    }

    stream
        .flush()
        .await
        .map_err(|e| ServeError::internal("flushing response", e))?;

    Ok(StatusCode::Ok)
}
