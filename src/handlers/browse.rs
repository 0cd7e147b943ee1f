use std::path::Path;

use askama::Template;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::handlers::error::ServeError;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub href: String,
}

#[derive(Template)]
#[template(path = "listing.html")]
struct ListingPage<'a> {
    uri: &'a str,
    entries: Vec<ListingEntry>,
}

/// Renders an HTML list of the directory's entries.
///
/// Any failure to read the directory is `NotFound`: listings are best-effort.
pub async fn serve_listing<W>(
    stream: &mut W,
    dir: &Path,
    uri: &str,
) -> Result<StatusCode, ServeError>
where
    W: AsyncWrite + Unpin,
{
    let names = list_entries(dir)
        .await
        .map_err(|e| ServeError::NotFound(format!("{}: {e}", dir.display())))?;

    let body = render_listing(uri, &names)?;

    ResponseWriter::new(&Response::html(body))
        .write_to_stream(stream)
        .await
        .map_err(|e| ServeError::internal("writing listing", e))?;
    stream
        .flush()
        .await
        .map_err(|e| ServeError::internal("flushing response", e))?;

    Ok(StatusCode::Ok)
}

/// Entry names in lexicographic order, with `..` but without `.`.
pub async fn list_entries(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = vec!["..".to_string()];

    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    names.sort();
    Ok(names)
}

pub fn render_listing(uri: &str, names: &[String]) -> Result<String, ServeError> {
    let entries: Vec<ListingEntry> = names
        .iter()
        .map(|name| ListingEntry {
            name: name.clone(),
            href: join_href(uri, name),
        })
        .collect();

    ListingPage { uri, entries }
        .render()
        .map_err(|e| ServeError::internal("rendering listing", e))
}

/// Appends the percent-encoded `name` to `uri` with exactly one slash
/// between them.
pub fn join_href(uri: &str, name: &str) -> String {
    let name = urlencoding::encode(name);
    if uri.ends_with('/') {
        format!("{uri}{name}")
    } else {
        format!("{uri}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_at_root_has_single_slash() {
        assert_eq!(join_href("/", "a.txt"), "/a.txt");
        assert_eq!(join_href("/sub", "a.txt"), "/sub/a.txt");
        assert_eq!(join_href("/sub/", "a.txt"), "/sub/a.txt");
    }

    #[test]
    fn href_encodes_reserved_characters() {
        assert_eq!(join_href("/", "a?b.txt"), "/a%3Fb.txt");
        assert_eq!(join_href("/", "c#1 %.txt"), "/c%231%20%25.txt");
        assert_eq!(join_href("/sub", ".."), "/sub/..");
    }
}
