use std::fmt;

use crate::http::request::{Header, Request};

/// Upper bound on the size of a request head (request line plus headers).
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// More bytes are needed before the head is complete
    Incomplete,
    MissingMethod,
    MissingUri,
    /// Target does not start with `/`
    InvalidUri(String),
    /// Header line without a colon, or with an empty name
    InvalidHeader(String),
    HeadersTooLarge,
    InvalidEncoding,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Incomplete => write!(f, "incomplete request head"),
            ParseError::MissingMethod => write!(f, "request line has no method"),
            ParseError::MissingUri => write!(f, "request line has no target"),
            ParseError::InvalidUri(uri) => write!(f, "request target {uri:?} is not absolute"),
            ParseError::InvalidHeader(line) => write!(f, "malformed header line {line:?}"),
            ParseError::HeadersTooLarge => {
                write!(f, "request head exceeds {MAX_HEAD_SIZE} bytes")
            }
            ParseError::InvalidEncoding => write!(f, "request head is not valid UTF-8"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a request head out of `buf`.
///
/// The head ends at the first blank line. When `eof` is set the peer has
/// stopped sending, so whatever is buffered is taken as the whole head.
/// Returns the request and the number of bytes consumed.
pub fn parse_request_head(buf: &[u8], eof: bool) -> Result<(Request, usize), ParseError> {
    let (head_len, consumed) = match find_head_end(buf) {
        Some(bounds) => bounds,
        None if buf.len() > MAX_HEAD_SIZE => return Err(ParseError::HeadersTooLarge),
        None if eof => (buf.len(), buf.len()),
        None => return Err(ParseError::Incomplete),
    };

    if head_len > MAX_HEAD_SIZE {
        return Err(ParseError::HeadersTooLarge);
    }

    let head = std::str::from_utf8(&buf[..head_len]).map_err(|_| ParseError::InvalidEncoding)?;
    let mut lines = head
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));

    let mut request = parse_request_line(lines.next().unwrap_or_default())?;

    for line in lines {
        if line.is_empty() {
            break;
        }
        request.headers.push(parse_header(line)?);
    }

    Ok((request, consumed))
}

/// Splits `METHOD SP TARGET SP VERSION` on single spaces.
pub fn parse_request_line(line: &str) -> Result<Request, ParseError> {
    let mut parts = line.split(' ');

    let method = parts
        .next()
        .filter(|m| !m.is_empty())
        .ok_or(ParseError::MissingMethod)?;
    let target = parts
        .next()
        .map(str::trim_end)
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::MissingUri)?;
    let version = parts
        .next()
        .map(str::trim_end)
        .filter(|v| !v.is_empty());

    let (uri, query) = match target.split_once('?') {
        Some((uri, query)) => (uri, Some(query.trim_end().to_string())),
        None => (target, None),
    };

    if !uri.starts_with('/') {
        return Err(ParseError::InvalidUri(uri.to_string()));
    }

    Ok(Request {
        method: method.to_string(),
        uri: uri.to_string(),
        query,
        version: version.map(str::to_string),
        ..Request::default()
    })
}

/// Splits a header line at its first colon, trimming both halves.
pub fn parse_header(line: &str) -> Result<Header, ParseError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::InvalidHeader(line.to_string()));
    }

    Ok(Header::new(name, value.trim()))
}

/// Locates the blank line ending the head.
///
/// Returns the length of the head (without the blank line) and the number
/// of bytes up to and including the blank line. Lines may end in `\n` or
/// `\r\n`; the first line is never treated as the terminator.
fn find_head_end(buf: &[u8]) -> Option<(usize, usize)> {
    let mut start = 0;
    let mut first = true;

    while let Some(pos) = buf[start..].iter().position(|&b| b == b'\n') {
        let end = start + pos;
        let line = &buf[start..end];
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if line.is_empty() && !first {
            return Some((start, end + 1));
        }

        first = false;
        start = end + 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.0\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_request_head(req, false).unwrap();

        assert_eq!(parsed.uri, "/");
        assert_eq!(parsed.header("Host"), Some("example.com"));
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn head_end_accepts_bare_newlines() {
        let req = b"GET / HTTP/1.0\nA: b\n\nleftover";

        assert_eq!(find_head_end(req), Some((20, 21)));
    }
}
