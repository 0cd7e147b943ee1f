use spidey::http::parser::{
    parse_header, parse_request_head, parse_request_line, ParseError, MAX_HEAD_SIZE,
};
use spidey::http::request::Header;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.0\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_request_head(req, false).unwrap();

    assert_eq!(parsed.method, "GET");
    assert_eq!(parsed.uri, "/");
    assert_eq!(parsed.query, None);
    assert_eq!(parsed.version.as_deref(), Some("HTTP/1.0"));
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_splits_query_at_first_question_mark() {
    let req = b"GET /scripts/env.cgi?x=1&y=a?b HTTP/1.0\r\n\r\n";
    let (parsed, _) = parse_request_head(req, false).unwrap();

    assert_eq!(parsed.uri, "/scripts/env.cgi");
    assert_eq!(parsed.query.as_deref(), Some("x=1&y=a?b"));
}

#[test]
fn test_parse_empty_query_is_present() {
    let (parsed, _) = parse_request_head(b"GET /x? HTTP/1.0\r\n\r\n", false).unwrap();

    assert_eq!(parsed.uri, "/x");
    assert_eq!(parsed.query.as_deref(), Some(""));
}

#[test]
fn test_parse_method_is_case_sensitive_token() {
    for method in ["GET", "get", "POST", "BREW"] {
        let req = format!("{method} /a HTTP/1.0\r\n\r\n");
        let (parsed, _) = parse_request_head(req.as_bytes(), false).unwrap();
        assert_eq!(parsed.method, method);
    }
}

#[test]
fn test_parse_headers_in_receipt_order_with_duplicates() {
    let req = b"GET /path HTTP/1.0\r\nHost: example.com\r\nAccept: */*\r\nX-Tag: one\r\nX-Tag: two\r\n\r\n";
    let (parsed, _) = parse_request_head(req, false).unwrap();

    assert_eq!(
        parsed.headers,
        vec![
            Header::new("Host", "example.com"),
            Header::new("Accept", "*/*"),
            Header::new("X-Tag", "one"),
            Header::new("X-Tag", "two"),
        ]
    );
}

#[test]
fn test_parse_header_splits_at_first_colon_and_trims() {
    let header = parse_header("  Host :  localhost:9898  ").unwrap();

    assert_eq!(header.name, "Host");
    assert_eq!(header.value, "localhost:9898");
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.0\r\nHost: example.com\r\n";
    let result = parse_request_head(req, false);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_headers_end_at_end_of_stream() {
    let req = b"GET / HTTP/1.0\r\nHost: example.com";
    let (parsed, consumed) = parse_request_head(req, true).unwrap();

    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_accepts_bare_newlines() {
    let req = b"GET /a HTTP/1.0\nHost: x\n\n";
    let (parsed, consumed) = parse_request_head(req, false).unwrap();

    assert_eq!(parsed.uri, "/a");
    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_missing_method() {
    let result = parse_request_head(b" /x HTTP/1.0\r\n\r\n", false);

    assert!(matches!(result, Err(ParseError::MissingMethod)));
}

#[test]
fn test_parse_empty_stream_is_missing_method() {
    assert!(matches!(parse_request_head(b"", true), Err(ParseError::MissingMethod)));
}

#[test]
fn test_parse_missing_uri() {
    assert!(matches!(parse_request_line("GET"), Err(ParseError::MissingUri)));
    assert!(matches!(parse_request_line("GET  HTTP/1.0"), Err(ParseError::MissingUri)));
}

#[test]
fn test_parse_relative_uri_rejected() {
    let result = parse_request_line("GET index.html HTTP/1.0");

    assert!(matches!(result, Err(ParseError::InvalidUri(_))));
}

#[test]
fn test_parse_version_is_optional() {
    let req = parse_request_line("GET /old").unwrap();

    assert_eq!(req.uri, "/old");
    assert_eq!(req.version, None);
    assert_eq!(req.protocol(), "HTTP/1.0");
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET / HTTP/1.0\r\nBrokenHeader\r\n\r\n";
    let result = parse_request_head(req, false);

    assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
}

#[test]
fn test_parse_empty_header_name() {
    assert!(matches!(parse_header(": value"), Err(ParseError::InvalidHeader(_))));
}

#[test]
fn test_parse_oversized_head() {
    let mut req = b"GET / HTTP/1.0\r\n".to_vec();
    while req.len() <= MAX_HEAD_SIZE {
        req.extend_from_slice(b"X-Filler: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
    }

    assert!(matches!(parse_request_head(&req, false), Err(ParseError::HeadersTooLarge)));
}

#[test]
fn test_parse_invalid_utf8() {
    let result = parse_request_head(b"GET /\xff HTTP/1.0\r\n\r\n", false);

    assert!(matches!(result, Err(ParseError::InvalidEncoding)));
}

#[test]
fn test_parse_reports_consumed_up_to_blank_line() {
    let req = b"GET / HTTP/1.0\r\n\r\nextra";
    let (_, consumed) = parse_request_head(req, false).unwrap();

    assert_eq!(&req[consumed..], b"extra");
}
