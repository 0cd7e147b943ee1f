use spidey::http::request::{Header, Request, RequestBuilder};

#[test]
fn test_request_header_retrieval() {
    let req = Request {
        method: "GET".to_string(),
        uri: "/".to_string(),
        headers: vec![
            Header::new("Host", "example.com"),
            Header::new("Content-Type", "text/plain"),
        ],
        ..Request::default()
    };

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("content-type"), Some("text/plain"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_returns_first_duplicate() {
    let req = RequestBuilder::new()
        .method("GET")
        .uri("/")
        .header("Accept", "text/html")
        .header("Accept", "text/plain")
        .build()
        .unwrap();

    assert_eq!(req.header("Accept"), Some("text/html"));
    assert_eq!(req.headers.len(), 2);
}

#[test]
fn test_request_set_peer() {
    let mut req = Request::default();
    req.set_peer("192.0.2.7:40123".parse().unwrap());

    assert_eq!(req.peer_host, "192.0.2.7");
    assert_eq!(req.peer_port, "40123");
}

#[test]
fn test_request_builder_requires_method_and_uri() {
    assert!(RequestBuilder::new().uri("/").build().is_err());
    assert!(RequestBuilder::new().method("GET").build().is_err());
}

#[test]
fn test_request_builder_defaults() {
    let req = RequestBuilder::new()
        .method("GET")
        .uri("/x")
        .query("a=b")
        .build()
        .unwrap();

    assert_eq!(req.query.as_deref(), Some("a=b"));
    assert_eq!(req.path, None);
    assert_eq!(req.protocol(), "HTTP/1.0");
}
