use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use spidey::handlers::error::ServeError;
use spidey::handlers::resolve::{classify, resolve_path, Resource};
use spidey::http::response::StatusCode;

/// Creates `<tmp>/www` with a secret file next to it, outside the root.
fn fixture() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("www");
    fs::create_dir(&root).unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("index.html"), "hi").unwrap();
    fs::write(dir.path().join("secret.txt"), "secret").unwrap();
    let root = fs::canonicalize(root).unwrap();
    (dir, root)
}

fn chmod(path: &Path, mode: u32) {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[tokio::test]
async fn test_resolve_file_under_root() {
    let (_dir, root) = fixture();

    let path = resolve_path(&root, "/index.html").await.unwrap();
    assert_eq!(path, root.join("index.html"));
}

#[tokio::test]
async fn test_resolve_root_uri() {
    let (_dir, root) = fixture();

    assert_eq!(resolve_path(&root, "/").await.unwrap(), root);
}

#[tokio::test]
async fn test_resolve_normalizes_dot_segments() {
    let (_dir, root) = fixture();

    let path = resolve_path(&root, "/sub/../index.html").await.unwrap();
    assert_eq!(path, root.join("index.html"));
}

#[tokio::test]
async fn test_resolve_missing_is_not_found() {
    let (_dir, root) = fixture();

    let err = resolve_path(&root, "/missing.txt").await.unwrap_err();
    assert!(matches!(err, ServeError::NotFound(_)));
    assert_eq!(err.status(), StatusCode::NotFound);
}

#[tokio::test]
async fn test_resolve_traversal_never_escapes_root() {
    let (_dir, root) = fixture();

    for uri in [
        "/../secret.txt",
        "/sub/../../secret.txt",
        "/../../../../../../etc/passwd",
        "/./../www/../secret.txt",
        "/%2e%2e/secret.txt",
        "/sub/%2E%2E%2F..%2Fsecret.txt",
    ] {
        match resolve_path(&root, uri).await {
            Ok(path) => panic!("{uri} resolved to {}", path.display()),
            Err(err) => assert!(matches!(err, ServeError::NotFound(_)), "{uri}: {err}"),
        }
    }
}

#[tokio::test]
async fn test_resolve_percent_decodes_uri() {
    let (_dir, root) = fixture();
    fs::write(root.join("a?b #1.txt"), "odd").unwrap();

    let path = resolve_path(&root, "/a%3Fb%20%231.txt").await.unwrap();
    assert_eq!(path, root.join("a?b #1.txt"));
}

#[tokio::test]
async fn test_resolve_invalid_percent_encoding_is_bad_request() {
    let (_dir, root) = fixture();

    let err = resolve_path(&root, "/%FF.txt").await.unwrap_err();
    assert!(matches!(err, ServeError::MalformedRequest(_)));
    assert_eq!(err.status(), StatusCode::BadRequest);
}

#[tokio::test]
async fn test_resolve_rejects_symlink_out_of_root() {
    let (dir, root) = fixture();
    std::os::unix::fs::symlink(dir.path().join("secret.txt"), root.join("link.txt")).unwrap();

    let err = resolve_path(&root, "/link.txt").await.unwrap_err();
    assert!(matches!(err, ServeError::NotFound(_)));
}

#[tokio::test]
async fn test_resolve_follows_symlink_inside_root() {
    let (_dir, root) = fixture();
    std::os::unix::fs::symlink(root.join("index.html"), root.join("alias.html")).unwrap();

    let path = resolve_path(&root, "/alias.html").await.unwrap();
    assert_eq!(path, root.join("index.html"));
}

#[tokio::test]
async fn test_classify_directory() {
    let (_dir, root) = fixture();

    assert_eq!(classify(&root.join("sub")).await.unwrap(), Resource::Directory);
}

#[tokio::test]
async fn test_classify_readable_file() {
    let (_dir, root) = fixture();
    let file = root.join("index.html");
    chmod(&file, 0o644);

    assert_eq!(classify(&file).await.unwrap(), Resource::Readable);
}

#[tokio::test]
async fn test_classify_execute_takes_priority() {
    let (_dir, root) = fixture();
    let script = root.join("run.cgi");
    fs::write(&script, "#!/bin/sh\n").unwrap();

    chmod(&script, 0o755);
    assert_eq!(classify(&script).await.unwrap(), Resource::Executable);

    chmod(&script, 0o311);
    assert_eq!(classify(&script).await.unwrap(), Resource::Executable);
}

#[tokio::test]
async fn test_classify_no_permissions_is_not_found() {
    let (_dir, root) = fixture();
    let file = root.join("locked.txt");
    fs::write(&file, "x").unwrap();
    chmod(&file, 0o000);

    let err = classify(&file).await.unwrap_err();
    assert!(matches!(err, ServeError::Forbidden(_)));
    assert_eq!(err.status(), StatusCode::NotFound);
}
