//! Runs the CGI programs the way the server does: CGI meta-variables in the
//! environment, the request body on stdin, the response on stdout.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use pretty_assertions::assert_eq;

struct CgiOutput {
    head: String,
    body: String,
}

fn run_cgi(program: &str, root: &Path, method: &str, query: &str, body: &str) -> CgiOutput {
    let mut child = Command::new(program)
        .current_dir(root)
        .env("MAPSAVE_ROOT", root)
        .env("GATEWAY_INTERFACE", "CGI/1.1")
        .env("SERVER_SOFTWARE", "mapsave-test")
        .env("SERVER_NAME", "localhost")
        .env("SERVER_PORT", "8000")
        .env("SERVER_PROTOCOL", "HTTP/1.1")
        .env("REMOTE_ADDR", "127.0.0.1")
        .env("REQUEST_METHOD", method)
        .env("SCRIPT_NAME", "/cgi-bin/test")
        .env("PATH_INFO", "")
        .env("QUERY_STRING", query)
        .env("CONTENT_TYPE", "application/x-www-form-urlencoded")
        .env("CONTENT_LENGTH", body.len().to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(body.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "{program} exited with {}", output.status);
    let stdout = String::from_utf8(output.stdout).unwrap().replace("\r\n", "\n");
    let (head, body) = stdout.split_once("\n\n").unwrap_or((stdout.as_str(), ""));
    CgiOutput {
        head: head.to_lowercase(),
        body: body.to_string(),
    }
}

fn root_with_maps() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("data").join("maps")).unwrap();
    tmp
}

#[test]
fn test_savemap_writes_map() {
    let root = root_with_maps();
    let out = run_cgi(
        env!("CARGO_BIN_EXE_savemap"),
        root.path(),
        "POST",
        "",
        "name=level1.map&data=%7B%22tiles%22%3A%5B1%2C2%2C3%5D%7D",
    );
    assert!(out.head.contains("content-type: text/html; charset=utf-8"), "{}", out.head);
    assert_eq!(out.body, "");
    let saved = std::fs::read_to_string(root.path().join("data/maps/level1.map")).unwrap();
    assert_eq!(saved, "{\"tiles\":[1,2,3]}");
}

#[test]
fn test_savemap_requires_name() {
    let root = root_with_maps();
    let out = run_cgi(env!("CARGO_BIN_EXE_savemap"), root.path(), "POST", "", "data=x");
    assert_eq!(out.body, "Please specify map name");
    assert_eq!(
        std::fs::read_dir(root.path().join("data/maps")).unwrap().count(),
        0
    );
}

#[test]
fn test_loadmap_and_listdir() {
    let root = root_with_maps();
    std::fs::write(root.path().join("data/maps/packed.map"), b"3\x00\x01\x00\x02").unwrap();

    let out = run_cgi(
        env!("CARGO_BIN_EXE_loadmap"),
        root.path(),
        "GET",
        "name=packed.map",
        "",
    );
    assert_eq!(out.body, "2[1,2]");

    let out = run_cgi(
        env!("CARGO_BIN_EXE_listdir"),
        root.path(),
        "GET",
        "dir=data/maps",
        "",
    );
    assert!(out.head.contains("content-type: application/json"), "{}", out.head);
    assert_eq!(out.body, r#"["packed.map"]"#);
}
