use serde_json::Value;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tiny_http::Method;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use rax_file_server::Server;
use rax_file_server::cli::LogLevel;
use rax_file_server::config::AppConfig;
use rax_file_server::navigate::WorkingDirectory;
use rax_file_server::protocol::{ApiResponse, dispatch};

// Helper to open a fresh working directory
fn setup_test_env() -> (TempDir, WorkingDirectory) {
    let temp_dir = TempDir::new().unwrap();
    let cwd = WorkingDirectory::open(temp_dir.path(), false).unwrap();
    (temp_dir, cwd)
}

fn json(response: &ApiResponse) -> Value {
    serde_json::from_slice(&response.body).unwrap()
}

fn create(cwd: &mut WorkingDirectory, filename: &str, content: &str, overwrite: bool) -> ApiResponse {
    let body = serde_json::json!({
        "filename": filename,
        "content": content,
        "overwrite": overwrite,
    });
    dispatch(&Method::Post, "/create_file", body.to_string().as_bytes(), cwd)
}

fn listed_names(cwd: &mut WorkingDirectory) -> HashSet<String> {
    let response = dispatch(&Method::Get, "/get_files", b"", cwd);
    assert_eq!(response.status, 200);
    json(&response)
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_create_then_get_file_data() {
    let (_temp_dir, mut cwd) = setup_test_env();

    let response = create(&mut cwd, "test_ok.txt", "test content", true);
    assert_eq!(response.status, 201);
    let record = json(&response);
    for key in ["name", "content", "created_at", "modified_at", "size"] {
        assert!(record.get(key).is_some(), "missing {key}");
    }

    let response = dispatch(&Method::Get, "/get_file_data?filename=test_ok.txt", b"", &mut cwd);
    assert_eq!(response.status, 200);
    let record = json(&response);
    assert_eq!(record["content"], "dGVzdCBjb250ZW50");
    assert_eq!(record["size"], 12);
}

#[test]
fn test_create_without_overwrite_conflicts_only_when_present() {
    let (_temp_dir, mut cwd) = setup_test_env();

    assert_eq!(create(&mut cwd, "once.txt", "1", false).status, 201);
    assert_eq!(create(&mut cwd, "once.txt", "2", false).status, 409);
    assert_eq!(create(&mut cwd, "once.txt", "2", true).status, 201);
}

#[test]
fn test_delete_then_get_is_not_found() {
    let (_temp_dir, mut cwd) = setup_test_env();
    create(&mut cwd, "test_for_delete.txt", "", true);

    let response = dispatch(
        &Method::Delete,
        "/delete_file?filename=test_for_delete.txt",
        b"",
        &mut cwd,
    );
    assert_eq!(response.status, 200);
    assert_eq!(json(&response)["deleted"], "test_for_delete.txt");

    let response = dispatch(
        &Method::Get,
        "/get_file_data?filename=test_for_delete.txt",
        b"",
        &mut cwd,
    );
    assert_eq!(response.status, 404);

    let response = dispatch(
        &Method::Delete,
        "/delete_file?filename=test_for_delete.txt",
        b"",
        &mut cwd,
    );
    assert_eq!(response.status, 404);
}

#[test]
fn test_invalid_filenames_are_rejected_everywhere() {
    let (temp_dir, mut cwd) = setup_test_env();
    let long_name = format!("{}.txt", "z".repeat(300));

    assert_eq!(create(&mut cwd, &long_name, "content", true).status, 400);
    let query = format!("filename={long_name}");
    assert_eq!(
        dispatch(&Method::Get, &format!("/get_file_data?{query}"), b"", &mut cwd).status,
        400
    );
    assert_eq!(
        dispatch(&Method::Delete, &format!("/delete_file?{query}"), b"", &mut cwd).status,
        400
    );

    assert!(std::fs::read_dir(temp_dir.path()).unwrap().next().is_none());
}

#[test]
fn test_change_dir_autocreate_then_missing() {
    let (temp_dir, mut cwd) = setup_test_env();

    let response = dispatch(&Method::Post, "/change_dir", br#"{"path": "newdir"}"#, &mut cwd);
    assert_eq!(response.status, 200);
    let new_root = temp_dir.path().canonicalize().unwrap().join("newdir");
    assert_eq!(cwd.path(), new_root);

    let response = dispatch(
        &Method::Post,
        "/change_dir",
        br#"{"path": "missing", "autocreate": false}"#,
        &mut cwd,
    );
    assert_eq!(response.status, 404);
    assert_eq!(cwd.path(), new_root);

    // Empty body only reports the current directory
    let response = dispatch(&Method::Post, "/change_dir", b"", &mut cwd);
    assert_eq!(json(&response)["path"], new_root.to_string_lossy().into_owned());
}

#[test]
fn test_listing_is_exact() {
    let (_temp_dir, mut cwd) = setup_test_env();
    assert!(listed_names(&mut cwd).is_empty());

    for name in ["a", "b", "c"] {
        create(&mut cwd, name, name, false);
    }

    let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    assert_eq!(listed_names(&mut cwd), expected);

    let response = dispatch(&Method::Get, "/get_files", b"", &mut cwd);
    for record in json(&response).as_array().unwrap() {
        assert!(record.get("content").is_none());
        assert!(!record["created_at"].is_null());
        assert!(!record["modified_at"].is_null());
        assert_eq!(record["size"], 1);
    }
}

#[test]
fn test_delete_directory_removes_tree() {
    let (temp_dir, mut cwd) = setup_test_env();
    std::fs::create_dir_all(temp_dir.path().join("folder/sub")).unwrap();
    std::fs::write(temp_dir.path().join("folder/sub/deep.txt"), "deep").unwrap();

    let response = dispatch(
        &Method::Delete,
        "/delete_file",
        br#"{"filename": "folder"}"#,
        &mut cwd,
    );
    assert_eq!(response.status, 200);
    assert!(!listed_names(&mut cwd).contains("folder"));
}

// Send a raw HTTP/1.1 request and read the whole response
async fn send(addr: SocketAddr, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        dir: temp_dir.path().join("data"),
        log_level: LogLevel::Warning,
        log_file: None,
        port: 0,
        host: "127.0.0.1".to_string(),
    };

    let server = Arc::new(Server::new(config).unwrap());
    assert!(temp_dir.path().join("data").is_dir());
    let addr = server.local_addr().unwrap();

    let running = Arc::clone(&server);
    let handle = tokio::spawn(async move { running.start().await });

    let response = send(addr, "GET", "/", "").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");

    let response = send(
        addr,
        "POST",
        "/create_file",
        r#"{"filename": "hello.txt", "content": "hi"}"#,
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 201"), "{response}");

    let response = send(addr, "GET", "/get_file_data?filename=hello.txt", "").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(r#""content":"aGk=""#), "{response}");

    let response = send(addr, "PUT", "/get_files", "").await;
    assert!(response.starts_with("HTTP/1.1 405"), "{response}");

    let response = send(addr, "POST", "/change_dir", r#"{"path": "inner"}"#).await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    let working_dir = server.working_dir();
    assert!(working_dir.lock().await.path().ends_with("data/inner"));

    server.shutdown();
    handle.await.unwrap();
}
