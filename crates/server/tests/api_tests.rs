//! Integration tests for HTTP API endpoints.

mod common;

use axum::http::{StatusCode, header};
use common::TestServer;

#[tokio::test]
async fn test_health() {
    let server = TestServer::new().await;
    let response = server.request("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let json = response.json();
    assert_eq!(json["ok"], true);
    assert_eq!(json["code"], 0);
    assert_eq!(json["results"], "ok");
}

#[tokio::test]
async fn test_upload_fetch_delete_flow() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;

    let response = server
        .upload("alice", Some(&token), "file", "a.txt", b"Hello, World!")
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    let json = response.json();
    assert_eq!(json["ok"], true);
    assert_eq!(json["results"]["url"], "http://files.test/files/1");
    assert_eq!(
        json["results"]["delete_url"],
        "http://files.test/uploads/alice/1/delete/delete"
    );
    assert_eq!(json["results"]["size"], 13);
    assert_eq!(json["results"]["filename"], "a.txt");

    let response = server.request("GET", "/files/1", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"Hello, World!");
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(response.header(header::CONTENT_DISPOSITION), None);

    let response = server.request("GET", "/files/1/whatever.txt", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"Hello, World!");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"a.txt\"")
    );

    let response = server
        .request("GET", "/uploads/alice/1/delete/delete", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["results"], true);

    let response = server.request("GET", "/files/1", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["code"], -1004);
    assert_eq!(response.json()["message"], "file not found");
}

#[tokio::test]
async fn test_binary_upload_is_sniffed_and_intact() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;

    let mut content = b"%PDF-1.7\n".to_vec();
    content.extend((0..10_000u32).map(|i| (i * 7 % 256) as u8));

    let response = server
        .upload("alice", Some(&token), "file", "doc.pdf", &content)
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let response = server.request("GET", "/files/1", None).await;
    assert_eq!(response.header(header::CONTENT_TYPE), Some("application/pdf"));
    assert_eq!(response.body, content);
}

#[tokio::test]
async fn test_upload_requires_valid_token() {
    let server = TestServer::new().await;
    server.register("alice").await;

    for token in [None, Some("not-a-real-token")] {
        let response = server.upload("alice", token, "file", "a.txt", b"x").await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        let json = response.json();
        assert_eq!(json["ok"], false);
        assert_eq!(json["code"], -2000);
        assert_eq!(json["message"], "Access token is missing or invalid");
    }
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/uploads/alice")
        .header(header::AUTHORIZATION, format!("bEaReR {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", common::BOUNDARY),
        )
        .body(axum::body::Body::from(common::multipart_body(
            "file", "a.txt", b"x",
        )))
        .unwrap();
    assert_eq!(server.send(request).await.status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_upload_as_other_user_is_forbidden() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;
    server.register("bob").await;

    let response = server
        .upload("bob", Some(&token), "file", "a.txt", b"x")
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json()["code"], -2001);
}

#[tokio::test]
async fn test_missing_file_field() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;

    let response = server
        .upload("alice", Some(&token), "attachment", "a.txt", b"x")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["code"], -1001);
    assert_eq!(response.json()["message"], "file not found in request");
}

#[tokio::test]
async fn test_malformed_multipart() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/uploads/alice")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{}"))
        .unwrap();
    let response = server.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let server = TestServer::with_config(|config| config.server.max_upload_size = 1024).await;
    let token = server.register("alice").await;

    let response = server
        .upload("alice", Some(&token), "file", "big.bin", &vec![7u8; 4096])
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json()["code"], -1000);

    let response = server.request("GET", "/files/1", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_delete_secret_keeps_file() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;
    server
        .upload("alice", Some(&token), "file", "a.txt", b"keep")
        .await;

    let response = server
        .request("GET", "/uploads/alice/1/delete/guess", None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["code"], -2002);

    let response = server.request("GET", "/files/1", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"keep");
}

#[tokio::test]
async fn test_public_delete_unknown_key() {
    let server = TestServer::new().await;
    let response = server
        .request("GET", "/uploads/alice/nope/delete/delete", None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["code"], -1004);
}

#[tokio::test]
async fn test_authenticated_delete() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;
    server
        .upload("alice", Some(&token), "file", "a.txt", b"bye")
        .await;

    let response = server
        .request("DELETE", "/uploads/alice/1", Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["results"], true);

    let response = server.request("GET", "/files/1", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = server
        .request("DELETE", "/uploads/alice/1", Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_authenticated_delete_requires_token() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;
    server
        .upload("alice", Some(&token), "file", "a.txt", b"x")
        .await;

    let response = server.request("DELETE", "/uploads/alice/1", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["code"], -2000);
}

#[tokio::test]
async fn test_deleting_another_users_upload_is_not_found() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    server
        .upload("alice", Some(&alice), "file", "a.txt", b"mine")
        .await;

    let response = server
        .request("DELETE", "/uploads/bob/1", Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["code"], -1004);

    let response = server
        .request("DELETE", "/uploads/alice/1", Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = server.request("GET", "/files/1", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_sequential_uploads_get_sequential_urls() {
    let server = TestServer::new().await;
    let token = server.register("alice").await;

    for expected in ["1", "2", "3"] {
        let response = server
            .upload("alice", Some(&token), "file", "f.txt", b"data")
            .await;
        assert_eq!(
            response.json()["results"]["url"],
            format!("http://files.test/files/{expected}")
        );
    }
}

#[tokio::test]
async fn test_unknown_file() {
    let server = TestServer::new().await;
    let response = server.request("GET", "/files/missing", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["ok"], false);
}

#[tokio::test]
async fn test_declared_size_does_not_frame_the_response() {
    let server = TestServer::new().await;
    let mut stream = std::io::Cursor::new(b"short".to_vec());
    server
        .state
        .service
        .upload(&mut stream, "a.txt", 4096, "alice")
        .await
        .unwrap();

    let response = server.request("GET", "/files/1", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"short");
    assert_ne!(response.header(header::CONTENT_LENGTH), Some("4096"));
}

#[tokio::test]
async fn test_named_fetch_without_stored_filename() {
    let server = TestServer::new().await;
    let mut stream = std::io::Cursor::new(b"anonymous".to_vec());
    server
        .state
        .service
        .upload(&mut stream, "", 9, "alice")
        .await
        .unwrap();

    let response = server.request("GET", "/files/1/anything.bin", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"anonymous");
    assert_eq!(response.header(header::CONTENT_DISPOSITION), None);
}
