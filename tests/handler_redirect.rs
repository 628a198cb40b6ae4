mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_redirect_success() {
    let app = common::create_test_app();
    let server = app.server();

    let code = common::shorten(&server, "example.com/very/long/path").await;

    let response = server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.header("location"),
        "https://example.com/very/long/path"
    );

    app.wait_for_visits(&code, 1).await;
}

#[tokio::test]
async fn test_redirect_counts_cache_hits() {
    let app = common::create_test_app();
    let server = app.server();

    let code = common::shorten(&server, "https://example.com/").await;

    for _ in 0..5 {
        server
            .get(&format!("/{code}"))
            .await
            .assert_status(StatusCode::FOUND);
    }

    app.wait_for_visits(&code, 5).await;
}

#[tokio::test]
async fn test_redirect_not_found_html() {
    let app = common::create_test_app();
    let server = app.server();

    let response = server
        .get("/nope12")
        .add_header("Accept", "text/html,application/xhtml+xml")
        .await;

    response.assert_status_not_found();
    assert!(
        response
            .header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(response.text().contains("404"));
}

#[tokio::test]
async fn test_redirect_not_found_json() {
    let app = common::create_test_app();
    let server = app.server();

    let response = server
        .get("/nope12")
        .add_header("Accept", "application/json")
        .await;

    response.assert_status_not_found();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_json_caller_gets_body() {
    let app = common::create_test_app();
    let server = app.server();

    let code = common::shorten(&server, "https://example.com/target").await;

    let response = server
        .get(&format!("/{code}"))
        .add_header("X-Requested-With", "XMLHttpRequest")
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target");

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["short_code"], code.as_str());
    assert_eq!(json["original_url"], "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_malformed_code() {
    let app = common::create_test_app();
    let server = app.server();

    server.get("/bad!code").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_after_delete_is_not_found() {
    let app = common::create_test_app();
    let server = app.server();
    let token = common::admin_token(&server).await;

    let code = common::shorten(&server, "https://example.com/").await;

    // Warm the cache.
    server
        .get(&format!("/{code}"))
        .await
        .assert_status(StatusCode::FOUND);

    server
        .delete(&format!("/api/admin/urls/{code}"))
        .add_header("Authorization", format!("Bearer {token}"))
        .await
        .assert_status_ok();

    server
        .get(&format!("/{code}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = common::create_test_app();
    let server = app.server();

    let response = server
        .get("/a/b/c")
        .add_header("Accept", "application/json")
        .await;

    response.assert_status_not_found();
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "error": { "code": "not_found", "message": "Route not found", "details": {} } })
    );
}
