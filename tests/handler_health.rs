mod common;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::create_test_app();
    let server = app.server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["storage"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["visit_queue"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let app = common::create_test_app();
    let server = app.server();

    let response = server.get("/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("timestamp").is_some());
    assert!(json["checks"].get("storage").is_some());
    assert!(json["checks"].get("cache").is_some());
    assert!(json["checks"].get("visit_queue").is_some());
}

#[tokio::test]
async fn test_health_reports_mapping_count() {
    let app = common::create_test_app();
    let server = app.server();

    common::shorten(&server, "https://example.com/").await;

    let json = server.get("/health").await.json::<serde_json::Value>();
    assert_eq!(json["checks"]["storage"]["message"], "1 mappings");
}
