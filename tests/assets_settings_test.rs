//! Integration tests for asset upload/download and site settings.

mod helpers;

use http::StatusCode;
use serde_json::json;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

#[tokio::test]
async fn test_upload_download_delete_asset() {
    let app = helpers::TestApp::new().await;

    let uploaded = app
        .upload("/api/assets", "hero image.png", "application/octet-stream", PNG)
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{}", uploaded.text);
    let asset = uploaded.data().clone();
    assert_eq!(asset["file_type"], "image");
    assert_eq!(asset["mime_type"], "image/png");
    assert_eq!(asset["size"], PNG.len());
    assert!(asset["metadata"]["original_filename"].is_string());

    let stored = std::path::PathBuf::from(asset["file_path"].as_str().unwrap());
    assert!(stored.starts_with(app.dir.path().join("media")));
    assert!(stored.is_file());

    let id = asset["id"].as_i64().unwrap();
    let file = app
        .request("GET", &format!("/api/assets/{id}/file"), None)
        .await;
    assert_eq!(file.status, StatusCode::OK);
    assert_eq!(file.text, String::from_utf8_lossy(PNG));

    let deleted = app
        .request("DELETE", &format!("/api/assets/{id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!stored.exists());

    let missing = app.request("GET", &format!("/api/assets/{id}"), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_assets_filters_by_kind() {
    let app = helpers::TestApp::new().await;
    app.upload("/api/assets", "logo.png", "image/png", PNG).await;
    app.upload("/api/assets", "terms.pdf", "application/pdf", b"%PDF-1.4")
        .await;

    let all = app.request("GET", "/api/assets", None).await;
    assert_eq!(all.data().as_array().unwrap().len(), 2);

    let documents = app
        .request("GET", "/api/assets?file_type=document", None)
        .await;
    let documents = documents.data().as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["name"], "terms.pdf");
}

#[tokio::test]
async fn test_empty_upload_is_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app
        .upload("/api/assets", "empty.png", "image/png", b"")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_default_settings_are_seeded() {
    let app = helpers::TestApp::new().await;

    let site_name = app.request("GET", "/api/settings/site_name", None).await;
    assert_eq!(site_name.status, StatusCode::OK);
    assert_eq!(site_name.data()["value"], "PixelMagix");
    assert_eq!(site_name.data()["value_type"], "string");

    let enable_ai = app.request("GET", "/api/settings/enable_ai", None).await;
    assert_eq!(enable_ai.data()["value"], true);

    let all = app.request("GET", "/api/settings", None).await;
    assert!(all.data().as_array().unwrap().len() >= 4);
}

#[tokio::test]
async fn test_update_setting_keeps_type() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "PUT",
            "/api/settings/max_pages",
            Some(json!({ "value": 25, "description": "Page limit" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.data()["value"], 25);
    assert_eq!(response.data()["value_type"], "number");

    let theme = app
        .request(
            "PUT",
            "/api/settings/theme",
            Some(json!({ "value": { "primary": "#ff0000" } })),
        )
        .await;
    assert_eq!(theme.data()["value"], json!({ "primary": "#ff0000" }));

    let fetched = app.request("GET", "/api/settings/max_pages", None).await;
    assert_eq!(fetched.data()["description"], "Page limit");
}

#[tokio::test]
async fn test_null_setting_and_unknown_key() {
    let app = helpers::TestApp::new().await;

    let null = app
        .request("PUT", "/api/settings/site_name", Some(json!({ "value": null })))
        .await;
    assert_eq!(null.status, StatusCode::BAD_REQUEST);

    let missing = app.request("GET", "/api/settings/nope", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
