mod common;

use std::sync::Arc;

use common::Harness;
use livetakeoff_client::credentials::{ACCESS_TOKEN_KEY, CredentialStore, FileStore, REFRESH_TOKEN_KEY};
use livetakeoff_client::services::jobs::{JobSummary, JobsApi, PhotoUpload};
use livetakeoff_client::{ApiClient, ApiError, ClientConfig};
use mockito::{Matcher, Server};
use serde_json::json;

#[tokio::test]
async fn test_list_jobs_sends_search_and_maps_results() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/jobs/")
        .match_query(Matcher::UrlEncoded("search".into(), "N123 AB".into()))
        .match_header("authorization", "JWT good")
        .with_status(200)
        .with_body(
            json!({
                "count": 2,
                "results": [
                    {"id": 10, "title": "Exterior wash", "status": "A"},
                    {"id": 11, "customer": {"name": "Acme Air"}, "status": "C"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let h = Harness::new(&server.url(), Some("good"), None);
    let jobs = h.client.list_jobs(Some("N123 AB")).await.unwrap();

    assert_eq!(
        jobs,
        vec![
            JobSummary {
                id: "10".into(),
                title: "Exterior wash".into(),
                status: Some("A".into()),
            },
            JobSummary {
                id: "11".into(),
                title: "Acme Air".into(),
                status: Some("C".into()),
            },
        ]
    );
    m.assert_async().await;
}

#[tokio::test]
async fn test_blank_search_lists_everything() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/jobs/")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let h = Harness::new(&server.url(), Some("good"), None);
    let jobs = h.client.list_jobs(Some("   ")).await.unwrap();

    assert!(jobs.is_empty());
    m.assert_async().await;
}

#[tokio::test]
async fn test_add_comment_posts_json() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/jobs/5/comments/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"comment": "Arrived on site"})))
        .with_status(201)
        .with_body(r#"{"id":99,"comment":"Arrived on site"}"#)
        .create_async()
        .await;

    let h = Harness::new(&server.url(), Some("good"), None);
    let comment = h.client.add_comment("5", "Arrived on site").await.unwrap();

    assert_eq!(comment["id"], 99);
    m.assert_async().await;
}

#[tokio::test]
async fn test_upload_photos_sends_one_part_per_file() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/jobs/5/photos/")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"filename="before.jpg""#.to_string()),
            Matcher::Regex(r#"filename="after.png""#.to_string()),
        ]))
        .with_status(201)
        .with_body("[]")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let before = dir.path().join("before.jpg");
    let after = dir.path().join("after.png");
    std::fs::write(&before, b"before").unwrap();
    std::fs::write(&after, b"after").unwrap();

    let photos = vec![
        PhotoUpload::from_path(&before).await.unwrap(),
        PhotoUpload::from_path(&after).await.unwrap(),
    ];
    assert_eq!(photos[0].mime.as_deref(), Some("image/jpeg"));

    let h = Harness::new(&server.url(), Some("good"), None);
    h.client.upload_photos("5", photos).await.unwrap();

    m.assert_async().await;
}

#[tokio::test]
async fn test_upload_without_photos_is_rejected_locally() {
    let h = Harness::new("http://127.0.0.1:1", Some("good"), None);
    let err = h.client.upload_photos("5", Vec::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_refresh_through_file_store_persists_new_token() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/jobs/3/")
        .match_header("authorization", "JWT stale")
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("POST", "/token/refresh/")
        .with_status(200)
        .with_body(r#"{"access":"fresh"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/jobs/3/")
        .match_header("authorization", "JWT fresh")
        .with_status(200)
        .with_body(r#"{"id":3}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let store = Arc::new(FileStore::new(&path));
    store.set_item(ACCESS_TOKEN_KEY, "stale").await.unwrap();
    store.set_item(REFRESH_TOKEN_KEY, "r1").await.unwrap();

    let client = ApiClient::new(ClientConfig::new(server.url()), store).unwrap();
    let job = client.get_job("3").await.unwrap();
    assert_eq!(job["id"], 3);

    let reopened = FileStore::new(&path);
    assert_eq!(
        reopened.get_item(ACCESS_TOKEN_KEY).await.unwrap().as_deref(),
        Some("fresh")
    );
}
