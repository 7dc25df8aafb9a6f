//! Integration tests for muzak-api endpoints backed by SQLite
//!
//! Tests cover:
//! - GET / metadata and GET /health
//! - GET /json ordering, limit handling and empty tables
//! - GET /table rendering and escaping
//! - GET /stats aggregates and the missing-database case

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use muzak_api::source::SqliteSource;
use muzak_api::{build_router, AppState};
use muzak_common::config::RenderConfig;
use muzak_common::render::Theme;
use muzak_common::Limit;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: create a `songs` table populated with the given rows
async fn setup_test_db(dir: &TempDir, rows: &[(&str, &str, &str, f64)]) -> PathBuf {
    let path = dir.path().join("songs.db");

    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .connect()
        .await
        .expect("Should create test database");

    sqlx::query("CREATE TABLE songs (timestamp TEXT, title TEXT, artist TEXT, audio_level REAL)")
        .execute(&mut conn)
        .await
        .expect("Should create songs table");

    for (timestamp, title, artist, level) in rows {
        sqlx::query("INSERT INTO songs (timestamp, title, artist, audio_level) VALUES (?, ?, ?, ?)")
            .bind(*timestamp)
            .bind(*title)
            .bind(*artist)
            .bind(*level)
            .execute(&mut conn)
            .await
            .expect("Should insert row");
    }

    conn.close().await.expect("Should close setup connection");
    path
}

/// Test helper: app over a SQLite file, timestamps left in UTC
fn setup_app(db_path: &Path, theme: Theme) -> Router {
    let source = Arc::new(SqliteSource::new(db_path, false));
    let render = RenderConfig {
        title: "Music Data".to_string(),
        theme,
    };
    build_router(AppState::new(source, render, Limit::default()))
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Should be UTF-8")
}

const TWO_SONGS: &[(&str, &str, &str, f64)] = &[
    ("2024-01-01T10:00:00", "Song A", "Artist X", -12.5),
    ("2024-01-01T11:00:00", "Song B", "Artist Y", -8.0),
];

// =============================================================================
// Metadata and health
// =============================================================================

#[tokio::test]
async fn test_index_lists_routes() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir.path().join("absent.db"), Theme::Plain);

    let response = app.oneshot(test_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "muzak-api");
    assert!(body["version"].is_string());
    assert_eq!(body["source"], "sqlite");
    for route in ["/json", "/table", "/stats"] {
        assert!(body["routes"][route].is_string(), "missing route {}", route);
    }
}

#[tokio::test]
async fn test_health_with_database() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(&dir, &[]).await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "muzak-api");
    assert_eq!(body["source"], "sqlite");
    assert_eq!(body["source_ready"], true);
    assert!(body.get("detail").is_none());
}

#[tokio::test]
async fn test_health_degraded_without_database() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.db");
    let app = setup_app(&missing, Theme::Plain);

    // Still 200: the process itself is alive
    let response = app.oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["source_ready"], false);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains(&missing.display().to_string()));
}

// =============================================================================
// GET /json
// =============================================================================

#[tokio::test]
async fn test_json_returns_newest_first() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(&dir, TWO_SONGS).await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body,
        json!([
            {"timestamp": "2024-01-01 11:00:00", "title": "Song B", "artist": "Artist Y", "audio_level": -8.0},
            {"timestamp": "2024-01-01 10:00:00", "title": "Song A", "artist": "Artist X", "audio_level": -12.5}
        ])
    );
}

#[tokio::test]
async fn test_json_keeps_column_order() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(&dir, &TWO_SONGS[..1]).await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/json")).await.unwrap();
    let text = extract_text(response.into_body()).await;

    assert_eq!(
        text,
        r#"[{"timestamp":"2024-01-01 10:00:00","title":"Song A","artist":"Artist X","audio_level":-12.5}]"#
    );
}

#[tokio::test]
async fn test_json_limit() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(
        &dir,
        &[
            ("2024-01-01T09:00:00", "One", "A", -1.0),
            ("2024-01-01T10:00:00", "Two", "A", -1.0),
            ("2024-01-01T11:00:00", "Three", "A", -1.0),
        ],
    )
    .await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/json?limit=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Three", "Two"]);
}

#[tokio::test]
async fn test_json_rejects_non_positive_limit() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(&dir, TWO_SONGS).await;

    for uri in ["/json?limit=0", "/json?limit=-3", "/table?limit=0"] {
        let app = setup_app(&db, Theme::Plain);
        let response = app.oneshot(test_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body = extract_json(response.into_body()).await;
        assert!(body["error"].as_str().unwrap().contains("limit"));
    }
}

#[tokio::test]
async fn test_json_rejects_non_numeric_limit() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(&dir, TWO_SONGS).await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/json?limit=lots")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

    let body = extract_json(response.into_body()).await;
    let message = body["error"].as_str().expect("error message should be a string");
    assert!(message.starts_with("Invalid input"), "{}", message);
}

#[tokio::test]
async fn test_json_empty_table_is_empty_array() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(&dir, &[]).await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!([]));
}

#[tokio::test]
async fn test_json_missing_database_is_503() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.db");
    let app = setup_app(&missing, Theme::Plain);

    let response = app.oneshot(test_request("/json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_json_missing_table_is_500() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no_table.db");
    let conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    conn.close().await.unwrap();

    let app = setup_app(&path, Theme::Plain);
    let response = app.oneshot(test_request("/json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("songs"));
}

// =============================================================================
// GET /table
// =============================================================================

#[tokio::test]
async fn test_table_renders_rows() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(&dir, TWO_SONGS).await;
    let app = setup_app(&db, Theme::Cyberpunk);

    let response = app.oneshot(test_request("/table")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = extract_text(response.into_body()).await;
    assert_eq!(html.matches("<th>").count(), 4);
    assert_eq!(html.matches("<tr>").count(), 3);
    assert!(html.contains("<td>Song B</td>"));
    assert!(html.contains("<footer>Showing 2 rows</footer>"));
    // Newest first
    assert!(html.find("Song B").unwrap() < html.find("Song A").unwrap());
}

#[tokio::test]
async fn test_table_escapes_markup() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(
        &dir,
        &[("2024-01-01T10:00:00", "<script>alert(1)</script>", "Artist", -3.0)],
    )
    .await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/table")).await.unwrap();
    let html = extract_text(response.into_body()).await;

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[tokio::test]
async fn test_table_empty_shows_placeholder() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(&dir, &[]).await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/table")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response.into_body()).await;
    assert!(html.contains("No data available"));
    assert!(!html.contains("<tr>"));
}

// =============================================================================
// GET /stats
// =============================================================================

#[tokio::test]
async fn test_stats() {
    let dir = TempDir::new().unwrap();
    let db = setup_test_db(
        &dir,
        &[
            ("2024-01-01T10:00:00", "Song A", "Artist X", -12.5),
            ("2024-01-01T11:00:00", "Song B", "Artist Y", -8.0),
            ("2024-01-01T12:00:00", "Song A", "Artist X", -9.0),
        ],
    )
    .await;
    let app = setup_app(&db, Theme::Plain);

    let response = app.oneshot(test_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_detections"], 3);
    assert_eq!(body["unique_songs"], 2);
    assert_eq!(body["last_detection"], "2024-01-01 12:00:00");
    assert_eq!(
        body["most_common"],
        json!({"title": "Song A", "artist": "Artist X", "count": 2})
    );
}

#[tokio::test]
async fn test_stats_missing_database_names_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.db");
    let app = setup_app(&missing, Theme::Plain);

    let response = app.oneshot(test_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = extract_json(response.into_body()).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains(&missing.display().to_string()));
}
