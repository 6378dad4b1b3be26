use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use image::{ImageFormat, RgbaImage};
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use siteinfo_server::{
    icon_store::{IconStore, IconStoreOptions},
    models::IconListFormat,
    siteinfo::{IconCandidate, LookupEngine, ManualLookupEngine, QueryState},
    web::{AppState, WebServer},
};

const LOOKUP_URL: &str = "https://example.com/";
const SMALL_ICON: &str = "https://example.com/favicon.ico";
const LARGE_ICON: &str = "https://example.com/apple-touch-icon.png";

fn png(size: u32) -> Bytes {
    let mut out = Cursor::new(Vec::new());
    RgbaImage::new(size, size)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    Bytes::from(out.into_inner())
}

fn icon(size: u32, url: &str) -> IconCandidate {
    IconCandidate {
        width: size,
        height: size,
        url: url.to_string(),
        data: Some(png(size)),
    }
}

fn create_test_app(format: IconListFormat) -> (Arc<ManualLookupEngine>, Router) {
    let engine = Arc::new(ManualLookupEngine::new());
    let store = IconStore::new(engine.clone(), IconStoreOptions::default());
    let app = WebServer::create_router(AppState::new(store, format));
    (engine, app)
}

// Helper function to send requests to the app
async fn send_request(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, headers, body_bytes)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = send_request(app, uri).await;
    let json = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_full_lookup_flow() {
    let (engine, app) = create_test_app(IconListFormat::List);

    let (status, response) = get_json(&app, "/siteinfo/example.com").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(response["domain"], "example.com");
    assert_eq!(response["status"], "processing");
    assert_eq!(response["icons"], json!([]));
    assert!(response["submitted"].as_i64().unwrap() > 0);

    engine.report(
        LOOKUP_URL,
        QueryState::Ready,
        vec![icon(48, SMALL_ICON), icon(144, LARGE_ICON)],
    );

    let (status, response) = get_json(&app, "/siteinfo/example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "done");
    assert_eq!(
        response["icons"],
        json!([
            {
                "width": 48,
                "height": 48,
                "sourceUrl": SMALL_ICON,
                "dataUrl": "/icondata?src=https%3A%2F%2Fexample.com%2Ffavicon.ico"
            },
            {
                "width": 144,
                "height": 144,
                "sourceUrl": LARGE_ICON,
                "dataUrl": "/icondata?src=https%3A%2F%2Fexample.com%2Fapple-touch-icon.png"
            }
        ])
    );
    assert!(response["lastModified"].as_i64().unwrap() >= response["submitted"].as_i64().unwrap());

    // Follow the advertised dataUrl
    let data_url = response["icons"][1]["dataUrl"].as_str().unwrap().to_string();
    let (status, headers, body) = send_request(&app, &data_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "filename=apple-touch-icon.png"
    );
    assert_eq!(body, png(144));

    // Only one lookup was ever started for the domain
    assert_eq!(engine.started_lookups(), 1);
}

#[tokio::test]
async fn test_icondata_errors() {
    let (_engine, app) = create_test_app(IconListFormat::List);

    let (status, response) = get_json(&app, "/icondata").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "No source icon URL specified");

    let (status, response) = get_json(&app, "/icondata?src=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "No source icon URL specified");

    let (status, response) =
        get_json(&app, "/icondata?src=https%3A%2F%2Funrelated.test%2Flogo.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["message"], "No such icon found");
}

#[tokio::test]
async fn test_dimension_map_format() {
    let (engine, app) = create_test_app(IconListFormat::DimensionMap);

    get_json(&app, "/siteinfo/example.com").await;
    engine.report(
        LOOKUP_URL,
        QueryState::Ready,
        vec![icon(48, SMALL_ICON), icon(144, LARGE_ICON)],
    );

    let (status, response) = get_json(&app, "/siteinfo/example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["icons"],
        json!({ "48x48": SMALL_ICON, "144x144": LARGE_ICON })
    );
}

#[tokio::test]
async fn test_partial_results_stay_accepted() {
    let (engine, app) = create_test_app(IconListFormat::List);

    get_json(&app, "/siteinfo/example.com").await;
    engine.report(LOOKUP_URL, QueryState::Pending, vec![icon(48, SMALL_ICON)]);

    let (status, response) = get_json(&app, "/siteinfo/example.com").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(response["status"], "processing");
    assert_eq!(response["icons"].as_array().unwrap().len(), 1);

    // Bytes are served as soon as they are reported
    let (status, _, _) = send_request(
        &app,
        "/icondata?src=https%3A%2F%2Fexample.com%2Ffavicon.ico",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_timeout_waits_for_completion() {
    let (engine, app) = create_test_app(IconListFormat::List);

    let reporter = {
        let engine = engine.clone();
        tokio::spawn(async move {
            // Give the request time to start waiting
            while engine.lookup_count(LOOKUP_URL) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            engine.report(LOOKUP_URL, QueryState::Ready, vec![icon(48, SMALL_ICON)]);
        })
    };

    let (status, response) = get_json(&app, "/siteinfo/example.com?timeout=10000").await;
    reporter.await.unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "done");
    assert_eq!(response["icons"].as_array().unwrap().len(), 1);
    // The waiter unsubscribed again
    assert_eq!(engine.updates().listener_count(), 1);
}

#[tokio::test]
async fn test_timeout_expires_while_processing() {
    let (_engine, app) = create_test_app(IconListFormat::List);

    let (status, response) = get_json(&app, "/siteinfo/slow.example?timeout=50").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(response["status"], "processing");

    // Invalid timeouts answer immediately
    let (status, _) = get_json(&app, "/siteinfo/other.example?timeout=soon").await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_cors_header_on_every_response() {
    let (_engine, app) = create_test_app(IconListFormat::List);

    for uri in ["/siteinfo/example.com", "/icondata", "/health", "/icondata?src=x"] {
        let (_, headers, _) = send_request(&app, uri).await;
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*",
            "missing CORS header on {uri}"
        );
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let (engine, app) = create_test_app(IconListFormat::List);

    get_json(&app, "/siteinfo/example.com").await;
    engine.report(
        LOOKUP_URL,
        QueryState::Ready,
        vec![icon(48, SMALL_ICON), icon(144, LARGE_ICON)],
    );

    let (status, response) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(response["domains"], 1);
    assert_eq!(response["icons"], 2);
}

#[tokio::test]
async fn test_unknown_route() {
    let (_engine, app) = create_test_app(IconListFormat::List);
    let (status, _, _) = send_request(&app, "/siteinfo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_domain_case_ignored_and_echoed() {
    let (engine, app) = create_test_app(IconListFormat::List);

    let (_, response) = get_json(&app, "/siteinfo/Example.COM").await;
    assert_eq!(response["domain"], "Example.COM");

    engine.report(LOOKUP_URL, QueryState::Ready, vec![icon(48, SMALL_ICON)]);

    let (status, response) = get_json(&app, "/siteinfo/EXAMPLE.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["domain"], "EXAMPLE.com");
    assert_eq!(engine.started_lookups(), 1);
}
