use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use url::form_urlencoded;

use lister_core::UNSUPPORTED_SITE_MESSAGE;

use crate::integration::common::{AMAZON_PAGE, setup_offline_app, setup_test_app};

fn form_post(url: &str) -> Request<Body> {
    let encoded: String = form_urlencoded::byte_serialize(url.as_bytes()).collect();
    let body = format!("url={encoded}");
    Request::post("/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app("");

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn form_page_is_served() {
    let app = setup_test_app("");

    let response = app
        .router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = body_text(response).await;
    assert!(html.contains(r#"name="url""#));
    assert_eq!(app.primary.call_count(), 0);
}

#[tokio::test]
async fn unsupported_site_returns_plain_message() {
    let app = setup_test_app(AMAZON_PAGE);

    let response = app
        .router
        .oneshot(form_post("https://www.ebay.com/itm/123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    assert_eq!(body_text(response).await, UNSUPPORTED_SITE_MESSAGE);

    // Rejected before any fetch.
    assert_eq!(app.primary.call_count(), 0);
    assert_eq!(app.secondary.call_count(), 0);
}

#[tokio::test]
async fn amazon_listing_via_static_fallback() {
    let app = setup_test_app(AMAZON_PAGE);
    let url = "https://www.amazon.it/dp/B0C1234567?ref=abc";

    let response = app.router.oneshot(form_post(url)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h2>Lampada LED da scrivania</h2>"), "{html}");
    assert!(html.contains("Original price: 19.99"));
    assert!(html.contains("<strong>23.99</strong>"));
    assert!(html.contains("Lampada da scrivania dimmerabile"));
    assert_eq!(html.matches("<img ").count(), 2);
    assert!(html.contains("(static fetch)"));

    assert_eq!(app.primary.calls(), vec![url.to_string()]);
    assert_eq!(app.secondary.calls(), vec![url.to_string()]);
}

#[tokio::test]
async fn submitted_url_is_trimmed() {
    let app = setup_test_app(AMAZON_PAGE);

    let response = app
        .router
        .oneshot(form_post("  https://www.amazon.de/dp/B0C1234567  "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.secondary.calls(),
        vec!["https://www.amazon.de/dp/B0C1234567".to_string()]
    );
}

#[tokio::test]
async fn offline_aliexpress_listing_uses_defaults() {
    let app = setup_offline_app();

    let response = app
        .router
        .oneshot(form_post(
            "https://www.aliexpress.com/item/1005001234567890.html",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h2>title not found</h2>"), "{html}");
    assert!(html.contains("Original price: 10"));
    assert!(html.contains("<strong>12.00</strong>"));
    assert!(html.contains("description not found"));
    assert!(!html.contains("<img "));
}

#[tokio::test]
async fn missing_url_field_is_rejected() {
    let app = setup_test_app(AMAZON_PAGE);

    let response = app
        .router
        .oneshot(
            Request::post("/")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("link=https%3A%2F%2Fwww.amazon.it"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(app.secondary.call_count(), 0);
}
