use std::sync::Arc;

use axum::Router;

use lister_core::AppError;
use lister_core::testutil::MockFetcher;
use lister_server::routes;
use lister_server::state::AppState;

pub struct TestApp {
    pub router: Router,
    pub primary: MockFetcher,
    pub secondary: MockFetcher,
}

/// Build the app with a failing browser tier and the given static-tier page.
pub fn setup_test_app(static_html: &str) -> TestApp {
    let primary = MockFetcher::with_error(AppError::BrowserError("no browser in tests".into()));
    let secondary = MockFetcher::html(static_html);
    build(primary, secondary)
}

/// Build the app with both tiers failing.
pub fn setup_offline_app() -> TestApp {
    let primary = MockFetcher::with_error(AppError::BrowserError("no browser in tests".into()));
    let secondary = MockFetcher::with_error(AppError::NetworkError("offline".into()));
    build(primary, secondary)
}

fn build(primary: MockFetcher, secondary: MockFetcher) -> TestApp {
    let state = Arc::new(AppState::new(primary.clone(), secondary.clone()));
    TestApp {
        router: routes::router(state),
        primary,
        secondary,
    }
}

pub const AMAZON_PAGE: &str = r#"<html><head>
    <title>Amazon.it: Lampada LED</title>
    <meta name="description" content="Lampada da scrivania dimmerabile">
    </head><body>
    <span id="productTitle">  Lampada LED da scrivania  </span>
    <span class="a-price"><span class="a-offscreen">19,99 €</span></span>
    <img src="https://m.media-amazon.com/images/I/lamp1.jpg">
    <img src="https://m.media-amazon.com/images/I/lamp2.jpg?x=1">
    </body></html>"#;
