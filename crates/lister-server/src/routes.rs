use std::sync::Arc;

use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};

use lister_core::traits::Fetcher;

use crate::dto::{HealthResponse, SubmitForm};
use crate::error::ApiError;
use crate::page::{FORM_PAGE, render_listing};
use crate::state::AppState;

/// Build the full router with all routes.
pub fn router<P, S>(state: Arc<AppState<P, S>>) -> Router
where
    P: Fetcher + 'static,
    S: Fetcher + 'static,
{
    Router::new()
        .route("/", get(form).post(submit::<P, S>))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn form() -> Html<&'static str> {
    Html(FORM_PAGE)
}

/// Run the listing pipeline for the submitted URL and render the result.
pub async fn submit<P, S>(
    State(state): State<Arc<AppState<P, S>>>,
    Form(body): Form<SubmitForm>,
) -> Result<Html<String>, ApiError>
where
    P: Fetcher + 'static,
    S: Fetcher + 'static,
{
    let url = body.url.trim();
    let listing = state.service.process_product_url(url).await?;
    Ok(Html(render_listing(&listing)))
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "healthy" })
}
