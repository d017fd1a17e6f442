use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::{browse, files, pages, sites};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/createsite",
            get(sites::create_site_form).post(sites::create_site_submit),
        )
        .route(
            "/editsite",
            get(sites::edit_site_form).post(sites::edit_site_submit),
        )
        .route(
            "/delsite",
            get(sites::delete_site_form).post(sites::delete_site_submit),
        )
        .route(
            "/createpage",
            get(pages::create_page_form).post(pages::create_page_submit),
        )
        .route(
            "/editpage",
            get(pages::edit_page_form).post(pages::edit_page_submit),
        )
        .route(
            "/delpage",
            get(pages::delete_page_form).post(pages::delete_page_submit),
        )
        .route(
            "/uploadfile",
            get(files::upload_file_form).post(files::upload_file_submit),
        )
        .route(
            "/delfile",
            get(files::delete_files_form).post(files::delete_files_submit),
        )
        // Everything else is a content address: a site, a page, or a file.
        .fallback(get(browse::browse))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
