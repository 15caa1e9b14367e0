//! Management UI: news listing plus source and keyword administration.

mod handlers;
mod views;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::db::Repository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Repository,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/add_source",
            get(handlers::add_source_form).post(handlers::add_source),
        )
        .route(
            "/add_keyword",
            get(handlers::add_keyword_form).post(handlers::add_keyword),
        )
        .route("/delete_source", post(handlers::delete_source))
        .route("/delete_all_sources", post(handlers::delete_all_sources))
        .route("/delete_keyword", post(handlers::delete_keyword))
        .route("/delete_all_keywords", post(handlers::delete_all_keywords))
        .route("/delete_all_news", post(handlers::delete_all_news))
        .route("/manage", get(handlers::manage))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
