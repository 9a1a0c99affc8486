use axum::{
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, Router},
};
use tower_http::cors::{Any, CorsLayer};

use crate::entities::{product, settings};
use crate::generation;
use crate::url_analysis;

pub fn create_router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let products_router = Router::new()
        .route("/", get(product::get_products_route).post(product::post_product_route))
        .route("/:id", delete(product::delete_product_route));

    let settings_router = Router::new()
        .route("/", get(settings::get_settings_route).put(settings::put_settings_route));

    Router::new()
        .route("/generate", post(generation::post_generate_route))
        .route("/suggest-keywords", post(generation::post_suggest_keywords_route))
        .route("/analyze-url", post(url_analysis::post_analyze_url_route))
        .nest("/products", products_router)
        .nest("/settings", settings_router)
        .route("/", get(root_handler))
        .fallback(fallback_handler)
        .layer(cors)
}

async fn fallback_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 Not Found")
}

async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, "Ok")
}
