pub mod handlers;
pub mod session;
pub mod ws;

use axum::routing::{get, get_service, post};
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

pub fn build_router() -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/defaults", get(handlers::defaults))
        .route("/api/presets", get(handlers::presets))
        .route("/api/presets/:filename", get(handlers::preset_file))
        .route("/api/compute", post(handlers::compute))
        .route("/ws", get(ws::upgrade))
        .route("/", get_service(ServeFile::new("webapp/config.html")))
        .route("/simulation", get_service(ServeFile::new("webapp/index.html")))
        .route("/loading", get_service(ServeFile::new("webapp/loading.html")))
        .nest_service("/static", ServeDir::new("webapp"))
        .nest_service("/textures", ServeDir::new("textures"))
}
