use crate::config::presets as preset_store;
use crate::simulate;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn defaults() -> Json<Value> {
    match preset_store::load_defaults() {
        Ok(cfg) => Json(cfg.to_defaults_json()),
        Err(e) => Json(json!({"error": e.to_string()})),
    }
}

pub async fn presets() -> Json<Value> {
    match preset_store::list_presets() {
        Ok(list) => Json(json!({"presets": list})),
        Err(e) => Json(json!({"error": e.to_string()})),
    }
}

pub async fn preset_file(Path(filename): Path<String>) -> Json<Value> {
    match preset_store::read_preset(&filename) {
        Ok(cfg) => Json(cfg.to_defaults_json()),
        Err(e) => Json(json!({"error": e.to_string()})),
    }
}

pub async fn compute(Json(payload): Json<Value>) -> (StatusCode, Json<Value>) {
    let result = tokio::task::spawn_blocking(move || run_compute(payload)).await;

    match result {
        Ok(Ok(value)) => (StatusCode::OK, Json(value)),
        Ok(Err(message)) => (StatusCode::OK, Json(json!({"error": message}))),
        Err(join_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": join_err.to_string()})),
        ),
    }
}

fn run_compute(payload: Value) -> Result<Value, String> {
    let mut config = preset_store::load_defaults().map_err(|e| e.to_string())?;
    config.merge(&payload).map_err(|e| e.to_string())?;
    let (dataset, metrics) = simulate::run(&config).map_err(|e| e.to_string())?;
    Ok(json!({"dataset": dataset, "metrics": metrics}))
}
