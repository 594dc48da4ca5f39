//! HTTP front end over the scheduling engine.
//!
//! Tasks live in memory behind a mutex; every `/schedule` call builds a fresh
//! scheduler from them and throws it away afterwards.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use blockwise_core::{DayBounds, TaskRecord};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::request::ScheduleRequest;

#[derive(Clone)]
pub struct AppState {
    tasks: Arc<Mutex<Vec<TaskRecord>>>,
    bounds: DayBounds,
}

impl AppState {
    pub fn new(bounds: DayBounds) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(Vec::new())),
            bounds,
        }
    }
}

fn error_response(status: StatusCode, err: &anyhow::Error) -> Response {
    (status, Json(json!({ "error": format!("{err:#}") }))).into_response()
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Blockwise scheduler is running" }))
        .route("/tasks", get(list_tasks).post(add_task))
        .route("/tasks/reset", post(reset_tasks))
        .route("/tasks/:id", delete(remove_task))
        .route("/schedule", post(schedule))
        // Paths used by the existing web frontend.
        .route("/add-task", post(add_task))
        .route("/get-tasks", get(list_tasks))
        .route("/reset-tasks", post(reset_tasks))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: &str, bounds: DayBounds) -> Result<()> {
    let app = router(AppState::new(bounds));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("Starting server on {}", addr);
    axum::serve(listener, app).await.context("serve http")?;
    Ok(())
}

async fn list_tasks(State(state): State<AppState>) -> impl IntoResponse {
    let tasks = state.tasks.lock().await;
    Json(json!({ "tasks": &*tasks }))
}

async fn add_task(State(state): State<AppState>, Json(task): Json<TaskRecord>) -> Response {
    let mut tasks = state.tasks.lock().await;
    info!(id = %task.id, title = %task.title, "task added");
    let body = json!({ "status": "success", "task": task });
    tasks.push(task);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn reset_tasks(State(state): State<AppState>) -> impl IntoResponse {
    state.tasks.lock().await.clear();
    Json(json!({ "status": "cleared" }))
}

async fn remove_task(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut tasks = state.tasks.lock().await;
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no task with id {id}") })),
        )
            .into_response();
    }
    Json(json!({ "status": "removed", "id": id })).into_response()
}

/// Schedule the stored tasks, optionally merged with a request document.
async fn schedule(State(state): State<AppState>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ScheduleRequest::default()
    } else {
        match serde_json::from_slice::<ScheduleRequest>(&body).context("parse request body") {
            Ok(r) => r,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
        }
    };

    let tasks = state.tasks.lock().await;
    let today = chrono::Local::now().date_naive();
    match request.run(&tasks, today, state.bounds) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
    }
}
