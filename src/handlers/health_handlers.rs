//! Health & readiness handlers.
//!
//! - GET /api/health -> simple liveness ("ok")
//! - GET /api/ready  -> readiness that checks DB connectivity

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /api/health`
///
/// Liveness check; always 200 with `{"status": "ok"}` and never touches the
/// database.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /api/ready`
///
/// Runs `SELECT 1` against SQLite. HTTP 200 when it succeeds, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let sqlite_check = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*state.db)
        .await
    {
        Ok(1) => (true, None::<String>),
        Ok(v) => (false, Some(format!("unexpected result: {}", v))),
        Err(e) => (false, Some(format!("error: {}", e))),
    };

    let ok = sqlite_check.0;
    let mut checks = HashMap::new();
    checks.insert(
        "sqlite",
        CheckStatus {
            ok,
            error: sqlite_check.1,
        },
    );

    let body = ReadyResponse {
        status: if ok { "ok".into() } else { "error".into() },
        checks,
    };
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
