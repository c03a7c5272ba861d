use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Length of the body returned by `/status/{code}`.
pub const STATUS_BODY_LEN: usize = 500;

/// What `/echo` saw: method, headers (lowercased names), and the JSON body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
    pub request_id: Uuid,
}

/// Reply from `/flaky/{key}/{failures}` once the failures are used up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flaky {
    pub key: String,
    pub attempts: u32,
}

pub type Counters = Arc<RwLock<HashMap<String, u32>>>;

pub fn app() -> Router {
    let counters: Counters = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route(
            "/echo",
            get(echo).post(echo).put(echo).patch(echo).delete(echo),
        )
        .route("/status/{code}", any(status))
        .route("/text", get(text))
        .route("/flaky/{key}/{failures}", get(flaky))
        .with_state(counters)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        headers,
        body: serde_json::from_slice(&body).ok(),
        request_id: Uuid::new_v4(),
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, "x".repeat(STATUS_BODY_LEN)))
}

async fn text() -> &'static str {
    "not json"
}

async fn flaky(
    State(counters): State<Counters>,
    Path((key, failures)): Path<(String, u32)>,
) -> Result<Json<Flaky>, (StatusCode, String)> {
    let mut counters = counters.write().await;
    let attempts = counters.entry(key.clone()).or_insert(0);
    *attempts += 1;
    if *attempts <= failures {
        tracing::debug!(%key, attempts = *attempts, failures, "rejecting flaky request");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            format!("attempt {attempts} for {key} rejected"),
        ));
    }
    Ok(Json(Flaky {
        key,
        attempts: *attempts,
    }))
}
