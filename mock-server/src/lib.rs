//! In-memory stand-in for the Wilddog REST data API.
//!
//! Serves a single JSON tree under `/{*path}.json`. GET reads, PUT replaces,
//! PATCH merges, POST appends under a generated key and DELETE removes.
//! Request bodies have no size limit. When started with an auth token, every
//! request must carry it as `?auth=`.

pub mod tree;

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const JSON_SUFFIX: &str = ".json";

pub type Db = Arc<RwLock<Value>>;

#[derive(Clone, Default)]
pub struct AppState {
    pub db: Db,
    pub auth_token: Option<Arc<str>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type Params = HashMap<String, String>;

pub fn app() -> Router {
    router(AppState::default())
}

/// An app that rejects requests whose `auth` parameter is not `token`.
pub fn app_with_auth(token: &str) -> Router {
    router(AppState {
        db: Db::default(),
        auth_token: Some(token.into()),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/{*path}",
            get(read).put(replace).patch(merge).post(append).delete(remove),
        )
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

fn reject(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: error.into() })).into_response()
}

/// Check auth and split the request path into tree segments.
fn prepare(state: &AppState, path: &str, params: &Params) -> Result<Vec<String>, Response> {
    if let Some(expected) = &state.auth_token {
        if params.get("auth").map(String::as_str) != Some(&**expected) {
            return Err(reject(StatusCode::UNAUTHORIZED, "Permission denied"));
        }
    }
    let Some(path) = path.strip_suffix(JSON_SUFFIX) else {
        return Err(reject(StatusCode::NOT_FOUND, "Not found"));
    };
    Ok(path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect())
}

fn parse_body(body: &Bytes) -> Result<Value, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(reject(StatusCode::BAD_REQUEST, "No data supplied."));
    }
    serde_json::from_slice(body)
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "Invalid data; couldn't parse JSON object."))
}

async fn read(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Response> {
    let segments = prepare(&state, &path, &params)?;
    let db = state.db.read().await;
    Ok(Json(tree::lookup(&db, &segments)))
}

async fn replace(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Result<Json<Value>, Response> {
    let segments = prepare(&state, &path, &params)?;
    let value = tree::prune(parse_body(&body)?);
    tree::set(&mut *state.db.write().await, &segments, value.clone());
    info!(%path, "replaced");
    Ok(Json(value))
}

async fn merge(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Result<Json<Value>, Response> {
    let segments = prepare(&state, &path, &params)?;
    let Value::Object(patch) = parse_body(&body)? else {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Invalid data; couldn't parse JSON object. Are you sending a JSON object with valid key names?",
        ));
    };
    tree::merge(&mut *state.db.write().await, &segments, patch.clone());
    info!(%path, "merged");
    Ok(Json(Value::Object(patch)))
}

async fn append(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Result<Json<Value>, Response> {
    let mut segments = prepare(&state, &path, &params)?;
    let value = parse_body(&body)?;
    let key = Uuid::new_v4().simple().to_string();
    segments.push(key.clone());
    tree::set(&mut *state.db.write().await, &segments, value);
    info!(%path, %key, "appended");
    Ok(Json(json!({ "name": key })))
}

async fn remove(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Response> {
    let segments = prepare(&state, &path, &params)?;
    tree::set(&mut *state.db.write().await, &segments, Value::Null);
    info!(%path, "removed");
    Ok(Json(Value::Null))
}
