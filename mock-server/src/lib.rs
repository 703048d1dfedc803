use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct NewUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// What `/echo` saw: method, headers (lowercase names), and the body both
/// raw and, when it parses, as JSON.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
    pub raw_body: String,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<u64, User>,
    next_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

type ApiError = (StatusCode, Json<ErrorBody>);

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not found".to_string(),
        }),
    )
}

pub fn app() -> Router {
    app_with_users(Vec::new())
}

/// Router preloaded with `users`. New ids continue after the largest one.
pub fn app_with_users(users: Vec<User>) -> Router {
    let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
    let store = Store {
        users: users.into_iter().map(|u| (u.id, u)).collect(),
        next_id,
    };
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user)
                .put(replace_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/slow/{millis}", get(slow))
        .route("/malformed", get(malformed))
        .route("/large/{bytes}", any(large))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, app()).await
}

pub async fn run_with(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let store = db.read().await;
    let mut users: Vec<User> = store.users.values().cloned().collect();
    users.sort_by_key(|u| u.id);
    Json(users)
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<NewUser>,
) -> (StatusCode, Json<User>) {
    let mut store = db.write().await;
    let user = User {
        id: store.next_id,
        name: input.name,
        email: input.email,
    };
    store.next_id += 1;
    store.users.insert(user.id, user.clone());
    tracing::debug!(id = user.id, "created user");
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, ApiError> {
    let store = db.read().await;
    store.users.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn replace_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    let mut store = db.write().await;
    let user = store.users.get_mut(&id).ok_or_else(not_found)?;
    user.name = input.name;
    user.email = input.email;
    Ok(Json(user.clone()))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    let mut store = db.write().await;
    let user = store.users.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = Some(email);
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, ApiError> {
    let mut store = db.write().await;
    store.users.remove(&id).map(Json).ok_or_else(not_found)
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        headers,
        body: serde_json::from_slice(&body).ok(),
        raw_body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Respond with `code` and `{"error": "<reason>"}`.
async fn status(Path(code): Path<u16>) -> Result<impl IntoResponse, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let reason = status.canonical_reason().unwrap_or("unknown").to_lowercase();
    Ok((status, Json(ErrorBody { error: reason })))
}

async fn slow(Path(millis): Path<u64>) -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(serde_json::json!({ "slept_ms": millis }))
}

/// A JSON string of `bytes` characters. `POST` answers with `500` instead
/// of `200`.
async fn large(method: Method, Path(bytes): Path<usize>) -> impl IntoResponse {
    let status = if method == Method::POST {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json("x".repeat(bytes)))
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "not json")
}
