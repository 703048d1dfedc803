use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_users, Echo, ErrorBody, User};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn seeded() -> axum::Router {
    app_with_users(vec![User {
        id: 1,
        name: "a".to_string(),
        email: None,
    }])
}

// --- users ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(empty_request("GET", "/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(resp).await;
    assert!(users.is_empty());
}

#[tokio::test]
async fn get_seeded_user() {
    let resp = seeded().oneshot(empty_request("GET", "/users/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, r#"{"id":1,"name":"a"}"#);
}

#[tokio::test]
async fn get_missing_user_returns_json_404() {
    let resp = app().oneshot(empty_request("GET", "/users/7")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "not found");
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/users/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_user_returns_201_with_next_id() {
    let resp = seeded()
        .oneshot(json_request("POST", "/users", r#"{"name":"b"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = body_json(resp).await;
    assert_eq!(user.id, 2);
    assert_eq!(user.name, "b");
}

#[tokio::test]
async fn create_user_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"not_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn replace_user_clears_omitted_email() {
    let app = app_with_users(vec![User {
        id: 3,
        name: "c".to_string(),
        email: Some("c@example.com".to_string()),
    }]);
    let resp = app
        .oneshot(json_request("PUT", "/users/3", r#"{"name":"cc"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "cc");
    assert!(user.email.is_none());
}

#[tokio::test]
async fn patch_user_keeps_omitted_fields() {
    let resp = seeded()
        .oneshot(json_request("PATCH", "/users/1", r#"{"email":"a@example.com"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "a");
    assert_eq!(user.email.as_deref(), Some("a@example.com"));
}

#[tokio::test]
async fn delete_user_returns_removed_user() {
    use tower::Service;

    let mut app = seeded().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", "/users/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let removed: User = body_json(resp).await;
    assert_eq!(removed.id, 1);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", "/users/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_headers_and_body() {
    let resp = app()
        .oneshot(json_request("PATCH", "/echo", r#"{"k":"v"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PATCH");
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.body, Some(serde_json::json!({ "k": "v" })));
    assert_eq!(echo.raw_body, r#"{"k":"v"}"#);
}

#[tokio::test]
async fn echo_without_body() {
    let resp = app().oneshot(empty_request("GET", "/echo")).await.unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert!(echo.body.is_none());
    assert!(echo.raw_body.is_empty());
}

// --- status / malformed ---

#[tokio::test]
async fn status_endpoint_returns_requested_code() {
    let resp = app().oneshot(empty_request("POST", "/status/503")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.error, "service unavailable");
}

#[tokio::test]
async fn status_endpoint_rejects_out_of_range_code() {
    let resp = app().oneshot(empty_request("GET", "/status/1000")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_endpoint_returns_invalid_json() {
    let resp = app().oneshot(empty_request("GET", "/malformed")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "not json");
}

#[tokio::test]
async fn large_endpoint_returns_string_of_requested_size() {
    let resp = app().oneshot(empty_request("GET", "/large/5")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, r#""xxxxx""#);
}

#[tokio::test]
async fn large_endpoint_post_is_an_error_status() {
    let resp = app().oneshot(empty_request("POST", "/large/3")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
