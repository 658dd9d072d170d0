//! HTTP tests for `HttpApi` against an in-process axum server.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sankofa_client::{
    session::{SessionStore, StoredSession},
    testing::sample_user,
    types::{AuthTokens, JoinGroupRequest},
    AuthContext, ClientError, HttpApi, MemorySessionStore, OtpPurpose, SankofaApi,
};

#[derive(Debug, Clone)]
struct Seen {
    path: String,
    authorization: Option<String>,
    cache_control: Option<String>,
    body: String,
}

#[derive(Default)]
struct Recorder {
    requests: Mutex<Vec<Seen>>,
}

impl Recorder {
    fn record(&self, path: String, headers: &HeaderMap, body: String) {
        let header_text = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(Seen {
            path,
            authorization: header_text(header::AUTHORIZATION),
            cache_control: header_text(header::CACHE_CONTROL),
            body,
        });
    }

    fn last(&self, path: &str) -> Seen {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|seen| seen.path == path)
            .cloned()
            .unwrap_or_else(|| panic!("no request to {path}"))
    }
}

type Shared = Arc<Recorder>;

fn user_json() -> Value {
    json!({
        "id": "user-1",
        "phone_number": "+233241234567",
        "full_name": "Ama Boateng",
        "kyc_status": "verified",
        "wallet_balance": "120.50",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

fn group_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Weekly Circle",
        "member_ids": ["member-1"],
        "target_member_count": 5,
        "contribution_amount": "100.00",
        "frequency": "weekly",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

async fn request_otp(State(rec): State<Shared>, headers: HeaderMap, body: String) -> Json<Value> {
    rec.record("/api/auth/otp/request/".into(), &headers, body);
    Json(json!({ "detail": "OTP sent." }))
}

async fn register(
    State(rec): State<Shared>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    rec.record("/api/auth/register/".into(), &headers, body);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "phone_number": ["A user with this phone number already exists."] })),
    )
}

async fn verify_otp(State(rec): State<Shared>, headers: HeaderMap, body: String) -> Json<Value> {
    rec.record("/api/auth/otp/verify/".into(), &headers, body);
    Json(json!({
        "access": "access-token",
        "refresh": "refresh-token",
        "user": user_json()
    }))
}

async fn me(State(rec): State<Shared>, headers: HeaderMap) -> Response {
    rec.record("/api/auth/me/".into(), &headers, String::new());
    let authorized = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|v| v == "Bearer access-token");
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Authentication credentials were not provided." })),
        )
            .into_response();
    }
    Json(user_json()).into_response()
}

async fn group(Path(id): Path<String>) -> Response {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response();
    }
    Json(group_json(&id)).into_response()
}

async fn join_group(
    State(rec): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    rec.record(format!("/api/groups/{id}/join/"), &headers, body);
    Json(group_json(&id))
}

async fn notifications() -> Json<Value> {
    Json(json!([
        { "id": "n-1", "title": "Payout", "body": "Due", "read": true, "created_at": "2024-05-01T10:00:00Z" },
        { "actionUrl": "/app/groups/g-1", "createdAt": "soon" }
    ]))
}

async fn mark_read(State(rec): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> StatusCode {
    rec.record(format!("/api/notifications/{id}/mark-read/"), &headers, String::new());
    StatusCode::NO_CONTENT
}

async fn transactions() -> &'static str {
    "<html>maintenance</html>"
}

async fn spawn_server() -> (String, Shared) {
    let recorder = Shared::default();
    let app = Router::new()
        .route("/api/auth/otp/request/", post(request_otp))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/otp/verify/", post(verify_otp))
        .route("/api/auth/me/", get(me))
        .route("/api/groups/:id/", get(group))
        .route("/api/groups/:id/join/", post(join_group))
        .route("/api/notifications/", get(notifications))
        .route("/api/notifications/:id/mark-read/", post(mark_read))
        .route("/api/transactions/", get(transactions))
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), recorder)
}

async fn client() -> (Arc<HttpApi>, Arc<MemorySessionStore>, Shared) {
    let (url, recorder) = spawn_server().await;
    let store = Arc::new(MemorySessionStore::new());
    let api = Arc::new(HttpApi::new(format!("{url}/"), store.clone()).unwrap());
    (api, store, recorder)
}

#[tokio::test]
async fn test_login_over_http_uses_issued_token() {
    let (api, store, recorder) = client().await;

    api.request_otp("+233241234567", OtpPurpose::Login)
        .await
        .unwrap();
    let seen = recorder.last("/api/auth/otp/request/");
    assert_eq!(seen.authorization, None);
    let body: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(
        body,
        json!({ "phone_number": "+233241234567", "purpose": "login" })
    );

    let auth = AuthContext::new(api.clone(), store);
    auth.login("+233241234567", "123456", OtpPurpose::Login)
        .await
        .unwrap();
    let verify: Value =
        serde_json::from_str(&recorder.last("/api/auth/otp/verify/").body).unwrap();
    assert_eq!(verify["code"], "123456");

    let user = auth.refresh_user().await.unwrap();
    assert_eq!(user.full_name, "Ama Boateng");
    let seen = recorder.last("/api/auth/me/");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer access-token"));
    assert_eq!(seen.cache_control.as_deref(), Some("no-cache"));
}

#[tokio::test]
async fn test_stale_session_does_not_block_sign_in() {
    let (api, store, recorder) = client().await;
    store
        .save(&StoredSession::new(
            AuthTokens {
                access: "expired".to_string(),
                refresh: "expired-refresh".to_string(),
            },
            sample_user("user-1"),
        ))
        .await
        .unwrap();

    api.request_otp("+233241234567", OtpPurpose::Login)
        .await
        .unwrap();
    assert_eq!(recorder.last("/api/auth/otp/request/").authorization, None);

    let auth = AuthContext::new(api.clone(), store.clone());
    auth.check_session().await;
    assert_eq!(
        recorder.last("/api/auth/me/").authorization.as_deref(),
        Some("Bearer expired")
    );
    assert!(!auth.is_authenticated());
    assert!(store.load().await.unwrap().is_none());

    auth.login("+233241234567", "123456", OtpPurpose::Login)
        .await
        .unwrap();
    assert_eq!(recorder.last("/api/auth/otp/verify/").authorization, None);
}

#[tokio::test]
async fn test_unauthenticated_request_reports_server_detail() {
    let (api, _, _) = client().await;

    let err = api.current_user(false).await.unwrap_err();

    let api_err = err.as_api().unwrap();
    assert_eq!(api_err.status, Some(401));
    assert_eq!(
        api_err.message,
        "Authentication credentials were not provided."
    );
}

#[tokio::test]
async fn test_registration_field_errors_are_kept() {
    let (api, _, recorder) = client().await;

    let err = api
        .register("+233241234567", "Ama Boateng", None)
        .await
        .unwrap_err();

    let api_err = err.as_api().unwrap();
    assert_eq!(api_err.status, Some(400));
    assert_eq!(
        api_err.field_error("phone_number"),
        Some("A user with this phone number already exists.")
    );
    let body: Value = serde_json::from_str(&recorder.last("/api/auth/register/").body).unwrap();
    assert!(body.get("email").is_none());
}

#[tokio::test]
async fn test_missing_group_is_not_found() {
    let (api, _, _) = client().await;

    assert!(api.get_group("missing").await.unwrap_err().is_not_found());
    assert_eq!(api.get_group("g-1").await.unwrap().total_members(), 1);
}

#[tokio::test]
async fn test_join_without_options_sends_no_body() {
    let (api, _, recorder) = client().await;

    api.join_group("g-1", &JoinGroupRequest::default())
        .await
        .unwrap();
    assert_eq!(recorder.last("/api/groups/g-1/join/").body, "");

    let request = JoinGroupRequest {
        reminders_enabled: Some(false),
        ..Default::default()
    };
    api.join_group("g-1", &request).await.unwrap();
    let body: Value = serde_json::from_str(&recorder.last("/api/groups/g-1/join/").body).unwrap();
    assert_eq!(body, json!({ "reminders_enabled": false }));
}

#[tokio::test]
async fn test_lenient_notifications_and_empty_responses() {
    let (api, _, recorder) = client().await;

    let notifications = api.list_notifications().await.unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].read, Some(true));
    assert_eq!(notifications[1].action_url.as_deref(), Some("/app/groups/g-1"));

    api.mark_notification_read("n-1").await.unwrap();
    recorder.last("/api/notifications/n-1/mark-read/");
}

#[tokio::test]
async fn test_unexpected_body_is_a_parse_error() {
    let (api, _, _) = client().await;

    assert!(matches!(
        api.list_transactions().await,
        Err(ClientError::Parse(_))
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let api = HttpApi::new("http://127.0.0.1:1", Arc::new(MemorySessionStore::new())).unwrap();

    assert!(matches!(
        api.list_groups().await,
        Err(ClientError::Network(_))
    ));
}

#[test]
fn test_base_url_needs_a_scheme() {
    let err = HttpApi::new("api.sankofa.example", Arc::new(MemorySessionStore::new())).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}
