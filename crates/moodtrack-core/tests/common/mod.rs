//! In-process stand-in for the moodtrack backend.
//!
//! Records every request it sees (method, path, headers) so tests can assert
//! on what the client actually sent.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub const VALID_TOKEN: &str = "tkn1";

/// How long `POST /moods` takes to answer, so overlapping submits can be observed
pub const SLOW_SUBMIT: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    empty_delete: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().last().cloned().expect("no request recorded")
    }

    /// Make `DELETE /moods` answer 204 with no body
    pub fn reply_empty_on_delete(&self) {
        self.empty_delete.store(true, Ordering::SeqCst);
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

/// Start the mock backend on an ephemeral port. Returns its API base URL.
pub async fn start_backend() -> (String, MockBackend) {
    let backend = MockBackend::default();

    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        .route("/moods/config", get(mood_config))
        .route("/moods", get(list_moods).post(add_mood).put(update_mood).delete(delete_mood))
        .route("/doctor/patients", get(patients))
        .route(
            "/doctor/patients/{id}/assign",
            post(assign_patient).delete(unassign_patient),
        )
        .route("/doctor/patients/{id}/moods", get(patient_moods))
        .route("/health", get(health));

    let app = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), backend)
}

async fn record(State(backend): State<MockBackend>, request: Request, next: Next) -> Response {
    // Nothing borrowing `request` may live across the await below
    let recorded = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
        }
    };
    backend.requests.lock().unwrap().push(recorded);
    next.run(request).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", VALID_TOKEN).as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized", "message": "Invalid or expired token"})),
    )
        .into_response()
}

fn patient_user() -> Value {
    json!({"id": "1", "email": "a@b.com", "name": "A", "role": "patient"})
}

fn mood(rate: u64) -> Value {
    json!({
        "id": "m-today",
        "userId": "1",
        "rate": rate,
        "date": "2026-10-18T08:00:00.000Z",
        "createdAt": "2026-10-18T08:00:00.000Z"
    })
}

// ===== Handlers =====

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "a@b.com" && body["password"] == "x" {
        Json(json!({"message": "Login successful", "token": VALID_TOKEN, "user": patient_user()}))
            .into_response()
    } else {
        Json(json!({"error": "Invalid credentials", "message": "Email or password is wrong"}))
            .into_response()
    }
}

async fn profile(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"user": patient_user()})).into_response()
}

async fn mood_config(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"error": null, "config": {"rate": {"min": 1, "max": 10}}})).into_response()
}

async fn list_moods(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "error": null,
        "moods": [
            mood(7),
            {"id": "m-old", "userId": "1", "rate": 3, "date": "2026-10-10T08:00:00.000Z", "createdAt": "2026-10-10T08:00:00.000Z"}
        ],
        "todayTracked": true,
        "todayMood": mood(7)
    }))
    .into_response()
}

async fn add_mood(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    tokio::time::sleep(SLOW_SUBMIT).await;
    let rate = body["rate"].as_u64().unwrap_or(0);
    Json(json!({"error": null, "message": "Mood added", "mood": mood(rate)})).into_response()
}

async fn update_mood(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let rate = body["rate"].as_u64().unwrap_or(0);
    Json(json!({"error": null, "message": "Mood updated", "mood": mood(rate)})).into_response()
}

async fn delete_mood(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if backend.empty_delete.load(Ordering::SeqCst) {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({"error": null, "message": "Mood deleted"})).into_response()
}

async fn patients(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "error": null,
        "myPatients": [
            {"id": "p1", "email": "p1@x.ro", "name": "Ana", "role": "patient", "moodScore": 6.5, "moodCount": 4}
        ],
        "unassignedPatients": [
            {"id": "p2", "email": "p2@x.ro", "name": "Ion", "role": "patient", "moodScore": null, "moodCount": 0}
        ]
    }))
    .into_response()
}

async fn assign_patient(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == "p1" {
        return Json(json!({"error": "Patient already assigned"})).into_response();
    }
    Json(json!({"error": null, "message": format!("Patient {} assigned", id)})).into_response()
}

async fn unassign_patient(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"error": null, "message": format!("Patient {} unassigned", id)})).into_response()
}

async fn patient_moods(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != "p1" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Patient not found"}))).into_response();
    }
    Json(json!({
        "error": null,
        "patient": {"id": "p1", "name": "Ana", "email": "p1@x.ro"},
        "moods": [
            {"id": "m1", "rate": 8, "date": "2026-10-17"},
            {"id": "m2", "rate": 5, "date": "2026-10-16"}
        ]
    }))
    .into_response()
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "timestamp": "2026-10-18T12:00:00.000Z"}))
}
