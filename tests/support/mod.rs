//! Local stand-ins for the Gemini and ArcGIS REST endpoints.

#![allow(dead_code)]

use ailocator::config::{Config, ExtractionMode};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub const GOOD_KEY: &str = "good-key";
pub const GOOD_PASSWORD: &str = "secret";
pub const TOKEN: &str = "tok-123";
pub const KEY_CHECK_REPLY: &str = "I am alive and well, thank you for checking in on me today.";

#[derive(Default)]
pub struct Mock {
    pub base_url: Mutex<String>,
    /// Replies for extraction calls, in order. Empty means `{}`.
    pub ai_replies: Mutex<VecDeque<String>>,
    pub ai_requests: Mutex<Vec<Value>>,
    pub upload_starts: Mutex<Vec<HeaderMap>>,
    pub uploaded_bytes: Mutex<Vec<usize>>,
    pub metadata_polls: Mutex<u32>,
    /// State reported by upload finalize. `None` means `PROCESSING`.
    pub finalize_state: Mutex<Option<&'static str>>,
    /// State reported by every metadata fetch. `None` turns `ACTIVE` on the
    /// second fetch.
    pub metadata_state: Mutex<Option<&'static str>>,
    /// Geocode answers keyed by the exact `SingleLine` query.
    pub places: Mutex<HashMap<String, (f64, f64)>>,
    pub geocode_queries: Mutex<Vec<String>>,
    pub reject_features: Mutex<bool>,
    pub added_features: Mutex<Vec<Value>>,
    pub feature_tokens: Mutex<Vec<String>>,
}

impl Mock {
    pub fn reply(&self, text: impl Into<String>) {
        self.ai_replies.lock().push_back(text.into());
    }

    pub fn place(&self, query: &str, x: f64, y: f64) {
        self.places.lock().insert(query.to_string(), (x, y));
    }

    pub fn added(&self) -> Vec<Value> {
        self.added_features.lock().clone()
    }
}

/// Start the mock on an ephemeral port; returns its base URL.
pub async fn spawn() -> (Arc<Mock>, String) {
    let mock = Arc::new(Mock::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    *mock.base_url.lock() = base.clone();

    let app = Router::new()
        .route("/v1beta/models/{call}", post(generate))
        .route("/upload/v1beta/files", post(upload_start))
        .route("/upload-session/{id}", post(upload_finalize))
        .route("/v1beta/files/{id}", get(file_metadata))
        .route("/geocode/findAddressCandidates", get(find_candidates))
        .route("/layer/addFeatures", post(add_features))
        .route("/portal/generateToken", post(generate_token))
        .route("/portal/community/self", get(community_self))
        .with_state(Arc::clone(&mock));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (mock, base)
}

/// Config pointing every endpoint at the mock.
pub fn config(base: &str, mode: ExtractionMode) -> Config {
    let mut config = Config::default();
    config.ai.base_url = base.to_string();
    config.ai.mode = mode;
    config.ai.upload_poll_interval_ms = 5;
    config.arcgis.portal_url = format!("{base}/portal");
    config.arcgis.geocode_url = format!("{base}/geocode");
    config.arcgis.feature_layer_url = format!("{base}/layer");
    config.http.timeout_secs = 10;
    config
}

fn key_ok(params: &HashMap<String, String>) -> bool {
    params.get("key").map(String::as_str) == Some(GOOD_KEY)
}

fn bad_key() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })),
    )
        .into_response()
}

async fn generate(
    State(mock): State<Arc<Mock>>,
    Path(call): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !call.ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if !key_ok(&params) {
        return bad_key();
    }
    let parts = body["contents"][0]["parts"].as_array().cloned().unwrap_or_default();
    let has_file = parts
        .iter()
        .any(|p| p.get("inline_data").is_some() || p.get("file_data").is_some());
    mock.ai_requests.lock().push(body);

    let text = if has_file {
        mock.ai_replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| "{}".to_string())
    } else {
        KEY_CHECK_REPLY.to_string()
    };
    Json(json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    }))
    .into_response()
}

async fn upload_start(
    State(mock): State<Arc<Mock>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !key_ok(&params) {
        return bad_key();
    }
    mock.upload_starts.lock().push(headers);
    let url = format!("{}/upload-session/abc", mock.base_url.lock());
    ([("x-goog-upload-url", url)], Json(json!({}))).into_response()
}

async fn upload_finalize(
    State(mock): State<Arc<Mock>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let command = headers
        .get("x-goog-upload-command")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if command != "upload, finalize" {
        return StatusCode::BAD_REQUEST.into_response();
    }
    mock.uploaded_bytes.lock().push(body.len());
    let base = mock.base_url.lock().clone();
    let state = mock.finalize_state.lock().unwrap_or("PROCESSING");
    Json(json!({
        "file": {
            "name": format!("files/{id}"),
            "uri": format!("{base}/v1beta/files/{id}"),
            "mimeType": "application/pdf",
            "state": state
        }
    }))
    .into_response()
}

async fn file_metadata(
    State(mock): State<Arc<Mock>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !key_ok(&params) {
        return bad_key();
    }
    let polls = {
        let mut polls = mock.metadata_polls.lock();
        *polls += 1;
        *polls
    };
    let state = match *mock.metadata_state.lock() {
        Some(state) => state,
        None if polls < 2 => "PROCESSING",
        None => "ACTIVE",
    };
    let base = mock.base_url.lock().clone();
    Json(json!({
        "name": format!("files/{id}"),
        "uri": format!("{base}/v1beta/files/{id}"),
        "mimeType": "application/pdf",
        "state": state
    }))
    .into_response()
}

async fn find_candidates(
    State(mock): State<Arc<Mock>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let query = params.get("SingleLine").cloned().unwrap_or_default();
    mock.geocode_queries.lock().push(query.clone());
    let candidates = match mock.places.lock().get(&query) {
        Some(&(x, y)) => json!([{
            "address": query,
            "location": {"x": x, "y": y},
            "score": 100,
            "attributes": {}
        }]),
        None => json!([]),
    };
    Json(json!({
        "spatialReference": {"wkid": 4326, "latestWkid": 4326},
        "candidates": candidates
    }))
}

async fn add_features(
    State(mock): State<Arc<Mock>>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    let features: Value = form
        .get("features")
        .and_then(|f| serde_json::from_str(f).ok())
        .unwrap_or(Value::Null);
    mock.feature_tokens
        .lock()
        .push(form.get("token").cloned().unwrap_or_default());
    if *mock.reject_features.lock() {
        return Json(json!({
            "addResults": [{
                "objectId": null,
                "success": false,
                "error": {"code": 1000, "description": "Invalid geometry."}
            }]
        }));
    }
    let object_id = {
        let mut added = mock.added_features.lock();
        added.push(features);
        added.len() as i64
    };
    Json(json!({"addResults": [{"objectId": object_id, "globalId": null, "success": true}]}))
}

async fn generate_token(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    if form.get("password").map(String::as_str) == Some(GOOD_PASSWORD) {
        let expires = chrono::Utc::now().timestamp_millis() + 2 * 60 * 60 * 1000;
        Json(json!({"token": TOKEN, "expires": expires, "ssl": true}))
    } else {
        Json(json!({
            "error": {
                "code": 400,
                "message": "Unable to generate token.",
                "details": ["Invalid username or password."]
            }
        }))
    }
}

async fn community_self(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("token").map(String::as_str) == Some(TOKEN) {
        Json(json!({"username": "jdoe", "fullName": "Jordan Doe"}))
    } else {
        Json(json!({"error": {"code": 498, "message": "Invalid token."}}))
    }
}
