//! In-process fake WebDriverAgent / Appium backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wdactl::{AdoptionConfig, Config, Controller};

#[derive(Default)]
pub struct BackendState {
	/// Live session ids, oldest first.
	pub sessions: Mutex<Vec<String>>,
	/// Status code per session-relative endpoint (e.g. `actions`); unset endpoints answer 404.
	pub endpoints: Mutex<HashMap<String, u16>>,
	/// Every `(method, path)` received.
	pub hits: Mutex<Vec<(String, String)>>,
	/// Bodies received per session-relative endpoint.
	pub bodies: Mutex<Vec<(String, Value)>>,
	created: Mutex<u32>,
	pub create_delay: Mutex<Option<Duration>>,
	/// Held before answering any session-relative POST.
	pub reply_delay: Mutex<Option<Duration>>,
	/// Base64 image served from `GET /session/{id}/screenshot`.
	pub screenshot: Mutex<Option<String>>,
}

impl BackendState {
	pub fn support(&self, endpoint: &str, status: u16) {
		self.endpoints.lock().insert(endpoint.to_string(), status);
	}

	pub fn add_session(&self, id: &str) {
		self.sessions.lock().push(id.to_string());
	}

	/// Simulates a backend restart: every session is forgotten.
	pub fn restart_with(&self, id: &str) {
		let mut sessions = self.sessions.lock();
		sessions.clear();
		sessions.push(id.to_string());
	}

	pub fn hits(&self, method: &str, path: &str) -> usize {
		self.hits.lock().iter().filter(|(m, p)| m == method && p == path).count()
	}

	pub fn created(&self) -> u32 {
		*self.created.lock()
	}

	fn record(&self, method: &str, path: String) {
		self.hits.lock().push((method.to_string(), path));
	}
}

pub struct FakeBackend {
	pub base: String,
	pub state: Arc<BackendState>,
}

impl FakeBackend {
	pub async fn start() -> Self {
		let state = Arc::new(BackendState::default());
		let app = Router::new()
			.route("/status", get(status))
			.route("/sessions", get(list_sessions))
			.route("/session", post(create_session))
			.route("/session/{id}", get(get_session))
			.route("/session/{id}/{*endpoint}", post(session_post).get(session_get))
			.with_state(state.clone());

		let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake backend");
		let addr = listener.local_addr().expect("local addr");
		tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});
		Self {
			base: format!("http://{addr}"),
			state,
		}
	}

	/// Controller pointing both WDA and Appium at this backend.
	pub fn controller(&self, configure: impl FnOnce(&mut Config)) -> Controller {
		let mut config = Config {
			wda_base: self.base.clone(),
			appium_base: self.base.clone(),
			adoption: AdoptionConfig {
				status_polls: 2,
				poll_interval: Duration::from_millis(10),
				..AdoptionConfig::default()
			},
			..Config::default()
		};
		configure(&mut config);
		Controller::new(config).expect("controller")
	}
}

fn session_gone() -> Response {
	(
		StatusCode::NOT_FOUND,
		Json(json!({ "value": { "error": "invalid session id", "message": "Session does not exist" } })),
	)
		.into_response()
}

async fn status(State(state): State<Arc<BackendState>>) -> Json<Value> {
	state.record("GET", "/status".into());
	Json(json!({ "value": { "ready": true } }))
}

async fn list_sessions(State(state): State<Arc<BackendState>>) -> Json<Value> {
	state.record("GET", "/sessions".into());
	let sessions: Vec<Value> = state.sessions.lock().iter().map(|id| json!({ "id": id })).collect();
	Json(json!({ "value": sessions }))
}

async fn create_session(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Json<Value> {
	state.record("POST", "/session".into());
	let delay = *state.create_delay.lock();
	if let Some(delay) = delay {
		tokio::time::sleep(delay).await;
	}
	let id = {
		let mut created = state.created.lock();
		*created += 1;
		format!("created-{created}")
	};
	state.add_session(&id);
	state.bodies.lock().push(("session".into(), body));
	Json(json!({ "value": { "sessionId": id, "capabilities": {} } }))
}

async fn get_session(State(state): State<Arc<BackendState>>, Path(id): Path<String>) -> Response {
	state.record("GET", format!("/session/{id}"));
	if state.sessions.lock().contains(&id) {
		Json(json!({ "value": { "sessionId": id } })).into_response()
	} else {
		session_gone()
	}
}

fn endpoint_reply(state: &BackendState, id: &str, endpoint: &str) -> Response {
	if !state.sessions.lock().iter().any(|s| s == id) {
		return session_gone();
	}
	let status = state.endpoints.lock().get(endpoint).copied().unwrap_or(404);
	match status {
		200 => Json(json!({ "value": null })).into_response(),
		404 => (StatusCode::NOT_FOUND, Json(json!({ "value": { "error": "unknown command", "message": "Unhandled endpoint" } }))).into_response(),
		other => {
			let code = StatusCode::from_u16(other).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
			(code, Json(json!({ "value": { "error": "unknown error", "message": "boom" } }))).into_response()
		}
	}
}

async fn session_post(
	State(state): State<Arc<BackendState>>,
	Path((id, endpoint)): Path<(String, String)>,
	Json(body): Json<Value>,
) -> Response {
	state.record("POST", format!("/session/{id}/{endpoint}"));
	state.bodies.lock().push((endpoint.clone(), body));
	let delay = *state.reply_delay.lock();
	if let Some(delay) = delay {
		tokio::time::sleep(delay).await;
	}
	endpoint_reply(&state, &id, &endpoint)
}

async fn session_get(State(state): State<Arc<BackendState>>, Path((id, endpoint)): Path<(String, String)>) -> Response {
	state.record("GET", format!("/session/{id}/{endpoint}"));
	if endpoint == "window/size" && state.endpoints.lock().contains_key("window/size") {
		return Json(json!({ "value": { "width": 390, "height": 844 } })).into_response();
	}
	let screenshot = state.screenshot.lock().clone();
	if let (Some(image), "screenshot") = (screenshot, endpoint.as_str()) {
		return Json(json!({ "value": { "value": image } })).into_response();
	}
	endpoint_reply(&state, &id, &endpoint)
}
