//! Session creation, listing, and probing payloads.
//!
//! Backends disagree on where they put the session id, so the extraction
//! helpers here accept every shape seen in the wild rather than a single
//! typed response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Capabilities;

/// Body of `POST /session`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewSessionRequest {
	pub capabilities: CapabilityRequest,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRequest {
	#[serde(default, skip_serializing_if = "Capabilities::is_empty")]
	pub always_match: Capabilities,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub first_match: Vec<Capabilities>,
}

impl NewSessionRequest {
	/// `{"capabilities": {}}`, accepted by WebDriverAgent as "attach to whatever is running".
	pub fn minimal() -> Self {
		Self::default()
	}

	/// Wraps `caps` as the single `firstMatch` entry; empty caps yield the minimal request.
	pub fn first_match(caps: Capabilities) -> Self {
		if caps.is_empty() {
			return Self::minimal();
		}
		Self {
			capabilities: CapabilityRequest {
				always_match: Capabilities::new(),
				first_match: vec![caps],
			},
		}
	}
}

/// Pulls a session id out of a creation response.
///
/// Checks `value.sessionId`, `value.id`, then top-level `sessionId` and `id`.
pub fn extract_session_id(body: &Value) -> Option<String> {
	let value = body.get("value");
	[
		value.and_then(|v| v.get("sessionId")),
		value.and_then(|v| v.get("id")),
		body.get("sessionId"),
		body.get("id"),
	]
	.into_iter()
	.flatten()
	.find_map(non_empty_str)
}

/// Session ids from `GET /sessions`, in backend order (oldest first).
///
/// Accepts `value: [...]` as well as `value: {sessions: [...]}`.
pub fn session_ids(body: &Value) -> Vec<String> {
	let Some(value) = body.get("value") else {
		return Vec::new();
	};
	let list = match value {
		Value::Array(items) => items.as_slice(),
		Value::Object(map) => match map.get("sessions") {
			Some(Value::Array(items)) => items.as_slice(),
			_ => &[],
		},
		_ => &[],
	};
	list.iter()
		.filter_map(|entry| entry.get("id").or_else(|| entry.get("sessionId")).and_then(non_empty_str))
		.collect()
}

/// Session id advertised by `GET /status`, if any.
pub fn status_session_id(body: &Value) -> Option<String> {
	body.get("sessionId")
		.and_then(non_empty_str)
		.or_else(|| body.get("value").and_then(|v| v.get("sessionId")).and_then(non_empty_str))
}

/// W3C error envelope message: `value.error` and `value.message` joined.
pub fn error_message(body: &Value) -> Option<String> {
	let value = body.get("value")?;
	let error = value.get("error").and_then(Value::as_str);
	let message = value.get("message").and_then(Value::as_str);
	match (error, message) {
		(Some(e), Some(m)) => Some(format!("{e}: {m}")),
		(Some(e), None) => Some(e.to_string()),
		(None, Some(m)) => Some(m.to_string()),
		(None, None) => None,
	}
}

fn non_empty_str(value: &Value) -> Option<String> {
	value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Base64 image from `GET /session/{id}/screenshot`.
///
/// The image is `value` itself or one of `value.value`, `value.data`,
/// `value.screenshot`, `value.image`.
pub fn screenshot_data(body: &Value) -> Option<&str> {
	let value = body.get("value")?;
	if let Some(data) = value.as_str() {
		return Some(data);
	}
	["value", "data", "screenshot", "image"]
		.iter()
		.find_map(|key| value.get(*key).and_then(Value::as_str))
}

/// Body of `POST /session/{id}/execute/sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteScriptRequest {
	pub script: String,
	pub args: Vec<Value>,
}

impl ExecuteScriptRequest {
	/// Arrays pass through; objects and `null` are wrapped in a one-element array.
	///
	/// Returns `None` for scalar arguments, which `mobile:` commands reject.
	pub fn new(script: impl Into<String>, args: Value) -> Option<Self> {
		let args = match args {
			Value::Array(items) => items,
			Value::Object(map) => vec![Value::Object(map)],
			Value::Null => vec![Value::Object(Default::default())],
			_ => return None,
		};
		Some(Self {
			script: script.into(),
			args,
		})
	}
}

/// Body of `POST /session/{id}/appium/settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRequest {
	pub settings: serde_json::Map<String, Value>,
}

/// Logical screen size from `GET /session/{id}/window/size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
	pub width: u32,
	pub height: u32,
}

impl WindowSize {
	/// Reads `value.width` / `value.height`; zero sizes count as absent.
	pub fn from_response(body: &Value) -> Option<Self> {
		let value = body.get("value")?;
		let width = value.get("width").and_then(Value::as_f64)? as u32;
		let height = value.get("height").and_then(Value::as_f64)? as u32;
		(width > 0 && height > 0).then_some(Self { width, height })
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn minimal_request_is_empty_capabilities() {
		assert_eq!(serde_json::to_value(NewSessionRequest::minimal()).unwrap(), json!({ "capabilities": {} }));
	}

	#[test]
	fn first_match_wraps_caps() {
		let mut caps = Capabilities::new();
		caps.insert("platformName".into(), json!("iOS"));
		assert_eq!(
			serde_json::to_value(NewSessionRequest::first_match(caps)).unwrap(),
			json!({ "capabilities": { "firstMatch": [{ "platformName": "iOS" }] } })
		);
	}

	#[test]
	fn session_id_found_in_every_shape() {
		assert_eq!(extract_session_id(&json!({ "value": { "sessionId": "a" } })).as_deref(), Some("a"));
		assert_eq!(extract_session_id(&json!({ "value": { "id": "b" } })).as_deref(), Some("b"));
		assert_eq!(extract_session_id(&json!({ "sessionId": "c", "value": {} })).as_deref(), Some("c"));
		assert_eq!(extract_session_id(&json!({ "id": "d" })).as_deref(), Some("d"));
		assert_eq!(extract_session_id(&json!({ "value": { "sessionId": "" } })), None);
		assert_eq!(extract_session_id(&json!({ "value": null })), None);
	}

	#[test]
	fn session_list_accepts_both_layouts() {
		let flat = json!({ "value": [{ "id": "old" }, { "sessionId": "new" }] });
		assert_eq!(session_ids(&flat), vec!["old", "new"]);
		let nested = json!({ "value": { "sessions": [{ "id": "x" }] } });
		assert_eq!(session_ids(&nested), vec!["x"]);
		assert!(session_ids(&json!({ "value": "nope" })).is_empty());
	}

	#[test]
	fn status_session_id_checks_top_level_then_value() {
		assert_eq!(status_session_id(&json!({ "sessionId": "s1" })).as_deref(), Some("s1"));
		assert_eq!(status_session_id(&json!({ "value": { "sessionId": "s2" } })).as_deref(), Some("s2"));
		assert_eq!(status_session_id(&json!({ "value": { "ready": true } })), None);
	}

	#[test]
	fn error_message_joins_error_and_message() {
		let body = json!({ "value": { "error": "invalid session id", "message": "Session does not exist" } });
		assert_eq!(error_message(&body).as_deref(), Some("invalid session id: Session does not exist"));
	}

	#[test]
	fn script_args_are_normalized() {
		let req = ExecuteScriptRequest::new("mobile: swipe", json!({ "direction": "down" })).unwrap();
		assert_eq!(req.args, vec![json!({ "direction": "down" })]);
		let req = ExecuteScriptRequest::new("mobile: swipe", Value::Null).unwrap();
		assert_eq!(req.args, vec![json!({})]);
		let req = ExecuteScriptRequest::new("mobile: swipe", json!([1, 2])).unwrap();
		assert_eq!(req.args, vec![json!(1), json!(2)]);
		assert!(ExecuteScriptRequest::new("mobile: swipe", json!(3)).is_none());
	}

	#[test]
	fn screenshot_data_found_in_every_shape() {
		assert_eq!(screenshot_data(&json!({ "value": "iVBOR" })), Some("iVBOR"));
		assert_eq!(screenshot_data(&json!({ "value": { "data": "abc" } })), Some("abc"));
		assert_eq!(screenshot_data(&json!({ "value": { "image": "xyz" } })), Some("xyz"));
		assert_eq!(screenshot_data(&json!({ "value": { "width": 3 } })), None);
	}

	#[test]
	fn window_size_rejects_zero() {
		assert_eq!(
			WindowSize::from_response(&json!({ "value": { "width": 390, "height": 844 } })),
			Some(WindowSize { width: 390, height: 844 })
		);
		assert_eq!(WindowSize::from_response(&json!({ "value": { "width": 0, "height": 844 } })), None);
	}
}
