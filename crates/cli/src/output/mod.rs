//! Result envelope printed on stdout for every command.
//!
//! ```json
//! { "ok": true, "command": "tap", "data": { ... }, "timings": { "durationMs": 42 } }
//! ```
//!
//! On failure `data` is replaced by `error`:
//!
//! ```json
//! { "ok": false, "command": "tap", "error": { "code": "DISPATCH_EXHAUSTED", "message": "..." } }
//! ```


use std::fmt;
use std::io::{self, Write};
use std::time::Instant;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,

	pub command: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,

	pub message: String,

	/// HTTP status of the failing backend reply, when there was one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<u16>,
}

/// Stable error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// No session could be adopted and auto-create is off
	NoSession,
	/// The backend reported the session gone and it could not be healed
	SessionInvalid,
	SessionCreateFailed,
	/// Every protocol was tried and none worked
	DispatchExhausted,
	/// HTTP or network failure that stopped dispatch
	Transport,
	/// A multi-request gesture stopped midway
	PartialGesture,
	InvalidInput,
	InternalError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::NoSession => "NO_SESSION",
			ErrorCode::SessionInvalid => "SESSION_INVALID",
			ErrorCode::SessionCreateFailed => "SESSION_CREATE_FAILED",
			ErrorCode::DispatchExhausted => "DISPATCH_EXHAUSTED",
			ErrorCode::Transport => "TRANSPORT",
			ErrorCode::PartialGesture => "PARTIAL_GESTURE",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Instant::now(),
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			ok: self.error.is_none(),
			command: self.command,
			data: if self.error.is_none() { self.data } else { None },
			error: self.error,
			timings: Some(Timings {
				duration_ms: self.start_time.elapsed().as_millis() as u64,
			}),
		}
	}
}

/// Writes the envelope as one JSON line on stdout.
pub fn print_result<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();
	match serde_json::to_string(result) {
		Ok(json) => {
			let _ = writeln!(stdout, "{json}");
		}
		Err(e) => {
			let _ = writeln!(
				stdout,
				r#"{{"ok":false,"command":"{}","error":{{"code":"{}","message":"failed to serialize result: {}"}}}}"#,
				result.command,
				ErrorCode::InternalError,
				e.to_string().replace('"', "'")
			);
		}
	}
}

/// Human-readable one-liner on stderr.
pub fn print_error_stderr(error: &CommandError) {
	let _ = writeln!(io::stderr(), "error [{}]: {}", error.code, error.message);
}
