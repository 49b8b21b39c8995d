//! Error taxonomy for dispatch, session management, and transport.
//!
//! Failures fall into four kinds that callers are expected to handle
//! differently:
//!
//! - [`Error::NoSession`] - no usable session and auto-create is disabled
//! - [`Error::SessionInvalid`] - the backend forgot the session; recoverable once via auto-heal
//! - [`Error::Transport`] - an HTTP status or network failure, classified by [`Error::fallback_decision`]
//! - [`Error::DispatchExhausted`] - every protocol was tried and failed

use thiserror::Error;

use crate::dispatch::Protocol;

pub type Result<T> = std::result::Result<T, Error>;

/// Upstream phrases meaning "this session no longer exists".
///
/// Appium and WebDriverAgent only report a dead session as free text, so the
/// phrases are matched case-insensitively. This is debt inherited from the
/// upstream API; keep matching confined to [`mentions_session_gone`].
pub const SESSION_GONE_MARKERS: [&str; 2] = ["invalid session id", "session is either terminated or not started"];

/// Returns `true` when `text` carries one of the [`SESSION_GONE_MARKERS`].
pub fn mentions_session_gone(text: &str) -> bool {
	let lower = text.to_ascii_lowercase();
	SESSION_GONE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Structured transport failure, produced once at the HTTP boundary.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
	/// Connection could not be established; the request never left this process.
	#[error("connection failed: {0}")]
	Connect(String),

	/// Read or write deadline elapsed; the request may have executed upstream.
	#[error("request timed out: {0}")]
	Timeout(String),

	#[error("HTTP {status}: {}", body_preview(.body))]
	Status { status: u16, body: String },

	#[error("network error: {0}")]
	Network(String),

	#[error("invalid response body: {0}")]
	Decode(String),
}

impl TransportError {
	/// HTTP status code, if the backend answered.
	pub fn status(&self) -> Option<u16> {
		match self {
			TransportError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("no automation session found; start one on the backend or enable auto-create")]
	NoSession,

	#[error("session is no longer valid: {message}")]
	SessionInvalid { message: String },

	#[error("session creation failed: {0}")]
	SessionCreateFailed(String),

	/// The protocol has no wire form for this gesture; nothing was sent.
	#[error("{protocol} protocol does not support {gesture}")]
	Unsupported { protocol: Protocol, gesture: &'static str },

	/// A multi-request gesture failed after part of it already executed.
	#[error("{gesture} interrupted after {completed} of {total} segments: {source}")]
	PartialGesture {
		gesture: &'static str,
		completed: usize,
		total: usize,
		#[source]
		source: Box<Error>,
	},

	#[error(transparent)]
	Transport(#[from] TransportError),

	#[error("all protocols failed; last error: {last}")]
	DispatchExhausted { last: Box<Error> },

	#[error("invalid input: {0}")]
	InvalidInput(String),
}

/// How the dispatcher should treat a failed protocol attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
	/// Nothing executed upstream; the next protocol may be tried.
	RetryableSafe,
	/// The gesture may have executed; trying another protocol could repeat it.
	RetryableUnsafe,
	/// Not a protocol problem; no other protocol can help.
	Fatal,
}

impl Error {
	/// The single session-gone check shared by every call site.
	pub fn is_session_invalid(&self) -> bool {
		match self {
			Error::SessionInvalid { .. } => true,
			Error::Transport(TransportError::Status { body, .. }) => mentions_session_gone(body),
			Error::PartialGesture { .. } | Error::DispatchExhausted { .. } => false,
			other => mentions_session_gone(&other.to_string()),
		}
	}

	/// HTTP status of the failing reply, if the backend answered.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Error::Transport(err) => err.status(),
			Error::PartialGesture { source, .. } => source.http_status(),
			_ => None,
		}
	}

	/// Classifies a failed attempt.
	///
	/// 404 means the endpoint is unknown to this backend build. Every other
	/// status is treated as possibly executed.
	pub fn fallback_decision(&self, timeouts_safe: bool) -> FallbackDecision {
		match self {
			Error::Transport(TransportError::Status { status: 404, .. }) => FallbackDecision::RetryableSafe,
			Error::Transport(TransportError::Connect(_)) => FallbackDecision::RetryableSafe,
			Error::Unsupported { .. } => FallbackDecision::RetryableSafe,
			Error::Transport(TransportError::Timeout(_)) if timeouts_safe => FallbackDecision::RetryableSafe,
			Error::Transport(_) | Error::PartialGesture { .. } => FallbackDecision::RetryableUnsafe,
			Error::NoSession
			| Error::SessionInvalid { .. }
			| Error::SessionCreateFailed(_)
			| Error::DispatchExhausted { .. }
			| Error::InvalidInput(_) => FallbackDecision::Fatal,
		}
	}
}

/// Maps a non-success HTTP reply to an error.
///
/// The only place upstream text is inspected: bodies carrying a session-gone
/// marker become [`Error::SessionInvalid`], everything else stays a
/// [`TransportError::Status`].
pub fn translate_status(status: u16, body: String) -> Error {
	if mentions_session_gone(&body) {
		let message = serde_json::from_str::<serde_json::Value>(&body)
			.ok()
			.and_then(|json| wdactl_protocol::session::error_message(&json))
			.unwrap_or_else(|| body_preview(&body).to_string());
		return Error::SessionInvalid { message };
	}
	Error::Transport(TransportError::Status { status, body })
}

/// First 200 characters of a response body, for logs and messages.
pub fn body_preview(body: &str) -> &str {
	match body.char_indices().nth(200) {
		Some((idx, _)) => &body[..idx],
		None => body,
	}
}
