//! Scripted in-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};

use super::{BoxFut, Transport};
use crate::error::{Error, Result, TransportError, translate_status};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
	Json(Value),
	Status(u16, String),
	Connect,
	Timeout,
}

impl Reply {
	pub(crate) fn ok() -> Self {
		Reply::Json(json!({ "value": null }))
	}

	pub(crate) fn session_gone() -> Self {
		Reply::Status(404, r#"{"value":{"error":"invalid session id","message":"Session does not exist"}}"#.into())
	}

	fn into_result(self) -> Result<Value> {
		match self {
			Reply::Json(value) => Ok(value),
			Reply::Status(status, body) => Err(translate_status(status, body)),
			Reply::Connect => Err(Error::Transport(TransportError::Connect("connection refused".into()))),
			Reply::Timeout => Err(Error::Transport(TransportError::Timeout("operation timed out".into()))),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
	pub method: &'static str,
	pub url: String,
	pub body: Option<Value>,
}

/// Replies are queued per `(method, url)`; the last queued reply repeats.
/// Unscripted endpoints answer 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
	routes: Mutex<HashMap<(&'static str, String), VecDeque<Reply>>>,
	calls: Mutex<Vec<Call>>,
	delay: Mutex<Option<Duration>>,
}

impl FakeTransport {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn on_get(&self, url: &str, reply: Reply) -> &Self {
		self.script("GET", url, reply)
	}

	pub(crate) fn on_post(&self, url: &str, reply: Reply) -> &Self {
		self.script("POST", url, reply)
	}

	/// Delays every reply, to widen race windows.
	pub(crate) fn with_delay(&self, delay: Duration) -> &Self {
		*self.delay.lock() = Some(delay);
		self
	}

	fn script(&self, method: &'static str, url: &str, reply: Reply) -> &Self {
		self.routes.lock().entry((method, url.to_string())).or_default().push_back(reply);
		self
	}

	pub(crate) fn count(&self, method: &str, url: &str) -> usize {
		self.calls.lock().iter().filter(|c| c.method == method && c.url == url).count()
	}

	pub(crate) fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	fn respond(&self, method: &'static str, url: &str, body: Option<&Value>) -> Reply {
		self.calls.lock().push(Call {
			method,
			url: url.to_string(),
			body: body.cloned(),
		});
		let mut routes = self.routes.lock();
		match routes.get_mut(&(method, url.to_string())) {
			Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(Reply::ok),
			Some(queue) => queue.front().cloned().unwrap_or_else(Reply::ok),
			None => Reply::Status(404, "unknown command".into()),
		}
	}

	async fn reply(&self, method: &'static str, url: &str, body: Option<&Value>) -> Result<Value> {
		let reply = self.respond(method, url, body);
		let delay = *self.delay.lock();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		reply.into_result()
	}
}

impl Transport for FakeTransport {
	fn get<'a>(&'a self, url: &'a str, _timeout: Duration) -> BoxFut<'a, Result<Value>> {
		Box::pin(self.reply("GET", url, None))
	}

	fn post<'a>(&'a self, url: &'a str, body: &'a Value, _timeout: Duration) -> BoxFut<'a, Result<Value>> {
		Box::pin(self.reply("POST", url, Some(body)))
	}
}
