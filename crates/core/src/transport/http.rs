use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use super::{BoxFut, Transport};
use crate::config::HttpConfig;
use crate::error::{Error, Result, TransportError, translate_status};

/// Pooled reqwest transport shared by every backend.
///
/// Keep-alive sizing maps onto reqwest's per-host idle pool; the total
/// connection bound is enforced with a semaphore around each request.
///
/// The read timeout bounds every individual read on the connection. reqwest
/// has no write-phase timeout, so a POST is instead given a deadline of at
/// most the write and read timeouts together.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	permits: Arc<Semaphore>,
	post_ceiling: Duration,
}

impl HttpTransport {
	pub fn new(config: &HttpConfig) -> Result<Self> {
		let client = reqwest::Client::builder()
			.user_agent(concat!("wdactl/", env!("CARGO_PKG_VERSION")))
			.pool_max_idle_per_host(config.max_keepalive)
			.pool_idle_timeout(config.keepalive_expiry)
			.connect_timeout(config.connect_timeout)
			.read_timeout(config.read_timeout)
			.timeout(config.total_timeout)
			.build()
			.map_err(|e| Error::Transport(TransportError::Network(format!("failed to build HTTP client: {e}"))))?;

		Ok(Self {
			client,
			permits: Arc::new(Semaphore::new(config.max_connections.max(1))),
			post_ceiling: config.write_timeout.saturating_add(config.read_timeout),
		})
	}

	async fn send(&self, request: reqwest::RequestBuilder, method: &'static str, url: &str) -> Result<Value> {
		let _permit = self
			.permits
			.acquire()
			.await
			.map_err(|_| Error::Transport(TransportError::Network("transport closed".into())))?;

		trace!(target = "wdactl.transport", method, url, "request");
		let response = request.send().await.map_err(|e| classify(&e))?;
		let status = response.status();
		let body = response.text().await.map_err(|e| classify(&e))?;
		debug!(target = "wdactl.transport", method, url, status = status.as_u16(), "response");

		if !status.is_success() {
			return Err(translate_status(status.as_u16(), body));
		}
		if body.trim().is_empty() {
			return Ok(Value::Null);
		}
		serde_json::from_str(&body).map_err(|e| Error::Transport(TransportError::Decode(e.to_string())))
	}
}

impl Transport for HttpTransport {
	fn get<'a>(&'a self, url: &'a str, timeout: Duration) -> BoxFut<'a, Result<Value>> {
		Box::pin(async move {
			let request = self.client.get(url).timeout(timeout);
			self.send(request, "GET", url).await
		})
	}

	fn post<'a>(&'a self, url: &'a str, body: &'a Value, timeout: Duration) -> BoxFut<'a, Result<Value>> {
		Box::pin(async move {
			let request = self.client.post(url).json(body).timeout(timeout.min(self.post_ceiling));
			self.send(request, "POST", url).await
		})
	}
}

/// Maps a reqwest failure onto the transport taxonomy.
///
/// A connect timeout is a connect failure: the request never reached the backend.
fn classify(err: &reqwest::Error) -> Error {
	let kind = if err.is_connect() {
		TransportError::Connect(err.to_string())
	} else if err.is_timeout() {
		TransportError::Timeout(err.to_string())
	} else if err.is_decode() {
		TransportError::Decode(err.to_string())
	} else {
		TransportError::Network(err.to_string())
	};
	Error::Transport(kind)
}
