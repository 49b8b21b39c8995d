//! Process-start configuration.
//!
//! Values are read once (the CLI fills them from flags and environment
//! variables) and never reloaded.

use std::time::Duration;

use crate::dispatch::{Mode, TapPreference};
use crate::error::{Error, Result};

/// Connection pool sizing and per-phase timeouts for the shared HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
	/// Upper bound on concurrent in-flight requests.
	pub max_connections: usize,
	/// Idle keep-alive connections retained per host.
	pub max_keepalive: usize,
	/// How long an idle keep-alive connection is retained.
	pub keepalive_expiry: Duration,
	/// Hard ceiling for any single request.
	pub total_timeout: Duration,
	pub connect_timeout: Duration,
	/// Longest wait for any single read from the backend.
	pub read_timeout: Duration,
	/// Added to `read_timeout` to cap the deadline of a request that carries a body.
	pub write_timeout: Duration,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			max_connections: 100,
			max_keepalive: 20,
			keepalive_expiry: Duration::from_secs(45),
			total_timeout: Duration::from_secs(120),
			connect_timeout: Duration::from_secs(10),
			read_timeout: Duration::from_secs(120),
			write_timeout: Duration::from_secs(120),
		}
	}
}

/// Session adoption tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct AdoptionConfig {
	/// How many times `/status` is polled for an advertised session id.
	pub status_polls: u32,
	pub poll_interval: Duration,
	/// Timeout for each adoption probe.
	pub probe_timeout: Duration,
	/// Timeout for `POST /session`.
	pub create_timeout: Duration,
}

impl Default for AdoptionConfig {
	fn default() -> Self {
		Self {
			status_polls: 15,
			poll_interval: Duration::from_millis(200),
			probe_timeout: Duration::from_secs(5),
			create_timeout: Duration::from_secs(60),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	/// WebDriverAgent base address gestures are sent to.
	pub wda_base: String,
	/// Appium base address used for script execution and session creation.
	pub appium_base: String,
	/// Mode every backend starts in.
	pub mode: Mode,
	/// Whether a failed protocol may be followed by another one.
	pub allow_fallback: bool,
	/// Whether read/write timeouts count as safe to fall back from.
	pub allow_timeout_fallback: bool,
	pub native_tap: TapPreference,
	/// Whether a minimal session may be created when none can be adopted.
	pub auto_create_session: bool,
	pub http: HttpConfig,
	pub adoption: AdoptionConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			wda_base: "http://127.0.0.1:8100".to_string(),
			appium_base: "http://127.0.0.1:4723".to_string(),
			mode: Mode::Auto,
			allow_fallback: true,
			allow_timeout_fallback: false,
			native_tap: TapPreference::Auto,
			auto_create_session: false,
			http: HttpConfig::default(),
			adoption: AdoptionConfig::default(),
		}
	}
}

impl Config {
	/// Normalizes both base addresses, rejecting anything that is not an http(s) URL.
	pub fn validated(mut self) -> Result<Self> {
		self.wda_base = normalize_address(&self.wda_base)?;
		self.appium_base = normalize_address(&self.appium_base)?;
		if self.http.max_connections == 0 {
			return Err(Error::InvalidInput("max_connections must be at least 1".into()));
		}
		Ok(self)
	}
}

/// Canonical key for a backend: the base URL without trailing slashes.
pub fn normalize_address(address: &str) -> Result<String> {
	let trimmed = address.trim().trim_end_matches('/');
	let parsed = url::Url::parse(trimmed).map_err(|e| Error::InvalidInput(format!("invalid backend address {address:?}: {e}")))?;
	if !matches!(parsed.scheme(), "http" | "https") {
		return Err(Error::InvalidInput(format!("backend address must be http(s): {address}")));
	}
	Ok(trimmed.to_string())
}
