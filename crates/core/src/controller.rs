//! Public facade over one WDA backend and its Appium front.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info};
use wdactl_protocol::native::PRESS_BUTTON_PATH;
use wdactl_protocol::session::screenshot_data;
use wdactl_protocol::{Capabilities, ExecuteScriptRequest, Point, PressButtonRequest, SettingsRequest, WindowSize};

use crate::config::Config;
use crate::dispatch::{Dispatcher, Mode, ModeSnapshot};
use crate::error::{Error, Result, TransportError};
use crate::gesture::{Command, DEFAULT_DRAG, DEFAULT_LONG_PRESS, DEFAULT_PUMP_SEGMENT, MIN_LONG_PRESS};
use crate::heal::{AdoptStrategy, CapabilitiesStrategy, Healed, with_auto_heal};
use crate::screen::{DeviceInfo, image_dimensions};
use crate::session::SessionManager;
use crate::transport::{HttpTransport, Transport};

const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);
const SETTINGS_READ_TIMEOUT: Duration = Duration::from_secs(10);
const SETTINGS_WRITE_TIMEOUT: Duration = Duration::from_secs(15);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const BUTTON_TIMEOUT: Duration = Duration::from_secs(10);
const SCREENSHOT_TIMEOUT: Duration = Duration::from_secs(20);

/// Gesture dispatch, session management, and Appium helpers for one device.
pub struct Controller {
	config: Config,
	transport: Arc<dyn Transport>,
	sessions: Arc<SessionManager>,
	dispatcher: Dispatcher,
}

impl Controller {
	/// Builds a controller over a pooled HTTP transport.
	pub fn new(config: Config) -> Result<Self> {
		let config = config.validated()?;
		let transport = Arc::new(HttpTransport::new(&config.http)?);
		Ok(Self::with_transport(config, transport))
	}

	/// Builds a controller over an existing transport. `config` is used as given.
	pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
		let sessions = Arc::new(
			SessionManager::new(transport.clone(), config.adoption.clone(), config.auto_create_session)
				.with_initial_mode(config.mode, config.native_tap),
		);
		let dispatcher = Dispatcher::new(sessions.clone(), transport.clone()).with_fallback(config.allow_fallback, config.allow_timeout_fallback);
		Self {
			config,
			transport,
			sessions,
			dispatcher,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn sessions(&self) -> &SessionManager {
		&self.sessions
	}

	pub async fn dispatch_tap(&self, x: f64, y: f64) -> Result<Value> {
		let at = point(x, y)?;
		self.dispatch(Command::Tap { at }).await
	}

	/// Drag over `duration_s` seconds (default 0.12).
	pub async fn dispatch_drag(&self, from: Point, to: Point, duration_s: Option<f64>) -> Result<Value> {
		let duration = seconds(duration_s, DEFAULT_DRAG)?;
		self.dispatch(Command::Drag {
			from: point(from.x, from.y)?,
			to: point(to.x, to.y)?,
			duration,
		})
		.await
	}

	/// Press held for `duration_s` seconds (default 0.6, at least 0.05).
	pub async fn dispatch_long_press(&self, x: f64, y: f64, duration_s: Option<f64>) -> Result<Value> {
		let at = point(x, y)?;
		let duration = seconds(duration_s, DEFAULT_LONG_PRESS)?.max(MIN_LONG_PRESS);
		self.dispatch(Command::LongPress { at, duration }).await
	}

	/// Polyline with a fixed per-segment duration (default 0.08 s).
	pub async fn dispatch_drag_pump(&self, points: Vec<Point>, per_segment_s: Option<f64>) -> Result<Value> {
		let segment = seconds(per_segment_s, DEFAULT_PUMP_SEGMENT)?;
		self.dispatch(Command::PumpedDrag {
			points: polyline(points)?,
			segment,
		})
		.await
	}

	/// Polyline traced over `total_ms`; non-positive totals fall back to fixed segments.
	pub async fn dispatch_drag_trace(&self, points: Vec<Point>, total_ms: f64) -> Result<Value> {
		if total_ms.is_nan() {
			return Err(Error::InvalidInput("total duration must be a number".into()));
		}
		let total = Duration::try_from_secs_f64(total_ms.max(0.0) / 1000.0).map_err(|e| Error::InvalidInput(format!("total duration: {e}")))?;
		self.dispatch(Command::TracedDrag {
			points: polyline(points)?,
			total,
		})
		.await
	}

	async fn dispatch(&self, command: Command) -> Result<Value> {
		self.dispatcher.dispatch(&self.config.wda_base, &command).await
	}

	pub fn set_mode(&self, mode: Mode) {
		self.sessions.backend(&self.config.wda_base).mode().set_mode(mode);
	}

	pub fn mode(&self) -> ModeSnapshot {
		self.sessions.backend(&self.config.wda_base).mode().snapshot()
	}

	/// Runs `script` (e.g. `mobile: swipe`) through Appium.
	///
	/// Without `session_id` the last session created through this controller
	/// is used. A gone session is recreated once from its cached capabilities.
	pub async fn exec_remote_script(&self, session_id: Option<&str>, script: &str, args: Value) -> Result<Healed<Value>> {
		let request = ExecuteScriptRequest::new(script, args).ok_or_else(|| Error::InvalidInput("script args must be an object or an array".into()))?;
		let body = serde_json::to_value(&request).map_err(|e| Error::InvalidInput(e.to_string()))?;
		let body = &body;
		let session_id = self.appium_session(session_id).await?;
		let base = self.config.appium_base.as_str();
		let strategy = CapabilitiesStrategy::new(&self.sessions, base);
		with_auto_heal(
			move |sid| async move {
				let url = format!("{base}/session/{sid}/execute/sync");
				self.transport.post(&url, body, SCRIPT_TIMEOUT).await
			},
			session_id,
			&strategy,
		)
		.await
	}

	/// Presses a hardware button (`home`, `volumeUp`, ...). Native endpoint only.
	pub async fn press_button(&self, name: &str) -> Result<Value> {
		if name.trim().is_empty() {
			return Err(Error::InvalidInput("button name is required".into()));
		}
		let body = serde_json::to_value(PressButtonRequest { name: name.to_string() }).map_err(|e| Error::InvalidInput(e.to_string()))?;
		let body = &body;
		let base = self.config.wda_base.as_str();
		let session_id = self.sessions.ensure(base).await?;
		let strategy = AdoptStrategy::new(&self.sessions, base);
		let healed = with_auto_heal(
			move |sid| async move {
				let url = format!("{base}/session/{sid}{PRESS_BUTTON_PATH}");
				self.transport.post(&url, body, BUTTON_TIMEOUT).await
			},
			session_id,
			&strategy,
		)
		.await?;
		Ok(healed.value)
	}

	/// Logical screen size, or `None` when the backend does not report one.
	pub async fn window_size(&self) -> Result<Option<WindowSize>> {
		let base = self.config.wda_base.as_str();
		let session_id = self.sessions.ensure(base).await?;
		let strategy = AdoptStrategy::new(&self.sessions, base);
		let reply = with_auto_heal(
			move |sid| async move {
				let url = format!("{base}/session/{sid}/window/size");
				self.transport.get(&url, PROBE_TIMEOUT).await
			},
			session_id,
			&strategy,
		)
		.await;
		match reply {
			Ok(healed) => Ok(WindowSize::from_response(&healed.value)),
			Err(Error::Transport(TransportError::Status { status: 404, .. })) => {
				debug!(target = "wdactl.session", "window size not supported");
				Ok(None)
			}
			Err(err) => Err(err),
		}
	}

	/// Pixel size of the current screenshot.
	pub async fn screenshot_size(&self) -> Result<WindowSize> {
		let base = self.config.wda_base.as_str();
		let session_id = self.sessions.ensure(base).await?;
		let strategy = AdoptStrategy::new(&self.sessions, base);
		let healed = with_auto_heal(
			move |sid| async move {
				let url = format!("{base}/session/{sid}/screenshot");
				self.transport.get(&url, SCREENSHOT_TIMEOUT).await
			},
			session_id,
			&strategy,
		)
		.await?;
		let data = screenshot_data(&healed.value)
			.ok_or_else(|| Error::Transport(TransportError::Decode("unexpected screenshot response shape".into())))?;
		image_dimensions(data)
	}

	/// Session id with logical and, unless skipped, pixel screen sizes.
	///
	/// A failing screenshot only leaves the pixel size empty.
	pub async fn device_info(&self, with_screenshot: bool) -> Result<DeviceInfo> {
		let base = self.config.wda_base.as_str();
		let session_id = self.sessions.ensure(base).await?;
		let size_pt = self.window_size().await?;
		let size_px = if with_screenshot {
			match self.screenshot_size().await {
				Ok(size) => Some(size),
				Err(err) => {
					info!(target = "wdactl.session", error = %err, "skipping screenshot size");
					None
				}
			}
		} else {
			None
		};
		let session_id = self.sessions.cached(base).await.unwrap_or(session_id);
		Ok(DeviceInfo {
			session_id,
			size_pt,
			size_px,
		})
	}

	/// Raw `GET /status` of the WDA backend.
	pub async fn status(&self) -> Result<Value> {
		let url = format!("{}/status", self.config.wda_base);
		self.transport.get(&url, PROBE_TIMEOUT).await
	}

	/// Creates an Appium session and remembers the capabilities for healing.
	pub async fn create_appium_session(&self, capabilities: Capabilities) -> Result<String> {
		self.sessions.create_with_capabilities(&self.config.appium_base, capabilities).await
	}

	pub async fn list_appium_sessions(&self) -> Result<Vec<String>> {
		self.sessions.list_sessions(&self.config.appium_base).await
	}

	pub async fn last_appium_session(&self) -> Option<String> {
		self.sessions.last_session(&self.config.appium_base).await
	}

	pub async fn appium_settings(&self, session_id: Option<&str>) -> Result<Healed<Value>> {
		let session_id = self.appium_session(session_id).await?;
		let base = self.config.appium_base.as_str();
		let strategy = CapabilitiesStrategy::new(&self.sessions, base);
		with_auto_heal(
			move |sid| async move {
				let url = format!("{base}/session/{sid}/appium/settings");
				self.transport.get(&url, SETTINGS_READ_TIMEOUT).await
			},
			session_id,
			&strategy,
		)
		.await
	}

	pub async fn update_appium_settings(&self, session_id: Option<&str>, settings: Map<String, Value>) -> Result<Healed<Value>> {
		let body = serde_json::to_value(SettingsRequest { settings }).map_err(|e| Error::InvalidInput(e.to_string()))?;
		let body = &body;
		let session_id = self.appium_session(session_id).await?;
		let base = self.config.appium_base.as_str();
		let strategy = CapabilitiesStrategy::new(&self.sessions, base);
		with_auto_heal(
			move |sid| async move {
				let url = format!("{base}/session/{sid}/appium/settings");
				self.transport.post(&url, body, SETTINGS_WRITE_TIMEOUT).await
			},
			session_id,
			&strategy,
		)
		.await
	}

	/// Explicit id, else the cached Appium session, else the last one created.
	async fn appium_session(&self, session_id: Option<&str>) -> Result<String> {
		if let Some(id) = session_id.map(str::trim).filter(|id| !id.is_empty()) {
			return Ok(id.to_string());
		}
		if let Some(id) = self.sessions.cached(&self.config.appium_base).await {
			return Ok(id);
		}
		self.last_appium_session().await.ok_or(Error::NoSession)
	}
}

fn point(x: f64, y: f64) -> Result<Point> {
	if !x.is_finite() || !y.is_finite() {
		return Err(Error::InvalidInput(format!("coordinates must be finite, got ({x}, {y})")));
	}
	Ok(Point::new(x, y))
}

fn polyline(points: Vec<Point>) -> Result<Vec<Point>> {
	points.into_iter().map(|p| point(p.x, p.y)).collect()
}

/// Seconds to a duration; `None` takes `default`.
fn seconds(value: Option<f64>, default: Duration) -> Result<Duration> {
	match value {
		None => Ok(default),
		Some(secs) if secs.is_finite() && secs >= 0.0 => {
			Duration::try_from_secs_f64(secs).map_err(|e| Error::InvalidInput(format!("duration {secs}: {e}")))
		}
		Some(secs) => Err(Error::InvalidInput(format!("duration must be a non-negative number of seconds, got {secs}"))),
	}
}
