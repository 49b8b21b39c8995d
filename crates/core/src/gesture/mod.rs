//! Gesture commands and the per-protocol request builders.
//!
//! Adapters are pure: they turn a [`Command`] into a [`Plan`] of
//! session-relative requests and never touch the network.

mod actions;
mod legacy;
mod native;

use std::time::Duration;

use serde_json::{Value, json};
use wdactl_protocol::Point;

pub use actions::ActionsAdapter;
pub use legacy::LegacyTouchAdapter;
pub use native::NativeAdapter;

use crate::dispatch::{Route, TapVariant};
use crate::error::Result;

/// Default long-press hold.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(600);
/// Shortest accepted long-press hold.
pub const MIN_LONG_PRESS: Duration = Duration::from_millis(50);
pub const DEFAULT_DRAG: Duration = Duration::from_millis(120);
pub const DEFAULT_PUMP_SEGMENT: Duration = Duration::from_millis(80);

/// A gesture to perform on the device surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
	Tap { at: Point },
	Drag { from: Point, to: Point, duration: Duration },
	LongPress { at: Point, duration: Duration },
	/// Polyline where every segment takes `segment` to traverse.
	PumpedDrag { points: Vec<Point>, segment: Duration },
	/// Polyline whose `total` duration is split evenly across segments.
	TracedDrag { points: Vec<Point>, total: Duration },
}

impl Command {
	pub fn name(&self) -> &'static str {
		match self {
			Command::Tap { .. } => "tap",
			Command::Drag { .. } => "drag",
			Command::LongPress { .. } => "long-press",
			Command::PumpedDrag { .. } => "pumped drag",
			Command::TracedDrag { .. } => "traced drag",
		}
	}

	pub fn is_tap(&self) -> bool {
		matches!(self, Command::Tap { .. })
	}

	/// Polyline commands with fewer than two points have nothing to send.
	pub fn is_trivial(&self) -> bool {
		match self {
			Command::PumpedDrag { points, .. } | Command::TracedDrag { points, .. } => points.len() < 2,
			_ => false,
		}
	}

	/// Per-request budget for this gesture.
	pub fn timeout(&self) -> Duration {
		match self {
			Command::Tap { .. } => Duration::from_secs(10),
			Command::Drag { .. } | Command::LongPress { .. } | Command::PumpedDrag { .. } => Duration::from_secs(20),
			Command::TracedDrag { .. } => Duration::from_secs(30),
		}
	}

	/// Reply for commands that never reach the backend.
	pub fn trivial_reply() -> Value {
		json!({ "ok": true, "segments": 0 })
	}
}

/// One session-relative request, e.g. `/actions`.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
	pub path: &'static str,
	pub body: Value,
}

impl WireRequest {
	pub fn new(path: &'static str, body: impl serde::Serialize) -> Result<Self> {
		let body = serde_json::to_value(body).map_err(|e| crate::Error::InvalidInput(format!("unserializable request body: {e}")))?;
		Ok(Self { path, body })
	}
}

/// Requests to send, in order, for one gesture on one protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
	pub requests: Vec<WireRequest>,
	/// Reply returned instead of the last response, for multi-request plans.
	pub summary: Option<Value>,
}

impl Plan {
	pub fn single(request: WireRequest) -> Self {
		Self {
			requests: vec![request],
			summary: None,
		}
	}
}

/// Builds the wire requests for a command on one protocol.
///
/// Returns [`crate::Error::Unsupported`] when the protocol has no form for the
/// gesture; nothing is sent in that case.
pub trait ProtocolAdapter: Send + Sync {
	fn plan(&self, command: &Command, tap: TapVariant) -> Result<Plan>;
}

/// Adapter serving a route.
pub fn adapter_for(route: Route) -> (&'static dyn ProtocolAdapter, TapVariant) {
	match route {
		Route::Native(variant) => (&NativeAdapter, variant),
		Route::Actions => (&ActionsAdapter, TapVariant::OneShot),
		Route::Jsonwp => (&LegacyTouchAdapter, TapVariant::OneShot),
	}
}

/// `max(1, floor(d in ms))`.
pub(crate) fn whole_millis(duration: Duration) -> u64 {
	(duration.as_millis() as u64).max(1)
}
