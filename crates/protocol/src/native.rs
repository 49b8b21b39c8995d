//! WebDriverAgent vendor endpoints.

use serde::{Deserialize, Serialize};

use crate::Point;

/// One-shot tap primitive.
pub const TAP_PATH: &str = "/wda/tap/0";
/// Timed drag primitive; also used for zero-distance taps and long presses.
pub const DRAG_PATH: &str = "/wda/dragfromtoforduration";
/// Hardware button press.
pub const PRESS_BUTTON_PATH: &str = "/wda/pressButton";

/// Body of [`TAP_PATH`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapRequest {
	pub x: f64,
	pub y: f64,
}

impl From<Point> for TapRequest {
	fn from(point: Point) -> Self {
		Self { x: point.x, y: point.y }
	}
}

/// Body of [`DRAG_PATH`]; `duration` is in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragRequest {
	pub from_x: f64,
	pub from_y: f64,
	pub to_x: f64,
	pub to_y: f64,
	pub duration: f64,
}

impl DragRequest {
	pub fn new(from: Point, to: Point, duration_secs: f64) -> Self {
		Self {
			from_x: from.x,
			from_y: from.y,
			to_x: to.x,
			to_y: to.y,
			duration: duration_secs,
		}
	}

	/// Zero-distance drag held at `at`.
	pub fn hold(at: Point, duration_secs: f64) -> Self {
		Self::new(at, at, duration_secs)
	}
}

/// Body of [`PRESS_BUTTON_PATH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressButtonRequest {
	pub name: String,
}
