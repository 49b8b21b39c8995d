//! Wire types for the WebDriverAgent / Appium HTTP surface.
//!
//! Three incompatible gesture dialects are modelled here:
//!
//! - [`native`] - vendor one-shot endpoints under `/wda/...`
//! - [`actions`] - W3C WebDriver pointer action sequences (`/actions`)
//! - [`touch`] - legacy pre-standard touch action lists (`/touch/perform`)
//!
//! plus the [`session`] payloads needed to list, probe, and create sessions.
//! Nothing in this crate performs I/O.

pub mod actions;
pub mod capabilities;
pub mod native;
pub mod session;
pub mod touch;

use serde::{Deserialize, Serialize};

pub use actions::{ActionsRequest, PointerAction, PointerSequence};
pub use capabilities::{Capabilities, XcuiCapabilities};
pub use native::{DragRequest, PressButtonRequest, TapRequest};
pub use session::{ExecuteScriptRequest, NewSessionRequest, SettingsRequest, WindowSize};
pub use touch::{TouchAction, TouchPerformRequest};

/// A point on the device surface in logical (pt) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Integer coordinates, truncated toward zero as the W3C and legacy endpoints expect.
	pub fn truncated(self) -> (i64, i64) {
		(self.x as i64, self.y as i64)
	}
}
