//! W3C WebDriver Actions payloads.
//!
//! Every gesture is expressed as a single touch pointer (`finger1`) whose
//! action list is built with the chainable helpers on [`PointerSequence`].

use serde::{Deserialize, Serialize};

use crate::Point;

/// Pointer id used for every touch sequence.
pub const TOUCH_POINTER_ID: &str = "finger1";

/// Body of `POST /session/{id}/actions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsRequest {
	pub actions: Vec<PointerSequence>,
}

impl ActionsRequest {
	pub fn single(sequence: PointerSequence) -> Self {
		Self { actions: vec![sequence] }
	}
}

/// One input source and its ordered actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerSequence {
	#[serde(rename = "type")]
	pub kind: String,
	pub id: String,
	pub parameters: PointerParameters,
	pub actions: Vec<PointerAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerParameters {
	pub pointer_type: String,
}

/// Coordinate origin for pointer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
	Viewport,
}

/// A single pointer action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
	PointerMove { duration: u64, x: i64, y: i64, origin: Origin },
	PointerDown { button: u8 },
	Pause { duration: u64 },
	PointerUp { button: u8 },
}

impl PointerSequence {
	/// Empty touch pointer sequence.
	pub fn touch() -> Self {
		Self {
			kind: "pointer".to_string(),
			id: TOUCH_POINTER_ID.to_string(),
			parameters: PointerParameters {
				pointer_type: "touch".to_string(),
			},
			actions: Vec::new(),
		}
	}

	/// Moves to `point` over `duration_ms`, relative to the viewport.
	pub fn move_to(mut self, point: Point, duration_ms: u64) -> Self {
		let (x, y) = point.truncated();
		self.actions.push(PointerAction::PointerMove {
			duration: duration_ms,
			x,
			y,
			origin: Origin::Viewport,
		});
		self
	}

	pub fn down(mut self) -> Self {
		self.actions.push(PointerAction::PointerDown { button: 0 });
		self
	}

	pub fn pause(mut self, duration_ms: u64) -> Self {
		self.actions.push(PointerAction::Pause { duration: duration_ms });
		self
	}

	pub fn up(mut self) -> Self {
		self.actions.push(PointerAction::PointerUp { button: 0 });
		self
	}
}
