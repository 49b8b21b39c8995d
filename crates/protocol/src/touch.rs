//! Legacy JSON Wire Protocol touch actions (`/touch/perform`).

use serde::{Deserialize, Serialize};

use crate::Point;

/// Body of `POST /session/{id}/touch/perform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchPerformRequest {
	pub actions: Vec<TouchAction>,
}

/// One step of a legacy touch chain.
///
/// `moveTo` offsets are relative to the previous position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "options", rename_all = "camelCase")]
pub enum TouchAction {
	Press { x: i64, y: i64 },
	MoveTo { x: i64, y: i64 },
	Wait { ms: u64 },
	Release {},
}

impl TouchPerformRequest {
	/// Press at `start`, then walk through `path` with relative `moveTo` steps.
	pub fn chain(start: Point, path: &[Point], hold_ms: Option<u64>) -> Self {
		let (x, y) = start.truncated();
		let mut actions = vec![TouchAction::Press { x, y }];
		let mut prev = start;
		for point in path {
			actions.push(TouchAction::MoveTo {
				x: (point.x - prev.x) as i64,
				y: (point.y - prev.y) as i64,
			});
			prev = *point;
		}
		if let Some(ms) = hold_ms {
			actions.push(TouchAction::Wait { ms });
		}
		actions.push(TouchAction::Release {});
		Self { actions }
	}
}
