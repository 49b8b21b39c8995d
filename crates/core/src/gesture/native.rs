use wdactl_protocol::native::{DRAG_PATH, DragRequest, TAP_PATH, TapRequest};

use super::{Command, Plan, ProtocolAdapter, WireRequest};
use crate::dispatch::{Protocol, TapVariant};
use crate::error::{Error, Result};

/// Hold used when a tap is sent as a zero-distance drag.
const TAP_DRAG_SECS: f64 = 0.05;

/// WebDriverAgent vendor endpoints. Coordinates are sent as floats, durations in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeAdapter;

impl ProtocolAdapter for NativeAdapter {
	fn plan(&self, command: &Command, tap: TapVariant) -> Result<Plan> {
		match command {
			Command::Tap { at } => match tap {
				TapVariant::OneShot => Ok(Plan::single(WireRequest::new(TAP_PATH, TapRequest::from(*at))?)),
				TapVariant::ZeroDrag => Ok(Plan::single(WireRequest::new(DRAG_PATH, DragRequest::hold(*at, TAP_DRAG_SECS))?)),
			},
			Command::Drag { from, to, duration } => {
				Ok(Plan::single(WireRequest::new(DRAG_PATH, DragRequest::new(*from, *to, duration.as_secs_f64()))?))
			}
			Command::LongPress { at, duration } => Ok(Plan::single(WireRequest::new(DRAG_PATH, DragRequest::hold(*at, duration.as_secs_f64()))?)),
			Command::PumpedDrag { points, segment } => {
				let secs = segment.as_secs_f64();
				let requests = points
					.windows(2)
					.map(|pair| WireRequest::new(DRAG_PATH, DragRequest::new(pair[0], pair[1], secs)))
					.collect::<Result<Vec<_>>>()?;
				let segments = requests.len();
				Ok(Plan {
					requests,
					summary: Some(serde_json::json!({ "ok": true, "segments": segments })),
				})
			}
			Command::TracedDrag { .. } => Err(Error::Unsupported {
				protocol: Protocol::Native,
				gesture: command.name(),
			}),
		}
	}
}
