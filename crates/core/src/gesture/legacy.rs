use wdactl_protocol::TouchPerformRequest;

use super::{Command, Plan, ProtocolAdapter, WireRequest, whole_millis};
use crate::dispatch::TapVariant;
use crate::error::Result;

pub const TOUCH_PERFORM_PATH: &str = "/touch/perform";

/// Legacy JSON Wire Protocol touch chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyTouchAdapter;

impl ProtocolAdapter for LegacyTouchAdapter {
	fn plan(&self, command: &Command, _tap: TapVariant) -> Result<Plan> {
		let request = match command {
			Command::Tap { at } => TouchPerformRequest::chain(*at, &[], None),
			Command::LongPress { at, duration } => TouchPerformRequest::chain(*at, &[], Some(whole_millis(*duration))),
			Command::Drag { from, to, .. } => TouchPerformRequest::chain(*from, &[*to], None),
			Command::PumpedDrag { points, .. } | Command::TracedDrag { points, .. } => match points.split_first() {
				Some((first, rest)) => TouchPerformRequest::chain(*first, rest, None),
				None => TouchPerformRequest { actions: Vec::new() },
			},
		};
		Ok(Plan::single(WireRequest::new(TOUCH_PERFORM_PATH, request)?))
	}
}
