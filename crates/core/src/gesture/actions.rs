use std::time::Duration;

use wdactl_protocol::{ActionsRequest, Point, PointerSequence};

use super::{Command, Plan, ProtocolAdapter, WireRequest, whole_millis};
use crate::dispatch::TapVariant;
use crate::error::Result;

pub const ACTIONS_PATH: &str = "/actions";

/// Press duration for a tap.
const TAP_PAUSE_MS: u64 = 50;
/// Per-segment duration when a traced drag has no usable total.
const TRACE_FALLBACK_SEGMENT_MS: u64 = 16;

/// W3C pointer actions with a single touch pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionsAdapter;

impl ProtocolAdapter for ActionsAdapter {
	fn plan(&self, command: &Command, _tap: TapVariant) -> Result<Plan> {
		let sequence = match command {
			Command::Tap { at } => press(*at, TAP_PAUSE_MS),
			Command::LongPress { at, duration } => press(*at, whole_millis(*duration)),
			Command::Drag { from, to, duration } => PointerSequence::touch().move_to(*from, 0).down().move_to(*to, whole_millis(*duration)).up(),
			Command::PumpedDrag { points, segment } => polyline(points, whole_millis(*segment)),
			Command::TracedDrag { points, total } => polyline(points, trace_segment_ms(*total, points.len().saturating_sub(1))),
		};
		Ok(Plan::single(WireRequest::new(ACTIONS_PATH, ActionsRequest::single(sequence))?))
	}
}

fn press(at: Point, hold_ms: u64) -> PointerSequence {
	PointerSequence::touch().move_to(at, 0).down().pause(hold_ms).up()
}

/// One contiguous sequence through every point.
fn polyline(points: &[Point], segment_ms: u64) -> PointerSequence {
	let Some((first, rest)) = points.split_first() else {
		return PointerSequence::touch();
	};
	let mut sequence = PointerSequence::touch().move_to(*first, 0).down();
	for point in rest {
		sequence = sequence.move_to(*point, segment_ms);
	}
	sequence.up()
}

/// Even split of the whole milliseconds of `total` across `segments`.
///
/// Halves round to even; every segment gets at least 1 ms.
fn trace_segment_ms(total: Duration, segments: usize) -> u64 {
	let total_ms = total.as_millis();
	if total_ms == 0 || segments == 0 {
		return TRACE_FALLBACK_SEGMENT_MS;
	}
	let per = total_ms as f64 / segments as f64;
	(per.round_ties_even() as u64).max(1)
}
