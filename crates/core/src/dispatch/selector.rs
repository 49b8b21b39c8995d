use parking_lot::Mutex;
use tracing::info;

use super::{Mode, Route, TapPreference};

/// Point-in-time view of a backend's mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSnapshot {
	pub mode: Mode,
	pub native_tap: TapPreference,
}

/// Sticky mode state for one backend.
///
/// Under [`Mode::Auto`] the first successful protocol is pinned; a native tap
/// success also pins the tap variant while the preference is still `Auto`.
/// Only [`ModeSelector::set_mode`] unpins.
#[derive(Debug)]
pub struct ModeSelector {
	state: Mutex<ModeSnapshot>,
}

impl ModeSelector {
	pub fn new(mode: Mode, native_tap: TapPreference) -> Self {
		Self {
			state: Mutex::new(ModeSnapshot { mode, native_tap }),
		}
	}

	pub fn snapshot(&self) -> ModeSnapshot {
		*self.state.lock()
	}

	pub fn mode(&self) -> Mode {
		self.state.lock().mode
	}

	/// Replaces the mode; `Auto` re-enables discovery.
	pub fn set_mode(&self, mode: Mode) {
		let mut state = self.state.lock();
		if state.mode != mode {
			info!(target = "wdactl.dispatch", from = %state.mode, to = %mode, "mode changed");
		}
		state.mode = mode;
	}

	/// Records a successful attempt and pins whatever is still undecided.
	///
	/// Repeated calls with the same route are no-ops.
	pub fn record_success(&self, route: Route, is_tap: bool) {
		let mut state = self.state.lock();
		if state.mode == Mode::Auto {
			let pinned = Mode::from(route.protocol());
			info!(target = "wdactl.dispatch", mode = %pinned, "pinned mode");
			state.mode = pinned;
		}
		if let (Route::Native(variant), true, TapPreference::Auto) = (route, is_tap, state.native_tap) {
			info!(target = "wdactl.dispatch", variant = variant.as_str(), "pinned native tap variant");
			state.native_tap = TapPreference::Pinned(variant);
		}
	}
}
