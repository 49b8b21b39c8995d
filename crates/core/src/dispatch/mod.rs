//! Protocol ordering, sticky mode selection, and the fallback engine.

mod engine;
mod selector;

use std::fmt;
use std::str::FromStr;

pub use engine::Dispatcher;
pub use selector::{ModeSelector, ModeSnapshot};

use crate::error::Error;

/// Wire protocol family a gesture can be sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
	/// WebDriverAgent vendor endpoints under `/wda/...`.
	Native,
	/// W3C pointer actions.
	Actions,
	/// Legacy `/touch/perform`.
	Jsonwp,
}

impl Protocol {
	pub fn as_str(self) -> &'static str {
		match self {
			Protocol::Native => "native",
			Protocol::Actions => "actions",
			Protocol::Jsonwp => "jsonwp",
		}
	}
}

impl fmt::Display for Protocol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Control mode for a backend.
///
/// `Auto` tries every protocol and pins the first one that works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
	#[default]
	Auto,
	Native,
	Actions,
	Jsonwp,
}

impl Mode {
	pub fn as_str(self) -> &'static str {
		match self {
			Mode::Auto => "auto",
			Mode::Native => "native",
			Mode::Actions => "actions",
			Mode::Jsonwp => "jsonwp",
		}
	}
}

impl From<Protocol> for Mode {
	fn from(protocol: Protocol) -> Self {
		match protocol {
			Protocol::Native => Mode::Native,
			Protocol::Actions => Mode::Actions,
			Protocol::Jsonwp => Mode::Jsonwp,
		}
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Mode {
	type Err = Error;

	/// Accepts `wda` for `native` and `appium` for `actions`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"auto" => Ok(Mode::Auto),
			"native" | "wda" => Ok(Mode::Native),
			"actions" | "appium" | "w3c" => Ok(Mode::Actions),
			"jsonwp" | "legacy" => Ok(Mode::Jsonwp),
			other => Err(Error::InvalidInput(format!("unknown mode {other:?} (expected auto, native, actions, or jsonwp)"))),
		}
	}
}

/// Wire form of a native tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapVariant {
	/// `/wda/tap/0`.
	OneShot,
	/// Zero-distance `/wda/dragfromtoforduration`.
	ZeroDrag,
}

impl TapVariant {
	pub fn as_str(self) -> &'static str {
		match self {
			TapVariant::OneShot => "tap0",
			TapVariant::ZeroDrag => "drag",
		}
	}

	fn other(self) -> Self {
		match self {
			TapVariant::OneShot => TapVariant::ZeroDrag,
			TapVariant::ZeroDrag => TapVariant::OneShot,
		}
	}
}

/// Native tap sub-preference; `Auto` is replaced by the first variant that works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapPreference {
	#[default]
	Auto,
	Pinned(TapVariant),
}

impl TapPreference {
	pub fn pinned(self) -> Option<TapVariant> {
		match self {
			TapPreference::Auto => None,
			TapPreference::Pinned(variant) => Some(variant),
		}
	}
}

impl fmt::Display for TapPreference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TapPreference::Auto => f.write_str("auto"),
			TapPreference::Pinned(variant) => f.write_str(variant.as_str()),
		}
	}
}

impl FromStr for TapPreference {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"auto" | "" => Ok(TapPreference::Auto),
			"tap0" | "tap" => Ok(TapPreference::Pinned(TapVariant::OneShot)),
			"drag" => Ok(TapPreference::Pinned(TapVariant::ZeroDrag)),
			other => Err(Error::InvalidInput(format!("unknown native tap preference {other:?} (expected auto, tap0, or drag)"))),
		}
	}
}

/// One candidate in an attempt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
	Native(TapVariant),
	Actions,
	Jsonwp,
}

impl Route {
	pub fn protocol(self) -> Protocol {
		match self {
			Route::Native(_) => Protocol::Native,
			Route::Actions => Protocol::Actions,
			Route::Jsonwp => Protocol::Jsonwp,
		}
	}

	/// Log label, e.g. `native:tap0`.
	pub fn label(self) -> &'static str {
		match self {
			Route::Native(TapVariant::OneShot) => "native:tap0",
			Route::Native(TapVariant::ZeroDrag) => "native:drag",
			Route::Actions => "actions",
			Route::Jsonwp => "jsonwp",
		}
	}
}

/// Computes the protocol attempt order for one dispatch.
///
/// The concrete mode goes first, followed by the remaining protocols in a
/// fixed secondary order. For taps the native family expands into both tap
/// variants, the preferred one first.
pub fn attempt_order(mode: Mode, native_tap: TapPreference, is_tap: bool) -> Vec<Route> {
	let families: [Protocol; 3] = match mode {
		Mode::Auto | Mode::Native => [Protocol::Native, Protocol::Actions, Protocol::Jsonwp],
		Mode::Actions => [Protocol::Actions, Protocol::Jsonwp, Protocol::Native],
		Mode::Jsonwp => [Protocol::Jsonwp, Protocol::Actions, Protocol::Native],
	};

	let preferred = native_tap.pinned().unwrap_or(TapVariant::OneShot);
	let mut order = Vec::with_capacity(4);
	for family in families {
		match family {
			Protocol::Native if is_tap => {
				order.push(Route::Native(preferred));
				order.push(Route::Native(preferred.other()));
			}
			Protocol::Native => order.push(Route::Native(preferred)),
			Protocol::Actions => order.push(Route::Actions),
			Protocol::Jsonwp => order.push(Route::Jsonwp),
		}
	}
	order
}
