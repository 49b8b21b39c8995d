//! Session capability payloads.

use serde_json::{Map, Value};

/// Ordered capability map, kept verbatim so a session can be recreated from it.
pub type Capabilities = Map<String, Value>;

/// Capability builder for an XCUITest-driven iOS device.
#[derive(Debug, Clone)]
pub struct XcuiCapabilities {
	pub udid: String,
	pub wda_local_port: u16,
	pub mjpeg_server_port: u16,
	pub new_command_timeout: u64,
	pub bundle_id: Option<String>,
	pub no_reset: Option<bool>,
	pub extra: Capabilities,
}

impl XcuiCapabilities {
	pub fn new(udid: impl Into<String>) -> Self {
		Self {
			udid: udid.into(),
			wda_local_port: 8100,
			mjpeg_server_port: 9100,
			new_command_timeout: 0,
			bundle_id: None,
			no_reset: None,
			extra: Capabilities::new(),
		}
	}

	pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
		self.bundle_id = Some(bundle_id.into());
		self
	}

	pub fn with_no_reset(mut self, no_reset: bool) -> Self {
		self.no_reset = Some(no_reset);
		self
	}

	pub fn with_extra(mut self, extra: Capabilities) -> Self {
		self.extra = extra;
		self
	}

	/// Flattens into `appium:`-prefixed capabilities.
	///
	/// Extra capabilities override the defaults; explicit bundle id and
	/// no-reset settings override the extras.
	pub fn build(self) -> Capabilities {
		let mut caps = Capabilities::new();
		caps.insert("platformName".into(), Value::from("iOS"));
		caps.insert("appium:automationName".into(), Value::from("XCUITest"));
		caps.insert("appium:udid".into(), Value::from(self.udid));
		caps.insert("appium:wdaLocalPort".into(), Value::from(self.wda_local_port));
		caps.insert("appium:mjpegServerPort".into(), Value::from(self.mjpeg_server_port));
		caps.insert("appium:newCommandTimeout".into(), Value::from(self.new_command_timeout));
		caps.extend(self.extra);
		if let Some(bundle_id) = self.bundle_id {
			caps.insert("appium:bundleId".into(), Value::from(bundle_id));
		}
		if let Some(no_reset) = self.no_reset {
			caps.insert("appium:noReset".into(), Value::from(no_reset));
		}
		caps
	}
}
