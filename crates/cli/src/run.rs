//! Executes one parsed command against a [`Controller`].

use anyhow::{Context, anyhow};
use serde_json::{Map, Value, json};
use wdactl::Controller;
use wdactl::protocol::{Point, WindowSize, XcuiCapabilities};

use crate::cli::{Commands, SessionCommand, SettingsCommand};
use crate::error::{CliError, Result};

/// Envelope name for a command.
pub fn command_name(command: &Commands) -> &'static str {
	match command {
		Commands::Tap { .. } => "tap",
		Commands::Drag { .. } => "drag",
		Commands::LongPress { .. } => "long-press",
		Commands::Pump { .. } => "pump",
		Commands::Trace { .. } => "trace",
		Commands::Button { .. } => "button",
		Commands::Status => "status",
		Commands::WindowSize => "window-size",
		Commands::DeviceInfo { .. } => "device-info",
		Commands::Exec { .. } => "exec",
		Commands::Session(SessionCommand::Ensure) => "session ensure",
		Commands::Session(SessionCommand::Create { .. }) => "session create",
		Commands::Session(SessionCommand::List) => "session list",
		Commands::Settings(SettingsCommand::Get { .. }) => "settings get",
		Commands::Settings(SettingsCommand::Set { .. }) => "settings set",
	}
}

pub async fn execute(controller: &Controller, command: Commands) -> Result<Value> {
	let data = match command {
		Commands::Tap { x, y } => controller.dispatch_tap(x, y).await?,
		Commands::Drag { x1, y1, x2, y2, duration } => controller.dispatch_drag(Point::new(x1, y1), Point::new(x2, y2), duration).await?,
		Commands::LongPress { x, y, duration } => controller.dispatch_long_press(x, y, duration).await?,
		Commands::Pump { points, segment } => controller.dispatch_drag_pump(points, segment).await?,
		Commands::Trace { points, total_ms } => controller.dispatch_drag_trace(points, total_ms).await?,
		Commands::Button { name } => controller.press_button(&name).await?,
		Commands::Status => controller.status().await?,
		Commands::WindowSize => match controller.window_size().await? {
			Some(size) => json!({ "width": size.width, "height": size.height }),
			None => Value::Null,
		},
		Commands::DeviceInfo { no_shot } => {
			let info = controller.device_info(!no_shot).await?;
			let size = |size: Option<WindowSize>| size.map(|s| json!({ "w": s.width, "h": s.height }));
			json!({ "sessionId": info.session_id, "size_pt": size(info.size_pt), "size_px": size(info.size_px) })
		}
		Commands::Exec { script, args, session } => {
			let args = match args {
				Some(raw) => parse_json(&raw, "--args")?,
				None => Value::Null,
			};
			let healed = controller.exec_remote_script(session.as_deref(), &script, args).await?;
			json!({ "result": healed.value, "sessionId": healed.session_id })
		}
		Commands::Session(SessionCommand::Ensure) => {
			let id = controller.sessions().ensure(&controller.config().wda_base).await?;
			json!({ "sessionId": id })
		}
		Commands::Session(SessionCommand::Create {
			udid,
			bundle_id,
			no_reset,
			caps,
		}) => {
			let mut builder = XcuiCapabilities::new(udid);
			if let Some(raw) = caps {
				builder = builder.with_extra(parse_object(&raw, "--caps")?);
			}
			if let Some(bundle_id) = bundle_id {
				builder = builder.with_bundle_id(bundle_id);
			}
			if no_reset {
				builder = builder.with_no_reset(true);
			}
			let id = controller.create_appium_session(builder.build()).await?;
			json!({ "sessionId": id })
		}
		Commands::Session(SessionCommand::List) => json!({ "sessions": controller.list_appium_sessions().await? }),
		Commands::Settings(SettingsCommand::Get { session }) => {
			let healed = controller.appium_settings(session.as_deref()).await?;
			json!({ "settings": healed.value, "sessionId": healed.session_id })
		}
		Commands::Settings(SettingsCommand::Set { settings, session }) => {
			let settings = parse_object(&settings, "settings")?;
			let healed = controller.update_appium_settings(session.as_deref(), settings).await?;
			json!({ "result": healed.value, "sessionId": healed.session_id })
		}
	};
	Ok(data)
}

fn parse_json(raw: &str, what: &str) -> Result<Value> {
	serde_json::from_str(raw)
		.with_context(|| format!("{what} is not valid JSON"))
		.map_err(CliError::Input)
}

fn parse_object(raw: &str, what: &str) -> Result<Map<String, Value>> {
	match parse_json(raw, what)? {
		Value::Object(map) => Ok(map),
		other => Err(CliError::Input(anyhow!("{what} must be a JSON object, got {other}"))),
	}
}
