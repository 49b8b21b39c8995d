use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use wdactl::protocol::Point;
use wdactl::{AdoptionConfig, Config, HttpConfig, Mode, TapPreference};

#[derive(Parser, Debug)]
#[command(name = "wdactl")]
#[command(about = "Drive an iOS device through WebDriverAgent, falling back across gesture protocols")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = ArgAction::Count)]
	pub verbose: u8,

	#[command(flatten)]
	pub backend: BackendArgs,

	#[command(flatten)]
	pub http: HttpArgs,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
	/// WebDriverAgent base URL
	#[arg(long, global = true, env = "WDA_BASE", default_value = "http://127.0.0.1:8100")]
	pub wda_base: String,

	/// Appium base URL for scripts, settings, and session creation
	#[arg(long, global = true, env = "APPIUM_BASE", default_value = "http://127.0.0.1:4723")]
	pub appium_base: String,

	/// Gesture protocol: auto, native (wda), actions (appium), or jsonwp
	#[arg(long, global = true, env = "CONTROL_MODE", default_value = "auto", value_parser = parse_mode)]
	pub mode: Mode,

	/// Try the next protocol when one is not available
	#[arg(long, global = true, env = "ALLOW_FALLBACK", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
	pub allow_fallback: bool,

	/// Treat read/write timeouts as safe to fall back from (may repeat a gesture)
	#[arg(long, global = true, env = "ALLOW_TIMEOUT_FALLBACK", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
	pub allow_timeout_fallback: bool,

	/// Native tap form: auto, tap0, or drag
	#[arg(long, global = true, env = "PREFERRED_WDA_TAP", default_value = "auto", value_parser = parse_tap)]
	pub native_tap: TapPreference,

	/// Create a session when none can be adopted
	#[arg(long = "auto-create", global = true, env = "WDA_AUTO_CREATE", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
	pub auto_create: bool,
}

#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "HTTP pool")]
pub struct HttpArgs {
	#[arg(long, global = true, env = "HTTP_MAX_CONN", default_value_t = 100, hide_short_help = true)]
	pub http_max_conn: usize,

	#[arg(long, global = true, env = "HTTP_MAX_KEEPALIVE", default_value_t = 20, hide_short_help = true)]
	pub http_max_keepalive: usize,

	/// Idle keep-alive expiry in seconds
	#[arg(long, global = true, env = "HTTP_KEEPALIVE_EXPIRY", default_value = "45", value_parser = parse_secs, hide_short_help = true)]
	pub http_keepalive_expiry: Duration,

	#[arg(long, global = true, env = "HTTP_TIMEOUT", default_value = "120", value_parser = parse_secs, hide_short_help = true)]
	pub http_timeout: Duration,

	#[arg(long, global = true, env = "HTTP_CONNECT_TIMEOUT", default_value = "10", value_parser = parse_secs, hide_short_help = true)]
	pub http_connect_timeout: Duration,

	#[arg(long, global = true, env = "HTTP_READ_TIMEOUT", default_value = "120", value_parser = parse_secs, hide_short_help = true)]
	pub http_read_timeout: Duration,

	#[arg(long, global = true, env = "HTTP_WRITE_TIMEOUT", default_value = "120", value_parser = parse_secs, hide_short_help = true)]
	pub http_write_timeout: Duration,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Tap at a point (logical pt coordinates)
	#[command(allow_negative_numbers = true)]
	Tap { x: f64, y: f64 },

	/// Drag between two points
	#[command(allow_negative_numbers = true)]
	Drag {
		x1: f64,
		y1: f64,
		x2: f64,
		y2: f64,
		/// Duration in seconds [default: 0.12]
		#[arg(short, long)]
		duration: Option<f64>,
	},

	/// Press and hold at a point
	#[command(allow_negative_numbers = true)]
	LongPress {
		x: f64,
		y: f64,
		/// Hold in seconds [default: 0.6, min: 0.05]
		#[arg(short, long)]
		duration: Option<f64>,
	},

	/// Drag through points, each segment taking a fixed time
	Pump {
		/// Points as `x,y`
		#[arg(required = true, num_args = 1.., value_parser = parse_point)]
		points: Vec<Point>,
		/// Seconds per segment [default: 0.08]
		#[arg(short, long)]
		segment: Option<f64>,
	},

	/// Drag through points within a total time
	Trace {
		/// Points as `x,y`
		#[arg(required = true, num_args = 1.., value_parser = parse_point)]
		points: Vec<Point>,
		/// Total duration in milliseconds; 0 uses 16 ms per segment
		#[arg(short, long, default_value_t = 0.0)]
		total_ms: f64,
	},

	/// Press a hardware button (home, volumeUp, volumeDown)
	Button { name: String },

	/// Backend status
	Status,

	/// Logical screen size
	WindowSize,

	/// Session id with logical (pt) and screenshot (px) sizes
	DeviceInfo {
		/// Skip the screenshot pixel size
		#[arg(long, env = "SKIP_SCREENSHOT_SIZE", default_value_t = false, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
		no_shot: bool,
	},

	/// Run an Appium script such as `mobile: swipe`
	Exec {
		script: String,
		/// JSON object or array of arguments
		#[arg(short, long)]
		args: Option<String>,
		/// Appium session id [default: last created]
		#[arg(long)]
		session: Option<String>,
	},

	/// Session management
	#[command(subcommand)]
	Session(SessionCommand),

	/// Appium settings
	#[command(subcommand)]
	Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
	/// Adopt (or create, with --auto-create true) the WDA session and print its id
	Ensure,

	/// Create an XCUITest session through Appium
	Create {
		udid: String,
		#[arg(long)]
		bundle_id: Option<String>,
		#[arg(long)]
		no_reset: bool,
		/// Extra capabilities as a JSON object
		#[arg(long)]
		caps: Option<String>,
	},

	/// Sessions known to the Appium backend
	List,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
	Get {
		#[arg(long)]
		session: Option<String>,
	},
	Set {
		/// Settings as a JSON object
		settings: String,
		#[arg(long)]
		session: Option<String>,
	},
}

impl Cli {
	pub fn to_config(&self) -> Config {
		Config {
			wda_base: self.backend.wda_base.clone(),
			appium_base: self.backend.appium_base.clone(),
			mode: self.backend.mode,
			allow_fallback: self.backend.allow_fallback,
			allow_timeout_fallback: self.backend.allow_timeout_fallback,
			native_tap: self.backend.native_tap,
			auto_create_session: self.backend.auto_create,
			http: HttpConfig {
				max_connections: self.http.http_max_conn,
				max_keepalive: self.http.http_max_keepalive,
				keepalive_expiry: self.http.http_keepalive_expiry,
				total_timeout: self.http.http_timeout,
				connect_timeout: self.http.http_connect_timeout,
				read_timeout: self.http.http_read_timeout,
				write_timeout: self.http.http_write_timeout,
			},
			adoption: AdoptionConfig::default(),
		}
	}
}

fn parse_mode(s: &str) -> Result<Mode, String> {
	s.parse().map_err(|e: wdactl::Error| e.to_string())
}

fn parse_tap(s: &str) -> Result<TapPreference, String> {
	s.parse().map_err(|e: wdactl::Error| e.to_string())
}

fn parse_secs(s: &str) -> Result<Duration, String> {
	let secs: f64 = s.trim().parse().map_err(|_| format!("expected seconds, got {s:?}"))?;
	Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration {s:?}: {e}"))
}

fn parse_point(s: &str) -> Result<Point, String> {
	let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y, got {s:?}"))?;
	let x: f64 = x.trim().parse().map_err(|_| format!("invalid x in {s:?}"))?;
	let y: f64 = y.trim().parse().map_err(|_| format!("invalid y in {s:?}"))?;
	Ok(Point::new(x, y))
}
