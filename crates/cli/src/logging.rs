use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter directive for a `-v` count. `RUST_LOG` takes precedence.
fn default_filter(verbosity: u8) -> &'static str {
	// 0 = warnings only (dispatch fallbacks and heals stay visible)
	// 1 (-v) = info: attempts, pins, adoptions
	// 2+ (-vv) = debug for wdactl, trace for transport requests
	match verbosity {
		0 => "warn",
		1 => "info,hyper=warn,reqwest=warn",
		_ => "debug,wdactl=trace,hyper=info",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
