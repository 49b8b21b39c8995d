use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Core(#[from] wdactl::Error),

	/// Malformed argument that clap cannot check on its own (JSON payloads).
	#[error("{0:#}")]
	Input(anyhow::Error),
}

impl CliError {
	pub fn to_command_error(&self) -> CommandError {
		match self {
			CliError::Core(err) => CommandError {
				code: error_code(err),
				message: err.to_string(),
				status: err.http_status(),
			},
			CliError::Input(err) => CommandError {
				code: ErrorCode::InvalidInput,
				message: format!("{err:#}"),
				status: None,
			},
		}
	}
}

/// Maps a core error kind onto its stable code.
pub fn error_code(err: &wdactl::Error) -> ErrorCode {
	use wdactl::Error;
	match err {
		Error::NoSession => ErrorCode::NoSession,
		Error::SessionInvalid { .. } => ErrorCode::SessionInvalid,
		Error::SessionCreateFailed(_) => ErrorCode::SessionCreateFailed,
		Error::DispatchExhausted { .. } => ErrorCode::DispatchExhausted,
		Error::Transport(_) => ErrorCode::Transport,
		Error::PartialGesture { .. } => ErrorCode::PartialGesture,
		Error::Unsupported { .. } => ErrorCode::DispatchExhausted,
		Error::InvalidInput(_) => ErrorCode::InvalidInput,
	}
}
