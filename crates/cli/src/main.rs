mod cli;
mod error;
mod logging;
mod output;
mod run;

use clap::Parser;
use tracing::debug;
use wdactl::Controller;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::{CommandResult, ResultBuilder};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let config = cli.to_config();
	let command = run::command_name(&cli.command);
	debug!(target = "wdactl.cli", command, wda = %config.wda_base, mode = %config.mode, "starting");

	let outcome = match Controller::new(config) {
		Ok(controller) => run::execute(&controller, cli.command).await,
		Err(err) => Err(CliError::from(err)),
	};

	match outcome {
		Ok(data) => {
			let result: CommandResult<serde_json::Value> = ResultBuilder::new(command).data(data).build();
			output::print_result(&result);
		}
		Err(err) => {
			let cmd_error = err.to_command_error();
			output::print_error_stderr(&cmd_error);
			let result: CommandResult<()> = ResultBuilder::new(command).error(cmd_error).build();
			output::print_result(&result);
			std::process::exit(1);
		}
	}
}
