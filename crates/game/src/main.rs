use std::env;
use std::process::ExitCode;

use tracing::{error, info};

mod app;

use app::bootstrap::{init_tracing, load_config};
use app::cli::{parse_args, usage_text, CliCommand};

fn main() -> ExitCode {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_args(&args) {
        Ok(CliCommand::Run(options)) => options,
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let config = match load_config(options.config_path.as_deref(), |key| env::var(key).ok()) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "config_failed");
            return ExitCode::FAILURE;
        }
    };

    app::loop_runner::run(config, options.mode)
}
