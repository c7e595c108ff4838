use std::process::ExitCode;

use clap::Parser;
use console::style;
use kcap::cli::{self, App};

fn main() -> ExitCode {
    let app = App::parse();

    env_logger::Builder::new()
        .filter_level(app.log_level())
        .parse_default_env()
        .format_target(false)
        .init();

    match cli::run(app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
