//! deploycfg CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use deploycfg::Environment;
use deploycfg::cli::{Cli, EXIT_ERROR, run};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let env = Environment::from_process();
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();

    match run(&cli, &env, &mut stdout, &mut stderr) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
