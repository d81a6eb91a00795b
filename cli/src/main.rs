mod cli;
mod error;
mod fixtures;
mod health;
mod init;
mod progress;
mod run;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            suite,
            env,
            coverage,
            report,
            reports_dir,
            config,
        } => run::execute(run::RunArgs {
            suite: suite.into(),
            environment: env,
            coverage,
            report,
            reports_dir,
            config_path: config,
        }),
        Commands::Health { env, wait, config } => health::execute(health::HealthArgs {
            environment: env,
            wait_secs: wait,
            config_path: config,
        }),
        Commands::Fixtures { set, seed } => fixtures::execute(set, seed).map(|_| 0),
        Commands::Init { force, config } => init::execute(&config, force).map(|_| 0),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{} {}", "Error:".bold().red(), err.user_message());
            process::exit(1);
        }
    }
}
