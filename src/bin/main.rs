// src/bin/main.rs

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use netspawner::cli::{normalize_args, Cli, Command};
use netspawner::{tool_dir, LocalNetwork};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    let Some(command) = cli.command else {
        eprintln!("{}", Cli::command().render_help());
        return ExitCode::from(2);
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli, command: Command) -> anyhow::Result<()> {
    let home = match &cli.home {
        Some(home) => home.clone(),
        None => tool_dir()?,
    };
    let network = LocalNetwork::load(home)?;

    match command {
        Command::Resume => network.resume(cli.resume_policy()).await?,
        Command::Reset => network.reset().await?,
    };
    Ok(())
}
