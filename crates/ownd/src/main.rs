mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;

    match cli.command {
        // Offline commands
        Command::Decode(args) => commands::decode::handle(args, &global),
        Command::Config(args) => commands::config_cmd::handle(&args, &global),

        // Gateway commands
        Command::Listen(args) => {
            let (endpoint, policy) = gateway(&global)?;
            commands::listen::handle(args, endpoint, policy, &global).await
        }
        Command::Send(args) => {
            let (endpoint, policy) = gateway(&global)?;
            commands::send::handle(args, endpoint, policy, &global).await
        }
        Command::Test => {
            let (endpoint, policy) = gateway(&global)?;
            commands::test::handle(endpoint, &policy, &global).await
        }
    }
}

fn gateway(global: &cli::GlobalOpts) -> Result<(ownd_api::GatewayEndpoint, ownd_api::RetryPolicy), CliError> {
    let config = config::load(global)?;
    let endpoint = config::resolve_endpoint(global, &config)?;
    let policy = config::retry_policy(&config)?;
    tracing::debug!(gateway = %endpoint, "Resolved gateway");
    Ok((endpoint, policy))
}
