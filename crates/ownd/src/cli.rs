//! Clap derive structures for the `ownd` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ownd -- talk to OpenWebNet (BTicino / Legrand) gateways
#[derive(Debug, Parser)]
#[command(
    name = "ownd",
    version,
    about = "Listen to and command OpenWebNet home automation gateways",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "OWND_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway address (overrides profile)
    #[arg(long, short = 'a', env = "OWND_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Gateway TCP port (overrides profile)
    #[arg(long, env = "OWND_PORT", global = true)]
    pub port: Option<u16>,

    /// Gateway password (overrides profile)
    #[arg(long, env = "OWND_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "OWND_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', env = "OWND_OUTPUT", default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// One summary line per message
    Text,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON (one object per line)
    JsonCompact,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open an event session and print bus messages as they arrive
    #[command(alias = "l")]
    Listen(ListenArgs),

    /// Send frames over a command session
    #[command(alias = "s")]
    Send(SendArgs),

    /// Check that the gateway accepts a session with the configured password
    Test,

    /// Decode frames offline, without a gateway
    #[command(alias = "d")]
    Decode(DecodeArgs),

    /// Inspect the configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Only show messages of these WHO families
    #[arg(long = "who", short = 'w')]
    pub who: Vec<u32>,

    /// Only show messages addressed to these WHERE values
    #[arg(long = "where")]
    pub where_: Vec<String>,

    /// Stop after this many messages
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Frames to send, e.g. '*1*1*12##'
    #[arg(required = true)]
    pub frames: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Frames to decode; read from stdin, one per line, when omitted
    pub frames: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// List configured gateway profiles
    Profiles,
}
