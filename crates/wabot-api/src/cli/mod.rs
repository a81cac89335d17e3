//! CLI command definitions for the `wabot` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod config;
pub mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// WhatsApp automation bot: reactions, moderation, group commands and
/// private auto-replies.
#[derive(Parser)]
#[command(name = "wabot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml (default: <config dir>/wabot/config.toml).
    #[arg(long, global = true, env = "WABOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default tracing filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "info,wabot_core=debug,wabot_infra=debug,wabot_api=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to WhatsApp through the session bridge and start handling events.
    Run(RunArgs),

    /// Print the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Bridge program to launch (overrides `bridge.command`).
    #[arg(long)]
    pub bridge: Option<String>,

    /// Argument passed to the bridge program. Repeatable; replaces `bridge.args`.
    #[arg(long = "bridge-arg", allow_hyphen_values = true)]
    pub bridge_args: Vec<String>,

    /// File that log lines are appended to.
    #[arg(long, default_value = "bot.log")]
    pub log_file: PathBuf,

    /// Also save pairing QR codes as a PNG (plus a .txt data URL next to it).
    #[arg(long)]
    pub qr_png: Option<PathBuf>,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long)]
    pub otel: bool,
}
