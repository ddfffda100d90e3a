//! CLI parser.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gatebot")]
#[command(about = "Run several Telegram bots with log forwarding and a channel subscription gate", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every valid bot until Ctrl-C (config from env; flags override BOTS_FILE / LOCALE_FILE).
    Run {
        #[arg(short, long)]
        bots: Option<PathBuf>,
        #[arg(short, long)]
        locale: Option<PathBuf>,
    },
    /// Validate config and list which sessions would start, without connecting.
    Check {
        #[arg(short, long)]
        bots: Option<PathBuf>,
        #[arg(short, long)]
        locale: Option<PathBuf>,
    },
}
