//! Offline referral tool: operate the referral keeper over an LMDB store.

mod commands;
mod config;
mod offline;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use axm_referral::Status;
use axm_types::Timestamp;
use axm_utils::LogFormat;
use clap::Parser;
use serde::Serialize;

use crate::commands::Tool;
use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "axm-referral", about = "Axiome referral keeper, offline tooling")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override
    /// its values.
    #[arg(long, env = "AXM_REFERRAL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of the LMDB store.
    #[arg(long, env = "AXM_REFERRAL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AXM_REFERRAL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "AXM_REFERRAL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Block time in unix seconds (defaults to now).
    #[arg(long)]
    time: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Import a JSON genesis file into an empty store.
    InitGenesis { file: PathBuf },

    /// Print the current state as a JSON genesis document.
    ExportGenesis {
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show an account's record.
    Show { account: String },

    /// List an account's direct referrals.
    Children { account: String },

    /// Evaluate a status tier's requirements for an account.
    CheckStatus { account: String, status: Status },

    /// Show how a delegation fee from an account would be split.
    Fees { account: String },

    /// Register `referral` under `referrer`.
    Register { referrer: String, referral: String },

    /// Apply a self-delegation change (base units, may be negative).
    Stake {
        account: String,
        #[arg(allow_negative_numbers = true)]
        delta: i128,
    },

    /// Process the status downgrades due at the block time.
    BeginBlock,

    /// List the scheduled status downgrades.
    Downgrades,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    axm_utils::init_logging(config.log_format, &config.log_level);

    let block_time = Timestamp::new(cli.time.unwrap_or_else(now_secs));
    tracing::debug!(data_dir = %config.data_dir.display(), %block_time, "starting");
    let tool = Tool::open(&config, block_time)?;

    match cli.command {
        Command::InitGenesis { file } => tool.init_genesis(&file)?,
        Command::ExportGenesis { out } => {
            let state = tool.export_genesis()?;
            match out {
                Some(path) => {
                    let text = serde_json::to_string_pretty(&state)?;
                    std::fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), "genesis exported");
                }
                None => print_json(&state)?,
            }
        }
        Command::Show { account } => print_json(&tool.show(&account)?)?,
        Command::Children { account } => print_json(&tool.children(&account)?)?,
        Command::CheckStatus { account, status } => {
            print_json(&tool.check_status(&account, status)?)?
        }
        Command::Fees { account } => print_json(&tool.fees(&account)?)?,
        Command::Register { referrer, referral } => {
            print_json(&tool.register(&referrer, &referral)?)?
        }
        Command::Stake { account, delta } => print_json(&tool.stake(&account, delta)?)?,
        Command::BeginBlock => print_json(&tool.begin_block()?)?,
        Command::Downgrades => print_json(&tool.downgrades()?)?,
    }
    Ok(())
}
