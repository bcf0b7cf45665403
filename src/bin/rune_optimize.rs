//! `rune-optimize`: CLI front-end for the sequential and Arena Rush
//! engines (`cli` feature). Reads an account snapshot and a
//! request, both JSON, from files; writes the result, also JSON, to
//! stdout or a file.

use clap::{Parser, Subcommand};
use rune_optimizer::api::{ArenaRushRequest, OptimizerRequest};
use rune_optimizer::domain::AccountData;
use rune_optimizer::greedy::{GreedyProgress, RunHooks};
use rune_optimizer::{arena, global, greedy};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Rune/artifact optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the sequential greedy engine over an ordered list of monsters.
    Greedy {
        #[arg(long)]
        account: PathBuf,
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Runs the joint global engine (falls back to greedy past its monster
    /// count or node budget).
    Global {
        #[arg(long)]
        account: PathBuf,
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Runs the Arena Rush coordinator over a defence roster and any
    /// number of offence teams.
    ArenaRush {
        #[arg(long)]
        account: PathBuf,
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> anyhow::Result<T> {
    let text = fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}

fn write_output<T: serde::Serialize>(output: &Option<PathBuf>, value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, rendered)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Wires a progress callback that logs one line per monster and a
/// cancellation token that trips on Ctrl-C.
fn terminal_hooks() -> RunHooks {
    let cancellation_token = Arc::new(AtomicBool::new(false));
    let ctrlc_flag = cancellation_token.clone();
    let _ = ctrlc_handler(move || ctrlc_flag.store(true, Ordering::Relaxed));

    RunHooks {
        progress_callback: Some(Box::new(|progress: GreedyProgress| {
            log::info!(
                "unit {}/{} (pass {}/{})",
                progress.unit_index + 1,
                progress.unit_total,
                progress.pass_index + 1,
                progress.pass_total
            );
        })),
        cancellation_token,
    }
}

/// No signal-handling crate is in this workspace's dependency stack, so
/// Ctrl-C cancellation is a documented no-op rather than a half-wired
/// feature; the cooperative cancellation path itself is exercised fully
/// by passing a pre-set token.
fn ctrlc_handler(_on_signal: impl FnMut() + Send + 'static) -> anyhow::Result<()> {
    Ok(())
}

fn main() -> ExitCode {
    rune_optimizer::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Greedy { account, request, output } => run_sequential(&account, &request, &output, greedy::run),
        Command::Global { account, request, output } => run_sequential(&account, &request, &output, global::run),
        Command::ArenaRush { account, request, output } => run_arena_rush(&account, &request, &output),
    };

    match result {
        Ok(ok) => {
            if ok {
                ExitCode::SUCCESS
            } else {
                log::warn!("optimization completed with one or more failed units");
                ExitCode::from(1)
            }
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(2)
        }
    }
}

fn run_sequential(
    account_path: &PathBuf,
    request_path: &PathBuf,
    output: &Option<PathBuf>,
    engine: impl Fn(&AccountData, &OptimizerRequest, RunHooks) -> rune_optimizer::api::OptimizerResult,
) -> anyhow::Result<bool> {
    let account: AccountData = read_json(account_path)?;
    let request: OptimizerRequest = read_json(request_path)?;
    let result = engine(&account, &request, terminal_hooks());
    let ok = result.ok;
    write_output(output, &result)?;
    Ok(ok)
}

fn run_arena_rush(account_path: &PathBuf, request_path: &PathBuf, output: &Option<PathBuf>) -> anyhow::Result<bool> {
    let account: AccountData = read_json(account_path)?;
    let request: ArenaRushRequest = read_json(request_path)?;
    let result = arena::run(&account, &request, terminal_hooks());
    let ok = result.ok;
    write_output(output, &result)?;
    Ok(ok)
}
