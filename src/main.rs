//! Plumchecker CLI entry point.

use std::path::Path;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use plumchecker::cli::{Cli, Command};
use plumchecker::config::Config;
use plumchecker::ingest::{Engine, IngestError, IngestOptions, WorkerSender};
use plumchecker::query::{HttpTransport, QueryField, QueryOutcome, QueryParams, QuerySession, render};

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        1 => tracing::Level::DEBUG,
        2 => tracing::Level::INFO,
        3 => tracing::Level::WARN,
        _ => tracing::Level::ERROR,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

extern "C" fn on_interrupt(_: nix::libc::c_int) {
    const FAREWELL: &[u8] = b"\nInterrupted. Goodbye!\n";
    // Only async-signal-safe calls are allowed here.
    unsafe {
        nix::libc::write(2, FAREWELL.as_ptr().cast(), FAREWELL.len());
        nix::libc::_exit(130);
    }
}

fn install_interrupt_handler() -> Result<()> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    let action = SigAction::new(SigHandler::Handler(on_interrupt), SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(Signal::SIGINT, &action) }.context("failed to install SIGINT handler")?;
    Ok(())
}

fn run_add(config: &Config, path: &Path, recursive_folders: bool, recursive_archives: bool) -> Result<()> {
    let options = IngestOptions {
        recursive_folders,
        recursive_archives,
        ..Default::default()
    };
    let mut sender = WorkerSender::new(config);
    match Engine::new(options, &mut sender).run(path) {
        Ok(summary) => {
            info!(
                forwarded = summary.forwarded,
                skipped = summary.skipped,
                "ingestion finished"
            );
            Ok(())
        }
        // Root path problems are reported, not raised.
        Err(e @ IngestError::NothingFound(_)) => {
            println!("{e}");
            Ok(())
        }
        Err(e) => Err(e).context("ingestion failed"),
    }
}

fn run_query(config: &Config, field: QueryField, all: bool, page: u32, keyword: Vec<String>) -> Result<()> {
    let params = QueryParams {
        field,
        keyword: keyword.join(" "),
        paginate: !all,
        page,
    };
    let transport = HttpTransport::new(config).context("failed to build HTTP client")?;
    let session = QuerySession::new(&transport);
    match session.run(&params) {
        // The session already warned that the result set ended early.
        QueryOutcome::EndedEarly { .. } => {}
        QueryOutcome::Page { leaks, next_page } => {
            print!("\n{}\n", render::format_table(&leaks));
            if let Some(next) = next_page {
                info!("this is not the last page for this search; to get the next page, use --page {next}");
            }
        }
        QueryOutcome::All { leaks } => {
            print!("\n{}\n", render::format_table(&leaks));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbosity);
    install_interrupt_handler()?;

    // Configuration failures are fatal before any subcommand runs.
    let config = Config::load(cli.config.as_deref()).context("configuration failure")?;

    match cli.command {
        Command::Add {
            path,
            recursive_folders,
            recursive_archives,
        } => run_add(&config, &path, recursive_folders, recursive_archives),
        Command::Query {
            field,
            all,
            page,
            keyword,
        } => run_query(&config, field, all, page, keyword),
    }
}
