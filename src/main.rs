use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use teamtab::application::service::LedgerService;
use teamtab::application::session::Session;
use teamtab::domain::ports::LedgerStoreBox;
use teamtab::error::LedgerError;
use teamtab::infrastructure::in_memory::InMemoryLedgerStore;
#[cfg(feature = "storage-rocksdb")]
use teamtab::infrastructure::rocksdb::RocksDBStore;
use teamtab::interfaces::csv::ledger_reader::{EntryType, LedgerEntry, LedgerReader};
use teamtab::interfaces::csv::report_writer::ReportWriter;
use teamtab::interfaces::http::{app, state::AppState};
use teamtab::interfaces::roster::{password_digest, read_roster};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the JSON API.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "TEAMTAB_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        /// Roster JSON file with the team's participants.
        #[arg(long, env = "TEAMTAB_ROSTER")]
        roster: PathBuf,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long, env = "TEAMTAB_DB_PATH")]
        db_path: Option<PathBuf>,
    },
    /// Print balances and suggested settlements for a ledger CSV file.
    ///
    /// Every row of the file is appended to the ledger as a new record. With
    /// `--db-path` the ledger persists between runs, so the file should only
    /// hold entries not recorded yet: reporting the same file twice records
    /// its entries twice.
    Report {
        /// Input ledger CSV file
        input: PathBuf,

        /// Roster JSON file with the team's participants.
        #[arg(long, env = "TEAMTAB_ROSTER")]
        roster: PathBuf,

        /// Persistent ledger to append the file's entries to (optional).
        /// If provided, uses RocksDB and reports on everything stored there.
        #[arg(long, env = "TEAMTAB_DB_PATH")]
        db_path: Option<PathBuf>,
    },
    /// Print the roster digest of a password.
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();

    match Cli::parse().command {
        Command::Serve {
            bind,
            roster,
            db_path,
        } => serve(bind, &roster, db_path).await,
        Command::Report {
            input,
            roster,
            db_path,
        } => report(&input, &roster, db_path).await,
        Command::HashPassword { password } => {
            println!("{}", password_digest(&password));
            Ok(())
        }
    }
}

async fn serve(bind: SocketAddr, roster: &Path, db_path: Option<PathBuf>) -> Result<()> {
    let service = load_service(roster, db_path).await?;

    let listener = TcpListener::bind(bind).await.into_diagnostic()?;
    tracing::info!(%bind, "listening");

    axum::serve(listener, app(AppState::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    tracing::info!("server stopped");
    Ok(())
}

async fn report(input: &Path, roster: &Path, db_path: Option<PathBuf>) -> Result<()> {
    let service = load_service(roster, db_path).await?;

    let file = File::open(input).into_diagnostic()?;
    let reader = LedgerReader::new(file);
    for (line, entry) in reader.entries().enumerate() {
        match entry {
            Ok(entry) => {
                if let Err(e) = apply_entry(&service, entry).await {
                    tracing::warn!(row = line + 1, error = %e, "Error applying ledger entry");
                }
            }
            Err(e) => {
                tracing::warn!(row = line + 1, error = %e, "Error reading ledger entry");
            }
        }
    }

    let report = service.report().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_report(&report).into_diagnostic()?;

    Ok(())
}

async fn load_service(roster: &Path, db_path: Option<PathBuf>) -> Result<LedgerService> {
    let service = LedgerService::new(open_store(db_path)?);
    let roster = read_roster(File::open(roster).into_diagnostic()?).into_diagnostic()?;
    let added = service.sync_roster(roster).await.into_diagnostic()?;
    tracing::debug!(added, "roster synchronised");
    Ok(service)
}

fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(&path).into_diagnostic()?;
            tracing::info!(path = %path.display(), "using persistent storage");
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            tracing::warn!(
                path = %path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryLedgerStore::new()))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

/// Expenses in a ledger file are shared by everyone registered when the row
/// is applied.
async fn apply_entry(service: &LedgerService, entry: LedgerEntry) -> teamtab::error::Result<()> {
    match entry.r#type {
        EntryType::Expense => {
            let description = entry.description.unwrap_or_default();
            service
                .add_expense(
                    &Session::new(entry.payer),
                    &description,
                    entry.amount,
                    Vec::new(),
                )
                .await?;
        }
        EntryType::Payment => {
            let receiver = entry
                .receiver
                .ok_or_else(|| LedgerError::validation("Payment has no receiver"))?;
            service
                .record_payment_between(entry.payer, receiver, entry.amount)
                .await?;
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
