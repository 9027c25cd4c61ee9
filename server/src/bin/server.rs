//! smelter server binary.

use clap::Parser;
use parking_lot::Mutex;
use server::listener::{self, TracingSink};
use server::{logging, Config};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use store_core::Db;

#[derive(Parser)]
#[command(name = "smelter-server")]
#[command(about = "Set-centric in-memory key-value store")]
struct Args {
    /// Path to configuration file (defaults apply when omitted)
    config: Option<PathBuf>,

    /// Override the listener address
    #[arg(long)]
    listen: Option<SocketAddr>,
}

fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config: {e}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.listener.address = listen;
    }

    logging::init(&config.logging);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        max_intset_entries = config.store.set_max_intset_entries,
        "starting"
    );

    let db = Arc::new(Mutex::new(Db::with_sink(
        &config.store,
        Box::new(TracingSink),
    )));
    let shutdown = Arc::new(AtomicBool::new(false));

    if let Err(e) = listener::run(&config, db, shutdown) {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
