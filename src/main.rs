//! Application entrypoint and state wiring.

use std::process::ExitCode;
use std::sync::Arc;

use civic_ledger::config::{ServerConfig, StoreBackend};
use civic_ledger::routes::{self, AppState};
use civic_ledger::seed::seed_demo;
use civic_ledger::storage::{FileStore, MemoryStore};
use civic_ledger::Ledger;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_json);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // 1) store
    let ledger = match &config.store {
        StoreBackend::File(dir) => {
            let store = FileStore::open(dir.clone())?;
            info!(dir = %store.dir().display(), "opened file store");
            Ledger::new(store, config.ledger)
        }
        StoreBackend::Memory => {
            info!("using in-memory store");
            Ledger::new(MemoryStore::new(), config.ledger)
        }
    };
    let options = ledger.options();
    info!(
        reports = ledger.len()?,
        encoding = %options.encoding,
        append_retries = options.append_retries,
        "ledger loaded"
    );

    // 2) optional demo data
    if config.seed_demo {
        seed_demo(&ledger)?;
    }

    // 3) startup integrity check (logged, not fatal)
    let check = ledger.verify()?;
    if !check.is_valid {
        error!(invalid = ?check.invalid_blocks, "stored chain failed verification");
    }

    // 4) router
    let app = routes::router(AppState {
        ledger: Arc::new(ledger),
    });

    // 5) serve
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
