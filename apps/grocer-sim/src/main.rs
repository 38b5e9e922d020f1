//! # Shopping Day Simulator
//!
//! Drives one full day against the store engine.
//!
//! ## Usage
//! ```bash
//! # Defaults from store.toml (or built-in defaults)
//! cargo run -p grocer-sim
//!
//! # Override the crowd
//! cargo run -p grocer-sim -- --shoppers 32 --registers 4
//!
//! # Explicit config file
//! cargo run -p grocer-sim -- --config ./store.toml
//! ```
//!
//! ## Day Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Load config, stock shelves from the seed catalog                   │
//! │  2. Open the store, open registers                                     │
//! │  3. Each shopper runs on a blocking task (it may block in the waiting  │
//! │     room, so it must not sit on an async worker)                       │
//! │  4. Service tick on an interval until every shopper task is finished   │
//! │  5. Shutdown on a blocking task (it sleeps through the grace period)   │
//! │  6. Print the day as JSON                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod catalog;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use grocer_core::{Item, Receipt};
use grocer_store::{Shopper, ShopperId, ShopperPhase, ShutdownReport, Store, StoreConfig};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How one shopper's visit ended.
#[derive(Debug, Serialize)]
struct ShopperOutcome {
    id: ShopperId,
    waited: bool,
    phase: ShopperPhase,
    entry_refused: bool,
    receipt: Option<Receipt>,
    receipt_lines: Vec<String>,
    /// Entries still wanted (quantity > 0) after the visit.
    unfilled: Vec<Item>,
}

/// Everything printed at the end of the day.
#[derive(Debug, Serialize)]
struct DaySummary {
    store: String,
    ticks: usize,
    checked_out_by_ticks: usize,
    shutdown: ShutdownReport,
    shoppers: Vec<ShopperOutcome>,
    closing_stock: Vec<Item>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut shoppers_override: Option<usize> = None;
    let mut registers_override: Option<usize> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--shoppers" | "-s" => {
                if i + 1 < args.len() {
                    shoppers_override = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--registers" | "-r" => {
                if i + 1 < args.len() {
                    registers_override = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Grocer Shopping Day Simulator");
                println!();
                println!("Usage: grocer-sim [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>     Config file (default: platform config dir)");
                println!("  -s, --shoppers <N>      Number of shoppers");
                println!("  -r, --registers <N>     Number of registers");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => StoreConfig::load(Some(path))?,
        None => StoreConfig::load_or_default(None),
    };
    if let Some(shoppers) = shoppers_override {
        config.simulation.shoppers = shoppers;
    }
    if let Some(registers) = registers_override {
        config.simulation.registers = registers;
    }

    let store = Arc::new(Store::new(config.store.clone()));

    // Stock the shelves before opening
    let stock = catalog::opening_stock()?;
    for item in &stock {
        store.add_item(item.clone())?;
    }
    info!(
        items = store.ledger().len(),
        units = store.ledger().total_units(),
        value = %store.ledger().stock_value(),
        "Shelves stocked"
    );

    store.open();
    for _ in 0..config.simulation.registers {
        store.open_register();
    }

    // Every third shopper is happy to wait; the store is already open so
    // they walk straight in unless it closes on them.
    let shoppers: Vec<Arc<Shopper>> = (0..config.simulation.shoppers)
        .map(|n| {
            let list = catalog::shopping_list(n, &stock);
            if n % 3 == 0 {
                Arc::new(Shopper::waiting(store.clone(), list))
            } else {
                Arc::new(Shopper::new(store.clone(), list))
            }
        })
        .collect();

    let tasks: Vec<JoinHandle<()>> = shoppers
        .iter()
        .map(|shopper| {
            let shopper = shopper.clone();
            tokio::task::spawn_blocking(move || shopper.shop())
        })
        .collect();

    let mut ticks = 0;
    let mut checked_out_by_ticks = 0;
    let mut interval = tokio::time::interval(config.simulation.service_interval());
    loop {
        interval.tick().await;
        let report = store.service_tick();
        ticks += 1;
        checked_out_by_ticks += report.checked_out;

        if tasks.iter().all(JoinHandle::is_finished) {
            break;
        }
    }
    for task in tasks {
        task.await?;
    }

    let shutdown = {
        let store = store.clone();
        tokio::task::spawn_blocking(move || store.shutdown()).await?
    };

    let outcomes: Vec<ShopperOutcome> = shoppers
        .iter()
        .map(|shopper| {
            let receipt = shopper.receipt();
            ShopperOutcome {
                id: shopper.id(),
                waited: shopper.waits(),
                phase: shopper.phase(),
                entry_refused: shopper.entry_refused(),
                receipt_lines: receipt
                    .as_ref()
                    .map(Receipt::itemized_lines)
                    .unwrap_or_default(),
                receipt,
                unfilled: shopper
                    .shopping_list()
                    .into_iter()
                    .filter(|item| item.quantity() > 0)
                    .collect(),
            }
        })
        .collect();

    let served = outcomes.iter().filter(|o| o.receipt.is_some()).count();
    info!(
        shoppers = outcomes.len(),
        served,
        ticks,
        "Shopping day finished"
    );

    let summary = DaySummary {
        store: store.name().to_string(),
        ticks,
        checked_out_by_ticks,
        shutdown,
        shoppers: outcomes,
        closing_stock: store.ledger().snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,grocer=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
