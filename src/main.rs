mod catalog;
mod cli;
mod config;
mod error;
mod printer;
mod printer_list;
mod query_engine;
mod report;
use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Mode};
use config::Config;
use printer::{summary, Status};
use printer_list::{PrinterList, ReadPolicy};
use query_engine::{QueryEngine, SnmpQueryEngine};
use report::{PrinterReport, Reporter, VERSION};
use std::{sync::Arc, time::Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Printer Monitor {VERSION} is Starting");

    let config = Config::load(&cli.config)?;
    let targets = PrinterList::from_config(&config)?;
    let engine: Arc<dyn QueryEngine> = Arc::new(SnmpQueryEngine);
    let mode = cli.mode();
    let reporter = match mode {
        Mode::Report => Some(Reporter::new(&config)?),
        _ => None,
    };

    let now = Instant::now();
    let policy = match mode {
        Mode::Ping => ReadPolicy::PingOnly,
        Mode::Report => ReadPolicy::Reachable,
        Mode::Debug => ReadPolicy::All,
    };
    let printers = targets.poll_all(&config, engine, policy).await;
    let online = printers.iter().filter(|p| p.status == Status::Ok).count();
    info!(
        "Queried {} printers in {:.2} seconds. {} online.",
        targets.targets.len(),
        now.elapsed().as_secs_f64(),
        online
    );

    match mode {
        Mode::Ping => {
            for printer in &printers {
                println!("{:<8} {}", printer.status.to_string(), printer.label());
            }
        }
        Mode::Debug => {
            for printer in &printers {
                println!("{}", summary::render(printer));
                let report = PrinterReport::new(printer, config.wire_format, Utc::now());
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Mode::Report => {
            let Some(reporter) = reporter else {
                return Ok(());
            };
            let mut accepted = 0;
            for printer in &printers {
                let report = PrinterReport::new(printer, config.wire_format, Utc::now());
                match reporter.send(&report).await {
                    Ok(true) => accepted += 1,
                    Ok(false) => {}
                    Err(e) => error!("Unable to send report for {}: {:?}", printer.label(), e),
                }
            }
            info!("Backend accepted {accepted} of {} reports", printers.len());
        }
    }

    Ok(())
}
