use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use coastal_availability::adapters::json_ledger::load_ledger_file;
use coastal_availability::adapters::snapshot_store::SnapshotStore;
use coastal_availability::config::load_config;
use coastal_availability::domain::dates::{add_days, parse_iso_date};
use coastal_availability::domain::fishing_window::CalendarKind;
use coastal_availability::engine::AvailabilityEngine;
use coastal_availability::ports::ledger_source::LedgerSource;

const REPORT_DAYS: i64 = 14;

fn find_config_path() -> PathBuf {
    let candidates = [
        PathBuf::from("config.yaml"),
        binary_dir().join("config.yaml"),
    ];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn binary_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut args = std::env::args().skip(1);
    let ledger_path = args
        .next()
        .context("usage: coastal-availability <ledger.json> [start YYYY-MM-DD]")?;
    let start = match args.next() {
        Some(value) => parse_iso_date(&value)?,
        None => chrono::Local::now().date_naive(),
    };

    let config = load_config(&find_config_path())?;
    let ledger = load_ledger_file(Path::new(&ledger_path))
        .with_context(|| format!("failed to load ledger {ledger_path}"))?;
    let store: Arc<dyn LedgerSource> = Arc::new(SnapshotStore::new(ledger));
    let engine = AvailabilityEngine::new(store, &config);

    for conflict in engine.overnight_conflicts(start) {
        tracing::warn!(date = %conflict, "More than one overnight stay booked");
    }

    let blocked = engine.blocked_fishing_dates_map(start, CalendarKind::General);
    println!("{:<12} {:<28} {:<9} Fishing", "Date", "Status", "Load");
    for offset in 0..REPORT_DAYS {
        let date = add_days(start, offset);
        let fishing = blocked
            .get(&date)
            .map_or_else(|| "open".to_string(), ToString::to_string);
        println!(
            "{:<12} {:<28} {:<9} {}",
            date.to_string(),
            engine.day_label(date),
            engine.day_severity(date, None).to_string(),
            fishing
        );
    }

    Ok(())
}
