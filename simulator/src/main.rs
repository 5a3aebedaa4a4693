//! fxswap scenario simulator
//!
//! Deploys an in-memory token bank and exchange from a TOML scenario and
//! replays its steps through the public exchange API.
//!
//! Usage: `fxswap-simulator` runs `$SIMULATOR_CONFIG` (default
//! `simulator.toml`); `fxswap-simulator init [path]` writes the default
//! scenario.

mod config;
mod scenario;

use anyhow::{bail, Context, Result};
use config::Config;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("init") {
        let path = args.get(1).map(String::as_str).unwrap_or("simulator.toml");
        return Config::write_default(path);
    }

    log::info!("Starting fxswap simulator");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default scenario", e);
        Config::default_scenario()
    });

    log::info!(
        "Scenario: {} accounts, {} tokens, {} steps",
        config.accounts.len(),
        config.tokens.len(),
        config.steps.len()
    );

    let summary = scenario::run(&config)?;
    let report = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    log::info!("Summary:\n{}", report);

    if !summary.violations.is_empty() {
        bail!("ledger invariants violated: {}", summary.violations.join("; "));
    }
    Ok(())
}
