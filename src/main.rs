// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod api;
mod config;
mod console;
mod controller;
mod error;
mod models;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api::{RateFetcher, RatesClient};
use crate::config::{resolve_currency, save_config, Config, Overrides};
use crate::console::ConsoleSurface;
use crate::controller::{Applied, Controller, Selection, Trigger};
use crate::models::{display_name, export_exchange_rates_csv, list_currencies, option_label, OTHERS_LABEL, POPULAR_LABEL};

#[derive(Parser, Debug)]
#[command(name = "fx-convert", version, about = "Convert amounts between currencies using live exchange rates")]
struct Cli {
    /// Config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rate API root, e.g. https://open.er-api.com/v6
    #[arg(long, global = true)]
    api_root: Option<String>,

    /// Write logs to this file (the interactive UI logs nowhere otherwise)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive converter (default)
    Tui {
        /// Initial source currency
        #[arg(long)]
        from: Option<String>,
        /// Initial target currency
        #[arg(long)]
        to: Option<String>,
    },
    /// Convert once and print the result
    Convert {
        amount: String,
        from: String,
        to: String,
        /// Also print the flag indicators
        #[arg(long)]
        flags: bool,
    },
    /// List selectable currencies, popular first
    Currencies,
    /// Show the latest rate table for a base currency
    Rates {
        base: String,
        /// Write the table to CSV (a directory gets a timestamped file)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Write the effective configuration to a TOML file
    InitConfig {
        #[arg(default_value = "config.toml")]
        path: PathBuf,
    },
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,fx_convert=info"))
}

fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<()> {

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(log_filter())
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(log_filter())
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui { from: None, to: None });

    init_logging(cli.log_file.as_deref(), matches!(command, Command::Tui { .. }))?;

    let mut overrides = Overrides {
        api_root: cli.api_root,
        ..Overrides::default()
    };
    if let Command::Tui { from, to } = &command {
        overrides.from = from.clone();
        overrides.to = to.clone();
    }
    let config = Config::load(cli.config.as_deref(), &overrides)?;
    tracing::debug!(?config, "configuration loaded");

    match command {
        Command::Tui { .. } => run_tui(&config).await?,
        Command::Convert { amount, from, to, flags } => convert_once(&config, &amount, &from, &to, flags).await?,
        Command::Currencies => print_currencies(),
        Command::Rates { base, csv } => show_rates(&config, &base, csv.as_deref()).await?,
        Command::InitConfig { path } => {
            save_config(&config, &path)?;
            println!("✅ Configuration written to {}", path.display());
        }
    }

    Ok(())
}

async fn run_tui(config: &Config) -> Result<()> {
    let selection = Selection::new(config.from_currency()?, config.to_currency()?, &config.default_amount);
    let fetcher = Arc::new(RatesClient::new(&config.api_root));
    let controller = Controller::new(fetcher, selection, &config.flag_provider);
    tui::start_tui(controller).await
}

async fn convert_once(config: &Config, amount: &str, from: &str, to: &str, flags: bool) -> Result<()> {
    let selection = Selection::new(resolve_currency(from)?, resolve_currency(to)?, amount);
    let fetcher = Arc::new(RatesClient::new(&config.api_root));
    let mut controller = Controller::new(fetcher, selection, &config.flag_provider);
    let mut surface = ConsoleSurface::new(flags);

    let pending = if flags {
        controller.start(&mut surface)
    } else {
        controller.handle(Trigger::Submit, &mut surface)
    };
    let completion = pending.await;

    match controller.complete(completion, &mut surface) {
        Applied::Failed => anyhow::bail!("conversion failed"),
        Applied::Displayed | Applied::Stale => Ok(()),
    }
}

fn print_currencies() {
    let groups = list_currencies();
    println!("{}:", POPULAR_LABEL);
    for entry in &groups.popular {
        println!("  {}", option_label(entry));
    }
    println!("\n{}:", OTHERS_LABEL);
    for entry in &groups.others {
        println!("  {}", option_label(entry));
    }
}

async fn show_rates(config: &Config, base: &str, csv: Option<&Path>) -> Result<()> {
    let base = resolve_currency(base)?;
    let client = RatesClient::new(&config.api_root);

    println!("Fetching latest {} rates...", base.code);
    let table = client
        .fetch_rates(base.code)
        .await
        .with_context(|| format!("Failed to fetch exchange rates for {}", base.code))?;

    for (code, rate) in table.sorted() {
        println!("  {:<4} {:>18.6}  {}", code, rate, display_name(code));
    }
    if let Some(updated) = &table.provider_updated {
        println!("Rates as of {}", updated);
    }

    if let Some(path) = csv {
        let written = export_exchange_rates_csv(&table, path)?;
        println!("✅ Exchange rates written to {}", written.display());
    }
    Ok(())
}
