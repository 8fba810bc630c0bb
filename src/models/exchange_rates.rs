// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use super::currencies::display_name;
use crate::error::ConvertError;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use csv::Writer;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Latest rates for one base currency, as returned by a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Local>,
    /// Provider-side "last updated" stamp, when the response carries one.
    pub provider_updated: Option<String>,
}

impl RateTable {
    #[cfg(test)]
    pub fn new(base: &str, rates: HashMap<String, f64>) -> Self {
        Self {
            base: base.to_string(),
            rates,
            fetched_at: Local::now(),
            provider_updated: None,
        }
    }

    /// Rate for `target`. Zero, negative and non-finite rates count as absent.
    pub fn rate(&self, target: &str) -> Option<f64> {
        self.rates
            .get(target)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }

    /// Parse a `/latest/<base>` response body.
    ///
    /// Non-JSON bodies are transport failures; JSON without a `rates` object
    /// of numbers is an invalid response.
    pub fn from_body(base: &str, body: &str) -> Result<Self, ConvertError> {
        let json: Value = serde_json::from_str(body)
            .map_err(|e| ConvertError::Network(format!("response is not JSON: {}", e)))?;

        let rates = json
            .get("rates")
            .ok_or_else(|| ConvertError::InvalidResponse("missing `rates`".to_string()))?
            .as_object()
            .ok_or_else(|| ConvertError::InvalidResponse("`rates` is not an object".to_string()))?;

        let mut table = HashMap::with_capacity(rates.len());
        for (code, value) in rates {
            let rate = value.as_f64().ok_or_else(|| {
                ConvertError::InvalidResponse(format!("rate for {} is not a number", code))
            })?;
            table.insert(code.clone(), rate);
        }

        let provider_updated = json
            .get("time_last_update_utc")
            .or_else(|| json.get("date"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            base: base.to_string(),
            rates: table,
            fetched_at: Local::now(),
            provider_updated,
        })
    }

    /// Rates sorted by currency code.
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut rows: Vec<_> = self.rates.iter().map(|(c, r)| (c.as_str(), *r)).collect();
        rows.sort_by(|a, b| a.0.cmp(b.0));
        rows
    }
}

/// Resolve where a CSV snapshot goes: a directory gets a timestamped file.
pub fn csv_destination(path: &Path, table: &RateTable) -> PathBuf {
    if path.is_dir() {
        let timestamp = table.fetched_at.format("%Y%m%d_%H%M%S");
        path.join(format!("exchange_rates_{}_{}.csv", table.base, timestamp))
    } else {
        path.to_path_buf()
    }
}

/// Export one rate table to CSV
pub fn export_exchange_rates_csv(table: &RateTable, path: &Path) -> Result<PathBuf> {
    let filename = csv_destination(path, table);
    if let Some(parent) = filename.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let file = fs::File::create(&filename)
        .with_context(|| format!("Failed to create {}", filename.display()))?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["Base", "Code", "Name", "Rate", "Fetched At"])?;

    let fetched_at = table.fetched_at.to_rfc3339();
    for (code, rate) in table.sorted() {
        writer.write_record([
            table.base.as_str(),
            code,
            display_name(code),
            rate.to_string().as_str(),
            fetched_at.as_str(),
        ])?;
    }
    writer.flush()?;

    Ok(filename)
}
