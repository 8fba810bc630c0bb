// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::ConvertError;
use crate::models::RateTable;
use reqwest::Client;

/// Source of the latest rates for a base currency.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, ConvertError>;
}

/// Client for `<api_root>/latest/<base>` style rate APIs.
#[derive(Clone)]
pub struct RatesClient {
    client: Client,
    api_root: String,
}

impl RatesClient {
    pub fn new(api_root: &str) -> Self {
        Self {
            client: Client::new(),
            api_root: api_root.trim_end_matches('/').to_string(),
        }
    }

    pub fn latest_url(&self, base: &str) -> String {
        format!("{}/latest/{}", self.api_root, base)
    }
}

#[async_trait::async_trait]
impl RateFetcher for RatesClient {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, ConvertError> {
        let url = self.latest_url(base);
        tracing::debug!(%url, "requesting latest rates");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ConvertError::Network(format!(
                "rate API returned {} for {}",
                status, base
            )));
        }

        RateTable::from_body(base, &text)
    }
}
