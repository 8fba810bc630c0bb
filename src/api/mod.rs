pub mod rates_client;

pub use rates_client::{RateFetcher, RatesClient};

#[cfg(test)]
pub use rates_client::MockRateFetcher;
