// Re-export model modules
mod conversion;
mod currencies;
mod exchange_rates;

pub use conversion::*;
pub use currencies::*;
pub use exchange_rates::*;
