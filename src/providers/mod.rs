pub mod backend;
pub mod coingecko;
pub mod exchange_rates;
pub mod fallback;
pub mod finnhub;
pub mod yahoo_finance;

// Re-export caches for providers to easily use
pub use crate::core::cache::Cache;
pub use crate::store::disk::DiskCache;
pub use crate::store::memory::MemoryCache;

pub(crate) fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("finboard/", env!("CARGO_PKG_VERSION")))
        .build()
}
