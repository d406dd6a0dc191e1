//! Core business logic abstractions

pub mod analytics;
pub mod auth;
pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod models;
pub mod price;
pub mod projection;
pub mod records;
pub mod refresh;

// Re-export main types for cleaner imports
pub use currency::{ExchangeRateProvider, RateTable};
pub use price::{CryptoPriceProvider, PriceProvider, PriceResult};
pub use records::{Records, Repository, Table};
