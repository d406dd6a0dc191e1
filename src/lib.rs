pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::projection::{CompoundParams, FireParams, MonteCarloParams};
use crate::core::{Records, Repository, Table};
use crate::providers::backend::RestBackend;
use crate::providers::coingecko::CoinGeckoProvider;
use crate::providers::exchange_rates::ExchangeRatesProvider;
use crate::providers::fallback::FallbackPriceProvider;
use crate::providers::finnhub::FinnhubProvider;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use crate::providers::{DiskCache, MemoryCache};
use crate::store::Storage;
use crate::store::local::LocalStore;
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Calculators need neither config nor storage.
pub enum CalcCommand {
    Compound(CompoundParams),
    MonteCarlo {
        params: MonteCarloParams,
        seed: Option<u64>,
    },
    Inflation {
        amount: f64,
        inflation: f64,
        years: u32,
    },
    Fire(FireParams),
}

impl CalcCommand {
    pub fn render(&self) -> String {
        match self {
            CalcCommand::Compound(params) => cli::calc::compound(params),
            CalcCommand::MonteCarlo { params, seed } => cli::calc::monte_carlo(params, *seed),
            CalcCommand::Inflation {
                amount,
                inflation,
                years,
            } => cli::calc::inflation(*amount, *inflation, *years),
            CalcCommand::Fire(params) => cli::calc::fire(params),
        }
    }
}

pub enum AppCommand {
    Login {
        email: String,
        password: Option<String>,
    },
    Logout,
    Summary {
        snapshot: bool,
    },
    CashFlow {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    Allocation,
    Refresh,
    List {
        table: Table,
    },
    Add {
        table: Table,
        json: String,
    },
    Delete {
        table: Table,
        id: String,
    },
    SearchCoin {
        query: String,
    },
}

type StockPriceProvider = FallbackPriceProvider<FinnhubProvider, YahooFinanceProvider>;

/// Stores and providers wired from the config.
struct Services {
    local: LocalStore,
    backend: Option<RestBackend>,
    prices: StockPriceProvider,
    crypto: CoinGeckoProvider,
    rates: ExchangeRatesProvider,
}

impl Services {
    fn new(config: &AppConfig) -> Result<Self> {
        let storage = Storage::open_for_config(config)?;
        let local = LocalStore::new(storage.clone());

        let backend = match (local.load_session()?, &config.backend) {
            (Some(session), Some(_)) => {
                info!("Using hosted backend as {}", session.email);
                Some(RestBackend::new(config, session)?)
            }
            (Some(_), None) => {
                warn!("Stored session ignored: no backend configured, using local store");
                None
            }
            (None, _) => None,
        };

        let providers = &config.providers;
        let prices = FallbackPriceProvider::new(
            FinnhubProvider::new(
                providers.finnhub_base_url(),
                providers.finnhub_api_key(),
                MemoryCache::new(),
            ),
            YahooFinanceProvider::new(providers.yahoo_base_url(), MemoryCache::new()),
        );
        let crypto = CoinGeckoProvider::new(
            providers.coingecko_base_url(),
            Arc::new(DiskCache::new(storage.partition("crypto_prices")?)),
            config.crypto_cache_ttl(),
        );
        let rates = ExchangeRatesProvider::new(
            providers.exchange_rates_base_url(),
            MemoryCache::new(),
            Arc::new(DiskCache::new(storage.partition("exchange_rates")?)),
        );

        Ok(Services {
            local,
            backend,
            prices,
            crypto,
            rates,
        })
    }

    fn repository(&self) -> &dyn Repository {
        match &self.backend {
            Some(backend) => backend,
            None => &self.local,
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let services = Services::new(&config)?;
    let records = Records::new(services.repository());
    let base_currency = config.base_currency.as_str();
    let today = chrono::Local::now().date_naive();

    match command {
        AppCommand::Login { email, password } => {
            cli::auth::login(&config, &services.local, &email, password).await
        }
        AppCommand::Logout => cli::auth::logout(&services.local),
        AppCommand::Summary { snapshot } => {
            cli::summary::run(records, &services.rates, base_currency, snapshot, today).await
        }
        AppCommand::CashFlow { from, to } => {
            cli::cashflow::run(records, &services.rates, base_currency, from, to).await
        }
        AppCommand::Allocation => {
            cli::allocation::run(records, &services.rates, base_currency).await
        }
        AppCommand::Refresh => cli::refresh::run(
            records,
            &services.prices,
            &services.crypto,
            &services.rates,
            base_currency,
        )
        .await
        .map(|_| ()),
        AppCommand::List { table } => {
            println!("{}", cli::records::list(records, table).await?);
            Ok(())
        }
        AppCommand::Add { table, json } => {
            let stored = cli::records::add(records, table, &json).await?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
            Ok(())
        }
        AppCommand::Delete { table, id } => {
            cli::records::delete(records, table, &id).await?;
            println!("Deleted {table}/{id}");
            Ok(())
        }
        AppCommand::SearchCoin { query } => cli::coins::search(&services.crypto, &query).await,
    }
}
