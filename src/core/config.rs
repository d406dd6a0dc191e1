use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FinnhubProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    /// Yahoo chart endpoint, usually reached through a CORS or caching proxy.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub finnhub: Option<FinnhubProviderConfig>,
    pub yahoo: Option<YahooProviderConfig>,
    pub coingecko: Option<CoinGeckoProviderConfig>,
    pub exchange_rates: Option<ExchangeRateProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            finnhub: Some(FinnhubProviderConfig {
                base_url: "https://finnhub.io".to_string(),
                api_key: None,
            }),
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
            coingecko: Some(CoinGeckoProviderConfig {
                base_url: "https://api.coingecko.com".to_string(),
            }),
            exchange_rates: Some(ExchangeRateProviderConfig {
                base_url: "https://open.er-api.com".to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn finnhub_base_url(&self) -> &str {
        self.finnhub
            .as_ref()
            .map_or("https://finnhub.io", |p| &p.base_url)
    }

    pub fn finnhub_api_key(&self) -> Option<&str> {
        self.finnhub
            .as_ref()
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url)
    }

    pub fn coingecko_base_url(&self) -> &str {
        self.coingecko
            .as_ref()
            .map_or("https://api.coingecko.com", |p| &p.base_url)
    }

    pub fn exchange_rates_base_url(&self) -> &str {
        self.exchange_rates
            .as_ref()
            .map_or("https://open.er-api.com", |p| &p.base_url)
    }
}

/// Hosted relational backend speaking the PostgREST table dialect.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_crypto_cache_ttl_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub backend: Option<BackendConfig>,
    /// Emails allowed to sign in. Empty means nobody may sign in.
    #[serde(default)]
    pub allowed_emails: Vec<String>,
    pub data_path: Option<String>,
    #[serde(default = "default_crypto_cache_ttl_secs")]
    pub crypto_cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            providers: ProvidersConfig::default(),
            backend: None,
            allowed_emails: Vec::new(),
            data_path: None,
            crypto_cache_ttl_secs: default_crypto_cache_ttl_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "finboard", "finboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "finboard", "finboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn crypto_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.crypto_cache_ttl_secs)
    }

    pub fn is_email_allowed(&self, email: &str) -> bool {
        let email = email.trim();
        self.allowed_emails
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(email))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
