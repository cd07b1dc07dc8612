use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cost_sync::{DuplicateSkuPolicy, PacingMode, PagePacing, RecordColumns, RetryPolicy, RunOptions};
use cost_sync_shopify::{DEFAULT_API_VERSION, ShopifyConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const SHOP_ENV: &str = "SHOPIFY_SHOP";
pub const TOKEN_ENV: &str = "SHOPIFY_ACCESS_TOKEN";

/// Update spacing used for parallel dispatch when none is configured. Matches
/// the Admin REST leak rate of two calls per second.
pub const PARALLEL_UPDATE_INTERVAL_MS: u64 = 500;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub shop: ShopSection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub columns: RecordColumns,
}

/// Which store to talk to and how to authenticate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopSection {
    pub name: Option<String>,
    pub access_token: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub api_base_url: Option<String>,
}

impl Default for ShopSection {
    fn default() -> Self {
        Self {
            name: None,
            access_token: None,
            api_version: default_api_version(),
            api_base_url: None,
        }
    }
}

/// Pacing, concurrency and retry knobs for a run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSection {
    pub page_size: u32,
    pub page_delay_ms: u64,
    pub pacing: PacingMode,
    pub concurrency: usize,
    pub update_interval_ms: u64,
    pub duplicate_policy: DuplicateSkuPolicy,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            page_size: 250,
            page_delay_ms: 500,
            pacing: PacingMode::Fixed,
            concurrency: 1,
            update_interval_ms: 0,
            duplicate_policy: DuplicateSkuPolicy::FirstSeen,
            max_retries: 0,
            retry_base_delay_ms: 1000,
        }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.into()
}

impl AppConfig {
    /// Replaces the shop name and token with values from the environment
    /// when `lookup` provides them.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(shop) = lookup(SHOP_ENV).filter(|v| !v.trim().is_empty()) {
            self.shop.name = Some(shop);
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.shop.access_token = Some(token);
        }
        self
    }

    /// Connection details, or an error naming whatever is missing.
    pub fn shopify(&self) -> Result<ShopifyConfig> {
        let shop = self
            .shop
            .name
            .as_deref()
            .context(format!("no shop configured; set [shop] name or {SHOP_ENV}"))?;
        let token = self
            .shop
            .access_token
            .as_deref()
            .context(format!(
                "no access token configured; set [shop] access_token or {TOKEN_ENV}"
            ))?;

        let mut config = ShopifyConfig::new(shop, token).with_api_version(&self.shop.api_version);
        if let Some(url) = &self.shop.api_base_url {
            config = config.with_api_base_url(url);
        }
        Ok(config)
    }
}

impl SyncSection {
    pub fn run_options(&self) -> RunOptions {
        let concurrency = self.concurrency.max(1);
        RunOptions {
            page_size: self.page_size,
            duplicate_policy: self.duplicate_policy,
            concurrency,
            update_interval: Duration::from_millis(self.update_interval_ms(concurrency)),
            ..RunOptions::default()
        }
    }

    /// Parallel updates without any spacing would burst past the store's
    /// rate limit, so they fall back to [`PARALLEL_UPDATE_INTERVAL_MS`].
    fn update_interval_ms(&self, concurrency: usize) -> u64 {
        if concurrency > 1 && self.update_interval_ms == 0 {
            warn!(
                concurrency,
                interval_ms = PARALLEL_UPDATE_INTERVAL_MS,
                "no update_interval_ms set for parallel updates; using default spacing"
            );
            PARALLEL_UPDATE_INTERVAL_MS
        } else {
            self.update_interval_ms
        }
    }

    pub fn pacing(&self) -> std::sync::Arc<dyn PagePacing> {
        self.pacing.build(Duration::from_millis(self.page_delay_ms))
    }

    /// `None` when retries are switched off.
    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        (self.max_retries > 0).then(|| {
            RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.retry_base_delay_ms),
            )
        })
    }
}

/// Config file path: `~/.config/cost-sync/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cost-sync").join("config.toml"))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).context("invalid configuration")
}

/// Loads `explicit` if given, otherwise the default config file.
///
/// A missing default file yields defaults; an explicit path that cannot be
/// read, or any file that fails to parse, is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let config = match explicit {
        Some(path) => read_config(path)?,
        None => match config_path() {
            Some(path) if path.exists() => read_config(&path)?,
            _ => AppConfig::default(),
        },
    };

    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}

fn read_config(path: &Path) -> Result<AppConfig> {
    debug!(path = %path.display(), "loading config");
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("in {}", path.display()))
}
