//! Configuration for the analytics engine.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AnalyticsError, Result};

/// Environment variable enabling or disabling the report cache
pub const ENV_CACHE_ENABLED: &str = "PUROK_CACHE_ENABLED";
/// Environment variable holding the cache TTL in seconds
pub const ENV_CACHE_TTL_SECS: &str = "PUROK_CACHE_TTL_SECS";
/// Environment variable holding the maximum number of cached reports
pub const ENV_CACHE_MAX_ENTRIES: &str = "PUROK_CACHE_MAX_ENTRIES";
/// Environment variable holding the vulnerable trend window
pub const ENV_VULNERABLE_TREND_MONTHS: &str = "PUROK_VULNERABLE_TREND_MONTHS";
/// Environment variable holding the registration trend window
pub const ENV_REGISTRATION_TREND_MONTHS: &str = "PUROK_REGISTRATION_TREND_MONTHS";

/// Report cache settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether reports are cached at all
    pub enabled: bool,
    /// How long a cached report stays valid
    pub ttl: Duration,
    /// Upper bound on cached reports; the oldest entry is evicted first
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300),
            max_entries: 1024,
        }
    }
}

/// Configuration for the analytics engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Report cache settings
    pub cache: CacheConfig,
    /// Default window for the vulnerable-population trend
    pub vulnerable_trend_months: u32,
    /// Default window for the registration trend
    pub registration_trend_months: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            vulnerable_trend_months: 6,
            registration_trend_months: 12,
        }
    }
}

impl AnalyticsConfig {
    /// Defaults overridden by `PUROK_*` environment variables
    ///
    /// # Errors
    /// Returns `Config` if a variable is set to a value that does not parse,
    /// or a trend window is zero.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by values from an arbitrary lookup
    ///
    /// # Errors
    /// Same as [`AnalyticsConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(enabled) = parse_flag(&lookup, ENV_CACHE_ENABLED)? {
            config.cache.enabled = enabled;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_CACHE_TTL_SECS)? {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var::<usize, _>(&lookup, ENV_CACHE_MAX_ENTRIES)? {
            config.cache.max_entries = max;
        }
        if let Some(months) = parse_var::<u32, _>(&lookup, ENV_VULNERABLE_TREND_MONTHS)? {
            config.vulnerable_trend_months = months;
        }
        if let Some(months) = parse_var::<u32, _>(&lookup, ENV_REGISTRATION_TREND_MONTHS)? {
            config.registration_trend_months = months;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that trend windows are non-zero
    ///
    /// # Errors
    /// Returns `Config` naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.vulnerable_trend_months == 0 {
            return Err(AnalyticsError::Config(
                "vulnerable trend window must be at least 1 month".to_string(),
            ));
        }
        if self.registration_trend_months == 0 {
            return Err(AnalyticsError::Config(
                "registration trend window must be at least 1 month".to_string(),
            ));
        }
        Ok(())
    }
}

fn raw_var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    raw_var(lookup, name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| AnalyticsError::Config(format!("{name} has invalid value '{raw}'")))
        })
        .transpose()
}

fn parse_flag<F>(lookup: &F, name: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    raw_var(lookup, name)
        .map(|raw| match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AnalyticsError::Config(format!(
                "{name} has invalid value '{raw}'"
            ))),
        })
        .transpose()
}

impl fmt::Display for AnalyticsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analytics Configuration:")?;
        writeln!(f, "  Cache enabled: {}", self.cache.enabled)?;
        writeln!(f, "  Cache TTL: {}s", self.cache.ttl.as_secs())?;
        writeln!(f, "  Cache max entries: {}", self.cache.max_entries)?;
        writeln!(
            f,
            "  Vulnerable trend window: {} months",
            self.vulnerable_trend_months
        )?;
        write!(
            f,
            "  Registration trend window: {} months",
            self.registration_trend_months
        )
    }
}
