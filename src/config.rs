use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants;
use crate::domain::BoroughGeography;
use crate::error::{FeedError, Result};
use crate::pipeline::ingestion::source::SourceDescriptor;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Overrides the built-in borough geography table when present.
    #[serde(default)]
    pub boroughs: Option<BoroughTableConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedsConfig {
    #[serde(default = "default_states_url")]
    pub us_states_url: String,
    #[serde(default = "default_counties_url")]
    pub us_counties_url: String,
    #[serde(default = "default_boroughs_url")]
    pub nyc_boroughs_url: String,
    /// Boundary polygons for the rendering layer; passed through untouched.
    #[serde(default = "default_boundaries_url")]
    pub county_boundaries_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Zero disables caching.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoroughTableConfig {
    pub version: String,
    /// Borough name or code -> geography id.
    pub fips: BTreeMap<String, String>,
}

fn default_states_url() -> String {
    constants::US_STATES_URL.to_string()
}

fn default_counties_url() -> String {
    constants::US_COUNTIES_URL.to_string()
}

fn default_boroughs_url() -> String {
    constants::NYC_BOROUGHS_URL.to_string()
}

fn default_boundaries_url() -> String {
    constants::COUNTY_BOUNDARIES_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

fn default_cache_ttl_seconds() -> u64 {
    constants::DEFAULT_CACHE_TTL_SECS
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            us_states_url: default_states_url(),
            us_counties_url: default_counties_url(),
            nyc_boroughs_url: default_boroughs_url(),
            county_boundaries_url: default_boundaries_url(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path)?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.fetch.timeout_seconds == 0 {
            return Err(FeedError::Configuration(
                "fetch.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        for (name, url) in [
            ("feeds.us_states_url", &self.feeds.us_states_url),
            ("feeds.us_counties_url", &self.feeds.us_counties_url),
            ("feeds.nyc_boroughs_url", &self.feeds.nyc_boroughs_url),
        ] {
            if url.trim().is_empty() {
                return Err(FeedError::Configuration(format!("{} must not be empty", name)));
            }
        }
        // Surface a bad borough table at load time rather than first use.
        self.geography()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_seconds)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.fetch.cache_ttl_seconds)
    }

    pub fn geography(&self) -> Result<BoroughGeography> {
        match &self.boroughs {
            Some(table) => BoroughGeography::from_entries(&table.version, table.fips.clone()),
            None => Ok(BoroughGeography::nyc_default()),
        }
    }

    pub fn states_source(&self) -> SourceDescriptor {
        SourceDescriptor::us_states(&self.feeds.us_states_url)
    }

    pub fn counties_source(&self) -> SourceDescriptor {
        SourceDescriptor::us_counties(&self.feeds.us_counties_url)
    }

    pub fn boroughs_source(&self) -> SourceDescriptor {
        SourceDescriptor::nyc_boroughs(&self.feeds.nyc_boroughs_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.feeds.us_states_url, constants::US_STATES_URL);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(
            config.geography().unwrap().version(),
            constants::DEFAULT_BOROUGH_TABLE_VERSION
        );
    }

    #[test]
    fn loads_overrides_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[feeds]
us_states_url = "http://localhost/states.csv"

[fetch]
cache_ttl_seconds = 0
timeout_seconds = 5

[boroughs]
version = "test-v2"

[boroughs.fips]
Bronx = "1"
Brooklyn = "2"
Manhattan = "3"
Queens = "4"
"Staten Island" = "5"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.states_source().url, "http://localhost/states.csv");
        assert_eq!(config.counties_source().url, constants::US_COUNTIES_URL);
        assert_eq!(config.cache_ttl(), Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.geography().unwrap().version(), "test-v2");
    }

    #[test]
    fn incomplete_borough_table_fails_at_load() {
        let err = Config::from_toml_str(
            r#"
[boroughs]
version = "broken"
[boroughs.fips]
Bronx = "36005"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, FeedError::Configuration(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_toml_str("[fetch]\ntimeout_seconds = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/covid_feeds.toml")).unwrap_err();
        assert!(matches!(err, FeedError::Io(_)));
        assert_eq!(err.kind(), "io");
    }
}
