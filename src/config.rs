use derive_more::Display;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Display)]
pub enum ConfigError {
    #[display(fmt = "{} has an invalid value: {}", key, value)]
    Invalid { key: &'static str, value: String },
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    /// Present => Postgres backend, absent => in-memory backend.
    pub database_url: Option<String>,
    pub log_dir: String,
    pub log_level: tracing::Level,

    // Year used for the monthly income breakdown, defaults to the current one
    pub report_year: Option<i32>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level = match lookup("LOG_LEVEL") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "LOG_LEVEL",
                value,
            })?,
            None => tracing::Level::DEBUG,
        };

        let report_year = match lookup("REPORT_YEAR") {
            Some(value) => Some(value.parse().map_err(|_| ConfigError::Invalid {
                key: "REPORT_YEAR",
                value,
            })?),
            None => None,
        };

        Ok(Self {
            database_url,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level,
            report_year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_database_url() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert!(config.report_year.is_none());
    }

    #[test]
    fn blank_database_url_counts_as_absent() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn reads_all_keys() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/opsdash"),
            ("LOG_DIR", "/var/log/opsdash"),
            ("LOG_LEVEL", "warn"),
            ("REPORT_YEAR", "2024"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/opsdash")
        );
        assert_eq!(config.log_dir, "/var/log/opsdash");
        assert_eq!(config.log_level, tracing::Level::WARN);
        assert_eq!(config.report_year, Some(2024));
    }

    #[test]
    fn rejects_bad_report_year() {
        let err = Config::from_lookup(lookup_from(&[("REPORT_YEAR", "last")])).unwrap_err();
        assert_eq!(err.to_string(), "REPORT_YEAR has an invalid value: last");
    }
}
