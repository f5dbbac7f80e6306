//! Runtime configuration loaded from the process environment.

use crate::project::adapters::postgres::ProjectPgPool;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::fmt;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_ENV: &str = "EXAMINER_DATABASE_URL";
/// Environment variable holding the maximum pool size.
pub const POOL_SIZE_ENV: &str = "EXAMINER_DB_POOL_SIZE";
/// Environment variable holding the tracing filter directive.
pub const LOG_FILTER_ENV: &str = "EXAMINER_LOG";
/// Environment variable selecting `plain` or `json` log output.
pub const LOG_FORMAT_ENV: &str = "EXAMINER_LOG_FORMAT";

const DEFAULT_POOL_MAX_SIZE: u32 = 8;
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while loading configuration or building resources from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The connection pool could not be created.
    #[error("failed to build database pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line records.
    #[default]
    Plain,
    /// Newline-delimited JSON records.
    Json,
}

impl TryFrom<&str> for LogFormat {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported log format '{other}'")),
        }
    }
}

/// Examiner runtime configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ExaminerConfig {
    database_url: String,
    pool_max_size: u32,
    log_filter: String,
    log_format: LogFormat,
}

impl fmt::Debug for ExaminerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExaminerConfig")
            .field("database_url", &"***")
            .field("pool_max_size", &self.pool_max_size)
            .field("log_filter", &self.log_filter)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl ExaminerConfig {
    /// Creates a configuration with default pool and logging settings.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: LogFormat::default(),
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the database URL is missing or a
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the database URL is missing or a
    /// variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = read(DATABASE_URL_ENV).ok_or(ConfigError::Missing(DATABASE_URL_ENV))?;
        let mut config = Self::new(database_url);

        if let Some(raw) = read(POOL_SIZE_ENV) {
            config.pool_max_size = parse_pool_size(&raw)?;
        }
        if let Some(filter) = read(LOG_FILTER_ENV) {
            config.log_filter = filter;
        }
        if let Some(raw) = read(LOG_FORMAT_ENV) {
            config.log_format =
                LogFormat::try_from(raw.as_str()).map_err(|reason| ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: raw.clone(),
                    reason,
                })?;
        }
        Ok(config)
    }

    /// Overrides the maximum pool size.
    ///
    /// A size of zero is rejected by [`Self::build_pool`].
    #[must_use]
    pub const fn with_pool_max_size(mut self, pool_max_size: u32) -> Self {
        self.pool_max_size = pool_max_size;
        self
    }

    /// Overrides the tracing filter directive.
    #[must_use]
    pub fn with_log_filter(mut self, log_filter: impl Into<String>) -> Self {
        self.log_filter = log_filter.into();
        self
    }

    /// Overrides the log output format.
    #[must_use]
    pub const fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// Returns the `PostgreSQL` connection URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_max_size(&self) -> u32 {
        self.pool_max_size
    }

    /// Returns the tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Builds the connection pool shared by the `PostgreSQL` adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the pool size is zero, or
    /// [`ConfigError::Pool`] when no initial connection can be established.
    pub fn build_pool(&self) -> Result<ProjectPgPool, ConfigError> {
        ensure_pool_size(self.pool_max_size, &self.pool_max_size.to_string())?;
        let manager = ConnectionManager::<PgConnection>::new(self.database_url.as_str());
        Ok(Pool::builder()
            .max_size(self.pool_max_size)
            .build(manager)?)
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| invalid_pool_size(raw, err.to_string()))?;
    ensure_pool_size(size, raw)?;
    Ok(size)
}

/// r2d2 panics on a zero-sized pool.
fn ensure_pool_size(size: u32, raw: &str) -> Result<(), ConfigError> {
    if size == 0 {
        return Err(invalid_pool_size(raw, "pool size must be at least 1".to_owned()));
    }
    Ok(())
}

fn invalid_pool_size(raw: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        name: POOL_SIZE_ENV,
        value: raw.to_owned(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |name: &str| values.get(name).cloned()
    }

    #[rstest]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = ExaminerConfig::from_lookup(lookup_from(&[(
            DATABASE_URL_ENV,
            "postgres://localhost/examiner",
        )]))
        .expect("config should load");

        assert_eq!(config.database_url(), "postgres://localhost/examiner");
        assert_eq!(config.pool_max_size(), 8);
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.log_format(), LogFormat::Plain);
    }

    #[rstest]
    fn overrides_are_read_from_lookup() {
        let config = ExaminerConfig::from_lookup(lookup_from(&[
            (DATABASE_URL_ENV, "postgres://db/examiner"),
            (POOL_SIZE_ENV, " 16 "),
            (LOG_FILTER_ENV, "examiner=debug"),
            (LOG_FORMAT_ENV, "JSON"),
        ]))
        .expect("config should load");

        assert_eq!(config.pool_max_size(), 16);
        assert_eq!(config.log_filter(), "examiner=debug");
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[(DATABASE_URL_ENV, "   ")])]
    fn missing_database_url_is_rejected(#[case] pairs: &[(&str, &str)]) {
        let result = ExaminerConfig::from_lookup(lookup_from(pairs));

        assert!(matches!(result, Err(ConfigError::Missing(DATABASE_URL_ENV))));
    }

    #[rstest]
    #[case(POOL_SIZE_ENV, "zero")]
    #[case(POOL_SIZE_ENV, "0")]
    #[case(LOG_FORMAT_ENV, "xml")]
    fn malformed_values_are_rejected(#[case] name: &'static str, #[case] value: &str) {
        let result = ExaminerConfig::from_lookup(lookup_from(&[
            (DATABASE_URL_ENV, "postgres://db/examiner"),
            (name, value),
        ]));

        match result {
            Err(ConfigError::Invalid {
                name: rejected,
                value: raw,
                ..
            }) => {
                assert_eq!(rejected, name);
                assert_eq!(raw, value);
            }
            other => panic!("expected invalid value error, got {other:?}"),
        }
    }

    #[rstest]
    fn zero_pool_size_from_builder_is_rejected_before_connecting() {
        let config = ExaminerConfig::new("postgres://db/examiner").with_pool_max_size(0);

        let result = config.build_pool();

        match result {
            Err(ConfigError::Invalid { name, value, .. }) => {
                assert_eq!(name, POOL_SIZE_ENV);
                assert_eq!(value, "0");
            }
            Err(other) => panic!("expected invalid pool size, got {other:?}"),
            Ok(_) => panic!("expected invalid pool size, got a pool"),
        }
    }

    #[rstest]
    fn debug_output_hides_database_url() {
        let config = ExaminerConfig::new("postgres://admin:hunter2@db/examiner");

        let rendered = format!("{config:?}");

        assert!(!rendered.contains("hunter2"));
    }
}
