//! Database connection and startup gate configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hello_core::error::{parsed_var, required_var, ConfigError};
use sqlx::mysql::MySqlConnectOptions;

/// Connection descriptor for the record store.
///
/// `Debug` output redacts the password.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Database host (default: `db`).
    pub host: String,
    /// Database port (default: `3306`).
    pub port: u16,
    /// Database/schema name, from `DB_DATABASE`.
    pub database: String,
    /// Login user, from `DB_USER`.
    pub username: String,
    /// Contents of the file named by `DB_PASSWORD_FILE`.
    pub password: String,
    /// Pool size (default: `10`).
    pub max_connections: u32,
    /// How long a checkout may wait for a connection (default: `5s`).
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Load the descriptor from the process environment.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `DB_DATABASE`             | required |
    /// | `DB_USER`                 | required |
    /// | `DB_PASSWORD_FILE`        | required |
    /// | `DB_HOST`                 | `db`    |
    /// | `DB_PORT`                 | `3306`  |
    /// | `DB_MAX_CONNECTIONS`      | `10`    |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the descriptor through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database = required_var(&lookup, "DB_DATABASE")?;
        let username = required_var(&lookup, "DB_USER")?;
        let password_path = PathBuf::from(required_var(&lookup, "DB_PASSWORD_FILE")?);

        let host = lookup("DB_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| "db".into());
        let port = parsed_var(&lookup, "DB_PORT", 3306u16)?;
        let max_connections = parsed_var(&lookup, "DB_MAX_CONNECTIONS", 10u32)?;
        let acquire_timeout_secs = parsed_var(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5u64)?;

        let password = read_password_file(&password_path)?;

        Ok(Self {
            host,
            port,
            database,
            username,
            password,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }

    /// sqlx connect options for this descriptor.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

/// Read the database password from `path`.
///
/// The whole file is the password, trailing whitespace included.
pub fn read_password_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::PasswordFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Retry policy for [`crate::startup::wait_for_database`].
#[derive(Debug, Clone)]
pub struct StartupGateConfig {
    /// Give up once this much time has passed since the first probe.
    pub timeout: Duration,
    /// Delay after the first failed probe.
    pub initial_delay: Duration,
    /// Upper bound on the delay between probes.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for StartupGateConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl StartupGateConfig {
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `DB_STARTUP_TIMEOUT_SECS` | `60`    |
    /// | `DB_STARTUP_INTERVAL_MS`  | `1000`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_secs =
            parsed_var(&lookup, "DB_STARTUP_TIMEOUT_SECS", defaults.timeout.as_secs())?;
        let interval_ms = parsed_var(&lookup, "DB_STARTUP_INTERVAL_MS", 1000u64)?;

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            initial_delay: Duration::from_millis(interval_ms),
            // Never cap below the configured starting interval.
            max_delay: defaults.max_delay.max(Duration::from_millis(interval_ms)),
            ..defaults
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use assert_matches::assert_matches;

    use super::*;

    fn password_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn env_with(
        password_path: &Path,
        extra: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> {
        let mut map: HashMap<String, String> = HashMap::new();
        map.insert("DB_DATABASE".into(), "app".into());
        map.insert("DB_USER".into(), "app".into());
        map.insert(
            "DB_PASSWORD_FILE".into(),
            password_path.to_string_lossy().into_owned(),
        );
        for (k, v) in extra {
            map.insert(k.to_string(), v.to_string());
        }
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_descriptor_with_defaults() {
        let file = password_file("s3cret");
        let config = DatabaseConfig::from_lookup(env_with(file.path(), &[])).unwrap();

        assert_eq!(config.host, "db");
        assert_eq!(config.port, 3306);
        assert_eq!(config.database, "app");
        assert_eq!(config.username, "app");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn host_and_port_overrides() {
        let file = password_file("s3cret");
        let lookup = env_with(file.path(), &[("DB_HOST", "127.0.0.1"), ("DB_PORT", "3307")]);
        let config = DatabaseConfig::from_lookup(lookup).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3307);
    }

    #[test]
    fn missing_password_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = DatabaseConfig::from_lookup(env_with(&missing, &[])).unwrap_err();
        assert_matches!(err, ConfigError::PasswordFile { ref path, .. } if path == &missing);
    }

    #[test]
    fn missing_required_variable() {
        let err = DatabaseConfig::from_lookup(|_| None).unwrap_err();
        assert_matches!(err, ConfigError::MissingVar("DB_DATABASE"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let file = password_file("s3cret");
        let lookup = env_with(file.path(), &[("DB_PORT", "99999")]);
        let err = DatabaseConfig::from_lookup(lookup).unwrap_err();
        assert_matches!(err, ConfigError::InvalidVar { name: "DB_PORT", .. });
    }

    #[test]
    fn password_file_contents_are_kept_verbatim() {
        assert_eq!(read_password_file(password_file("s3cret\n").path()).unwrap(), "s3cret\n");
        assert_eq!(read_password_file(password_file("s3cret\r\n").path()).unwrap(), "s3cret\r\n");
        assert_eq!(read_password_file(password_file(" s3cret ").path()).unwrap(), " s3cret ");
    }

    #[test]
    fn debug_output_redacts_password() {
        let file = password_file("s3cret");
        let config = DatabaseConfig::from_lookup(env_with(file.path(), &[])).unwrap();
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn gate_config_defaults() {
        let config = StartupGateConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(5));
    }

    #[test]
    fn gate_config_overrides() {
        let config = StartupGateConfig::from_lookup(|key| match key {
            "DB_STARTUP_TIMEOUT_SECS" => Some("120".into()),
            "DB_STARTUP_INTERVAL_MS" => Some("250".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.initial_delay, Duration::from_millis(250));
        assert_eq!(config.max_delay, Duration::from_secs(5));
    }
}
