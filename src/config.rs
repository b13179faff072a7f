//! Connection configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Default user when none is configured.
pub const DEFAULT_USERNAME: &str = "system";
/// Default host when none is configured.
pub const DEFAULT_HOST: &str = "localhost";
/// Default listener port.
pub const DEFAULT_PORT: u16 = 1521;
/// Default time allowed for opening a session.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection parameters handed to the driver.
///
/// Loadable from TOML; every key is optional:
///
/// ```toml
/// username = "scott"
/// password = "tiger"
/// host = "db.internal"
/// port = 1521
/// service_name = "ORCLPDB1"
/// connect_timeout = 5
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Database user.
    pub username: String,
    /// Password.
    pub password: String,
    /// Host address, or a TNS alias when no service name is given.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Service name.
    pub service_name: Option<String>,
    /// Time allowed for opening the session, in seconds when deserialized.
    #[serde(deserialize_with = "deserialize_secs")]
    pub connect_timeout: Duration,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            service_name: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ConnectConfig {
    /// Create a configuration for `host` with default credentials.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Set the credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the service name.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    /// Set the connection timeout.
    ///
    /// ```
    /// use oracle_adapter::ConnectConfig;
    /// use std::time::Duration;
    ///
    /// let config = ConnectConfig::new("localhost")
    ///     .with_connect_timeout(Duration::from_secs(5));
    /// assert_eq!(config.connect_timeout, Duration::from_secs(5));
    /// ```
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Parse an easy-connect string: `[user[/password]@]host[:port][/service]`.
    pub fn parse(conn_str: &str) -> Result<Self> {
        let mut config = Self::default();

        let addr_part = match conn_str.rsplit_once('@') {
            Some((creds, addr)) => {
                let (user, password) = creds.split_once('/').unwrap_or((creds, ""));
                if user.is_empty() {
                    return Err(Error::InvalidConfig {
                        message: "Empty username before '@'".to_string(),
                    });
                }
                config.username = user.to_string();
                config.password = password.to_string();
                addr
            }
            None => conn_str,
        };

        let (host_port, service) = match addr_part.split_once('/') {
            Some((hp, service)) => (hp, Some(service)),
            None => (addr_part, None),
        };

        let host = if let Some((h, p)) = host_port.split_once(':') {
            config.port = p.parse::<u16>().map_err(|_| Error::InvalidConfig {
                message: format!("Invalid port: {}", p),
            })?;
            h
        } else {
            host_port
        };
        if !host.is_empty() {
            config.host = host.to_string();
        }

        match service {
            Some("") => {
                return Err(Error::InvalidConfig {
                    message: "Empty service name after '/'".to_string(),
                })
            }
            Some(s) => config.service_name = Some(s.to_string()),
            None => {}
        }

        Ok(config)
    }

    /// Load a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// The descriptor the driver should dial: `host:port/service`, or the
    /// bare host (a TNS alias) when no service name is set.
    pub fn connect_string(&self) -> String {
        match &self.service_name {
            Some(service) => format!("{}:{}/{}", self.host, self.port, service),
            None => self.host.clone(),
        }
    }
}

fn deserialize_secs<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}
