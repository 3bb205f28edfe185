//! Configuration types for mail delivery.
//!
//! Provides:
//! - SMTP connection details with honest validation
//! - Retry policy (backoff base, delay cap, jitter unit, RNG seed)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::errors::{MailError, MailResult};

/// Default base delay between retry attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Default cap on a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);

/// Default unit for the random jitter added to each backoff.
pub const DEFAULT_JITTER_UNIT: Duration = Duration::from_secs(1);

/// SMTP connection details.
///
/// Immutable once used to construct a transport handle; the handle is
/// built exactly once at [`Mailer`](crate::client::Mailer) construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDetails {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Authentication username.
    pub username: String,
    /// Authentication password (serialization skipped for security).
    #[serde(skip, default = "default_password")]
    pub password: SecretString,
}

fn default_password() -> SecretString {
    SecretString::new(String::new())
}

impl ConnectionDetails {
    /// Creates connection details from host, port, and credentials.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Validates the connection details.
    ///
    /// Every required field is checked and each violation is rejected
    /// with `InvalidConnection`.
    pub fn validate(&self) -> MailResult<()> {
        if self.host.is_empty() {
            return Err(MailError::invalid_connection("host cannot be empty"));
        }
        if self.port == 0 {
            return Err(MailError::invalid_connection("port cannot be 0"));
        }
        if self.username.is_empty() {
            return Err(MailError::invalid_connection("username cannot be empty"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(MailError::invalid_connection("password cannot be empty"));
        }
        Ok(())
    }

    /// Returns the full server address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempt budget. Zero means no attempt is made and the send
    /// fails with `RetriesExhausted` immediately after validation.
    #[serde(default)]
    pub max_retries: u32,
    /// Base delay; attempt `i` backs off for `base_delay * 2^i`.
    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,
    /// Cap on a single backoff delay.
    #[serde(default = "default_max_delay", with = "humantime_serde")]
    pub max_delay: Duration,
    /// Unit for the random jitter; attempt `i` adds `jitter_unit * k`
    /// with `k` drawn uniformly from `[0, i)`.
    #[serde(default = "default_jitter_unit", with = "humantime_serde")]
    pub jitter_unit: Duration,
    /// Optional RNG seed for reproducible jitter in tests.
    pub seed: Option<u64>,
}

fn default_base_delay() -> Duration {
    DEFAULT_BASE_DELAY
}
fn default_max_delay() -> Duration {
    DEFAULT_MAX_DELAY
}
fn default_jitter_unit() -> Duration {
    DEFAULT_JITTER_UNIT
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
            jitter_unit: default_jitter_unit(),
            seed: None,
        }
    }
}

impl RetryConfig {
    /// Returns a copy of this configuration with the given attempt budget.
    pub fn with_max_retries(&self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self.clone()
        }
    }
}

// Humantime serde support
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
