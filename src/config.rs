//! Configuration for the APRS-IS tracker.
//!
//! ## File format
//!
//! Configuration is read from TOML. Every section is optional; only the
//! callsign has no usable default.
//!
//! ```toml
//! destination = "(28.5383, -81.3792)"
//!
//! [station]
//! callsign = "KR4BYQ-9"
//! passcode = "12345"
//!
//! [server]
//! host = "rotate.aprs2.net"
//! port = 14580
//!
//! [report]
//! interval_secs = 30
//! mode = "timestamped-default"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::aprs::EncodingMode;
use crate::constants::{
    DEFAULT_APRS_IS_HOST, DEFAULT_APRS_IS_PORT, DEFAULT_COMMENT, DEFAULT_FILTER,
};
use crate::error::{Result, TrackerError};
use crate::position::DestinationTarget;

/// APRS-IS server address
///
/// # Parsing formats
/// - `rotate.aprs2.net:14580`
/// - `rotate.aprs2.net` (default port)
/// - `[2001:db8::1]:14580`
///
/// # Example
/// ```
/// use aprs_tracker::config::ServerEndpoint;
///
/// let endpoint: ServerEndpoint = "noam.aprs2.net:10152".parse().unwrap();
/// assert_eq!(endpoint.port, 10152);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_APRS_IS_HOST, DEFAULT_APRS_IS_PORT)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ServerEndpoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        // Bracketed IPv6 literal
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| format!("unterminated IPv6 address: {}", s))?;
            let port = match tail.strip_prefix(':') {
                Some(port) => parse_port(port)?,
                None if tail.is_empty() => DEFAULT_APRS_IS_PORT,
                None => return Err(format!("invalid server address: {}", s)),
            };
            return Ok(Self::new(host, port));
        }

        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => (host, parse_port(port)?),
            None => (s, DEFAULT_APRS_IS_PORT),
        };
        if host.is_empty() {
            return Err(format!("missing host: {}", s));
        }
        Ok(Self::new(host, port))
    }
}

fn parse_port(s: &str) -> std::result::Result<u16, String> {
    match s.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(format!("invalid port: {}", s)),
        Ok(port) => Ok(port),
    }
}

/// Station callsign and APRS-IS passcode
///
/// Constant for the life of the process. A passcode of `-1` logs in
/// unverified (receive-only), which the server will not gate to RF.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StationIdentity {
    /// Callsign with optional SSID, e.g. `KR4BYQ-9`
    pub callsign: String,
    /// Numeric APRS-IS passcode for the base callsign
    pub passcode: String,
}

impl StationIdentity {
    pub fn new(callsign: impl Into<String>, passcode: impl Into<String>) -> Self {
        Self {
            callsign: callsign.into(),
            passcode: passcode.into(),
        }
    }
}

/// APRS-IS server connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server hostname or address
    pub host: String,
    /// Server TCP port (14580 accepts user-defined filters)
    pub port: u16,
    /// Bound on TCP connect, in seconds
    pub connect_timeout_secs: u64,
    /// Bound on each socket write, in seconds
    pub write_timeout_secs: u64,
}

impl ServerConfig {
    pub fn endpoint(&self) -> ServerEndpoint {
        ServerEndpoint::new(self.host.clone(), self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_APRS_IS_HOST.to_string(),
            port: DEFAULT_APRS_IS_PORT,
            connect_timeout_secs: 10,
            write_timeout_secs: 10,
        }
    }
}

/// Software identification sent in the login line
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoftwareConfig {
    /// Software name (no whitespace)
    pub name: String,
    /// Software version (no whitespace)
    pub version: String,
    /// Server-side filter; empty to omit the clause
    pub filter: String,
}

impl Default for SoftwareConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

/// Report cadence and packet layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Minimum spacing between reports, and backstop period, in seconds
    pub interval_secs: u64,
    /// Packet layout
    pub mode: EncodingMode,
    /// Comment used when no destination is set
    pub comment: String,
}

impl ReportConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            mode: EncodingMode::TimestampedDefault,
            comment: DEFAULT_COMMENT.to_string(),
        }
    }
}

/// Complete tracker configuration
///
/// # Example
/// ```
/// use aprs_tracker::config::TrackerConfig;
///
/// let mut config = TrackerConfig::default();
/// config.station.callsign = "kr4byq-9".to_string();
/// config.validate().unwrap();
/// assert_eq!(config.station.callsign, "KR4BYQ-9");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Station identity
    pub station: StationIdentity,
    /// APRS-IS server
    pub server: ServerConfig,
    /// Login software identification
    pub software: SoftwareConfig,
    /// Report cadence and layout
    pub report: ReportConfig,
    /// Optional destination for distance reports
    pub destination: Option<DestinationTarget>,
}

impl TrackerConfig {
    /// Load configuration from a TOML file. The result is not yet validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TrackerError::Config(e.to_string()))
    }

    /// Normalise and check the configuration.
    ///
    /// Upper-cases the callsign and rejects values the tracker cannot run with.
    pub fn validate(&mut self) -> Result<()> {
        let callsign = self.station.callsign.trim().to_ascii_uppercase();
        if callsign.is_empty() {
            return Err(TrackerError::Config("callsign is required".into()));
        }
        if !callsign
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(TrackerError::Config(format!(
                "invalid callsign: {}",
                callsign
            )));
        }
        self.station.callsign = callsign;
        let passcode = self.station.passcode.trim();
        if passcode.contains(|c: char| c.is_whitespace() || c.is_control()) {
            return Err(TrackerError::Config(
                "passcode must not contain whitespace".into(),
            ));
        }
        self.station.passcode = passcode.to_string();

        if self.server.host.trim().is_empty() {
            return Err(TrackerError::Config("server host is required".into()));
        }
        if self.server.port == 0 {
            return Err(TrackerError::Config("server port must be non-zero".into()));
        }
        if self.server.connect_timeout_secs == 0 || self.server.write_timeout_secs == 0 {
            return Err(TrackerError::Config("timeouts must be positive".into()));
        }

        for (what, value) in [
            ("software name", &self.software.name),
            ("software version", &self.software.version),
        ] {
            if value.is_empty() || value.contains(char::is_whitespace) {
                return Err(TrackerError::Config(format!(
                    "{} must be a single word: {:?}",
                    what, value
                )));
            }
        }

        if self.software.filter.contains(char::is_control) {
            return Err(TrackerError::Config(format!(
                "filter must not contain control characters: {:?}",
                self.software.filter
            )));
        }

        if self.report.interval_secs == 0 {
            return Err(TrackerError::Config(
                "report interval must be positive".into(),
            ));
        }

        Ok(())
    }
}
