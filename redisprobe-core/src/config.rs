//! Connection configuration variants and their derivation from settings.
//!
//! A [`ConnectionConfig`] is a pure derivation of [`Settings`] plus a
//! transport-security flag. The probe tries the fixed [`PROBE_ORDER`]
//! (plaintext, then TLS without certificate verification, then TLS with
//! verification); ordering is significant because the first working
//! variant wins.

use crate::settings::Settings;
use crate::{ProbeError, Result};
use serde::Serialize;
use std::time::Duration;

/// Settings key for the server host name.
pub const HOST_KEY: &str = "REDIS_HOST";
/// Settings key for the server port.
pub const PORT_KEY: &str = "REDIS_PORT";
/// Settings key for the server password.
pub const PASSWORD_KEY: &str = "REDIS_PASSWORD";
/// Settings key for the logical database index.
pub const DATABASE_KEY: &str = "REDIS_DB";

/// Host used when `REDIS_HOST` is absent.
pub const DEFAULT_HOST: &str = "localhost";
/// Port used when `REDIS_PORT` is absent.
pub const DEFAULT_PORT: u16 = 6379;

// Matches the command timeout the original deployment configured on its
// client; enforced by the client library, not by the probe.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The fixed variant ordering the multi-configuration probe walks.
pub const PROBE_ORDER: [TransportSecurity; 3] = [
    TransportSecurity::Plain,
    TransportSecurity::TlsInsecure,
    TransportSecurity::Tls,
];

/// Transport security mode for a connection attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportSecurity {
    /// Unencrypted TCP
    #[default]
    Plain,
    /// TLS, but the server certificate is not verified (self-signed or
    /// expired certificates are accepted)
    TlsInsecure,
    /// TLS with full certificate verification against system roots
    Tls,
}

impl TransportSecurity {
    /// Whether the connection is encrypted at all.
    pub fn is_encrypted(&self) -> bool {
        !matches!(self, Self::Plain)
    }

    /// Whether the server certificate is validated.
    pub fn verifies_certificate(&self) -> bool {
        matches!(self, Self::Tls)
    }

    /// Human-readable description used in narration and reports.
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Plain => "plaintext",
            Self::TlsInsecure => "TLS (certificate verification disabled)",
            Self::Tls => "TLS (certificate verified)",
        }
    }
}

impl std::fmt::Display for TransportSecurity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::TlsInsecure => write!(f, "tls-insecure"),
            Self::Tls => write!(f, "tls"),
        }
    }
}

impl std::str::FromStr for TransportSecurity {
    type Err = ProbeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "tls-insecure" => Ok(Self::TlsInsecure),
            "tls" => Ok(Self::Tls),
            _ => Err(ProbeError::configuration(format!(
                "invalid transport security mode '{s}': expected plain, tls-insecure, or tls"
            ))),
        }
    }
}

/// One named variant of connection parameters.
///
/// # Security
/// The password is carried for the client library but never serialized and
/// never part of `Display` output.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionConfig {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Password, when the server requires AUTH
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Logical database index selected after connecting
    pub database: i64,
    /// Transport security mode for this variant
    pub security: TransportSecurity,
    /// Connect/response timeout handed to the client library
    pub connect_timeout: Duration,
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} ({})", self.host, self.port, self.security.describe())
    }
}

impl ConnectionConfig {
    /// Creates a config for `host:port` with defaults for everything else.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: None,
            database: 0,
            security: TransportSecurity::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Builder method to set the transport security mode.
    pub fn with_security(mut self, security: TransportSecurity) -> Self {
        self.security = security;
        self
    }

    /// Builder method to set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Derives a config from settings plus a transport-security flag.
    ///
    /// Defaults apply for absent keys: `localhost`, port 6379, no
    /// password, database 0. An empty `REDIS_PASSWORD` counts as no
    /// password, matching how the original deployment treated it.
    ///
    /// # Errors
    /// Returns a configuration error when `REDIS_PORT` or `REDIS_DB` is
    /// present but not parseable; nothing beyond parseability is checked.
    pub fn from_settings(settings: &Settings, security: TransportSecurity) -> Result<Self> {
        let host = settings.get_or(HOST_KEY, DEFAULT_HOST).to_string();

        let port = match settings.get(PORT_KEY) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                ProbeError::configuration(format!(
                    "{PORT_KEY} value '{raw}' is not a valid port number"
                ))
            })?,
            None => DEFAULT_PORT,
        };

        let password = settings
            .get(PASSWORD_KEY)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string);

        let database = match settings.get(DATABASE_KEY) {
            Some(raw) => raw.parse::<u32>().map(i64::from).map_err(|_| {
                ProbeError::configuration(format!(
                    "{DATABASE_KEY} value '{raw}' is not a valid database index"
                ))
            })?,
            None => 0,
        };

        Ok(Self {
            host,
            port,
            password,
            database,
            security,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Derives the full fixed-order candidate list from settings.
    ///
    /// # Errors
    /// Propagates the first derivation error; since every variant shares
    /// the same settings, either all derive or none do.
    pub fn candidates(settings: &Settings) -> Result<Vec<Self>> {
        PROBE_ORDER
            .iter()
            .map(|security| Self::from_settings(settings, *security))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_settings() {
        let settings = Settings::default();
        let config = ConnectionConfig::from_settings(&settings, TransportSecurity::Plain)
            .expect("defaults always derive");

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 6379);
        assert_eq!(config.password, None);
        assert_eq!(config.database, 0);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_settings_values_are_applied() {
        let settings = Settings::parse(
            "REDIS_HOST=cache.example.com\nREDIS_PORT=6380\nREDIS_PASSWORD=hunter2\nREDIS_DB=3\n",
        );
        let config = ConnectionConfig::from_settings(&settings, TransportSecurity::Tls)
            .expect("derivation succeeds");

        assert_eq!(config.host, "cache.example.com");
        assert_eq!(config.port, 6380);
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.database, 3);
        assert_eq!(config.security, TransportSecurity::Tls);
    }

    #[test]
    fn test_empty_password_counts_as_unset() {
        let settings = Settings::parse("REDIS_PASSWORD=\n");
        let config = ConnectionConfig::from_settings(&settings, TransportSecurity::Plain)
            .expect("derivation succeeds");
        assert_eq!(config.password, None);
    }

    #[test]
    fn test_unparseable_port_is_a_configuration_error() {
        let settings = Settings::parse("REDIS_PORT=not-a-port\n");
        let error = ConnectionConfig::from_settings(&settings, TransportSecurity::Plain)
            .expect_err("bad port must not derive");
        assert_eq!(error.kind(), crate::ErrorKind::Other);
        assert!(error.to_string().contains("REDIS_PORT"));
    }

    #[test]
    fn test_negative_database_index_is_rejected() {
        let settings = Settings::parse("REDIS_DB=-1\n");
        assert!(ConnectionConfig::from_settings(&settings, TransportSecurity::Plain).is_err());
    }

    #[test]
    fn test_candidates_follow_fixed_order() {
        let settings = Settings::parse("REDIS_HOST=cache.example.com\n");
        let candidates = ConnectionConfig::candidates(&settings).expect("derivation succeeds");

        let order: Vec<TransportSecurity> = candidates.iter().map(|c| c.security).collect();
        assert_eq!(
            order,
            vec![
                TransportSecurity::Plain,
                TransportSecurity::TlsInsecure,
                TransportSecurity::Tls,
            ]
        );
        assert!(candidates.iter().all(|c| c.host == "cache.example.com"));
    }

    #[test]
    fn test_transport_security_from_str() {
        assert_eq!(
            "plain".parse::<TransportSecurity>().unwrap(),
            TransportSecurity::Plain
        );
        assert_eq!(
            "tls-insecure".parse::<TransportSecurity>().unwrap(),
            TransportSecurity::TlsInsecure
        );
        assert_eq!(
            "tls".parse::<TransportSecurity>().unwrap(),
            TransportSecurity::Tls
        );
        assert!("ssl".parse::<TransportSecurity>().is_err());
    }

    #[test]
    fn test_transport_security_display_round_trips() {
        for mode in PROBE_ORDER {
            let parsed: TransportSecurity = mode.to_string().parse().expect("round trip");
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn test_display_omits_password() {
        let config = ConnectionConfig::new("cache.example.com", 6380).with_password("hunter2");
        let rendered = config.to_string();
        assert!(rendered.contains("cache.example.com:6380"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_serialization_omits_password() {
        let config = ConnectionConfig::new("cache.example.com", 6380).with_password("hunter2");
        let json = serde_json::to_string(&config).expect("serialize config");
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));
        assert!(json.contains("cache.example.com"));
    }
}
