//! Production store client backed by the `redis` crate.
//!
//! Builds a [`redis::ConnectionInfo`] from a [`ConnectionConfig`] (plain
//! TCP, TLS with verification, or TLS with the `insecure` flag), opens a
//! multiplexed async connection with the configured timeouts, and maps
//! [`redis::RedisError`] into the probe's error taxonomy. Responses are
//! decoded through the crate's typed `FromRedisValue` conversions.

use crate::config::{ConnectionConfig, TransportSecurity};
use crate::{ProbeError, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError};
use std::collections::HashMap;

use super::{StoreClient, StoreConnector};

/// Opens real Redis connections for the probe.
#[derive(Debug, Default)]
pub struct RedisConnector;

impl RedisConnector {
    /// Creates a connector.
    pub fn new() -> Self {
        Self
    }

    /// Translates a connection config into the client library's
    /// connection description.
    fn connection_info(config: &ConnectionConfig) -> ConnectionInfo {
        let addr = match config.security {
            TransportSecurity::Plain => {
                ConnectionAddr::Tcp(config.host.clone(), config.port)
            }
            TransportSecurity::TlsInsecure => ConnectionAddr::TcpTls {
                host: config.host.clone(),
                port: config.port,
                insecure: true,
                tls_params: None,
            },
            TransportSecurity::Tls => ConnectionAddr::TcpTls {
                host: config.host.clone(),
                port: config.port,
                insecure: false,
                tls_params: None,
            },
        };

        ConnectionInfo {
            addr,
            redis: RedisConnectionInfo {
                db: config.database,
                username: None,
                password: config.password.clone(),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl StoreConnector for RedisConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn StoreClient>> {
        let client = redis::Client::open(Self::connection_info(config))
            .map_err(|e| classify_redis_error(config.to_string(), e))?;

        // One timeout covers both connect and responses, like the command
        // timeout the original deployment set on its client.
        let conn = client
            .get_multiplexed_async_connection_with_timeouts(
                config.connect_timeout,
                config.connect_timeout,
            )
            .await
            .map_err(|e| classify_redis_error(config.to_string(), e))?;

        Ok(Box::new(RedisStoreClient { conn }))
    }
}

/// A live multiplexed connection wrapped behind the probe's client trait.
pub struct RedisStoreClient {
    conn: MultiplexedConnection,
}

#[async_trait]
impl StoreClient for RedisStoreClient {
    async fn ping(&mut self) -> Result<bool> {
        let reply: String = redis::cmd("PING")
            .query_async(&mut self.conn)
            .await
            .map_err(|e| classify_redis_error("PING command", e))?;
        Ok(reply.eq_ignore_ascii_case("PONG"))
    }

    async fn set_with_ttl(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let () = self
            .conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(|e| classify_redis_error(format!("SET {key}"), e))?;
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .conn
            .get(key)
            .await
            .map_err(|e| classify_redis_error(format!("GET {key}"), e))?;
        Ok(value)
    }

    async fn delete(&mut self, key: &str) -> Result<()> {
        let () = self
            .conn
            .del(key)
            .await
            .map_err(|e| classify_redis_error(format!("DEL {key}"), e))?;
        Ok(())
    }

    async fn server_info(&mut self) -> Result<HashMap<String, String>> {
        let raw: String = redis::cmd("INFO")
            .query_async(&mut self.conn)
            .await
            .map_err(|e| classify_redis_error("INFO command", e))?;
        Ok(parse_info(&raw))
    }
}

/// Maps a client-library error into the probe taxonomy.
///
/// Authentication rejections keep their own class; I/O-shaped failures
/// (unreachable, refused, dropped, timed out) become connection errors;
/// everything else is unclassified. The library's own message is folded
/// into the context so rendered reports keep the underlying cause.
fn classify_redis_error(context: impl Into<String>, error: RedisError) -> ProbeError {
    let context = format!("{}: {}", context.into(), error);
    if error.kind() == redis::ErrorKind::AuthenticationFailed
        || matches!(error.code(), Some("NOAUTH") | Some("WRONGPASS"))
    {
        ProbeError::authentication_failed(context, error)
    } else if error.is_io_error() || error.is_timeout() || error.is_connection_dropped() {
        ProbeError::connection_failed(context, error)
    } else {
        ProbeError::other(context, error)
    }
}

/// Parses an INFO reply into a flat mapping.
///
/// The payload is line-oriented: `# Section` headers and blank lines are
/// skipped, everything else splits on the first `:`.
fn parse_info(raw: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.to_string(), value.to_string());
        }
    }
    fields
}
