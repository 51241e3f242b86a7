//! Sequential multi-configuration connectivity probe.
//!
//! Tries an ordered list of connection configurations one at a time and
//! stops at the first one that yields a live connection. A working
//! configuration is exercised with a short smoke test (write a key with a
//! bounded lifetime, read it back, delete it, query server metadata);
//! individual smoke steps may fail without demoting the attempt, since the
//! probe's question is "which configuration produces a usable connection".

use crate::ProbeError;
use crate::client::{StoreClient, StoreConnector};
use crate::config::ConnectionConfig;
use crate::error::ErrorKind;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Key written and removed by the smoke test.
pub const PROBE_KEY: &str = "test_key";

/// Value stored under [`PROBE_KEY`].
pub const PROBE_VALUE: &str = "test_value";

/// Lifetime attached to the probe key so an interrupted run self-heals.
pub const PROBE_KEY_TTL_SECS: u64 = 60;

/// Server metadata captured from a successful INFO query.
///
/// Every field is optional; renderers substitute `"unknown"` for absent
/// values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerInfo {
    /// Reported server version
    pub version: Option<String>,
    /// Human-readable memory usage
    pub used_memory_human: Option<String>,
    /// Number of connected clients
    pub connected_clients: Option<String>,
}

impl ServerInfo {
    /// Extracts the fields of interest from a raw INFO mapping.
    pub fn from_info(info: &HashMap<String, String>) -> Self {
        Self {
            version: info.get("redis_version").cloned(),
            used_memory_human: info.get("used_memory_human").cloned(),
            connected_clients: info.get("connected_clients").cloned(),
        }
    }
}

/// One step of the post-connection smoke test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokeStep {
    /// SET with a bounded lifetime
    Write,
    /// GET of the freshly written key
    Read,
    /// DEL of the probe key
    Delete,
    /// INFO metadata query
    Info,
}

impl std::fmt::Display for SmokeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Write => "SET",
            Self::Read => "GET",
            Self::Delete => "DEL",
            Self::Info => "INFO",
        };
        write!(f, "{label}")
    }
}

/// Outcome of a single smoke-test step.
#[derive(Debug, Clone, Serialize)]
pub enum StepOutcome {
    /// Step completed, optionally with an observed detail (e.g. the value
    /// read back)
    Passed { detail: Option<String> },
    /// Step failed with the rendered error
    Failed { error: String },
}

/// A smoke-test step together with its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: SmokeStep,
    pub outcome: StepOutcome,
}

impl StepReport {
    /// Whether the step completed.
    pub fn passed(&self) -> bool {
        matches!(self.outcome, StepOutcome::Passed { .. })
    }
}

/// Results of the fixed smoke-test sequence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SmokeReport {
    pub steps: Vec<StepReport>,
}

impl SmokeReport {
    /// Whether every step completed.
    pub fn all_passed(&self) -> bool {
        self.steps.iter().all(StepReport::passed)
    }
}

/// Outcome of one configuration attempt.
#[derive(Debug, Clone, Serialize)]
pub enum AttemptOutcome {
    /// Connection established and the server answered the liveness check
    Connected {
        server: ServerInfo,
        smoke: SmokeReport,
    },
    /// Connection established but the liveness check came back negative
    LivenessFailed,
    /// The attempt failed with a classified error
    Failed { kind: ErrorKind, error: String },
}

/// One configuration attempt and how long it took.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    /// Configuration that was tried (credentials are never serialized)
    pub config: ConnectionConfig,
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

impl AttemptReport {
    /// Whether this attempt produced a usable connection.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Connected { .. })
    }
}

/// Full record of a probe run.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// When the run started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Version of the probe that produced this report
    pub probe_version: String,
    /// Attempts in the order they were made
    pub attempts: Vec<AttemptReport>,
    /// Index into `attempts` of the first working configuration
    pub working: Option<usize>,
    pub total_elapsed_ms: u64,
}

impl ProbeReport {
    /// Whether any configuration produced a usable connection.
    pub fn succeeded(&self) -> bool {
        self.working.is_some()
    }

    /// The first working attempt, if any.
    pub fn working_attempt(&self) -> Option<&AttemptReport> {
        self.working.and_then(|index| self.attempts.get(index))
    }
}

/// Drives connection attempts through a [`StoreConnector`].
pub struct ConnectivityProbe<'a> {
    connector: &'a dyn StoreConnector,
}

impl<'a> ConnectivityProbe<'a> {
    /// Creates a probe over the given connector.
    pub fn new(connector: &'a dyn StoreConnector) -> Self {
        Self { connector }
    }

    /// Tries each candidate in order, stopping at the first success.
    ///
    /// Per-attempt failures are recorded and never propagated; an empty
    /// candidate list yields a report with no attempts and no winner.
    pub async fn run(&self, candidates: &[ConnectionConfig]) -> ProbeReport {
        let start_time = Instant::now();
        let started_at = chrono::Utc::now();
        let mut attempts = Vec::with_capacity(candidates.len());
        let mut working = None;

        tracing::info!(
            "Starting connectivity probe across {} configuration(s)",
            candidates.len()
        );

        for (index, config) in candidates.iter().enumerate() {
            tracing::info!("Attempt {}/{}: {}", index + 1, candidates.len(), config);
            let attempt = self.check(config).await;
            let succeeded = attempt.succeeded();
            attempts.push(attempt);

            if succeeded {
                working = Some(index);
                tracing::info!("Found working configuration: {}", config);
                break;
            }
        }

        if working.is_none() {
            tracing::warn!(
                "No configuration produced a usable connection ({} tried)",
                attempts.len()
            );
        }

        ProbeReport {
            started_at,
            probe_version: env!("CARGO_PKG_VERSION").to_string(),
            attempts,
            working,
            total_elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Attempts a single configuration and reports the outcome.
    ///
    /// Connection and liveness errors are classified and captured in the
    /// report rather than returned.
    pub async fn check(&self, config: &ConnectionConfig) -> AttemptReport {
        let start_time = Instant::now();

        let outcome = match self.connector.connect(config).await {
            Ok(mut client) => match client.ping().await {
                Ok(true) => {
                    tracing::info!("Liveness check passed for {}", config);
                    let (server, smoke) = run_smoke_tests(client.as_mut()).await;
                    AttemptOutcome::Connected { server, smoke }
                }
                Ok(false) => {
                    tracing::warn!("Server gave a negative liveness reply for {}", config);
                    AttemptOutcome::LivenessFailed
                }
                Err(error) => failure(config, &error),
            },
            Err(error) => failure(config, &error),
        };

        AttemptReport {
            config: config.clone(),
            outcome,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}

/// Records a classified attempt failure.
fn failure(config: &ConnectionConfig, error: &ProbeError) -> AttemptOutcome {
    tracing::warn!("Attempt against {} failed: {}", config, error);
    AttemptOutcome::Failed {
        kind: error.kind(),
        error: error.to_string(),
    }
}

/// Runs the fixed smoke-test sequence on a live connection.
///
/// Steps run in order and are individually guarded; a failed step is
/// reported and the sequence continues.
async fn run_smoke_tests(client: &mut dyn StoreClient) -> (ServerInfo, SmokeReport) {
    let mut steps = Vec::with_capacity(4);
    let mut server = ServerInfo::default();

    let outcome = match client
        .set_with_ttl(PROBE_KEY, PROBE_VALUE, PROBE_KEY_TTL_SECS)
        .await
    {
        Ok(()) => {
            tracing::debug!("Wrote '{}' with {}s TTL", PROBE_KEY, PROBE_KEY_TTL_SECS);
            StepOutcome::Passed {
                detail: Some(format!("ttl {PROBE_KEY_TTL_SECS}s")),
            }
        }
        Err(error) => StepOutcome::Failed {
            error: error.to_string(),
        },
    };
    steps.push(StepReport {
        step: SmokeStep::Write,
        outcome,
    });

    let outcome = match client.get(PROBE_KEY).await {
        Ok(Some(value)) => {
            tracing::debug!("Read back '{}' = {}", PROBE_KEY, value);
            StepOutcome::Passed {
                detail: Some(value),
            }
        }
        Ok(None) => StepOutcome::Failed {
            error: format!("no value found for '{PROBE_KEY}' after writing it"),
        },
        Err(error) => StepOutcome::Failed {
            error: error.to_string(),
        },
    };
    steps.push(StepReport {
        step: SmokeStep::Read,
        outcome,
    });

    let outcome = match client.delete(PROBE_KEY).await {
        Ok(()) => {
            tracing::debug!("Deleted '{}'", PROBE_KEY);
            StepOutcome::Passed { detail: None }
        }
        Err(error) => StepOutcome::Failed {
            error: error.to_string(),
        },
    };
    steps.push(StepReport {
        step: SmokeStep::Delete,
        outcome,
    });

    let outcome = match client.server_info().await {
        Ok(info) => {
            server = ServerInfo::from_info(&info);
            StepOutcome::Passed { detail: None }
        }
        Err(error) => StepOutcome::Failed {
            error: error.to_string(),
        },
    };
    steps.push(StepReport {
        step: SmokeStep::Info,
        outcome,
    });

    (server, SmokeReport { steps })
}
