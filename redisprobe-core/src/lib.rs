//! Core types and probe logic for redisprobe.
//!
//! This crate provides the settings loader, the connection configuration
//! model, the store client abstraction, and the sequential connectivity
//! probe shared by the redisprobe binary.
//!
//! # Security Guarantees
//! - Passwords are never logged and never serialized into reports
//! - The probe writes exactly one short-lived key per successful attempt
//!   and deletes it before finishing
//! - No network activity beyond the target store
//!
//! # Architecture
//! The core library follows these patterns:
//! - Connector trait for store access abstraction, with the production
//!   implementation backed by the `redis` crate
//! - Probe outcomes modeled as data and rendered separately
//! - Errors classified by kind and propagated by value

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod report;
pub mod settings;

// Re-export commonly used types
pub use client::redis::RedisConnector;
pub use client::{StoreClient, StoreConnector};
pub use config::{ConnectionConfig, PROBE_ORDER, TransportSecurity};
pub use error::{ErrorKind, ProbeError, Result};
pub use logging::init_logging;
pub use probe::{
    AttemptOutcome, AttemptReport, ConnectivityProbe, PROBE_KEY, PROBE_KEY_TTL_SECS, PROBE_VALUE,
    ProbeReport, ServerInfo, SmokeReport, SmokeStep, StepOutcome, StepReport,
};
pub use report::{render_attempt, render_report};
pub use settings::{DEFAULT_SETTINGS_FILE, Settings};
