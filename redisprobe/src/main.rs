//! Redis connectivity probe.
//!
//! This binary loads connection settings from a local environment file,
//! tries a fixed ordered set of connection variants (plaintext, TLS
//! without certificate validation, TLS with validation), and reports the
//! first one that yields a usable connection.
//!
//! # Security Guarantees
//! - Passwords never appear in logs, reports, or JSON output
//! - The smoke test writes a single key with a 60 second lifetime and
//!   deletes it before finishing

use clap::{Args, Parser, Subcommand};
use redisprobe_core::{
    ConnectionConfig, ConnectivityProbe, DEFAULT_SETTINGS_FILE, PROBE_ORDER, ProbeError,
    RedisConnector, Result, Settings, TransportSecurity, config, init_logging, render_attempt,
    render_report,
};
use std::path::PathBuf;
use tracing::info;

/// Every configuration variant was exhausted without a usable connection,
/// or the single checked variant failed.
const EXIT_PROBE_FAILED: i32 = 1;

/// Settings, flags, or logging could not be set up; no probe was run.
const EXIT_CONFIG_ERROR: i32 = 2;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "redisprobe")]
#[command(about = "Redis connectivity probe")]
#[command(version)]
#[command(long_about = "
Redis connectivity probe

Loads connection settings from a local environment file and tries three
connection variants in order:
  1. plain         - unencrypted TCP
  2. tls-insecure  - TLS without certificate validation
  3. tls           - TLS with certificate validation

The first variant that connects and answers PING is exercised with a
short smoke test (SET with a 60s TTL, GET, DEL, INFO) and reported as
the working configuration.

SETTINGS:
  Read from .env.app (KEY=VALUE lines, # comments) or --env-file.
  Recognized keys: REDIS_HOST, REDIS_PORT, REDIS_PASSWORD, REDIS_DB.
  Flags and process environment variables override file values.

EXIT CODES:
  0  a configuration worked
  1  no configuration worked
  2  configuration or usage error
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Subcommand)]
pub enum Command {
    /// Try every connection variant in order, stopping at the first success
    Probe(ConnectionArgs),
    /// Check a single connection variant
    Check(CheckArgs),
    /// List the connection variants the probe tries
    Modes,
}

/// Settings source and overrides shared by probe and check.
#[derive(Args)]
pub struct ConnectionArgs {
    /// Settings file path
    #[arg(
        long,
        default_value = DEFAULT_SETTINGS_FILE,
        help = "Settings file with KEY=VALUE lines (missing file is not an error)"
    )]
    pub env_file: PathBuf,

    /// Server host
    #[arg(long, env = "REDIS_HOST", help = "Host, overrides the settings file")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "REDIS_PORT", help = "Port, overrides the settings file")]
    pub port: Option<u16>,

    /// Password for AUTH
    #[arg(
        long,
        env = "REDIS_PASSWORD",
        hide_env_values = true,
        help = "Password, overrides the settings file"
    )]
    pub password: Option<String>,

    /// Logical database index
    #[arg(
        long,
        env = "REDIS_DB",
        help = "Database index, overrides the settings file"
    )]
    pub db: Option<u32>,

    /// Emit JSON instead of text
    #[arg(long, help = "Emit the report as JSON on stdout")]
    pub json: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Transport security mode to check
    #[arg(
        long,
        default_value_t = TransportSecurity::TlsInsecure,
        help = "Variant to check: plain, tls-insecure, or tls"
    )]
    pub mode: TransportSecurity,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all log output except errors")]
    pub quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error}");
            EXIT_CONFIG_ERROR
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    init_logging(cli.global.verbose, cli.global.quiet)?;

    match &cli.command {
        Some(Command::Probe(args)) => run_probe(args).await,
        Some(Command::Check(args)) => run_check(args).await,
        Some(Command::Modes) => {
            list_modes();
            Ok(EXIT_SUCCESS)
        }
        // Default behavior: run the full probe
        None => run_probe(&cli.connection).await,
    }
}

/// Tries all connection variants and reports the first working one.
async fn run_probe(args: &ConnectionArgs) -> Result<i32> {
    info!("Settings file: {}", args.env_file.display());

    let settings = load_settings(args)?;
    let candidates = ConnectionConfig::candidates(&settings)?;

    let connector = RedisConnector::new();
    let probe = ConnectivityProbe::new(&connector);
    let report = probe.run(&candidates).await;

    emit(&report, render_report(&report), args.json)?;

    Ok(if report.succeeded() {
        EXIT_SUCCESS
    } else {
        EXIT_PROBE_FAILED
    })
}

/// Checks a single connection variant and reports its outcome directly.
async fn run_check(args: &CheckArgs) -> Result<i32> {
    let settings = load_settings(&args.connection)?;
    let config = ConnectionConfig::from_settings(&settings, args.mode)?;

    info!("Checking single configuration: {}", config);

    let connector = RedisConnector::new();
    let probe = ConnectivityProbe::new(&connector);
    let attempt = probe.check(&config).await;

    emit(&attempt, render_attempt(&attempt), args.connection.json)?;

    Ok(if attempt.succeeded() {
        EXIT_SUCCESS
    } else {
        EXIT_PROBE_FAILED
    })
}

/// Loads the settings file and applies flag/environment overrides on top.
fn load_settings(args: &ConnectionArgs) -> Result<Settings> {
    let settings = Settings::load(&args.env_file)?;

    let mut overrides = Vec::new();
    if let Some(host) = &args.host {
        overrides.push((config::HOST_KEY.to_string(), host.clone()));
    }
    if let Some(port) = args.port {
        overrides.push((config::PORT_KEY.to_string(), port.to_string()));
    }
    if let Some(password) = &args.password {
        overrides.push((config::PASSWORD_KEY.to_string(), password.clone()));
    }
    if let Some(db) = args.db {
        overrides.push((config::DATABASE_KEY.to_string(), db.to_string()));
    }

    Ok(settings.overlay(overrides))
}

/// Prints either the rendered text or pretty JSON for a report value.
fn emit<T: serde::Serialize>(value: &T, rendered: String, json: bool) -> Result<()> {
    if json {
        let payload = serde_json::to_string_pretty(value)
            .map_err(|e| ProbeError::other("Failed to serialize report", e))?;
        println!("{payload}");
    } else {
        print!("{rendered}");
    }
    Ok(())
}

/// Lists the connection variants the probe tries, in order.
fn list_modes() {
    println!("Connection variants (tried in this order):");
    println!();

    for (index, security) in PROBE_ORDER.iter().enumerate() {
        println!(
            "  {}. {:<13} {}",
            index + 1,
            security.to_string(),
            security.describe()
        );
    }

    println!();
    println!("Check a single variant with:");
    println!("  redisprobe check --mode tls-insecure");
}
