//! Human-readable rendering of probe reports.
//!
//! Console texture follows the deployment checks this tool replaces:
//! ✅/❌ markers per line, a 📊 block for the smoke-test operations and a
//! 📈 block for server metadata, with `unknown` standing in for metadata
//! the server did not report.

use crate::probe::{
    AttemptOutcome, AttemptReport, ProbeReport, SmokeReport, SmokeStep, StepOutcome, StepReport,
};

const UNKNOWN: &str = "unknown";

/// Renders a full multi-configuration probe run.
///
/// Attempts appear in order, followed by a single overall verdict line.
pub fn render_report(report: &ProbeReport) -> String {
    let mut out = String::new();

    for (index, attempt) in report.attempts.iter().enumerate() {
        out.push_str(&format!(
            "--- Attempt {}/{} ---\n",
            index + 1,
            report.attempts.len()
        ));
        render_attempt_into(&mut out, attempt);
        out.push('\n');
    }

    match report.working_attempt() {
        Some(attempt) => {
            out.push_str(&format!("✅ Working configuration: {}\n", attempt.config));
        }
        None if report.attempts.is_empty() => {
            out.push_str("❌ No connection configurations to try.\n");
        }
        None => out.push_str("❌ No configuration could connect to Redis.\n"),
    }

    out
}

/// Renders a single configuration attempt.
pub fn render_attempt(attempt: &AttemptReport) -> String {
    let mut out = String::new();
    render_attempt_into(&mut out, attempt);
    out
}

fn render_attempt_into(out: &mut String, attempt: &AttemptReport) {
    out.push_str(&format!("Connecting to Redis: {}\n", attempt.config));

    match &attempt.outcome {
        AttemptOutcome::Connected { server, smoke } => {
            out.push_str("✅ Connected to Redis successfully!\n");
            out.push_str("\n📊 Testing basic operations:\n");
            for step in &smoke.steps {
                render_step_into(out, step);
            }
            if info_passed(smoke) {
                out.push_str("\n📈 Redis server info:\n");
                push_field(out, "Version", server.version.as_deref());
                push_field(out, "Used memory", server.used_memory_human.as_deref());
                push_field(out, "Connected clients", server.connected_clients.as_deref());
            }
        }
        AttemptOutcome::LivenessFailed => {
            out.push_str("❌ Could not connect to Redis.\n");
        }
        AttemptOutcome::Failed { error, .. } => {
            out.push_str(&format!("❌ {error}\n"));
        }
    }
}

fn render_step_into(out: &mut String, step: &StepReport) {
    let line = match (&step.step, &step.outcome) {
        (SmokeStep::Write, StepOutcome::Passed { .. }) => "✅ Write to Redis: OK".to_string(),
        (SmokeStep::Read, StepOutcome::Passed { detail }) => {
            format!("✅ Read from Redis: {}", detail.as_deref().unwrap_or("OK"))
        }
        (SmokeStep::Delete, StepOutcome::Passed { .. }) => "✅ Delete from Redis: OK".to_string(),
        (SmokeStep::Info, StepOutcome::Passed { .. }) => "✅ Server info: OK".to_string(),
        (op, StepOutcome::Failed { error }) => format!("❌ {op} failed: {error}"),
    };
    out.push_str(&line);
    out.push('\n');
}

fn info_passed(smoke: &SmokeReport) -> bool {
    smoke
        .steps
        .iter()
        .any(|step| step.step == SmokeStep::Info && step.passed())
}

fn push_field(out: &mut String, label: &str, value: Option<&str>) {
    out.push_str(&format!("   {}: {}\n", label, value.unwrap_or(UNKNOWN)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, TransportSecurity};
    use crate::error::ErrorKind;
    use crate::probe::ServerInfo;

    fn passed(step: SmokeStep, detail: Option<&str>) -> StepReport {
        StepReport {
            step,
            outcome: StepOutcome::Passed {
                detail: detail.map(String::from),
            },
        }
    }

    fn connected_attempt() -> AttemptReport {
        AttemptReport {
            config: ConnectionConfig::new("cache.example.com", 6380)
                .with_security(TransportSecurity::TlsInsecure),
            outcome: AttemptOutcome::Connected {
                server: ServerInfo {
                    version: Some("7.2.0".to_string()),
                    used_memory_human: Some("1.05M".to_string()),
                    connected_clients: None,
                },
                smoke: SmokeReport {
                    steps: vec![
                        passed(SmokeStep::Write, Some("ttl 60s")),
                        passed(SmokeStep::Read, Some("test_value")),
                        passed(SmokeStep::Delete, None),
                        passed(SmokeStep::Info, None),
                    ],
                },
            },
            elapsed_ms: 18,
        }
    }

    #[test]
    fn test_render_connected_attempt() {
        let text = render_attempt(&connected_attempt());

        assert!(text.contains("Connecting to Redis: cache.example.com:6380"));
        assert!(text.contains("✅ Connected to Redis successfully!"));
        assert!(text.contains("📊 Testing basic operations:"));
        assert!(text.contains("✅ Read from Redis: test_value"));
        assert!(text.contains("📈 Redis server info:"));
        assert!(text.contains("   Version: 7.2.0"));
        assert!(text.contains("   Used memory: 1.05M"));
        assert!(text.contains("   Connected clients: unknown"));
    }

    #[test]
    fn test_render_failed_attempt_uses_error_text() {
        let attempt = AttemptReport {
            config: ConnectionConfig::new("localhost", 6379),
            outcome: AttemptOutcome::Failed {
                kind: ErrorKind::Authentication,
                error: "authentication rejected: localhost:6379 (plaintext)".to_string(),
            },
            elapsed_ms: 2,
        };

        let text = render_attempt(&attempt);
        assert!(text.contains("❌ authentication rejected: localhost:6379"));
        assert!(!text.contains("📈"));
    }

    #[test]
    fn test_render_negative_liveness() {
        let attempt = AttemptReport {
            config: ConnectionConfig::new("localhost", 6379),
            outcome: AttemptOutcome::LivenessFailed,
            elapsed_ms: 2,
        };

        let text = render_attempt(&attempt);
        assert!(text.contains("❌ Could not connect to Redis."));
    }

    #[test]
    fn test_failed_info_step_suppresses_metadata_block() {
        let attempt = AttemptReport {
            config: ConnectionConfig::new("localhost", 6379),
            outcome: AttemptOutcome::Connected {
                server: ServerInfo::default(),
                smoke: SmokeReport {
                    steps: vec![
                        passed(SmokeStep::Write, None),
                        StepReport {
                            step: SmokeStep::Info,
                            outcome: StepOutcome::Failed {
                                error: "connection failed: INFO command: broken pipe".to_string(),
                            },
                        },
                    ],
                },
            },
            elapsed_ms: 7,
        };

        let text = render_attempt(&attempt);
        assert!(text.contains("❌ INFO failed:"));
        assert!(!text.contains("📈"));
    }

    #[test]
    fn test_render_report_identifies_working_configuration() {
        let report = ProbeReport {
            started_at: chrono::Utc::now(),
            probe_version: env!("CARGO_PKG_VERSION").to_string(),
            attempts: vec![
                AttemptReport {
                    config: ConnectionConfig::new("cache.example.com", 6380),
                    outcome: AttemptOutcome::Failed {
                        kind: ErrorKind::Connection,
                        error: "connection failed: cache.example.com:6380 (plaintext)".to_string(),
                    },
                    elapsed_ms: 4,
                },
                connected_attempt(),
            ],
            working: Some(1),
            total_elapsed_ms: 22,
        };

        let text = render_report(&report);
        assert!(text.contains("--- Attempt 1/2 ---"));
        assert!(text.contains("--- Attempt 2/2 ---"));
        assert!(text.contains("✅ Working configuration: cache.example.com:6380"));
        assert!(!text.contains("No configuration could connect"));
    }

    #[test]
    fn test_render_report_overall_failure() {
        let report = ProbeReport {
            started_at: chrono::Utc::now(),
            probe_version: env!("CARGO_PKG_VERSION").to_string(),
            attempts: vec![AttemptReport {
                config: ConnectionConfig::new("localhost", 6379),
                outcome: AttemptOutcome::LivenessFailed,
                elapsed_ms: 1,
            }],
            working: None,
            total_elapsed_ms: 1,
        };

        let text = render_report(&report);
        assert!(text.contains("❌ No configuration could connect to Redis."));
    }

    #[test]
    fn test_render_report_with_no_candidates() {
        let report = ProbeReport {
            started_at: chrono::Utc::now(),
            probe_version: env!("CARGO_PKG_VERSION").to_string(),
            attempts: Vec::new(),
            working: None,
            total_elapsed_ms: 0,
        };

        let text = render_report(&report);
        assert!(text.contains("❌ No connection configurations to try."));
    }
}
