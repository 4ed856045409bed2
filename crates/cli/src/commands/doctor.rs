use comparcar_core::config::{AppConfig, LoadOptions};
use comparcar_db::{connect_with_settings, migrations};
use serde::Serialize;

use crate::commands::{build_runtime, CommandResult, EXIT_CONFIG, EXIT_DB_CONNECT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    command: &'static str,
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
    #[serde(skip)]
    exit_code: u8,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"doctor\",\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code: report.exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    finish_report(checks)
}

fn finish_report(checks: Vec<DoctorCheck>) -> DoctorReport {
    let failed = |name: &str| {
        checks.iter().any(|check| check.name == name && check.status == CheckStatus::Fail)
    };
    let exit_code = if failed("config_validation") {
        EXIT_CONFIG
    } else if checks.iter().any(|check| check.status == CheckStatus::Fail) {
        EXIT_DB_CONNECT
    } else {
        0
    };

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { command: "doctor", overall_status, summary, checks, exit_code }
}

/// Connects with the configured pool settings and reports the migration state.
fn check_database(config: &AppConfig) -> DoctorCheck {
    let runtime = match build_runtime("doctor") {
        Ok(runtime) => runtime,
        Err(result) => {
            return DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Fail,
                details: result.output,
            };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

        let applied = migrations::applied_count(&pool)
            .await
            .map_err(|error| format!("failed to read migration state: {error}"));
        pool.close().await;
        applied
    });

    match result {
        Ok(applied) => DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!(
                "connected using `{}` ({applied} migrations applied)",
                config.database.url
            ),
        },
        Err(error) => {
            DoctorCheck { name: "database_connectivity", status: CheckStatus::Fail, details: error }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{finish_report, render_human, CheckStatus, DoctorCheck};

    fn check(name: &'static str, status: CheckStatus) -> DoctorCheck {
        DoctorCheck { name, status, details: format!("{name} details") }
    }

    #[test]
    fn config_failure_takes_precedence_in_exit_code() {
        let report = finish_report(vec![
            check("config_validation", CheckStatus::Fail),
            check("database_connectivity", CheckStatus::Skipped),
        ]);

        assert_eq!(report.exit_code, 2);
        assert_eq!(report.overall_status, CheckStatus::Fail);
    }

    #[test]
    fn database_failure_maps_to_connect_exit_code() {
        let report = finish_report(vec![
            check("config_validation", CheckStatus::Pass),
            check("database_connectivity", CheckStatus::Fail),
        ]);

        assert_eq!(report.exit_code, 4);
        assert!(render_human(&report).contains("- [fail] database_connectivity"));
    }

    #[test]
    fn all_passing_checks_exit_cleanly() {
        let report = finish_report(vec![
            check("config_validation", CheckStatus::Pass),
            check("database_connectivity", CheckStatus::Pass),
        ]);

        assert_eq!(report.exit_code, 0);
        assert_eq!(report.summary, "doctor: all readiness checks passed");
    }
}
