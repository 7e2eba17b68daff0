use std::path::Path;

use restock_core::config::{AppConfig, LoadOptions};
use restock_core::rules::RulesConfig;
use serde::Serialize;

use crate::commands::CommandResult;

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
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const REPORT_CHECKS: [&str; 4] =
    ["sales_report", "traffic_report", "restock_report", "inventory_report"];

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
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
            checks.push(check_rules_file(&config.rules.path));

            let report_paths = [
                &config.reports.sales,
                &config.reports.traffic,
                &config.reports.restock,
                &config.reports.inventory,
            ];
            for (name, path) in REPORT_CHECKS.into_iter().zip(report_paths) {
                checks.push(check_report_file(name, path));
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in std::iter::once("rules_file").chain(REPORT_CHECKS) {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_rules_file(path: &Path) -> DoctorCheck {
    match RulesConfig::load(path) {
        Ok(rules) => DoctorCheck {
            name: "rules_file",
            status: CheckStatus::Pass,
            details: format!(
                "loaded `{}` ({} fee classes, topseller {})",
                path.display(),
                rules.fees.classes.classes().count(),
                rules.topseller
            ),
        },
        Err(error) => {
            DoctorCheck { name: "rules_file", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_report_file(name: &'static str, path: &Path) -> DoctorCheck {
    if path.is_file() {
        DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("found `{}`", path.display()),
        }
    } else {
        DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!("report file `{}` does not exist", path.display()),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

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
