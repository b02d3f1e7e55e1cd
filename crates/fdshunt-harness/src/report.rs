//! Report generation.

use serde::Serialize;
use thiserror::Error;

use crate::scenarios::ScenarioResult;

/// Failures of the harness itself. A failing scenario is data in the
/// report, not one of these.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("report io: {0}")]
    Io(#[from] std::io::Error),
    #[error("report encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Roll-up over every executed scenario.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: &[ScenarioResult]) -> Self {
        let passed = results.iter().filter(|result| result.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Full report document, renderable as markdown or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub title: String,
    pub timestamp: String,
    pub summary: VerificationSummary,
    pub results: Vec<ScenarioResult>,
}

impl VerificationReport {
    #[must_use]
    pub fn new(timestamp: String, results: Vec<ScenarioResult>) -> Self {
        Self {
            title: String::from("fdshunt verification report"),
            timestamp,
            summary: VerificationSummary::from_results(&results),
            results,
        }
    }

    /// Human-readable rendering: a scenario table, then one section per
    /// failing scenario itemizing its failed checks.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("Generated: {}\n\n", self.timestamp));
        out.push_str(&format!(
            "Scenarios: {} total, {} passed, {} failed\n\n",
            self.summary.total, self.summary.passed, self.summary.failed
        ));
        out.push_str("| Scenario | Status | Checks |\n");
        out.push_str("|----------|--------|--------|\n");
        for result in &self.results {
            let status = if result.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                result.scenario,
                status,
                result.checks.len()
            ));
        }
        for result in &self.results {
            if result.passed {
                continue;
            }
            out.push_str(&format!("\n## {} failures\n\n", result.scenario));
            for check in result.checks.iter().filter(|check| !check.passed) {
                out.push_str(&format!(
                    "- {}: expected {}, got {}\n",
                    check.label, check.expected, check.actual
                ));
            }
        }
        out
    }

    /// Machine-readable rendering.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
