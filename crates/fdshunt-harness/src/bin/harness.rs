//! CLI entrypoint for the fdshunt verification harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fdshunt_harness::{HarnessError, VerificationReport, scenarios};

/// Self-verification tooling for fdshunt.
#[derive(Debug, Parser)]
#[command(name = "fdshunt-harness")]
#[command(about = "Routing and partitioning verification harness for fdshunt")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every known scenario.
    List,
    /// Run scenarios and report the outcome.
    Verify {
        /// Run a single scenario instead of all of them.
        #[arg(long)]
        scenario: Option<String>,
        /// Output report path (markdown; a .json sibling is written too).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            for scenario in scenarios::all() {
                println!("{:<24} {}", scenario.name, scenario.summary);
            }
        }
        Command::Verify {
            scenario,
            report,
            timestamp,
        } => {
            let selected = match scenario {
                Some(name) => {
                    let found = scenarios::by_name(&name)
                        .ok_or(HarnessError::UnknownScenario(name))?;
                    vec![found]
                }
                None => scenarios::all(),
            };

            let results: Vec<_> = selected
                .iter()
                .map(|scenario| {
                    let result = scenario.run();
                    eprintln!(
                        "[{}] {}",
                        if result.passed { "pass" } else { "FAIL" },
                        result.scenario
                    );
                    result
                })
                .collect();

            let report_doc = VerificationReport::new(
                timestamp.unwrap_or_else(|| format!("{:?}", std::time::SystemTime::now())),
                results,
            );
            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            if let Some(path) = report {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, report_doc.to_markdown())?;
                std::fs::write(path.with_extension("json"), report_doc.to_json()?)?;
                eprintln!("Wrote report to {}", path.display());
            }

            if !report_doc.summary.all_passed() {
                return Err("verification failed".into());
            }
        }
    }

    Ok(())
}
