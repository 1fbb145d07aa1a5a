//! Console transcript
//!
//! Renders runner events and the final report for a human reader.

use std::time::Duration;

use colored::Colorize;

use crate::common::truncate;
use crate::http::{Body, StepResult};

use super::checkout::{self, Verdict};
use super::runner::{Outcome, RunObserver, RunReport, StepRecord};
use super::step::Step;

/// Values longer than this are summarised instead of printed
const MAX_FIELD_CHARS: usize = 300;

/// Longest plain-text body echoed back
const MAX_TEXT_CHARS: usize = 200;

/// Prints progress as the run executes
pub struct Console {
    verbose: bool,
}

impl Console {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl RunObserver for Console {
    fn waiting(&mut self, delay: Duration, attempt: u32) {
        println!(
            "  {} Waiting {} ms for settlement (poll {})",
            "…".cyan(),
            delay.as_millis(),
            attempt
        );
    }

    fn step_started(&mut self, index: usize, step: &Step, attempt: u32) {
        if self.verbose || attempt == 1 {
            println!(
                "\n{} {}",
                format!("Step {}:", index + 1).blue().bold(),
                step.title.white().bold()
            );
        }
    }

    fn step_finished(&mut self, _index: usize, step: &Step, record: &StepRecord) {
        if self.verbose {
            if let Some(request) = &record.request {
                println!("  {} {}", request.method.as_str().dimmed(), request.path.dimmed());
                if let Some(body) = &request.body {
                    println!("  {}", body.to_string().dimmed());
                }
            }
        }

        match &record.outcome {
            Ok(result) => {
                println!("  {} HTTP {}", "✓".green(), result.status);
                print_fields(step, result);
            }
            Err(e) if record.fatal || e.is_connection() => {
                println!("  {} {}", "✗".red(), e);
            }
            Err(e) => {
                println!("  {} {} (continuing)", "!".yellow(), e);
            }
        }
    }
}

fn print_fields(step: &Step, result: &StepResult) {
    if let Body::Text(text) = &result.body {
        println!("  {}", truncate(text.trim(), MAX_TEXT_CHARS).dimmed());
        return;
    }

    for field in step.display {
        if let Some(value) = result.body.field_text(field) {
            let shown = if value.chars().count() > MAX_FIELD_CHARS {
                format!("<{} chars>", value.chars().count())
            } else {
                value
            };
            println!("  {}: {}", field, shown.white());
        }
    }
}

/// Print the closing verdict and any remediation hint
pub fn print_summary(report: &RunReport, verdict: &Verdict, mismatch: Option<&str>) {
    println!();

    if let Some(cause) = report.abort_cause() {
        let message = cause
            .error()
            .map(|e| e.to_string())
            .unwrap_or_default();
        println!(
            "{} {} at '{}': {}",
            "✗".red().bold(),
            "Run aborted".red().bold(),
            cause.title,
            message
        );
        if let Some(hint) = checkout::hint(cause) {
            println!("  {} {}", "hint:".yellow(), hint);
        }
        println!();
        return;
    }

    for record in report.records.iter().filter(|r| !r.is_success()) {
        if let Some(hint) = checkout::hint(record) {
            println!("  {} {}", "hint:".yellow(), hint);
        }
    }

    if let Some(message) = mismatch {
        println!("{} {}", "✗".red().bold(), message.red().bold());
    } else {
        match report.outcome {
            Outcome::Completed => println!(
                "{} {} (final status: {})",
                "✓".green().bold(),
                "Checkout flow completed".green().bold(),
                verdict.to_string().white().bold()
            ),
            _ => println!(
                "{} {} (final status: {})",
                "!".yellow().bold(),
                "Checkout flow completed with warnings".yellow().bold(),
                verdict.to_string().white().bold()
            ),
        }
    }
    println!();
}
