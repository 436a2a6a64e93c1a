use std::fmt::{self, Write as _};

use colored::Colorize;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::session::Summary;
use crate::style;
use crate::testing::{Outcome, Status};

const RULE_WIDTH: usize = 60;

/// Human-readable report over `outcomes`, in order.
/// Only non-passing outcomes carry input/expected/actual details.
pub fn render_text(outcomes: &[Outcome]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, outcomes);
    out
}

pub fn write_text(out: &mut impl fmt::Write, outcomes: &[Outcome]) -> fmt::Result {
    let summary = Summary::of(outcomes);
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "TEST SUMMARY: {}/{} tests passed",
        summary.passed, summary.total
    )?;
    writeln!(out, "{}", rule)?;

    if outcomes.is_empty() {
        writeln!(out, "\nNo tests have been run yet.")?;
    }
    for o in outcomes {
        write_outcome(out, o)?;
    }

    writeln!(out, "\n{}", rule)?;
    writeln!(out, "{}", status_breakdown(outcomes))?;
    match summary.score_percent() {
        Some(pct) => writeln!(
            out,
            "Score: {}/{} ({:.1}%)",
            summary.passed, summary.total, pct
        )?,
        None => writeln!(out, "Score: 0/0 (n/a)")?,
    }
    writeln!(out, "{}", rule)
}

fn write_outcome(out: &mut impl fmt::Write, o: &Outcome) -> fmt::Result {
    let elapsed = format!("[{}ms]", o.execution_time.as_millis()).dimmed();
    if o.passed() {
        return writeln!(
            out,
            "\n{}: {} {}",
            style::pass_marker(true),
            o.test_name,
            elapsed
        );
    }

    writeln!(
        out,
        "\n{}: {} {} {}",
        style::pass_marker(false),
        o.test_name.bright_yellow().bold(),
        style::status_icon(o.status),
        elapsed,
    )?;
    writeln!(out, "  Input: {:?}", o.input)?;
    writeln!(out, "  Expected: {:?}", o.expected_output)?;
    match &o.actual_output {
        Some(actual) => writeln!(out, "  Got: {:?}", actual)?,
        None => writeln!(out, "  Got: {}", "<none>".magenta().dimmed())?,
    }
    if let Some(diagnostic) = &o.diagnostic {
        writeln!(out, "  Error: {}", diagnostic.bright_red())?;
    }
    if let Some(stderr) = &o.stderr {
        writeln!(out, "  Stderr: {}", stderr.trim_end())?;
    }
    if let Some(code) = o.exit_code.filter(|&c| c != 0) {
        writeln!(out, "  Exit code: {}", code)?;
    }
    Ok(())
}

/// One-line verdict, e.g. `2/5 tests failed (FAIL x1, TLE x1)`.
pub fn status_breakdown(outcomes: &[Outcome]) -> String {
    let summary = Summary::of(outcomes);
    if summary.total == 0 {
        return "No tests were run".to_owned();
    }
    if summary.all_passed() {
        return format!("All {} tests passed ✨", summary.total)
            .green()
            .to_string();
    }

    let headline = if summary.passed > 0 {
        format!("{}/{} tests failed 💣", summary.failed(), summary.total)
    } else {
        format!("All {} tests failed 💀", summary.total)
    };

    let detail = Status::iter()
        .filter(|s| !s.is_passed())
        .filter_map(|s| {
            let cnt = outcomes.iter().filter(|o| o.status == s).count();
            (cnt > 0).then(|| {
                format!(
                    "{}{}{}",
                    style::status_icon(s),
                    "x".dimmed(),
                    cnt.to_string().bold().bright_white()
                )
            })
        })
        .collect::<Vec<String>>()
        .join(", ");

    format!("{} ({})", headline.bright_red(), detail)
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    score_percent: Option<f64>,
    outcomes: &'a [Outcome],
}

pub fn render_json(outcomes: &[Outcome]) -> serde_json::Result<String> {
    let summary = Summary::of(outcomes);
    serde_json::to_string_pretty(&JsonReport {
        summary,
        score_percent: summary.score_percent(),
        outcomes,
    })
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    fn outcome(name: &str, status: Status) -> Outcome {
        let (actual, exit_code, diagnostic) = match status {
            Status::Passed => (Some("3".to_owned()), Some(0), None),
            Status::Failed => (Some("4".to_owned()), Some(1), None),
            Status::TimedOut => (
                None,
                None,
                Some("Timeout: Execution exceeded 5 seconds".to_owned()),
            ),
            Status::ExecutionError => (None, None, Some("Failed to spawn 'x'".to_owned())),
        };
        Outcome {
            test_name: name.to_owned(),
            status,
            input: "1 2\n".to_owned(),
            expected_output: "3".to_owned(),
            actual_output: actual,
            stderr: None,
            exit_code,
            diagnostic,
            execution_time: Duration::from_millis(7),
        }
    }

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn empty_report_does_not_divide_by_zero() {
        plain();
        let r = render_text(&[]);
        assert!(r.contains("TEST SUMMARY: 0/0 tests passed"));
        assert!(r.contains("No tests have been run yet."));
        assert!(r.contains("Score: 0/0 (n/a)"));
        assert!(!r.contains("NaN"));
    }

    #[test]
    fn passing_outcomes_are_terse() {
        plain();
        let r = render_text(&[outcome("a", Status::Passed)]);
        assert!(r.contains("✓ PASS: a [7ms]"));
        assert!(!r.contains("Input:"));
        assert!(r.contains("All 1 tests passed"));
        assert!(r.contains("Score: 1/1 (100.0%)"));
    }

    #[test]
    fn failing_outcomes_show_details() {
        plain();
        let mut failed = outcome("b", Status::Failed);
        failed.stderr = Some("oops\n".to_owned());
        let outcomes = [
            outcome("a", Status::Passed),
            failed,
            outcome("c", Status::TimedOut),
        ];
        let r = render_text(&outcomes);

        assert!(r.contains("TEST SUMMARY: 1/3 tests passed"));
        assert!(r.contains("✗ FAIL: b  FAIL  [7ms]"), "{}", r);
        assert!(r.contains("✗ FAIL: c  TLE  [7ms]"), "{}", r);
        assert!(r.contains("  Input: \"1 2\\n\""));
        assert!(r.contains("  Expected: \"3\""));
        assert!(r.contains("  Got: \"4\""));
        assert!(r.contains("  Stderr: oops\n"));
        assert!(r.contains("  Exit code: 1"));
        assert!(r.contains("  Got: <none>"));
        assert!(r.contains("  Error: Timeout: Execution exceeded 5 seconds"));
        assert!(r.contains("Score: 1/3 (33.3%)"));
    }

    #[test]
    fn breakdown_counts_each_failing_status() {
        plain();
        let outcomes = [
            outcome("a", Status::Failed),
            outcome("b", Status::ExecutionError),
            outcome("c", Status::Failed),
        ];
        assert_eq!(
            status_breakdown(&outcomes),
            "All 3 tests failed 💀 ( FAIL x2,  ERR x1)"
        );

        let outcomes = [outcome("a", Status::Passed), outcome("b", Status::TimedOut)];
        assert_eq!(status_breakdown(&outcomes), "1/2 tests failed 💣 ( TLE x1)");
    }

    #[test]
    fn json_report_has_summary_and_outcomes() {
        let outcomes = [outcome("a", Status::Passed), outcome("b", Status::TimedOut)];
        let json: serde_json::Value = serde_json::from_str(&render_json(&outcomes).unwrap()).unwrap();

        assert_eq!(json["summary"]["passed"], 1);
        assert_eq!(json["summary"]["total"], 2);
        assert_eq!(json["score_percent"], 50.0);
        assert_eq!(json["outcomes"][1]["status"], "TimedOut");
        assert_eq!(json["outcomes"][1]["actual_output"], serde_json::Value::Null);
    }

    #[test]
    fn json_report_for_empty_session() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&[]).unwrap()).unwrap();
        assert_eq!(json["summary"]["total"], 0);
        assert_eq!(json["score_percent"], serde_json::Value::Null);
    }
}
