pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use error::*;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::config::TestConfig;
use crate::session::{assign_names, Session};
use crate::style;
use crate::testing::{Discovery, TargetCommand, TestCase, TestRunner};

/// Builds the launch command for `program_file`, prefixing the configured interpreter if any.
pub fn resolve_target(program_file: impl AsRef<Path>, cfg: &TestConfig) -> Result<TargetCommand> {
    let program_file = program_file.as_ref();
    ensure!(
        program_file.is_file(),
        "Program not found: {}",
        program_file.to_string_lossy()
    );
    let target = match &cfg.interpreter {
        Some(interpreter) => TargetCommand::with_interpreter(interpreter, program_file),
        None if program_file.is_absolute() || program_file.components().count() > 1 => {
            TargetCommand::new(program_file)
        }
        // A bare file name would be looked up in PATH instead of the current dir.
        None => TargetCommand::new(Path::new(".").join(program_file)),
    };
    Ok(target)
}

pub fn discover_testcases(testcase_dir: impl AsRef<Path>, cfg: &TestConfig) -> Result<Discovery> {
    let testcase_dir = testcase_dir.as_ref();
    let discovery = cfg
        .finder()
        .discover(testcase_dir)
        .context("Failed to find testcases")?;
    log::debug!(
        "Discovered {} testcase(s), skipped {}",
        discovery.cases.len(),
        discovery.skipped.len()
    );
    Ok(discovery)
}

pub async fn do_test(
    target: TargetCommand,
    testcase_dir: impl AsRef<Path>,
    cfg: &TestConfig,
    show_progress: bool,
) -> Result<Session> {
    let testcase_dir = testcase_dir.as_ref();
    let Discovery { cases, .. } = self::discover_testcases(testcase_dir, cfg)?;
    if cases.is_empty() {
        bail!(
            "No valid testcases found in {}",
            testcase_dir.to_string_lossy()
        );
    }
    log::info!("Found {} test case(s)", cases.len());
    log::info!("Running: {}", target);

    let runner = TestRunner::new(target).timeout(cfg.timeout()?);
    let mut session = Session::new(runner);
    self::run_with_progress(&mut session, &cases, show_progress).await;
    Ok(session)
}

/// Runs `cases` on `session`, drawing one spinner line per testcase.
pub async fn run_with_progress(session: &mut Session, cases: &[TestCase], show_progress: bool) {
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let container = MultiProgress::new();
    if !show_progress {
        container.set_draw_target(ProgressDrawTarget::hidden());
    }

    let bars: Vec<ProgressBar> = assign_names(cases)
        .into_iter()
        .map(|label| {
            let bar = container
                .add(ProgressBar::new_spinner())
                .with_style(style.clone())
                .with_message(format!("Testcase {} ...", label));
            bar.enable_steady_tick(Duration::from_millis(50));
            bar
        })
        .collect();

    session
        .run_batch_with(cases, |i, res| {
            bars[i].finish_with_message(
                format!(
                    "Testcase {} ... {}{} [{}ms]",
                    res.test_name,
                    style::status_icon(res.status),
                    " ".repeat(4usize.saturating_sub(res.status.to_string().len())),
                    res.execution_time.as_millis(),
                )
                .cyan()
                .to_string(),
            );
        })
        .await;
}
