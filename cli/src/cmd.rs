pub mod list;

use std::path::PathBuf;

use anyhow::Context as _;
use grader_core::{config::TestConfig, serdable::GlobPattern, Config};

use crate::util;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Config file to use instead of searching for `grader.toml`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Run a program against every testcase in a directory
    #[command(alias("t"))]
    Test(test::Args),

    /// Show which testcases would be run
    #[command(alias("ls"))]
    List(list::Args),
}

/// Process exit status of the `grader` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    AllPassed = 0,
    SomeFailed = 1,
    SetupError = 2,
}

pub type SubcmdResult = anyhow::Result<Verdict>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Test(args) => test::exec(args, self).await,
            List(args) => list::exec(args, self),
        }
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        let cfg = match &self.config {
            Some(path) => Config::from_toml_file(path.clone()),
            None => Config::from_file_finding_in_ancestors(util::current_dir()),
        }
        .context("Failed to load config")?;
        if let Some(path) = &cfg.source_config_file {
            log::debug!(
                "Loaded config {}",
                util::replace_homedir_to_tilde(path).to_string_lossy()
            );
        }
        Ok(cfg)
    }
}

/// Where to look for testcases and how to pair them.
#[derive(Debug, Clone, clap::Args)]
pub struct DiscoveryArgs {
    /// Directory containing input/output file pairs [default: tests]
    #[arg(short = 'd', long)]
    pub testcase_dir: Option<PathBuf>,

    /// Glob for input files [default: *.in]
    #[arg(long)]
    pub input_pattern: Option<GlobPattern>,

    /// Glob for expected-output files [default: *.out]
    #[arg(long)]
    pub output_pattern: Option<GlobPattern>,
}

impl DiscoveryArgs {
    pub fn apply(&self, mut cfg: TestConfig) -> TestConfig {
        let DiscoveryArgs {
            testcase_dir,
            input_pattern,
            output_pattern,
        } = self;

        if let Some(d) = testcase_dir {
            cfg.testcase_dir = d.clone();
        }
        if let Some(p) = input_pattern {
            cfg.input_pattern = p.clone();
        }
        if let Some(p) = output_pattern {
            cfg.output_pattern = p.clone();
        }
        cfg
    }
}
