use grader_core::action;

use super::{DiscoveryArgs, GlobalArgs, SubcmdResult, Verdict};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = args.discovery.apply(global_args.load_config()?.test);
    let discovery = action::discover_testcases(&cfg.testcase_dir, &cfg)?;

    for t in &discovery.cases {
        println!("{}", t.name.as_deref().unwrap_or_default());
    }
    for s in &discovery.skipped {
        eprintln!("skipped {}: {}", s.input_file.to_string_lossy(), s.reason);
    }

    if discovery.cases.is_empty() {
        return Ok(Verdict::SetupError);
    }
    Ok(Verdict::AllPassed)
}
