use std::io::Write as _;

use clap::Parser;
use colored::Colorize;
use grader_cli::cmd::{GlobalArgs, Verdict};
use grader_core::style::ColorTheme;

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let level = record.level();
            writeln!(
                buf,
                "{} {}",
                format!("[{}]", level).color(level.color()).bold(),
                record.args()
            )
        })
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();
    let app = GlobalArgs::parse();
    let verdict = app.exec_subcmd().await.unwrap_or_else(|e| {
        eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
        Verdict::SetupError
    });
    std::process::exit(verdict as i32);
}
