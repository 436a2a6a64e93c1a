use std::time::Duration;

use serde::Serialize;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
pub enum Status {
    #[strum(serialize = "PASS")]
    Passed,
    #[strum(serialize = "FAIL")]
    Failed,
    #[strum(serialize = "TLE")]
    TimedOut,
    #[strum(serialize = "ERR")]
    ExecutionError,
}

impl Status {
    pub fn is_passed(self) -> bool {
        self == Status::Passed
    }
}

/// Recorded result of running one testcase. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub test_name: String,
    pub status: Status,
    pub input: String,
    /// Trimmed.
    pub expected_output: String,
    /// Trimmed stdout. `None` if the process never completed.
    pub actual_output: Option<String>,
    /// `None` if stderr was empty.
    pub stderr: Option<String>,
    /// `None` unless the process terminated normally.
    pub exit_code: Option<i32>,
    pub diagnostic: Option<String>,
    pub execution_time: Duration,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.status.is_passed()
    }
}

/// `Passed` iff both sides are equal after trimming leading/trailing whitespace.
pub fn judge(actual_stdout: &str, expected_output: &str) -> Status {
    if actual_stdout.trim() == expected_output.trim() {
        Status::Passed
    } else {
        Status::Failed
    }
}
