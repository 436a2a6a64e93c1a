use std::{
    fmt, io,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use anyhow::Context as _;
use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    process::{Child, Command},
};

use super::result::*;

/// How to launch the program under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl TargetCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// `<interpreter> <script>`, e.g. `python3 main.py`.
    pub fn with_interpreter(interpreter: impl Into<PathBuf>, script: impl AsRef<Path>) -> Self {
        Self::new(interpreter).arg(script.as_ref().to_string_lossy())
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for TargetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug)]
enum Completion {
    Exited(ProcessOutput),
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    target: TargetCommand,
    timeout: Duration,
}

impl TestRunner {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(target: TargetCommand) -> Self {
        Self {
            target,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn get_target(&self) -> &TargetCommand {
        &self.target
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs the target once. Every failure mode is reported through `Outcome::status`.
    pub async fn execute(&self, name: &str, input: &str, expected_output: &str) -> Outcome {
        let start_at = tokio::time::Instant::now();
        let res = self.spawn_and_wait(input).await;
        let execution_time = start_at.elapsed();

        let mut outcome = Outcome {
            test_name: name.to_owned(),
            status: Status::ExecutionError,
            input: input.to_owned(),
            expected_output: expected_output.trim().to_owned(),
            actual_output: None,
            stderr: None,
            exit_code: None,
            diagnostic: None,
            execution_time,
        };

        match res {
            Ok(Completion::Exited(output)) => {
                outcome.status = judge(&output.stdout, expected_output);
                outcome.actual_output = Some(output.stdout.trim().to_owned());
                outcome.stderr = Some(output.stderr).filter(|s| !s.is_empty());
                outcome.exit_code = output.status;
            }
            Ok(Completion::TimedOut) => {
                outcome.status = Status::TimedOut;
                outcome.diagnostic = Some(format!(
                    "Timeout: Execution exceeded {} seconds",
                    self.timeout.as_secs_f64()
                ));
            }
            Err(e) => {
                log::debug!("{}: execution error: {:#}", name, e);
                outcome.diagnostic = Some(format!("{:#}", e));
            }
        }
        outcome
    }

    async fn spawn_and_wait(&self, input: &str) -> anyhow::Result<Completion> {
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let mut cmd = Command::new(&self.target.program);
        cmd.args(&self.target.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so that everything the target spawns can be killed together.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut proc = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn '{}'", self.target))?;
        let pgid = proc.id();
        let mut stdin = proc.stdin.take().context("Failed to open stdin")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let res = {
            // stdin is dropped at the end of this future, which closes the pipe.
            let fut_stdin = async move {
                match stdin.write_all(input.as_bytes()).await {
                    // The target may exit without consuming its input.
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(()),
                }
            };
            let fut_stdout = stdout.read_to_end(&mut stdout_buf);
            let fut_stderr = stderr.read_to_end(&mut stderr_buf);
            let fut_exit_status = proc.wait();

            tokio::time::timeout(self.timeout, async {
                tokio::try_join!(fut_stdin, fut_stdout, fut_stderr, fut_exit_status)
                    .context("Failed to communicate with subprocess")
            })
            .await
        };

        match res {
            Err(_elapsed) => {
                self::kill_process_tree(&mut proc, pgid).await;
                Ok(Completion::TimedOut)
            }
            Ok(Err(e)) => {
                self::kill_process_tree(&mut proc, pgid).await;
                Err(e)
            }
            Ok(Ok((_, _, _, exit_status))) => Ok(Completion::Exited(ProcessOutput {
                status: exit_status.code(),
                stdout: String::from_utf8_lossy(&stdout_buf).into(),
                stderr: String::from_utf8_lossy(&stderr_buf).into(),
            })),
        }
    }
}

/// SIGKILLs the whole process group led by the target, then reaps the target itself.
async fn kill_process_tree(proc: &mut Child, pgid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pgid) = pgid {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
            log::debug!("Failed to kill process group {}: {}", pgid, e);
        }
    }
    #[cfg(not(unix))]
    let _ = pgid;

    proc.kill()
        .await
        .unwrap_or_else(|e| log::debug!("Failed to kill process: {:#}", e));
}
