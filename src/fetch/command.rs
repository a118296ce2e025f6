use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

use super::validate::PredatorName;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// External process that prints a fetch payload for the predator appended
/// as its last argument.
#[derive(Clone, Debug)]
pub struct FetchCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl FetchCommand {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the process without a shell and returns its stdout.
    pub(super) fn run(&self, predator: &PredatorName) -> PipelineResult<String> {
        let upstream = |message: String| PipelineError::Upstream {
            predator: predator.to_string(),
            message,
        };

        debug!(program = %self.program, args = ?self.args, %predator, "spawning fetch process");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(predator.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| upstream(format!("failed to spawn {}: {error}", self.program)))?;

        let deadline = Instant::now() + self.timeout;
        let timed_out = || {
            warn!(%predator, timeout_secs = self.timeout.as_secs(), "fetch process timed out");
            PipelineError::Timeout {
                predator: predator.to_string(),
                timeout: self.timeout,
            }
        };

        let (tx, rx) = mpsc::channel();
        let pipes = usize::from(drain(Stream::Stdout, child.stdout.take(), &tx))
            + usize::from(drain(Stream::Stderr, child.stderr.take(), &tx));
        drop(tx);

        let status = match wait_until(&mut child, deadline) {
            Ok(Some(status)) => status,
            Ok(None) => {
                if let Err(error) = child.kill() {
                    warn!(%error, "failed to kill fetch process");
                }
                let _ = child.wait();
                return Err(timed_out());
            }
            Err(error) => return Err(upstream(format!("failed to wait for fetch process: {error}"))),
        };

        // A background grandchild can keep the pipes open after the child exits.
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        for _ in 0..pipes {
            match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok((Stream::Stdout, bytes)) => stdout = bytes,
                Ok((Stream::Stderr, bytes)) => stderr = bytes,
                Err(RecvTimeoutError::Timeout) => return Err(timed_out()),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if status.success() {
            String::from_utf8(stdout).map_err(|_| upstream("fetch output was not valid UTF-8".to_owned()))
        } else {
            let stderr = String::from_utf8_lossy(&stderr);
            Err(upstream(format!("{status}: {}", stderr.trim())))
        }
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Reads `pipe` to EOF on its own thread and sends the bytes to `tx`.
fn drain(
    stream: Stream,
    pipe: Option<impl Read + Send + 'static>,
    tx: &Sender<(Stream, Vec<u8>)>,
) -> bool {
    let Some(mut pipe) = pipe else {
        return false;
    };
    let tx = tx.clone();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        let _ = tx.send((stream, buffer));
    });
    true
}

fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}
