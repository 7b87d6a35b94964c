//! Bounded execution of external tools.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{HostPulseError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `command`, returning its stdout, or kill it once `timeout` elapses.
///
/// Stdout is drained on a separate thread while the child runs, so output
/// larger than the pipe buffer cannot stall it. A non-zero exit status is
/// reported as an unavailable source.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<String> {
    let program = command.get_program().to_string_lossy().to_string();

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| HostPulseError::source_unavailable(format!("{}: {}", program, e)))?;

    let reader = child.stdout.take().map(|mut pipe| {
        thread::spawn(move || -> std::io::Result<String> {
            let mut stdout = String::new();
            pipe.read_to_string(&mut stdout)?;
            Ok(stdout)
        })
    });

    let start = Instant::now();

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            // the reader ends once every holder of the pipe has exited
            return Err(HostPulseError::command_timeout(timeout.as_millis() as u64));
        }

        thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
    };

    let stdout = match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| HostPulseError::other(format!("{}: stdout reader panicked", program)))??,
        None => String::new(),
    };

    if !status.success() {
        return Err(HostPulseError::source_unavailable(format!(
            "{} exited with {}",
            program, status
        )));
    }

    Ok(stdout)
}

/// First non-blank line of a command's output, trimmed.
pub fn first_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|line| !line.is_empty())
}
