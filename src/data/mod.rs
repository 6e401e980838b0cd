pub mod git;
pub mod github;
pub mod jira;
pub mod logs;

use std::io::Read;
use std::time::{Duration, Instant};

use anyhow::Result;

/// Wait for a child process with a hard timeout, draining its pipes after
/// exit. The child is killed if it outlives the timeout.
pub(crate) fn wait_with_output(
    child: &mut std::process::Child,
    timeout: Duration,
) -> Result<std::process::Output> {
    let start = Instant::now();
    loop {
        match child.try_wait()? {
            Some(status) => {
                let mut stdout = Vec::new();
                let mut stderr = Vec::new();
                if let Some(mut s) = child.stdout.take() {
                    s.read_to_end(&mut stdout).ok();
                }
                if let Some(mut s) = child.stderr.take() {
                    s.read_to_end(&mut stderr).ok();
                }
                return Ok(std::process::Output {
                    status,
                    stdout,
                    stderr,
                });
            }
            None => {
                if start.elapsed() > timeout {
                    child.kill().ok();
                    anyhow::bail!("command timed out after {}s", timeout.as_secs());
                }
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Copy text to the system clipboard via the platform's clipboard command.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let program = "pbcopy";
    #[cfg(target_os = "windows")]
    let program = "clip";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let program = "xclip";

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let args: &[&str] = &["-selection", "clipboard"];
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    let args: &[&str] = &[];

    let mut child = std::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()?;
    if let Some(stdin) = child.stdin.as_mut() {
        use std::io::Write;
        stdin.write_all(text.as_bytes())?;
    }
    child.wait()?;
    Ok(())
}
