use anyhow::{Context, Result};
use std::process::{Command, ExitStatus, Output, Stdio};

/// Abstraction for running the external unpacking tools (simg2img,
/// unyaffs, cpio, mount). Keeps the invocation sites mockable.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CommandExecutor {
    /// Runs a command synchronously and captures its output.
    fn run<'a>(&self, program: &'a str, args: &'a [&'a str]) -> Result<Output>;

    /// Runs a command with inherited stdio. Needed when an elevation
    /// runner wants to prompt for a password.
    fn run_interactive<'a>(&self, program: &'a str, args: &'a [&'a str]) -> Result<ExitStatus>;

    /// Is `program` available on PATH?
    fn has(&self, program: &str) -> bool;
}

/// Real system executor using std::process::Command.
pub struct RealSystem;

impl CommandExecutor for RealSystem {
    fn run<'a>(&self, program: &'a str, args: &'a [&'a str]) -> Result<Output> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute command: {} {:?}", program, args))
    }

    fn run_interactive<'a>(&self, program: &'a str, args: &'a [&'a str]) -> Result<ExitStatus> {
        Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to execute command: {} {:?}", program, args))
    }

    fn has(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
