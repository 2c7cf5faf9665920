use anyhow::{Result, anyhow};
use std::fs;
use std::path::Path;
use log::warn;

use crate::constants::ALLOWED_ROOT_CMDS;

pub fn current_uid() -> Result<u32> {
    let content = fs::read_to_string("/proc/self/status")?;
    parse_uid_from_status(&content)
}

pub fn is_root() -> Result<bool> {
    Ok(current_uid()? == 0)
}

/// First available privilege escalation command, if any.
pub fn superuser_runner() -> Option<String> {
    for tool in ALLOWED_ROOT_CMDS {
        if which::which(tool).is_ok() {
            return Some(tool.to_string());
        }
    }
    None
}

/// Returns None when already root, or the runner to prefix commands with.
/// Errors when elevation is needed but no runner exists on this system.
pub fn root_or_runner(reason: &str) -> Result<Option<String>> {
    if is_root()? {
        return Ok(None);
    }
    if let Some(runner) = superuser_runner() {
        warn!("{}", reason);
        return Ok(Some(runner));
    }
    Err(anyhow!(
        "Root privileges required but no elevation tool (sudo, doas, etc.) found."
    ))
}

/// Preflight check that a scan root is actually readable. An unreadable
/// root is fatal to the whole session, unlike unreadable files below it.
pub fn ensure_readable(path: &Path) -> Result<()> {
    let metadata =
        fs::metadata(path).map_err(|e| anyhow!("Failed to access {:?}: {}", path, e))?;
    if metadata.is_dir() {
        fs::read_dir(path).map_err(|e| anyhow!("Failed to read directory {:?}: {}", path, e))?;
    } else {
        fs::File::open(path).map_err(|e| anyhow!("Failed to open file {:?}: {}", path, e))?;
    }
    Ok(())
}

fn parse_uid_from_status(content: &str) -> Result<u32> {
    for line in content.lines() {
        if line.starts_with("Uid:") {
            // Format: Uid: Real Effective Saved Filesystem
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                return parts[2]
                    .parse()
                    .map_err(|e| anyhow!("Failed to parse UID: {}", e));
            }
        }
    }
    Err(anyhow!("Uid field not found in status"))
}
