// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Resolve state directory: `ODC_STATE_DIR` > `XDG_STATE_HOME/odc` > `~/.local/state/odc`.
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ODC_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("odc"));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".local/state/odc"))
}

/// Agent-wait timeout override for Submit-with-recovery (§4.8), in milliseconds.
pub fn agent_wait_timeout_ms() -> Option<u64> {
    std::env::var("ODC_AGENT_WAIT_TIMEOUT_MS").ok().and_then(|s| s.parse().ok())
}
