//! Lock-status command implementation.

use d3data_core::{LockCoordinator, LockState, ProcessProbe};
use serde::Serialize;
use std::path::Path;

/// Lock status result.
#[derive(Debug, Serialize)]
pub struct LockStatusResult {
    /// Lock file path.
    pub path: String,
    /// One of `unlocked`, `held-by-self`, `held-by-other`, `stale`.
    pub state: &'static str,
    /// Process id recorded in the lock file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_pid: Option<i32>,
}

impl LockStatusResult {
    fn new(path: &Path, state: LockState, self_pid: i32) -> Self {
        let (state, owner_pid) = match state {
            LockState::Unlocked => ("unlocked", None),
            LockState::HeldBySelf => ("held-by-self", Some(self_pid)),
            LockState::HeldByOther(pid) => ("held-by-other", Some(pid)),
            LockState::Stale(pid) => ("stale", Some(pid)),
        };
        Self {
            path: path.display().to_string(),
            state,
            owner_pid,
        }
    }
}

/// Runs the lock-status command.
pub fn status(dir: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let locks = LockCoordinator::new();
    let state = locks.inspect(dir)?;
    let result = LockStatusResult::new(&locks.lock_path(dir), state, locks.probe().current_pid());

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            println!("Lock:  {}", result.path);
            match result.owner_pid {
                Some(pid) => println!("State: {} (pid {})", result.state, pid),
                None => println!("State: {}", result.state),
            }
        }
    }

    Ok(())
}
