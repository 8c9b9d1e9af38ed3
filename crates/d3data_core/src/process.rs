//! Process identity and liveness queries.

use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

/// Answers questions about processes on this machine.
///
/// The lock coordinator only ever asks two things: who am I, and is the
/// process with this id still running.
pub trait ProcessProbe {
    /// Returns the id of the calling process.
    fn current_pid(&self) -> i32;

    /// Returns true if a process with `pid` is currently running.
    fn is_alive(&self, pid: i32) -> bool;
}

/// [`ProcessProbe`] backed by the operating system.
///
/// Liveness refreshes only the requested process. Zombies count as dead.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl ProcessProbe for SystemProbe {
    fn current_pid(&self) -> i32 {
        i32::try_from(std::process::id()).unwrap_or(i32::MAX)
    }

    fn is_alive(&self, pid: i32) -> bool {
        let Ok(raw) = u32::try_from(pid) else {
            return false;
        };
        if raw == 0 {
            return false;
        }

        let pid = Pid::from_u32(raw);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::new(),
        );

        system
            .process(pid)
            .is_some_and(|process| process.status() != ProcessStatus::Zombie)
    }
}
