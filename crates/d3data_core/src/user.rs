//! Current user lookup.

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users};

/// Name reported when the OS cannot name the current user.
pub const UNKNOWN_USER: &str = "Unknown";

/// Returns the name of the user running this process, or `"Unknown"`.
#[must_use]
pub fn current_user_name() -> String {
    lookup_current_user().unwrap_or_else(|| UNKNOWN_USER.to_string())
}

fn lookup_current_user() -> Option<String> {
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::new().with_user(UpdateKind::Always),
    );

    let process = system.process(pid)?;
    let uid = process.effective_user_id().or_else(|| process.user_id())?;

    let users = Users::new_with_refreshed_list();
    let name = users.get_user_by_id(uid)?.name();
    (!name.is_empty()).then(|| name.to_string())
}
