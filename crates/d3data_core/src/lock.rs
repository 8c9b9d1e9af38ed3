//! Directory lock files.
//!
//! A directory is locked by a `.lock` file holding the owner's process id:
//!
//! ```text
//! <dir>/
//! └─ .lock    # "LOCK" + i32 LE owner pid, 8 bytes
//! ```
//!
//! The file alone proves nothing. A lock whose owner process no longer runs
//! is stale and any other process may reclaim it. A file that does not carry
//! the `LOCK` tag is never touched.
//!
//! Liveness is all that is checked: if the owner's pid has been recycled by
//! an unrelated process, the lock still reads as held.

use crate::config::{Config, LOCK_FILE_NAME};
use crate::error::{CoreError, CoreResult};
use crate::process::{ProcessProbe, SystemProbe};
use d3data_codec::LockRecord;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// How a successful acquire came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// No lock existed; a new one was written.
    Created,
    /// The calling process already held the lock.
    AlreadyHeld,
    /// A lock left by a dead process was replaced.
    Reclaimed {
        /// Process id recorded in the stale lock.
        stale_pid: i32,
    },
}

/// How a successful release came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The calling process's lock file was removed.
    Released,
    /// There was no lock file.
    NotLocked,
}

/// The state of a directory's lock as seen by the calling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No lock file exists.
    Unlocked,
    /// The calling process holds the lock.
    HeldBySelf,
    /// A running process holds the lock.
    HeldByOther(i32),
    /// The recorded owner is no longer running.
    Stale(i32),
}

/// Creates, checks and removes lock files.
///
/// # Example
///
/// ```rust,no_run
/// use d3data_core::LockCoordinator;
/// use std::path::Path;
///
/// let locks = LockCoordinator::new();
/// if !locks.acquire_lock(Path::new("/home/pilot/.local/share/descent3")) {
///     eprintln!("another instance is running");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LockCoordinator<P = SystemProbe> {
    probe: P,
    lock_file_name: String,
}

impl Default for LockCoordinator<SystemProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl LockCoordinator<SystemProbe> {
    /// Creates a coordinator that queries the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_probe(SystemProbe)
    }
}

impl<P: ProcessProbe> LockCoordinator<P> {
    /// Creates a coordinator using `probe` for process queries.
    pub fn with_probe(probe: P) -> Self {
        Self {
            probe,
            lock_file_name: LOCK_FILE_NAME.to_string(),
        }
    }

    /// Creates a coordinator taking the lock file name from `config`.
    pub fn with_config(config: &Config, probe: P) -> Self {
        Self {
            probe,
            lock_file_name: config.lock_file_name.clone(),
        }
    }

    /// Returns the probe used for process queries.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Returns the lock file path for `dir`.
    #[must_use]
    pub fn lock_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.lock_file_name)
    }

    /// Acquires the lock on `dir` for the calling process.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotADirectory`] if `dir` is not a directory
    /// - [`CoreError::TruncatedOrCorrupt`] if an existing lock cannot be read
    /// - [`CoreError::NotALockFile`] if the existing file lacks the tag
    /// - [`CoreError::OwnershipConflict`] if a running process holds the lock
    /// - [`CoreError::Io`] if the lock cannot be written
    ///
    /// # Panics
    ///
    /// Panics if an existing lock file carries the tag but no owner.
    pub fn acquire(&self, dir: &Path) -> CoreResult<LockOutcome> {
        if !dir.is_dir() {
            return Err(CoreError::not_a_directory(dir));
        }

        let path = self.lock_path(dir);
        let me = self.probe.current_pid();
        let mut outcome = LockOutcome::Created;

        if path.exists() {
            let record = read_lock(&path)?;

            if record.owner_pid == me {
                return Ok(LockOutcome::AlreadyHeld);
            }

            if self.probe.is_alive(record.owner_pid) {
                return Err(CoreError::OwnershipConflict {
                    path,
                    owner_pid: record.owner_pid,
                });
            }

            debug!(
                path = %path.display(),
                stale_pid = record.owner_pid,
                "replacing stale lock"
            );
            outcome = LockOutcome::Reclaimed {
                stale_pid: record.owner_pid,
            };
        }

        write_lock(&path, LockRecord::owned_by(me))?;

        debug!(path = %path.display(), pid = me, "lock acquired");
        Ok(outcome)
    }

    /// Releases the calling process's lock on `dir`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::TruncatedOrCorrupt`] if the lock cannot be read
    /// - [`CoreError::NotALockFile`] if the file lacks the tag
    /// - [`CoreError::OwnershipConflict`] if another process owns the lock
    /// - [`CoreError::Io`] if the file cannot be removed
    ///
    /// # Panics
    ///
    /// Panics if the lock file carries the tag but no owner.
    pub fn release(&self, dir: &Path) -> CoreResult<ReleaseOutcome> {
        let path = self.lock_path(dir);
        if !path.exists() {
            return Ok(ReleaseOutcome::NotLocked);
        }

        let record = read_lock(&path)?;
        if record.owner_pid != self.probe.current_pid() {
            return Err(CoreError::OwnershipConflict {
                path,
                owner_pid: record.owner_pid,
            });
        }

        fs::remove_file(&path)?;
        debug!(path = %path.display(), "lock released");
        Ok(ReleaseOutcome::Released)
    }

    /// Reports the lock state of `dir` without changing anything.
    ///
    /// # Errors
    ///
    /// Same read errors as [`acquire`](Self::acquire).
    ///
    /// # Panics
    ///
    /// Panics if the lock file carries the tag but no owner.
    pub fn inspect(&self, dir: &Path) -> CoreResult<LockState> {
        if !dir.is_dir() {
            return Err(CoreError::not_a_directory(dir));
        }

        let path = self.lock_path(dir);
        if !path.exists() {
            return Ok(LockState::Unlocked);
        }

        let owner = read_lock(&path)?.owner_pid;
        Ok(if owner == self.probe.current_pid() {
            LockState::HeldBySelf
        } else if self.probe.is_alive(owner) {
            LockState::HeldByOther(owner)
        } else {
            LockState::Stale(owner)
        })
    }

    /// Acquires the lock on `dir`, logging any failure.
    ///
    /// Returns true if the calling process holds the lock afterwards.
    pub fn acquire_lock(&self, dir: &Path) -> bool {
        match self.acquire(dir) {
            Ok(_) => true,
            Err(e) => {
                log_failure("acquire", dir, &e);
                false
            }
        }
    }

    /// Releases the lock on `dir`, logging any failure.
    ///
    /// Returns true if no lock of the calling process remains.
    pub fn release_lock(&self, dir: &Path) -> bool {
        match self.release(dir) {
            Ok(_) => true,
            Err(e) => {
                log_failure("release", dir, &e);
                false
            }
        }
    }

    /// Acquires the lock on `dir` and returns a guard that releases it on drop.
    ///
    /// If the lock was already held by this process the guard leaves it in
    /// place when dropped.
    ///
    /// # Errors
    ///
    /// Same as [`acquire`](Self::acquire).
    pub fn guard(&self, dir: &Path) -> CoreResult<LockGuard<'_, P>> {
        let outcome = self.acquire(dir)?;
        Ok(LockGuard {
            coordinator: self,
            dir: dir.to_path_buf(),
            owned: outcome != LockOutcome::AlreadyHeld,
        })
    }
}

/// Holds a directory lock until dropped.
#[derive(Debug)]
pub struct LockGuard<'a, P: ProcessProbe> {
    coordinator: &'a LockCoordinator<P>,
    dir: PathBuf,
    owned: bool,
}

impl<P: ProcessProbe> LockGuard<'_, P> {
    /// Returns the locked directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl<P: ProcessProbe> Drop for LockGuard<'_, P> {
    fn drop(&mut self) {
        if self.owned {
            self.coordinator.release_lock(&self.dir);
        }
    }
}

/// Acquires the lock on `dir` for the current process.
///
/// See [`LockCoordinator::acquire_lock`].
pub fn acquire_lock(dir: &Path) -> bool {
    LockCoordinator::new().acquire_lock(dir)
}

/// Releases the current process's lock on `dir`.
///
/// See [`LockCoordinator::release_lock`].
pub fn release_lock(dir: &Path) -> bool {
    LockCoordinator::new().release_lock(dir)
}

/// Writes `record` to a per-process sibling and renames it over `path`.
///
/// On failure the sibling is removed and `path` is untouched.
fn write_lock(path: &Path, record: LockRecord) -> CoreResult<()> {
    let temp = lock_temp_path(path, record.owner_pid);
    let written = File::create(&temp).map_err(CoreError::from).and_then(|mut file| {
        record.write_to(&mut file)?;
        file.sync_all()?;
        Ok(())
    });

    match written.and_then(|()| fs::rename(&temp, path).map_err(CoreError::from)) {
        Ok(()) => Ok(()),
        Err(e) => {
            if temp.is_file() {
                let _ = fs::remove_file(&temp);
            }
            Err(e)
        }
    }
}

fn lock_temp_path(path: &Path, pid: i32) -> PathBuf {
    let mut name = path.file_name().map_or_else(OsString::new, OsString::from);
    name.push(format!(".{pid}.tmp"));
    path.with_file_name(name)
}

fn read_lock(path: &Path) -> CoreResult<LockRecord> {
    let file = File::open(path)?;
    let record = LockRecord::read_from(file).map_err(|source| CoreError::TruncatedOrCorrupt {
        path: path.to_path_buf(),
        source,
    })?;

    if !record.has_valid_tag() {
        return Err(CoreError::NotALockFile {
            path: path.to_path_buf(),
        });
    }

    assert!(
        !record.is_unassigned(),
        "lock file {} is tagged but has no owner",
        path.display()
    );
    Ok(record)
}

fn log_failure(op: &str, dir: &Path, e: &CoreError) {
    match e {
        CoreError::OwnershipConflict { owner_pid, .. } => {
            warn!(dir = %dir.display(), owner_pid, "cannot {op} lock held by another process");
        }
        CoreError::NotADirectory { .. } | CoreError::NotALockFile { .. } => {
            warn!(dir = %dir.display(), error = %e, "cannot {op} lock");
        }
        _ => error!(dir = %dir.display(), error = %e, "failed to {op} lock"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    /// A probe with a fixed pid and a scripted set of live processes.
    #[derive(Debug)]
    struct FakeProbe {
        pid: i32,
        alive: HashSet<i32>,
    }

    impl FakeProbe {
        fn new(pid: i32, alive: &[i32]) -> Self {
            Self {
                pid,
                alive: alive.iter().copied().collect(),
            }
        }
    }

    impl ProcessProbe for FakeProbe {
        fn current_pid(&self) -> i32 {
            self.pid
        }

        fn is_alive(&self, pid: i32) -> bool {
            pid == self.pid || self.alive.contains(&pid)
        }
    }

    fn plant_lock(dir: &Path, pid: i32) {
        fs::write(dir.join(".lock"), LockRecord::owned_by(pid).encode()).unwrap();
    }

    fn lock_owner(dir: &Path) -> i32 {
        LockRecord::decode(&fs::read(dir.join(".lock")).unwrap())
            .unwrap()
            .owner_pid
    }

    #[test]
    fn acquire_creates_lock_file() {
        let dir = tempdir().unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert_eq!(locks.acquire(dir.path()).unwrap(), LockOutcome::Created);
        assert_eq!(fs::read(dir.path().join(".lock")).unwrap().len(), 8);
        assert_eq!(lock_owner(dir.path()), 100);
    }

    #[test]
    fn acquire_twice_is_idempotent() {
        let dir = tempdir().unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert!(locks.acquire_lock(dir.path()));
        assert_eq!(locks.acquire(dir.path()).unwrap(), LockOutcome::AlreadyHeld);
        assert_eq!(lock_owner(dir.path()), 100);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn acquire_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));
        let missing = dir.path().join("missing");

        assert!(matches!(
            locks.acquire(&missing),
            Err(CoreError::NotADirectory { .. })
        ));
        assert!(!locks.acquire_lock(&missing));
        assert!(!missing.exists());
    }

    #[test]
    fn acquire_reclaims_stale_lock() {
        let dir = tempdir().unwrap();
        plant_lock(dir.path(), 555);
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert_eq!(
            locks.acquire(dir.path()).unwrap(),
            LockOutcome::Reclaimed { stale_pid: 555 }
        );
        assert_eq!(lock_owner(dir.path()), 100);
    }

    #[test]
    fn acquire_respects_live_owner() {
        let dir = tempdir().unwrap();
        plant_lock(dir.path(), 555);
        let before = fs::read(dir.path().join(".lock")).unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[555]));

        assert!(matches!(
            locks.acquire(dir.path()),
            Err(CoreError::OwnershipConflict { owner_pid: 555, .. })
        ));
        assert!(!locks.acquire_lock(dir.path()));
        assert_eq!(fs::read(dir.path().join(".lock")).unwrap(), before);
    }

    #[test]
    fn acquire_refuses_truncated_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".lock"), b"LOC").unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert!(matches!(
            locks.acquire(dir.path()),
            Err(CoreError::TruncatedOrCorrupt { .. })
        ));
        assert_eq!(fs::read(dir.path().join(".lock")).unwrap(), b"LOC");
    }

    #[test]
    fn acquire_refuses_foreign_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".lock"), b"JUNKJUNK").unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert!(matches!(
            locks.acquire(dir.path()),
            Err(CoreError::NotALockFile { .. })
        ));
        assert_eq!(fs::read(dir.path().join(".lock")).unwrap(), b"JUNKJUNK");
    }

    #[test]
    fn failed_write_leaves_no_lock() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".lock.100.tmp")).unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert!(matches!(locks.acquire(dir.path()), Err(CoreError::Io(_))));
        assert!(!dir.path().join(".lock").exists());
        assert!(!locks.acquire_lock(dir.path()));
    }

    #[test]
    fn failed_write_keeps_stale_lock() {
        let dir = tempdir().unwrap();
        plant_lock(dir.path(), 555);
        fs::create_dir(dir.path().join(".lock.100.tmp")).unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert!(locks.acquire(dir.path()).is_err());
        assert_eq!(lock_owner(dir.path()), 555);
    }

    #[test]
    fn acquire_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        plant_lock(dir.path(), 555);
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        locks.acquire(dir.path()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from(".lock")]);
    }

    #[test]
    #[should_panic(expected = "tagged but has no owner")]
    fn acquire_panics_on_unassigned_owner() {
        let dir = tempdir().unwrap();
        plant_lock(dir.path(), -1);
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));
        let _ = locks.acquire(dir.path());
    }

    #[test]
    fn release_without_lock_succeeds() {
        let dir = tempdir().unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));
        assert_eq!(locks.release(dir.path()).unwrap(), ReleaseOutcome::NotLocked);
        assert!(locks.release_lock(dir.path()));
    }

    #[test]
    fn release_removes_own_lock() {
        let dir = tempdir().unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));
        locks.acquire(dir.path()).unwrap();

        assert_eq!(locks.release(dir.path()).unwrap(), ReleaseOutcome::Released);
        assert!(!dir.path().join(".lock").exists());
    }

    #[test]
    fn release_refuses_foreign_owner() {
        let dir = tempdir().unwrap();
        plant_lock(dir.path(), 555);
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert!(!locks.release_lock(dir.path()));
        assert!(dir.path().join(".lock").exists());
        assert_eq!(lock_owner(dir.path()), 555);
    }

    #[test]
    fn release_refuses_foreign_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".lock"), b"NOTALOCK").unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        assert!(matches!(
            locks.release(dir.path()),
            Err(CoreError::NotALockFile { .. })
        ));
        assert!(dir.path().join(".lock").exists());
    }

    #[test]
    fn inspect_reports_each_state() {
        let dir = tempdir().unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[555]));

        assert_eq!(locks.inspect(dir.path()).unwrap(), LockState::Unlocked);

        plant_lock(dir.path(), 100);
        assert_eq!(locks.inspect(dir.path()).unwrap(), LockState::HeldBySelf);

        plant_lock(dir.path(), 555);
        assert_eq!(locks.inspect(dir.path()).unwrap(), LockState::HeldByOther(555));

        plant_lock(dir.path(), 777);
        assert_eq!(locks.inspect(dir.path()).unwrap(), LockState::Stale(777));
        assert_eq!(lock_owner(dir.path()), 777);
    }

    #[test]
    fn guard_releases_on_drop() {
        let dir = tempdir().unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));

        {
            let guard = locks.guard(dir.path()).unwrap();
            assert_eq!(guard.dir(), dir.path());
            assert!(dir.path().join(".lock").exists());
        }
        assert!(!dir.path().join(".lock").exists());
    }

    #[test]
    fn guard_keeps_lock_it_did_not_take() {
        let dir = tempdir().unwrap();
        let locks = LockCoordinator::with_probe(FakeProbe::new(100, &[]));
        locks.acquire(dir.path()).unwrap();

        drop(locks.guard(dir.path()).unwrap());
        assert!(dir.path().join(".lock").exists());
    }

    #[test]
    fn custom_lock_file_name() {
        let dir = tempdir().unwrap();
        let config = Config::new().lock_file_name("LOCK");
        let locks = LockCoordinator::with_config(&config, FakeProbe::new(100, &[]));

        locks.acquire(dir.path()).unwrap();
        assert!(dir.path().join("LOCK").exists());
        assert!(!dir.path().join(".lock").exists());
    }
}
