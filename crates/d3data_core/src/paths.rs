//! Filesystem path utilities.
//!
//! - enumerating files of one directory by name pattern
//! - generating unused temporary file names
//! - resolving the writable preference directory and the executable's
//!   directory

use crate::config::{Config, TEMP_NAME_ATTEMPTS, TEMP_NAME_RANDOM_LEN};
use crate::error::{CoreError, CoreResult};
use directories::BaseDirs;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Extension appended to generated temporary file names.
pub const TEMP_EXTENSION: &str = ".tmp";

/// A file name pattern that must match the whole name.
#[derive(Debug, Clone)]
pub struct FilePattern {
    regex: Regex,
}

impl FilePattern {
    /// Compiles a regular expression, anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPattern`] if the expression is invalid.
    pub fn regex(pattern: &str) -> CoreResult<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { regex })
    }

    /// Compiles a glob where `*` matches any run of characters and `?`
    /// matches one character.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPattern`] if the translated expression is
    /// invalid.
    pub fn glob(glob: &str) -> CoreResult<Self> {
        Self::regex(&glob_to_regex(glob))
    }

    /// Returns true if `name` matches the whole pattern.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Translates a glob into an unanchored regular expression.
#[must_use]
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut literal = [0u8; 4];

    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }

    out
}

/// Calls `visit` with the full path of every regular file in `dir` whose
/// name matches `pattern`.
///
/// Symlinks are followed when deciding whether an entry is a regular file.
/// Subdirectories are neither visited nor descended into. Order is whatever
/// the platform's directory listing yields. Does nothing if `dir` is not a
/// directory.
pub fn enumerate_matching_files<F>(dir: &Path, pattern: &FilePattern, mut visit: F)
where
    F: FnMut(&Path),
{
    if !dir.is_dir() {
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "cannot list directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }

        let name = entry.file_name();
        if pattern.matches(&name.to_string_lossy()) {
            visit(&path);
        }
    }
}

/// Collects the paths [`enumerate_matching_files`] would visit.
#[must_use]
pub fn collect_matching_files(dir: &Path, pattern: &FilePattern) -> Vec<PathBuf> {
    let mut found = Vec::new();
    enumerate_matching_files(dir, pattern, |path| found.push(path.to_path_buf()));
    found
}

/// Returns an unused path `base_dir/<prefix><10 random alphanumerics>.tmp`.
///
/// Tries 20 candidates and returns `None` if every one already exists.
/// The file is not created.
#[must_use]
pub fn generate_temp_file_name(base_dir: &Path, prefix: &str) -> Option<PathBuf> {
    generate_temp_file_name_with(
        &mut rand::thread_rng(),
        base_dir,
        prefix,
        TEMP_NAME_ATTEMPTS,
        TEMP_NAME_RANDOM_LEN,
    )
}

/// [`generate_temp_file_name`] with the limits taken from `config`.
#[must_use]
pub fn generate_temp_file_name_for(
    config: &Config,
    base_dir: &Path,
    prefix: &str,
) -> Option<PathBuf> {
    generate_temp_file_name_with(
        &mut rand::thread_rng(),
        base_dir,
        prefix,
        config.temp_name_attempts,
        config.temp_name_random_len,
    )
}

/// [`generate_temp_file_name`] with an explicit generator and limits.
pub fn generate_temp_file_name_with<R: Rng>(
    rng: &mut R,
    base_dir: &Path,
    prefix: &str,
    attempts: usize,
    random_len: usize,
) -> Option<PathBuf> {
    for _ in 0..attempts {
        let candidate = temp_candidate(rng, base_dir, prefix, random_len);
        if !candidate.exists() {
            return Some(candidate);
        }
    }

    debug!(
        base_dir = %base_dir.display(),
        prefix,
        attempts,
        "no unused temporary name found"
    );
    None
}

fn temp_candidate<R: Rng>(
    rng: &mut R,
    base_dir: &Path,
    prefix: &str,
    random_len: usize,
) -> PathBuf {
    let random: String = (0..random_len)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();

    let mut name = OsString::from(prefix);
    name.push(random);
    name.push(TEMP_EXTENSION);
    base_dir.join(name)
}

/// Resolves OS directories.
pub trait DirectoryResolver {
    /// Returns the per-user writable directory for `org`/`app`.
    fn preference_dir(&self, org: &str, app: &str) -> Option<PathBuf>;

    /// Returns the directory containing the running executable.
    fn executable_base_dir(&self) -> Option<PathBuf>;
}

/// [`DirectoryResolver`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsDirectories;

impl DirectoryResolver for OsDirectories {
    fn preference_dir(&self, org: &str, app: &str) -> Option<PathBuf> {
        writable_preference_directory(org, app)
    }

    fn executable_base_dir(&self) -> Option<PathBuf> {
        executable_base_directory()
    }
}

/// Returns the canonical per-user writable data directory for `org`/`app`,
/// creating it if needed.
///
/// The directory is `<data dir>/<org>/<app>`, e.g.
/// `~/.local/share/Outrage/Descent 3` on Linux and
/// `%APPDATA%\Outrage\Descent 3` on Windows. An empty `org` is skipped.
///
/// Logs and returns `None` on failure.
#[must_use]
pub fn writable_preference_directory(org: &str, app: &str) -> Option<PathBuf> {
    match resolve_preference_directory(org, app) {
        Ok(path) => Some(path),
        Err(e) => {
            error!(org, app, error = %e, "failed to get writable preference path");
            None
        }
    }
}

fn resolve_preference_directory(org: &str, app: &str) -> CoreResult<PathBuf> {
    let base = BaseDirs::new().ok_or(CoreError::DirectoryUnavailable {
        which: "preference",
    })?;

    let mut dir = base.data_dir().to_path_buf();
    if !org.is_empty() {
        dir.push(org);
    }
    dir.push(app);

    fs::create_dir_all(&dir)?;
    Ok(dir.canonicalize()?)
}

/// Returns the canonical directory containing the running executable.
///
/// Logs and returns `None` on failure.
#[must_use]
pub fn executable_base_directory() -> Option<PathBuf> {
    match resolve_executable_base_directory() {
        Ok(path) => Some(path),
        Err(e) => {
            error!(error = %e, "failed to get parent path of executable");
            None
        }
    }
}

fn resolve_executable_base_directory() -> CoreResult<PathBuf> {
    let exe = std::env::current_exe()?;
    let parent = exe.parent().ok_or(CoreError::DirectoryUnavailable {
        which: "executable base",
    })?;
    Ok(parent.canonicalize()?)
}
