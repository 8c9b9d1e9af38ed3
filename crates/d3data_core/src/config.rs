//! Configuration for locks, temporary names and the registry.

/// Default organization used to locate the preference directory.
pub const DEFAULT_ORG: &str = "Outrage";

/// Default application used to locate the preference directory.
pub const DEFAULT_APP: &str = "Descent 3";

/// Default name of the registry file inside the preference directory.
pub const REGISTRY_FILE_NAME: &str = ".Descent3Registry";

/// Default name of the lock file inside a locked directory.
pub const LOCK_FILE_NAME: &str = ".lock";

/// Default number of candidates tried for a temporary file name.
pub const TEMP_NAME_ATTEMPTS: usize = 20;

/// Default number of random characters in a temporary file name.
pub const TEMP_NAME_RANDOM_LEN: usize = 10;

/// Configuration shared by the lock coordinator, path utilities and registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Organization name for the preference directory.
    pub org: String,

    /// Application name for the preference directory.
    pub app: String,

    /// Registry file name inside the preference directory.
    pub registry_file_name: String,

    /// Lock file name inside a locked directory.
    pub lock_file_name: String,

    /// How many temporary name candidates to try before giving up.
    pub temp_name_attempts: usize,

    /// Number of random characters in a temporary name.
    pub temp_name_random_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: DEFAULT_ORG.to_string(),
            app: DEFAULT_APP.to_string(),
            registry_file_name: REGISTRY_FILE_NAME.to_string(),
            lock_file_name: LOCK_FILE_NAME.to_string(),
            temp_name_attempts: TEMP_NAME_ATTEMPTS,
            temp_name_random_len: TEMP_NAME_RANDOM_LEN,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the organization name.
    #[must_use]
    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    /// Sets the application name.
    #[must_use]
    pub fn app(mut self, app: impl Into<String>) -> Self {
        self.app = app.into();
        self
    }

    /// Sets the registry file name.
    #[must_use]
    pub fn registry_file_name(mut self, name: impl Into<String>) -> Self {
        self.registry_file_name = name.into();
        self
    }

    /// Sets the lock file name.
    #[must_use]
    pub fn lock_file_name(mut self, name: impl Into<String>) -> Self {
        self.lock_file_name = name.into();
        self
    }

    /// Sets the number of temporary name attempts.
    #[must_use]
    pub const fn temp_name_attempts(mut self, attempts: usize) -> Self {
        self.temp_name_attempts = attempts;
        self
    }

    /// Sets the number of random characters in a temporary name.
    #[must_use]
    pub const fn temp_name_random_len(mut self, len: usize) -> Self {
        self.temp_name_random_len = len;
        self
    }
}
