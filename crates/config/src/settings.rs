// Run settings
// Loaded from <root>/rostersync.toml, then ~/.config/rostersync/settings.toml

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const PROJECT_FILE: &str = "rostersync.toml";

/// Input and output locations, relative to the run root unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub roster: PathBuf,
    pub intake: PathBuf,
    pub amplify_outputs: PathBuf,
    pub results_dir: PathBuf,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            roster: PathBuf::from("scripts/students.json"),
            intake: PathBuf::from("scripts/submissions.json"),
            amplify_outputs: PathBuf::from("amplify_outputs.json"),
            results_dir: PathBuf::from("scripts"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Accounts carrying this role get a profile (case-insensitive).
    pub role: String,
    /// `type` written into `linkedProfiles` entries.
    pub link_type: String,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            role: "student".into(),
            link_type: "Profile".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    /// Exact `user_roles` value a roster entry needs.
    pub role: String,
    pub email_suffix: Option<String>,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            role: "student".into(),
            email_suffix: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RosterTableSettings {
    pub name: String,
    pub region: String,
    pub endpoint_url: Option<String>,
}

impl Default for RosterTableSettings {
    fn default() -> Self {
        Self {
            name: "GauntletStudents".into(),
            region: "us-east-1".into(),
            endpoint_url: None,
        }
    }
}

/// Fixed delays between remote calls, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub profile_pages_ms: u64,
    pub submission_pages_ms: u64,
    pub identity_pages_ms: u64,
    pub profile_create_ms: u64,
    pub submission_create_ms: u64,
    pub account_create_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            profile_pages_ms: 200,
            submission_pages_ms: 500,
            identity_pages_ms: 100,
            profile_create_ms: 200,
            submission_create_ms: 1000,
            account_create_ms: 200,
        }
    }
}

impl Pacing {
    /// No delays anywhere.
    pub fn none() -> Self {
        Self {
            profile_pages_ms: 0,
            submission_pages_ms: 0,
            identity_pages_ms: 0,
            profile_create_ms: 0,
            submission_create_ms: 0,
            account_create_ms: 0,
        }
    }

    pub fn profile_pages(&self) -> Duration {
        Duration::from_millis(self.profile_pages_ms)
    }

    pub fn submission_pages(&self) -> Duration {
        Duration::from_millis(self.submission_pages_ms)
    }

    pub fn identity_pages(&self) -> Duration {
        Duration::from_millis(self.identity_pages_ms)
    }

    pub fn profile_create(&self) -> Duration {
        Duration::from_millis(self.profile_create_ms)
    }

    pub fn submission_create(&self) -> Duration {
        Duration::from_millis(self.submission_create_ms)
    }

    pub fn account_create(&self) -> Duration {
        Duration::from_millis(self.account_create_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub files: FileSettings,
    pub profiles: ProfileSettings,
    pub identities: IdentitySettings,
    pub roster_table: RosterTableSettings,
    pub pacing: Pacing,
}

impl Settings {
    /// User-level settings file.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rostersync").join("settings.toml"))
    }

    /// First settings file found: the project file under `root`, then the
    /// user file. Defaults when neither exists.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_from(root, Self::user_path())
    }

    pub fn load_from(root: &Path, user_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let candidates = std::iter::once(root.join(PROJECT_FILE)).chain(user_path);

        for path in candidates {
            if path.is_file() {
                log::debug!("settings from {}", path.display());
                return Self::from_file(&path);
            }
        }
        log::debug!("no settings file; using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Resolve a configured path against the run root.
    pub fn resolve(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}
