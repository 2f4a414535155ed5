// Connection config
// Read from amplify_outputs.json, as written by the backend deploy.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Identity provider coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthConfig {
    pub user_pool_id: String,
    pub aws_region: String,
}

/// Data API endpoint and key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default)]
    pub aws_region: Option<String>,
}

/// The parts of `amplify_outputs.json` the commands use. Other keys are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AmplifyOutputs {
    #[serde(default)]
    auth: Option<AuthConfig>,
    #[serde(default)]
    data: Option<DataConfig>,
    #[serde(skip)]
    path: PathBuf,
}

impl AmplifyOutputs {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(ConfigError::Missing { path: display });
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let mut outputs: AmplifyOutputs =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?;
        outputs.path = path.to_path_buf();
        Ok(outputs)
    }

    pub fn auth(&self) -> Result<&AuthConfig, ConfigError> {
        self.auth.as_ref().ok_or_else(|| self.missing("auth"))
    }

    pub fn data(&self) -> Result<&DataConfig, ConfigError> {
        self.data.as_ref().ok_or_else(|| self.missing("data"))
    }

    fn missing(&self, section: &'static str) -> ConfigError {
        ConfigError::MissingSection {
            path: self.path.display().to_string(),
            section,
        }
    }
}
