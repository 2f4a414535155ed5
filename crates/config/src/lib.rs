// Configuration loading

pub mod amplify;
pub mod error;
pub mod settings;

pub use amplify::{AmplifyOutputs, AuthConfig, DataConfig};
pub use error::ConfigError;
pub use settings::{
    FileSettings, IdentitySettings, Pacing, ProfileSettings, RosterTableSettings, Settings,
};
