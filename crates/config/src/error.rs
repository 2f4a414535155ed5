use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Required file does not exist.
    Missing { path: String },
    Read { path: String, message: String },
    Parse { path: String, message: String },
    /// A section the command needs is absent.
    MissingSection { path: String, section: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing { path } => write!(f, "config file not found: {path}"),
            ConfigError::Read { path, message } => write!(f, "cannot read {path}: {message}"),
            ConfigError::Parse { path, message } => write!(f, "invalid config {path}: {message}"),
            ConfigError::MissingSection { path, section } => {
                write!(f, "{path} has no `{section}` section")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
