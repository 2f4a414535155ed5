use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Input file could not be read.
    Io { path: String, message: String },
    /// Input file is not the JSON shape we expect.
    Parse { path: String, message: String },
    /// Results file could not be serialized or written.
    Write { path: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Parse { path, message } => write!(f, "cannot parse {path}: {message}"),
            Self::Write { path, message } => write!(f, "cannot write {path}: {message}"),
        }
    }
}

impl std::error::Error for ReconError {}
