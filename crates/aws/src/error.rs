use std::fmt;

#[derive(Debug)]
pub enum AwsError {
    /// Client could not be set up.
    Config(String),
    /// A service call failed (network, auth, validation).
    Service {
        operation: &'static str,
        message: String,
    },
    /// A record could not be converted for the store.
    Invalid(String),
}

impl AwsError {
    pub(crate) fn service<E: std::error::Error>(operation: &'static str, err: E) -> Self {
        AwsError::Service {
            operation,
            message: aws_sdk_dynamodb::error::DisplayErrorContext(&err).to_string(),
        }
    }
}

impl fmt::Display for AwsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwsError::Config(msg) => write!(f, "AWS setup failed: {msg}"),
            AwsError::Service { operation, message } => write!(f, "{operation} failed: {message}"),
            AwsError::Invalid(msg) => write!(f, "invalid record: {msg}"),
        }
    }
}

impl std::error::Error for AwsError {}
