//! AWS collaborators: the Cognito user pool (identity provider) and the
//! DynamoDB roster table (key-value store).
//!
//! The SDK is async; each client owns a current-thread Tokio runtime and
//! blocks on every call, so callers stay sequential.

mod cognito;
mod dynamo;
mod error;
mod password;

pub use cognito::{CognitoDirectory, IdentityDirectory, IdentityPages};
pub use dynamo::{json_to_attribute, DynamoStore, RecordStore};
pub use error::AwsError;
pub use password::{generate_temporary_password, temporary_password_with, SPECIAL_CHARS};

fn runtime() -> Result<tokio::runtime::Runtime, AwsError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AwsError::Config(format!("cannot start async runtime: {e}")))
}

/// Shared SDK config (credentials chain, retry defaults).
fn load_sdk_config(runtime: &tokio::runtime::Runtime) -> aws_config::SdkConfig {
    runtime.block_on(aws_config::defaults(aws_config::BehaviorVersion::latest()).load())
}
