use aws_sdk_cognitoidentityprovider::config::Region;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, MessageActionType, UserType};
use aws_sdk_cognitoidentityprovider::Client;
use tokio::runtime::Runtime;

use rostersync_recon::{IdentityAccount, Page, PageSource};

use crate::error::AwsError;

/// The identity provider's account store.
pub trait IdentityDirectory {
    /// One page of accounts. `cursor` is the previous page's token.
    fn list_accounts(&self, cursor: Option<&str>) -> Result<Page<IdentityAccount>, AwsError>;

    /// Create an account named by `email`, verified, with no invitation
    /// sent. Returns the new username.
    fn create_account(&self, email: &str, temporary_password: &str) -> Result<String, AwsError>;
}

/// Cognito user pool.
pub struct CognitoDirectory {
    client: Client,
    user_pool_id: String,
    runtime: Runtime,
}

impl CognitoDirectory {
    pub fn connect(user_pool_id: &str, region: &str) -> Result<Self, AwsError> {
        let runtime = crate::runtime()?;
        let sdk_config = crate::load_sdk_config(&runtime);
        let config = aws_sdk_cognitoidentityprovider::config::Builder::from(&sdk_config)
            .region(Region::new(region.to_string()))
            .build();

        log::debug!("cognito pool {user_pool_id} in {region}");
        Ok(Self {
            client: Client::from_conf(config),
            user_pool_id: user_pool_id.to_string(),
            runtime,
        })
    }
}

impl IdentityDirectory for CognitoDirectory {
    fn list_accounts(&self, cursor: Option<&str>) -> Result<Page<IdentityAccount>, AwsError> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_users()
                    .user_pool_id(&self.user_pool_id)
                    .set_pagination_token(cursor.map(String::from))
                    .send(),
            )
            .map_err(|e| AwsError::service("ListUsers", e))?;

        Ok(Page {
            items: output.users().iter().map(identity_of).collect(),
            next: output.pagination_token().map(String::from),
        })
    }

    fn create_account(&self, email: &str, temporary_password: &str) -> Result<String, AwsError> {
        let attribute = |name: &str, value: &str| {
            AttributeType::builder()
                .name(name)
                .value(value)
                .build()
                .map_err(|e| AwsError::Invalid(e.to_string()))
        };

        let output = self
            .runtime
            .block_on(
                self.client
                    .admin_create_user()
                    .user_pool_id(&self.user_pool_id)
                    .username(email)
                    .temporary_password(temporary_password)
                    .message_action(MessageActionType::Suppress)
                    .user_attributes(attribute("email", email)?)
                    .user_attributes(attribute("email_verified", "true")?)
                    .send(),
            )
            .map_err(|e| AwsError::service("AdminCreateUser", e))?;

        Ok(output
            .user()
            .and_then(UserType::username)
            .unwrap_or(email)
            .to_string())
    }
}

fn identity_of(user: &UserType) -> IdentityAccount {
    IdentityAccount {
        username: user.username().unwrap_or_default().to_string(),
        email: user
            .attributes()
            .iter()
            .find(|a| a.name() == "email")
            .and_then(AttributeType::value)
            .map(String::from),
    }
}

/// Adapts a directory to the page-draining contract.
pub struct IdentityPages<'a, D: ?Sized>(pub &'a D);

impl<D: IdentityDirectory + ?Sized> PageSource for IdentityPages<'_, D> {
    type Item = IdentityAccount;
    type Error = AwsError;

    fn label(&self) -> &str {
        "identity accounts"
    }

    fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<IdentityAccount>, AwsError> {
        self.0.list_accounts(cursor)
    }
}
