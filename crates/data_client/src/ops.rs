//! Typed operations over [`DataClient::execute`].

use serde::Deserialize;
use serde_json::{json, Map, Value};

use rostersync_recon::{
    Account, AccountInput, LinkedProfiles, Page, Profile, ProfileInput, Submission,
    SubmissionInput,
};

use crate::client::{DataApiError, DataClient};
use crate::queries;

/// Echo of a `createUser` mutation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedUser {
    pub id: String,
    #[serde(rename = "cognitoId", default)]
    pub cognito_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Items<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<T>>,
}

impl DataClient {
    // ── Users ───────────────────────────────────────────────────────

    pub fn list_users_page(&self, cursor: Option<&str>) -> Result<Page<Account>, DataApiError> {
        self.list_page(queries::LIST_USERS, "listUsers", Map::new(), cursor)
    }

    /// Fresh read of one user. `None` when the id does not exist.
    pub fn get_user(&self, id: &str) -> Result<Option<Account>, DataApiError> {
        self.field(queries::GET_USER, json!({ "id": id }), "getUser")
    }

    /// Overwrite `linkedProfiles` with the given set, encoded as JSON text.
    pub fn update_user_linked_profiles(
        &self,
        id: &str,
        linked: &LinkedProfiles,
    ) -> Result<(), DataApiError> {
        let variables = json!({
            "input": { "id": id, "linkedProfiles": linked.to_json_text() }
        });
        let _: Value = self.required(queries::UPDATE_USER, variables, "updateUser")?;
        Ok(())
    }

    pub fn create_user(&self, input: &AccountInput) -> Result<CreatedUser, DataApiError> {
        self.required(queries::CREATE_USER, json!({ "input": input }), "createUser")
    }

    pub fn list_user_by_cognito_id(&self, cognito_id: &str) -> Result<Vec<Account>, DataApiError> {
        let found: Option<Items<Account>> = self.field(
            queries::LIST_USER_BY_COGNITO_ID,
            json!({ "cognitoId": cognito_id }),
            "listUserByCognitoId",
        )?;
        Ok(found
            .map(|list| list.items.into_iter().flatten().collect())
            .unwrap_or_default())
    }

    // ── Student profiles ────────────────────────────────────────────

    pub fn list_student_profiles_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<Page<Profile>, DataApiError> {
        self.list_page(
            queries::LIST_STUDENT_PROFILES,
            "listStudentProfiles",
            Map::new(),
            cursor,
        )
    }

    /// Full profile record as returned by the API.
    pub fn get_student_profile(&self, id: &str) -> Result<Option<Value>, DataApiError> {
        self.field(queries::GET_STUDENT_PROFILE, json!({ "id": id }), "getStudentProfile")
    }

    pub fn create_student_profile(&self, input: &ProfileInput) -> Result<Profile, DataApiError> {
        self.required(
            queries::CREATE_STUDENT_PROFILE,
            json!({ "input": input }),
            "createStudentProfile",
        )
    }

    // ── Submissions ─────────────────────────────────────────────────

    pub fn list_submissions_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<Page<Submission>, DataApiError> {
        self.list_page(queries::LIST_SUBMISSIONS, "listSubmissions", Map::new(), cursor)
    }

    pub fn create_submission(&self, input: &SubmissionInput) -> Result<Submission, DataApiError> {
        self.required(
            queries::CREATE_SUBMISSION,
            json!({ "input": input }),
            "createSubmission",
        )
    }
}
