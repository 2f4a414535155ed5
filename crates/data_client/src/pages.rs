use rostersync_recon::{Account, Page, PageSource, Profile, Submission};

use crate::client::{DataApiError, DataClient};

/// `listUsers`, page by page.
pub struct UserPages<'a>(pub &'a DataClient);

/// `listStudentProfiles`, page by page.
pub struct ProfilePages<'a>(pub &'a DataClient);

/// `listSubmissions`, page by page.
pub struct SubmissionPages<'a>(pub &'a DataClient);

impl PageSource for UserPages<'_> {
    type Item = Account;
    type Error = DataApiError;

    fn label(&self) -> &str {
        "users"
    }

    fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Account>, DataApiError> {
        self.0.list_users_page(cursor)
    }
}

impl PageSource for ProfilePages<'_> {
    type Item = Profile;
    type Error = DataApiError;

    fn label(&self) -> &str {
        "student profiles"
    }

    fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Profile>, DataApiError> {
        self.0.list_student_profiles_page(cursor)
    }
}

impl PageSource for SubmissionPages<'_> {
    type Item = Submission;
    type Error = DataApiError;

    fn label(&self) -> &str {
        "submissions"
    }

    fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Submission>, DataApiError> {
        self.0.list_submissions_page(cursor)
    }
}
