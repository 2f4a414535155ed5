// GraphQL documents. Selection sets list only the fields the commands read.

pub(crate) const LIST_USERS: &str = r#"
query ListUsers($limit: Int, $nextToken: String) {
  listUsers(limit: $limit, nextToken: $nextToken) {
    items { id cognitoId email roles linkedProfiles }
    nextToken
  }
}"#;

pub(crate) const GET_USER: &str = r#"
query GetUser($id: ID!) {
  getUser(id: $id) { id cognitoId email roles linkedProfiles }
}"#;

pub(crate) const UPDATE_USER: &str = r#"
mutation UpdateUser($input: UpdateUserInput!) {
  updateUser(input: $input) { id cognitoId email linkedProfiles }
}"#;

pub(crate) const CREATE_USER: &str = r#"
mutation CreateUser($input: CreateUserInput!) {
  createUser(input: $input) { id cognitoId email }
}"#;

pub(crate) const LIST_USER_BY_COGNITO_ID: &str = r#"
query ListUserByCognitoId($cognitoId: String!) {
  listUserByCognitoId(cognitoId: $cognitoId) {
    items { id cognitoId email roles linkedProfiles }
  }
}"#;

pub(crate) const LIST_STUDENT_PROFILES: &str = r#"
query ListStudentProfiles($limit: Int, $nextToken: String) {
  listStudentProfiles(limit: $limit, nextToken: $nextToken) {
    items { id userId firstName lastName contactEmail }
    nextToken
  }
}"#;

pub(crate) const GET_STUDENT_PROFILE: &str = r#"
query GetStudentProfile($id: ID!) {
  getStudentProfile(id: $id) {
    id userId firstName lastName title bio location experienceYears
    contactEmail isStaff orgName
  }
}"#;

pub(crate) const CREATE_STUDENT_PROFILE: &str = r#"
mutation CreateStudentProfile($input: CreateStudentProfileInput!) {
  createStudentProfile(input: $input) { id userId firstName lastName contactEmail }
}"#;

pub(crate) const LIST_SUBMISSIONS: &str = r#"
query ListSubmissions($limit: Int, $nextToken: String) {
  listSubmissions(limit: $limit, nextToken: $nextToken) {
    items { id studentProfileId week status title }
    nextToken
  }
}"#;

pub(crate) const CREATE_SUBMISSION: &str = r#"
mutation CreateSubmission($input: CreateSubmissionInput!) {
  createSubmission(input: $input) { id title description studentProfileId status week }
}"#;
