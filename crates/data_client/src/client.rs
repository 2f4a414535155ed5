//! GraphQL transport: one POST per operation, `x-api-key` auth, and error
//! classification into transport vs application failures.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use rostersync_recon::Page;

/// Items requested per list page.
pub const PAGE_LIMIT: u32 = 100;

const USER_AGENT: &str = concat!("rostersync/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-api-key";

/// Data API client (blocking).
#[derive(Clone)]
pub struct DataClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

/// One entry of a GraphQL `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphqlError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "errorType", default)]
    pub error_type: Option<String>,
}

impl std::fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_type {
            Some(kind) => write!(f, "{}: {}", kind, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Error type for data API operations.
#[derive(Debug)]
pub enum DataApiError {
    /// Request never produced a response
    Network(String),
    /// Non-2xx status with response body
    Http(u16, String),
    /// Well-formed response carrying an `errors` list
    Graphql(Vec<GraphqlError>),
    /// Response body is not the expected JSON shape
    Parse(String),
    /// Response had no `data.<field>`
    MissingData(String),
}

impl DataApiError {
    /// Network and HTTP failures; everything else came back from the API.
    pub fn is_transport(&self) -> bool {
        matches!(self, DataApiError::Network(_) | DataApiError::Http(..))
    }
}

impl std::fmt::Display for DataApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataApiError::Network(msg) => write!(f, "Network error: {}", msg),
            DataApiError::Http(code, body) => write!(f, "HTTP {}: {}", code, body),
            DataApiError::Graphql(errors) => {
                let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "GraphQL error: {}", joined.join("; "))
            }
            DataApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            DataApiError::MissingData(field) => write!(f, "Response has no data for {}", field),
        }
    }
}

impl std::error::Error for DataApiError {}

impl DataClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, DataApiError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataApiError::Network(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one query or mutation and return its `data` object.
    ///
    /// An `errors` list fails the call even when partial `data` is present.
    pub fn execute(&self, query: &str, variables: Value) -> Result<Value, DataApiError> {
        let body = json!({ "query": query, "variables": variables });
        log::debug!("POST {} variables={}", self.endpoint, body["variables"]);

        let response = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| DataApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().unwrap_or_default();
            return Err(DataApiError::Http(status, text));
        }

        let mut result: Value = response
            .json()
            .map_err(|e| DataApiError::Parse(e.to_string()))?;

        match result.get("errors") {
            None | Some(Value::Null) => {}
            Some(errors) => {
                let parsed = serde_json::from_value::<Vec<GraphqlError>>(errors.clone())
                    .unwrap_or_else(|_| {
                        vec![GraphqlError {
                            message: errors.to_string(),
                            error_type: None,
                        }]
                    });
                return Err(DataApiError::Graphql(parsed));
            }
        }

        match result.get_mut("data").map(Value::take) {
            Some(data @ Value::Object(_)) => Ok(data),
            _ => Err(DataApiError::MissingData("data".into())),
        }
    }

    /// Run an operation and deserialize `data.<field>`. A null field maps
    /// to `None`.
    pub(crate) fn field<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> Result<Option<T>, DataApiError> {
        let mut data = self.execute(query, variables)?;
        match data.get_mut(field).map(Value::take) {
            None => Err(DataApiError::MissingData(field.to_string())),
            Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DataApiError::Parse(format!("{}: {}", field, e))),
        }
    }

    /// Like [`field`](Self::field) but a null result is an error. Used for
    /// mutations, which always echo the written record.
    pub(crate) fn required<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> Result<T, DataApiError> {
        self.field(query, variables, field)?
            .ok_or_else(|| DataApiError::MissingData(field.to_string()))
    }

    /// Fetch one page of a `list*` connection. `nextToken` is only sent
    /// when continuing.
    pub(crate) fn list_page<T: DeserializeOwned>(
        &self,
        query: &str,
        field: &str,
        extra: Map<String, Value>,
        cursor: Option<&str>,
    ) -> Result<Page<T>, DataApiError> {
        let mut variables = extra;
        variables.insert("limit".into(), json!(PAGE_LIMIT));
        if let Some(token) = cursor {
            variables.insert("nextToken".into(), json!(token));
        }

        let connection: Connection<T> = self.required(query, Value::Object(variables), field)?;
        Ok(Page {
            items: connection.items.into_iter().flatten().collect(),
            next: connection.next_token,
        })
    }
}

#[derive(Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<T>>,
    #[serde(rename = "nextToken", default)]
    next_token: Option<String>,
}
