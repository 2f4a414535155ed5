use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::links::LinkedProfiles;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Role set of an Account, decoded once at the boundary.
///
/// The data API hands roles back as a real array, as JSON text holding an
/// array, as a bare string naming a single role, or as null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles(Vec<String>);

impl Roles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    pub fn decode(value: &Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::Array(items) => Self(items.iter().filter_map(text_of).collect()),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(parsed @ Value::Array(_)) => Self::decode(&parsed),
                Ok(Value::String(single)) => Self(vec![single]),
                _ => Self(vec![raw.clone()]),
            },
            other => Self(text_of(other).into_iter().collect()),
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, role: &str) -> bool {
        let wanted = role.to_uppercase();
        self.0.iter().any(|r| r.to_uppercase() == wanted)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Roles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::decode(&value))
    }
}

// ---------------------------------------------------------------------------
// Remote records
// ---------------------------------------------------------------------------

/// A user record from the data API, mirrored from the identity provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Account {
    /// Record id inside the data API.
    #[serde(rename = "id")]
    pub internal_id: String,
    /// Stable id issued by the identity provider.
    #[serde(rename = "cognitoId", default)]
    pub account_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Roles,
    #[serde(rename = "linkedProfiles", default)]
    pub linked_profiles: LinkedProfiles,
}

/// A per-role extension record owned by an Account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(rename = "userId", default)]
    pub owner_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

/// A work-product record owned by a Profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    #[serde(rename = "studentProfileId", default)]
    pub owner_profile_id: Option<String>,
    #[serde(default)]
    pub week: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// An account as listed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAccount {
    pub username: String,
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// Local records
// ---------------------------------------------------------------------------

/// One record of the local roster export.
///
/// Text fields are read leniently (numbers become text). The fields whose
/// JSON type matters downstream are kept as raw values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RosterEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default)]
    pub experience_years: Option<Value>,
    #[serde(default)]
    pub is_staff: Option<Value>,
    #[serde(default)]
    pub org_name: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_roles: Option<String>,
}

/// One raw entry of the submissions intake file, keyed by `auth_id`.
///
/// Kept as the original JSON object so skipped entries can be reported
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeEntry {
    pub fields: Map<String, Value>,
}

impl IntakeEntry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Present and non-null field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// `auth_id` as text; empty strings count as absent.
    pub fn auth_id(&self) -> Option<String> {
        self.get("auth_id")
            .and_then(text_of)
            .filter(|s| !s.is_empty())
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Render a scalar JSON value as text. Strings are taken as-is, numbers
/// and booleans are formatted; arrays, objects and null yield `None`.
pub(crate) fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_of))
}
