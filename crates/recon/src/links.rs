//! `linkedProfiles` back-references on an Account.
//!
//! Stored remotely as JSON text. Decoded once into [`LinkedProfiles`];
//! every merge is a set-union keyed by profile id.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A `{type, id}` reference to a profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl ProfileLink {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    fn to_object(&self) -> Map<String, Value> {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.kind.clone()));
        obj.insert("id".into(), Value::String(self.id.clone()));
        obj
    }
}

/// One element of the stored sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEntry {
    /// An object carrying a string `id`. The full object is kept so that
    /// unknown keys survive a write-back.
    Linked { id: String, raw: Map<String, Value> },
    /// Anything else. Written back verbatim, never used for dedup.
    Opaque(Value),
}

impl LinkEntry {
    fn from_object(obj: &Map<String, Value>) -> Self {
        match obj.get("id").and_then(Value::as_str) {
            Some(id) => LinkEntry::Linked {
                id: id.to_string(),
                raw: obj.clone(),
            },
            None => LinkEntry::Opaque(Value::Object(obj.clone())),
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            LinkEntry::Linked { id, .. } => Some(id),
            LinkEntry::Opaque(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            LinkEntry::Linked { raw, .. } => Value::Object(raw.clone()),
            LinkEntry::Opaque(v) => v.clone(),
        }
    }
}

/// Ordered, id-unique sequence of profile back-references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedProfiles {
    entries: Vec<LinkEntry>,
}

impl LinkedProfiles {
    /// Decode whatever shape the field arrived in. Unparseable text decodes
    /// to an empty sequence.
    pub fn decode(value: &Value) -> Self {
        let mut linked = Self::default();
        match value {
            Value::String(raw) => {
                if let Ok(parsed @ Value::Array(_)) = serde_json::from_str::<Value>(raw) {
                    linked.absorb(&parsed);
                }
            }
            Value::Array(_) => linked.absorb(value),
            _ => {}
        }
        linked
    }

    /// The store coerces the written text into a one-element list, so an
    /// element may itself be a whole encoded sequence. Nested sequences are
    /// flattened into this one.
    fn absorb(&mut self, value: &Value) {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.absorb(item);
                }
            }
            Value::Object(obj) => self.push_entry(LinkEntry::from_object(obj)),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(parsed @ Value::Array(_)) => self.absorb(&parsed),
                Ok(Value::Object(obj)) if obj.get("id").and_then(Value::as_str).is_some() => {
                    self.push_entry(LinkEntry::from_object(&obj))
                }
                _ => self.push_entry(LinkEntry::Opaque(value.clone())),
            },
            other => self.push_entry(LinkEntry::Opaque(other.clone())),
        }
    }

    fn push_entry(&mut self, entry: LinkEntry) {
        if let Some(id) = entry.id() {
            if self.contains_id(id) {
                return;
            }
        }
        self.entries.push(entry);
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id() == Some(id))
    }

    /// Merge a link in. Returns `false` when an entry with the same id is
    /// already present (the set is left unchanged).
    pub fn merge(&mut self, link: &ProfileLink) -> bool {
        if self.contains_id(&link.id) {
            return false;
        }
        self.entries.push(LinkEntry::Linked {
            id: link.id.clone(),
            raw: link.to_object(),
        });
        true
    }

    /// Ids of all well-formed entries, in stored order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(LinkEntry::id)
    }

    pub fn entries(&self) -> &[LinkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.entries.iter().map(LinkEntry::to_value).collect())
    }

    /// Storage encoding: the whole sequence as one JSON text.
    pub fn to_json_text(&self) -> String {
        self.to_value().to_string()
    }
}

impl<'de> Deserialize<'de> for LinkedProfiles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::decode(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_json_text_array() {
        let linked = LinkedProfiles::decode(&json!(r#"[{"type":"Profile","id":"p1"}]"#));
        assert_eq!(linked.ids().collect::<Vec<_>>(), vec!["p1"]);
    }

    #[test]
    fn decode_array_of_json_text_elements() {
        let linked = LinkedProfiles::decode(&json!([
            r#"{"type":"Profile","id":"p1"}"#,
            {"type": "Profile", "id": "p2"}
        ]));
        assert_eq!(linked.ids().collect::<Vec<_>>(), vec!["p1", "p2"]);
    }

    #[test]
    fn decode_garbage_text_is_empty() {
        assert!(LinkedProfiles::decode(&json!("not json")).is_empty());
    }

    #[test]
    fn decode_collapses_stored_duplicates() {
        let linked = LinkedProfiles::decode(&json!([
            {"type": "Profile", "id": "p1"},
            {"type": "StudentProfile", "id": "p1"}
        ]));
        assert_eq!(linked.len(), 1);
    }

    #[test]
    fn opaque_entries_survive_round_trip() {
        let linked = LinkedProfiles::decode(&json!([42, {"type": "Profile", "id": "p1", "extra": true}]));
        assert_eq!(linked.len(), 2);
        assert_eq!(
            linked.to_value(),
            json!([42, {"type": "Profile", "id": "p1", "extra": true}])
        );
    }

    #[test]
    fn merge_is_keyed_by_id() {
        let mut linked = LinkedProfiles::decode(&json!([{"type": "StudentProfile", "id": "X"}]));
        assert!(!linked.merge(&ProfileLink::new("Profile", "X")));
        assert_eq!(linked.len(), 1);
        assert!(linked.merge(&ProfileLink::new("Profile", "Y")));
        assert_eq!(linked.ids().collect::<Vec<_>>(), vec!["X", "Y"]);
    }

    #[test]
    fn merge_order_does_not_matter() {
        let a = ProfileLink::new("Profile", "A");
        let b = ProfileLink::new("Profile", "B");

        let mut first = LinkedProfiles::default();
        for link in [&a, &b, &a, &b] {
            first.merge(link);
        }
        let mut second = LinkedProfiles::default();
        for link in [&b, &a, &b, &a] {
            second.merge(link);
        }

        let mut ids_first: Vec<_> = first.ids().collect();
        let mut ids_second: Vec<_> = second.ids().collect();
        ids_first.sort();
        ids_second.sort();
        assert_eq!(ids_first, ids_second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn stored_text_inside_list_is_flattened() {
        let mut linked = LinkedProfiles::default();
        linked.merge(&ProfileLink::new("Profile", "p1"));

        // What the store hands back after the JSON text was written.
        let read_back = LinkedProfiles::decode(&json!([linked.to_json_text()]));
        assert!(read_back.contains_id("p1"));
        assert_eq!(read_back.len(), 1);

        let mut again = read_back.clone();
        assert!(!again.merge(&ProfileLink::new("Profile", "p1")));
        assert_eq!(again.to_value(), json!([{"type": "Profile", "id": "p1"}]));
    }

    #[test]
    fn earlier_nested_writes_collapse() {
        let inner = r#"[{"type":"Profile","id":"p1"}]"#;
        let nested = json!([inner, {"type": "Profile", "id": "p1"}]).to_string();
        let linked = LinkedProfiles::decode(&json!([nested, {"type": "Profile", "id": "p2"}]));
        assert_eq!(linked.ids().collect::<Vec<_>>(), vec!["p1", "p2"]);
    }

    #[test]
    fn json_text_encoding() {
        let mut linked = LinkedProfiles::default();
        linked.merge(&ProfileLink::new("Profile", "p9"));
        let text = linked.to_json_text();
        let reparsed = LinkedProfiles::decode(&Value::String(text));
        assert_eq!(reparsed, linked);
    }
}
