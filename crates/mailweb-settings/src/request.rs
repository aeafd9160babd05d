//! Wire form of an incoming settings batch.

use std::fmt;

use schemars::JsonSchema;
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

/// One action as sent by the client.
///
/// Decoding is lenient: fields with an unexpected JSON type are kept as raw values (or dropped,
/// for `type`) and only interpreted when the action is executed, so a malformed action fails on
/// its own instead of failing the whole batch.
#[derive(Serialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct ActionRequest {
    /// `retrieveAll`, `set`, `delete` or `reset`. When absent, the action id is used as the type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    /// Hex entry id of the store to act on, or a list whose first element is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_entryid: Option<Value>,
    /// Volatile `{ path, value }` item(s) for `set`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting: Option<Value>,
    /// Persistent `{ path, value }` item(s) for `set`.
    #[serde(rename = "persistentSetting", skip_serializing_if = "Option::is_none")]
    pub persistent_setting: Option<Value>,
    /// Path(s) for `delete` and `reset`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting_path: Option<Value>,
}

impl ActionRequest {
    /// An empty request of the given type.
    pub fn of_type(action_type: impl Into<String>) -> Self {
        Self {
            action_type: Some(action_type.into()),
            ..Default::default()
        }
    }

    #[allow(missing_docs)]
    pub fn with_store(mut self, store_entryid: impl Into<Value>) -> Self {
        self.store_entryid = Some(store_entryid.into());
        self
    }

    #[allow(missing_docs)]
    pub fn with_setting(mut self, setting: Value) -> Self {
        self.setting = Some(setting);
        self
    }

    #[allow(missing_docs)]
    pub fn with_persistent_setting(mut self, setting: Value) -> Self {
        self.persistent_setting = Some(setting);
        self
    }

    #[allow(missing_docs)]
    pub fn with_setting_path(mut self, path: impl Into<Value>) -> Self {
        self.setting_path = Some(path.into());
        self
    }

    /// Interpret a raw JSON value as a request. Anything that is not an object becomes an empty
    /// request, and `null` fields count as absent.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        let mut take = |key: &str| fields.remove(key).filter(|value| !value.is_null());

        Self {
            action_type: match take("type") {
                Some(Value::String(action_type)) => Some(action_type),
                _ => None,
            },
            store_entryid: take("store_entryid"),
            setting: take("setting"),
            persistent_setting: take("persistentSetting"),
            setting_path: take("setting_path"),
        }
    }

    /// The store token, if one was sent as a string or as a non-empty list starting with a
    /// string.
    pub fn store_token(&self) -> Option<&str> {
        match self.store_entryid.as_ref()? {
            Value::String(token) => Some(token),
            Value::Array(tokens) => tokens.first()?.as_str(),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ActionRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// An ordered collection of actions keyed by action id.
///
/// Serialized as a JSON object; the order of its keys is the execution order. Ids are unique: a
/// repeated id keeps the position of its first occurrence and the request of its last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    actions: Vec<(String, ActionRequest)>,
}

impl Batch {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a batch from its JSON object form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Append an action, or replace the request of an id that is already present.
    pub fn push(&mut self, id: impl Into<String>, request: ActionRequest) {
        let id = id.into();
        match self.actions.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = request,
            None => self.actions.push((id, request)),
        }
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, id: impl Into<String>, request: ActionRequest) -> Self {
        self.push(id, request);
        self
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionRequest)> {
        self.actions
            .iter()
            .map(|(id, request)| (id.as_str(), request))
    }
}

impl FromIterator<(String, ActionRequest)> for Batch {
    fn from_iter<T: IntoIterator<Item = (String, ActionRequest)>>(iter: T) -> Self {
        let mut batch = Self::new();
        for (id, request) in iter {
            batch.push(id, request);
        }
        batch
    }
}

impl IntoIterator for Batch {
    type Item = (String, ActionRequest);
    type IntoIter = std::vec::IntoIter<(String, ActionRequest)>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

impl Serialize for Batch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.actions.len()))?;
        for (id, request) in &self.actions {
            map.serialize_entry(id, request)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Batch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BatchVisitor;

        impl<'de> Visitor<'de> for BatchVisitor {
            type Value = Batch;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a map of action ids to actions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Batch, A::Error> {
                let mut batch = Batch::new();
                while let Some((id, request)) = access.next_entry::<String, ActionRequest>()? {
                    batch.push(id, request);
                }
                Ok(batch)
            }
        }

        deserializer.deserialize_map(BatchVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn batch_keeps_wire_order() {
        let batch = Batch::from_json(
            r#"{
                "z": { "type": "retrieveAll" },
                "a": { "type": "set", "setting": { "path": "a", "value": 1 } },
                "m": { "type": "delete", "setting_path": "a" }
            }"#,
        )
        .unwrap();

        let ids: Vec<&str> = batch.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }

    #[test]
    fn repeated_id_keeps_first_position_and_last_request() {
        let batch = Batch::from_json(
            r#"{
                "a1": { "type": "set", "setting": { "path": "a", "value": 1 } },
                "a2": { "type": "delete", "setting_path": "a" },
                "a1": { "type": "retrieveAll" }
            }"#,
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        let actions: Vec<(&str, Option<&str>)> = batch
            .iter()
            .map(|(id, request)| (id, request.action_type.as_deref()))
            .collect();
        assert_eq!(
            actions,
            [("a1", Some("retrieveAll")), ("a2", Some("delete"))]
        );
    }

    #[test]
    fn collected_batch_has_unique_ids() {
        let batch: Batch = [
            ("a1".to_string(), ActionRequest::of_type("set")),
            ("a1".to_string(), ActionRequest::of_type("reset")),
        ]
        .into_iter()
        .collect();

        assert_eq!(batch, Batch::new().with("a1", ActionRequest::of_type("reset")));
    }

    #[test]
    fn batch_serializes_in_order() {
        let batch = Batch::new()
            .with("second", ActionRequest::of_type("retrieveAll"))
            .with("first", ActionRequest::of_type("reset"));

        assert_eq!(
            serde_json::to_string(&batch).unwrap(),
            r#"{"second":{"type":"retrieveAll"},"first":{"type":"reset"}}"#
        );
    }

    #[test]
    fn malformed_action_does_not_fail_the_batch() {
        let batch = Batch::from_json(r#"{ "a1": 5, "a2": { "type": 7, "setting_path": "x" } }"#)
            .unwrap();

        let requests: Vec<&ActionRequest> = batch.iter().map(|(_, r)| r).collect();
        assert_eq!(requests[0], &ActionRequest::default());
        assert_eq!(requests[1].action_type, None);
        assert_eq!(requests[1].setting_path, Some(json!("x")));
    }

    #[test]
    fn null_fields_are_absent() {
        let request = ActionRequest::from_value(json!({
            "type": "set",
            "setting": null,
            "persistentSetting": { "path": "a", "value": 1 },
        }));

        assert_eq!(request.setting, None);
        assert!(request.persistent_setting.is_some());
    }

    #[test]
    fn store_token_from_string_or_list() {
        assert_eq!(
            ActionRequest::default().with_store("ab01").store_token(),
            Some("ab01")
        );
        assert_eq!(
            ActionRequest::default()
                .with_store(json!(["cd", "ef"]))
                .store_token(),
            Some("cd")
        );
        assert_eq!(
            ActionRequest::default()
                .with_store(json!([]))
                .store_token(),
            None
        );
        assert_eq!(
            ActionRequest::default().with_store(json!(12)).store_token(),
            None
        );
        assert_eq!(ActionRequest::default().store_token(), None);
    }
}
