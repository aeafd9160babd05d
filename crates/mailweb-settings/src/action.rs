//! Typed actions decoded from [`ActionRequest`]s.

use std::fmt;

use mailweb_state::SettingPath;
use serde_json::Value;
use tracing::debug;

use crate::{ActionRequest, EngineSettings, PathPayloadError};

/// The type tag of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    #[allow(missing_docs)]
    RetrieveAll,
    #[allow(missing_docs)]
    Set,
    #[allow(missing_docs)]
    Delete,
    #[allow(missing_docs)]
    Reset,
    /// Any tag that is not handled.
    Unknown(String),
}

impl ActionType {
    /// Map a wire tag to its type. Tags are case sensitive.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "retrieveAll" => ActionType::RetrieveAll,
            "set" => ActionType::Set,
            "delete" => ActionType::Delete,
            "reset" => ActionType::Reset,
            other => ActionType::Unknown(other.to_owned()),
        }
    }

    /// The wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::RetrieveAll => "retrieveAll",
            ActionType::Set => "set",
            ActionType::Delete => "delete",
            ActionType::Reset => "reset",
            ActionType::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `{ path, value }` pair of a `set` action.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingItem {
    #[allow(missing_docs)]
    pub path: SettingPath,
    #[allow(missing_docs)]
    pub value: Value,
}

/// A decoded action.
///
/// Payloads are `Option`s because an absent payload and an empty one behave differently: `set`
/// commits a tier whenever its payload key was sent, and `delete`/`reset` without paths still run
/// the routing cleanup. A path payload that failed to decode is kept as its error, so the routing
/// cleanup still runs before the action reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Read both tiers, merged.
    RetrieveAll,
    /// Write items into the volatile and/or persistent tier.
    Set {
        #[allow(missing_docs)]
        volatile: Option<Vec<SettingItem>>,
        #[allow(missing_docs)]
        persistent: Option<Vec<SettingItem>>,
    },
    /// Remove paths from the volatile tier.
    Delete {
        #[allow(missing_docs)]
        paths: Result<Option<Vec<SettingPath>>, PathPayloadError>,
    },
    /// Same effect as [`Action::Delete`].
    Reset {
        #[allow(missing_docs)]
        paths: Result<Option<Vec<SettingPath>>, PathPayloadError>,
    },
    /// An action whose type is not handled.
    Unknown(String),
}

impl Action {
    /// Decode the request with id `id`. Without a `type` field the id itself is the type tag.
    ///
    /// Malformed `set` items are skipped. Malformed `delete`/`reset` paths are carried as an error
    /// that fails the action once its routing cleanup ran.
    pub fn decode(id: &str, request: &ActionRequest, settings: &EngineSettings) -> Self {
        let tag = request.action_type.as_deref().unwrap_or(id);
        let separator = settings.path_separator;

        match ActionType::parse(tag) {
            ActionType::RetrieveAll => Action::RetrieveAll,
            ActionType::Set => Action::Set {
                volatile: request
                    .setting
                    .as_ref()
                    .map(|payload| decode_items(payload, separator)),
                persistent: request
                    .persistent_setting
                    .as_ref()
                    .map(|payload| decode_items(payload, separator)),
            },
            ActionType::Delete => Action::Delete {
                paths: delete_paths(request, settings),
            },
            ActionType::Reset => Action::Reset {
                paths: delete_paths(request, settings),
            },
            ActionType::Unknown(tag) => Action::Unknown(tag),
        }
    }

    /// The type this action was decoded as.
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::RetrieveAll => ActionType::RetrieveAll,
            Action::Set { .. } => ActionType::Set,
            Action::Delete { .. } => ActionType::Delete,
            Action::Reset { .. } => ActionType::Reset,
            Action::Unknown(tag) => ActionType::Unknown(tag.clone()),
        }
    }
}

fn decode_items(payload: &Value, separator: char) -> Vec<SettingItem> {
    match payload {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| decode_item(item, separator))
            .collect(),
        item => decode_item(item, separator).into_iter().collect(),
    }
}

fn decode_item(item: &Value, separator: char) -> Option<SettingItem> {
    let item = item.as_object()?;
    let raw_path = item.get("path")?.as_str()?;
    let value = item.get("value").filter(|value| !value.is_null())?;

    match SettingPath::parse_with(raw_path, separator) {
        Ok(path) => Some(SettingItem {
            path,
            value: value.clone(),
        }),
        Err(error) => {
            debug!(path = raw_path, %error, "Skipping setting item");
            None
        }
    }
}

fn delete_paths(
    request: &ActionRequest,
    settings: &EngineSettings,
) -> Result<Option<Vec<SettingPath>>, PathPayloadError> {
    let payload = match (&request.setting_path, &request.setting) {
        (Some(paths), _) => paths,
        (None, Some(legacy)) if settings.legacy_delete_key => legacy,
        _ => return Ok(None),
    };

    let separator = settings.path_separator;
    let paths: Vec<SettingPath> = match payload {
        Value::Array(paths) => paths
            .iter()
            .map(|path| parse_path(path, separator))
            .collect::<Result<_, _>>()?,
        path => vec![parse_path(path, separator)?],
    };
    Ok(Some(paths))
}

fn parse_path(raw: &Value, separator: char) -> Result<SettingPath, PathPayloadError> {
    match raw {
        Value::String(raw) => Ok(SettingPath::parse_with(raw, separator)?),
        other => Err(PathPayloadError::NotAString(other.to_string())),
    }
}
