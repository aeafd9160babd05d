//! A single tier of settings.

use serde_json::{Map, Value};

use crate::{SettingPath, SettingsError};

/// A rooted settings tree holding JSON values at any node.
///
/// Nodes are JSON objects keyed by path segment, so a node can carry data (its other keys) and
/// children at the same time. Writing a deep path creates missing ancestors as empty objects,
/// deleting a path removes the whole subtree below it, and reading a missing path returns `None`.
///
/// The tree tracks whether it changed since it was loaded or last committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsTree {
    root: Map<String, Value>,
    dirty: bool,
}

impl SettingsTree {
    /// Create an empty, clean tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean tree from its transport form. Only objects (or `null`, meaning empty) are
    /// valid trees; `None` is returned for any other value.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::new()),
            Value::Object(root) => Some(Self { root, dirty: false }),
            _ => None,
        }
    }

    /// Transport form of the whole tree.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The value stored at `path`, or `None` if no such node exists.
    pub fn get(&self, path: &SettingPath) -> Option<&Value> {
        let (parents, last) = path.split_last();

        let mut node = &self.root;
        for segment in parents {
            node = node.get(segment)?.as_object()?;
        }
        node.get(last)
    }

    /// The whole tree, or the subtree at `root` when given.
    pub fn get_all(&self, root: Option<&SettingPath>) -> Option<Value> {
        match root {
            None => Some(self.to_value()),
            Some(path) => self.get(path).cloned(),
        }
    }

    /// Create or overwrite the node at `path`.
    ///
    /// Missing ancestors are created as empty objects. If an existing ancestor holds a value that
    /// is not an object the tree is left untouched and [`SettingsError::NotAContainer`] is
    /// returned.
    pub fn set(&mut self, path: &SettingPath, value: Value) -> Result<(), SettingsError> {
        let (parents, last) = path.split_last();

        // Check the whole walk first so a failing write leaves no new ancestors behind.
        let mut node = Some(&self.root);
        for (depth, segment) in parents.iter().enumerate() {
            node = match node.and_then(|map| map.get(segment)) {
                Some(Value::Object(map)) => Some(map),
                Some(_) => {
                    return Err(SettingsError::NotAContainer {
                        path: path.prefix(depth + 1).to_string(),
                    })
                }
                None => None,
            };
        }

        let mut node = &mut self.root;
        for segment in parents {
            let child = node
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match child {
                Value::Object(map) => map,
                _ => {
                    return Err(SettingsError::NotAContainer {
                        path: path.to_string(),
                    })
                }
            };
        }
        node.insert(last.to_owned(), value);
        self.dirty = true;

        Ok(())
    }

    /// Remove the node at `path` together with all of its descendants.
    ///
    /// Returns whether a node was removed. Deleting a missing path is not an error and leaves the
    /// tree clean.
    pub fn delete(&mut self, path: &SettingPath) -> bool {
        let (parents, last) = path.split_last();

        let mut node = &mut self.root;
        for segment in parents {
            node = match node.get_mut(segment) {
                Some(Value::Object(map)) => map,
                _ => return false,
            };
        }

        let removed = node.remove(last).is_some();
        self.dirty |= removed;
        removed
    }

    /// Deep merge `other` into this tree. Objects are merged key by key, any other value in
    /// `other` replaces the value in `self`.
    pub fn merge(&mut self, other: &SettingsTree) {
        if other.root.is_empty() {
            return;
        }
        merge_maps(&mut self.root, &other.root);
        self.dirty = true;
    }

    /// True if the tree changed since it was loaded or last committed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

fn merge_maps(target: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) =
            (target.get_mut(key), value)
        {
            merge_maps(existing, incoming);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}
