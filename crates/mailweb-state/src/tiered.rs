use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{SettingPath, SettingsError, SettingsTree, Tier};

/// Which tier wins when both tiers hold a value at the same path.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum MergePrecedence {
    /// Volatile values override persistent ones.
    #[default]
    VolatileWins,
    /// Persistent values override volatile ones.
    PersistentWins,
}

/// The volatile and persistent trees of one scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TieredSettings {
    volatile: SettingsTree,
    persistent: SettingsTree,
}

impl TieredSettings {
    #[allow(missing_docs)]
    pub fn new(volatile: SettingsTree, persistent: SettingsTree) -> Self {
        Self {
            volatile,
            persistent,
        }
    }

    #[allow(missing_docs)]
    pub fn tree(&self, tier: Tier) -> &SettingsTree {
        match tier {
            Tier::Volatile => &self.volatile,
            Tier::Persistent => &self.persistent,
        }
    }

    #[allow(missing_docs)]
    pub fn tree_mut(&mut self, tier: Tier) -> &mut SettingsTree {
        match tier {
            Tier::Volatile => &mut self.volatile,
            Tier::Persistent => &mut self.persistent,
        }
    }

    /// See [`SettingsTree::get`].
    pub fn get(&self, path: &SettingPath, tier: Tier) -> Option<&Value> {
        self.tree(tier).get(path)
    }

    /// Full transport form of one tier.
    pub fn get_all(&self, tier: Tier) -> Value {
        self.tree(tier).to_value()
    }

    /// See [`SettingsTree::set`].
    pub fn set(&mut self, path: &SettingPath, value: Value, tier: Tier) -> Result<(), SettingsError> {
        self.tree_mut(tier).set(path, value)
    }

    /// See [`SettingsTree::delete`].
    pub fn delete(&mut self, path: &SettingPath, tier: Tier) -> bool {
        self.tree_mut(tier).delete(path)
    }

    #[allow(missing_docs)]
    pub fn is_dirty(&self, tier: Tier) -> bool {
        self.tree(tier).is_dirty()
    }

    /// Both tiers combined into one tree.
    pub fn merged(&self, precedence: MergePrecedence) -> Value {
        let (base, overlay) = match precedence {
            MergePrecedence::VolatileWins => (&self.persistent, &self.volatile),
            MergePrecedence::PersistentWins => (&self.volatile, &self.persistent),
        };

        let mut merged = base.clone();
        merged.merge(overlay);
        merged.to_value()
    }
}
