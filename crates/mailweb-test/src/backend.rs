use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use mailweb_state::{BackendError, Scope, SettingsBackend, Tier};
use serde_json::Value;

/// A [`SettingsBackend`] that keeps trees in memory and records every call.
#[derive(Debug, Default)]
pub struct MemorySettingsBackend {
    stored: Mutex<HashMap<(Scope, Tier), Value>>,
    loads: Mutex<Vec<(Scope, Tier)>>,
    saves: Mutex<Vec<(Scope, Tier, Value)>>,
    failing_loads: Mutex<HashSet<(Scope, Tier)>>,
    failing_saves: Mutex<HashSet<(Scope, Tier)>>,
}

impl MemorySettingsBackend {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a stored tree.
    pub fn with_tree(self, scope: Scope, tier: Tier, tree: Value) -> Self {
        self.stored
            .lock()
            .expect("Mutex should not be poisoned")
            .insert((scope, tier), tree);
        self
    }

    /// Make every following load of `scope`/`tier` fail.
    pub fn fail_loads(&self, scope: Scope, tier: Tier) {
        self.failing_loads
            .lock()
            .expect("Mutex should not be poisoned")
            .insert((scope, tier));
    }

    /// Make every following save of `scope`/`tier` fail.
    pub fn fail_saves(&self, scope: Scope, tier: Tier) {
        self.failing_saves
            .lock()
            .expect("Mutex should not be poisoned")
            .insert((scope, tier));
    }

    /// The currently stored tree.
    pub fn stored(&self, scope: &Scope, tier: Tier) -> Option<Value> {
        self.stored
            .lock()
            .expect("Mutex should not be poisoned")
            .get(&(scope.clone(), tier))
            .cloned()
    }

    /// Every load call, in order.
    pub fn loads(&self) -> Vec<(Scope, Tier)> {
        self.loads
            .lock()
            .expect("Mutex should not be poisoned")
            .clone()
    }

    /// Every save call (including failed ones), in order.
    pub fn saves(&self) -> Vec<(Scope, Tier, Value)> {
        self.saves
            .lock()
            .expect("Mutex should not be poisoned")
            .clone()
    }

    /// Number of save calls for one scope and tier.
    pub fn save_count(&self, scope: &Scope, tier: Tier) -> usize {
        self.saves
            .lock()
            .expect("Mutex should not be poisoned")
            .iter()
            .filter(|(s, t, _)| s == scope && *t == tier)
            .count()
    }
}

#[async_trait::async_trait]
impl SettingsBackend for MemorySettingsBackend {
    async fn load(&self, scope: &Scope, tier: Tier) -> Result<Option<Value>, BackendError> {
        self.loads
            .lock()
            .expect("Mutex should not be poisoned")
            .push((scope.clone(), tier));

        if self
            .failing_loads
            .lock()
            .expect("Mutex should not be poisoned")
            .contains(&(scope.clone(), tier))
        {
            return Err(BackendError::Internal(format!(
                "Loading {tier} settings of the {scope} failed"
            )));
        }

        Ok(self.stored(scope, tier))
    }

    async fn save(&self, scope: &Scope, tier: Tier, tree: &Value) -> Result<(), BackendError> {
        self.saves
            .lock()
            .expect("Mutex should not be poisoned")
            .push((scope.clone(), tier, tree.clone()));

        if self
            .failing_saves
            .lock()
            .expect("Mutex should not be poisoned")
            .contains(&(scope.clone(), tier))
        {
            return Err(BackendError::Internal(format!(
                "Saving {tier} settings of the {scope} failed"
            )));
        }

        self.stored
            .lock()
            .expect("Mutex should not be poisoned")
            .insert((scope.clone(), tier), tree.clone());
        Ok(())
    }
}
