use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::{
    MergePrecedence, Scope, SettingPath, SettingsBackend, SettingsError, SettingsTree, Tier,
    TieredSettings,
};

/// Settings trees of every scope touched during a session, keyed by [`Scope`].
///
/// Trees are loaded from the [`SettingsBackend`] the first time a scope is opened and then kept in
/// memory, so every action of a batch sees the mutations of the actions before it. The host
/// creates one registry per session (or request) and drops it afterwards.
///
/// Loading one scope never blocks opening another. Concurrent opens of the same scope share a
/// single load.
pub struct SettingsRegistry {
    backend: Arc<dyn SettingsBackend>,
    scopes: Mutex<HashMap<Scope, Arc<ScopeSlot>>>,
}

type ScopeSlot = OnceCell<Arc<Mutex<TieredSettings>>>;

impl std::fmt::Debug for SettingsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsRegistry").finish()
    }
}

impl SettingsRegistry {
    #[allow(missing_docs)]
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        Self {
            backend,
            scopes: Mutex::new(HashMap::new()),
        }
    }

    /// Get a handle to the settings of `scope`, loading both tiers on first access.
    ///
    /// A failed load is not cached, the next open tries again.
    pub async fn open(&self, scope: &Scope) -> Result<ScopedSettings, SettingsError> {
        // The map lock only guards the slot lookup, never the backend call.
        let slot = Arc::clone(self.scopes.lock().await.entry(scope.clone()).or_default());

        let tiers = slot
            .get_or_try_init(|| async {
                self.load(scope)
                    .await
                    .map(|tiers| Arc::new(Mutex::new(tiers)))
            })
            .await?;

        Ok(ScopedSettings {
            scope: scope.clone(),
            tiers: Arc::clone(tiers),
            backend: Arc::clone(&self.backend),
        })
    }

    /// Scopes that are currently held in memory.
    pub async fn loaded_scopes(&self) -> Vec<Scope> {
        self.scopes
            .lock()
            .await
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(scope, _)| scope.clone())
            .collect()
    }

    /// Drop the in-memory trees of `scope`. Uncommitted changes are lost; the next
    /// [`open`](Self::open) loads the scope again.
    pub async fn evict(&self, scope: &Scope) -> bool {
        self.scopes
            .lock()
            .await
            .remove(scope)
            .is_some_and(|slot| slot.initialized())
    }

    async fn load(&self, scope: &Scope) -> Result<TieredSettings, SettingsError> {
        let volatile = self.load_tier(scope, Tier::Volatile).await?;
        let persistent = self.load_tier(scope, Tier::Persistent).await?;
        Ok(TieredSettings::new(volatile, persistent))
    }

    async fn load_tier(&self, scope: &Scope, tier: Tier) -> Result<SettingsTree, SettingsError> {
        let stored = self
            .backend
            .load(scope, tier)
            .await
            .map_err(|source| SettingsError::Load {
                scope: scope.clone(),
                tier,
                source,
            })?;

        debug!(%scope, %tier, found = stored.is_some(), "Loaded settings tier");

        match stored {
            None => Ok(SettingsTree::new()),
            Some(value) => SettingsTree::from_value(value).ok_or_else(|| {
                SettingsError::InvalidTreeShape {
                    scope: scope.clone(),
                    tier,
                }
            }),
        }
    }
}

/// A handle to the two tiers of one scope, obtained from [`SettingsRegistry::open`].
///
/// All handles of a scope share the same trees.
#[derive(Clone)]
pub struct ScopedSettings {
    scope: Scope,
    tiers: Arc<Mutex<TieredSettings>>,
    backend: Arc<dyn SettingsBackend>,
}

impl std::fmt::Debug for ScopedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedSettings")
            .field("scope", &self.scope)
            .finish()
    }
}

impl ScopedSettings {
    #[allow(missing_docs)]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The value at `path`, `None` if absent.
    pub async fn get(&self, path: &SettingPath, tier: Tier) -> Option<Value> {
        self.tiers.lock().await.get(path, tier).cloned()
    }

    /// Transport form of one tier.
    pub async fn get_all(&self, tier: Tier) -> Value {
        self.tiers.lock().await.get_all(tier)
    }

    /// Both tiers merged according to `precedence`. Never marks anything dirty.
    pub async fn merged(&self, precedence: MergePrecedence) -> Value {
        self.tiers.lock().await.merged(precedence)
    }

    /// Write a value in memory. Nothing is persisted until [`commit`](Self::commit).
    pub async fn set(
        &self,
        path: &SettingPath,
        value: Value,
        tier: Tier,
    ) -> Result<(), SettingsError> {
        self.tiers.lock().await.set(path, value, tier)
    }

    /// Remove a node and its subtree in memory. Returns whether anything was removed.
    pub async fn delete(&self, path: &SettingPath, tier: Tier) -> bool {
        self.tiers.lock().await.delete(path, tier)
    }

    #[allow(missing_docs)]
    pub async fn is_dirty(&self, tier: Tier) -> bool {
        self.tiers.lock().await.is_dirty(tier)
    }

    /// Persist the current state of `tier` through the backend.
    ///
    /// The dirty flag is only cleared when the backend accepted the tree. On failure the in-memory
    /// state is kept as is.
    pub async fn commit(&self, tier: Tier) -> Result<(), SettingsError> {
        let mut tiers = self.tiers.lock().await;
        let snapshot = tiers.get_all(tier);

        match self.backend.save(&self.scope, tier, &snapshot).await {
            Ok(()) => {
                tiers.tree_mut(tier).mark_clean();
                debug!(scope = %self.scope, %tier, "Committed settings tier");
                Ok(())
            }
            Err(source) => {
                warn!(scope = %self.scope, %tier, error = %source, "Failed to commit settings tier");
                Err(SettingsError::Persistence {
                    scope: self.scope.clone(),
                    tier,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::{BackendError, StoreId};

    #[derive(Default)]
    struct TestBackend {
        stored: StdMutex<HashMap<(Scope, Tier), Value>>,
        loads: StdMutex<usize>,
        fail_saves: bool,
    }

    #[async_trait::async_trait]
    impl SettingsBackend for TestBackend {
        async fn load(&self, scope: &Scope, tier: Tier) -> Result<Option<Value>, BackendError> {
            *self.loads.lock().unwrap() += 1;
            Ok(self
                .stored
                .lock()
                .unwrap()
                .get(&(scope.clone(), tier))
                .cloned())
        }

        async fn save(&self, scope: &Scope, tier: Tier, tree: &Value) -> Result<(), BackendError> {
            if self.fail_saves {
                return Err(BackendError::Internal("disk full".to_string()));
            }
            self.stored
                .lock()
                .unwrap()
                .insert((scope.clone(), tier), tree.clone());
            Ok(())
        }
    }

    fn path(raw: &str) -> SettingPath {
        SettingPath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn open_loads_each_scope_once() {
        let backend = Arc::new(TestBackend::default());
        let registry = SettingsRegistry::new(backend.clone());

        registry.open(&Scope::Default).await.unwrap();
        registry.open(&Scope::Default).await.unwrap();

        assert_eq!(*backend.loads.lock().unwrap(), 2, "one load per tier");
        assert_eq!(registry.loaded_scopes().await, vec![Scope::Default]);
    }

    #[tokio::test]
    async fn concurrent_opens_share_one_load() {
        let backend = Arc::new(TestBackend::default());
        let registry = SettingsRegistry::new(backend.clone());

        let (first, second) = tokio::join!(
            registry.open(&Scope::Default),
            registry.open(&Scope::Default)
        );
        first
            .unwrap()
            .set(&path("a"), json!(1), Tier::Volatile)
            .await
            .unwrap();

        assert_eq!(*backend.loads.lock().unwrap(), 2, "one load per tier");
        assert_eq!(
            second.unwrap().get(&path("a"), Tier::Volatile).await,
            Some(json!(1))
        );
    }

    /// Holds the volatile load of one scope until the gate opens.
    struct GatedBackend {
        gated: Scope,
        gate: Notify,
    }

    #[async_trait::async_trait]
    impl SettingsBackend for GatedBackend {
        async fn load(&self, scope: &Scope, tier: Tier) -> Result<Option<Value>, BackendError> {
            if *scope == self.gated && tier == Tier::Volatile {
                self.gate.notified().await;
            }
            Ok(None)
        }

        async fn save(&self, _scope: &Scope, _tier: Tier, _tree: &Value) -> Result<(), BackendError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_load_does_not_block_other_scopes() {
        let gated = Scope::Store(StoreId::new(vec![0xab]));
        let backend = Arc::new(GatedBackend {
            gated: gated.clone(),
            gate: Notify::new(),
        });
        let registry = SettingsRegistry::new(backend.clone());

        // The default scope must open while the gated load is still pending, otherwise the gate
        // is never released.
        let (slow, fast) = tokio::join!(registry.open(&gated), async {
            let fast = registry.open(&Scope::Default).await;
            backend.gate.notify_one();
            fast
        });

        assert_eq!(slow.unwrap().scope(), &gated);
        assert_eq!(fast.unwrap().scope(), &Scope::Default);
        assert_eq!(registry.loaded_scopes().await.len(), 2);
    }

    #[tokio::test]
    async fn handles_share_state_until_commit() {
        let backend = Arc::new(TestBackend::default());
        let registry = SettingsRegistry::new(backend.clone());

        let first = registry.open(&Scope::Default).await.unwrap();
        first
            .set(&path("general/theme"), json!("dark"), Tier::Volatile)
            .await
            .unwrap();

        let second = registry.open(&Scope::Default).await.unwrap();
        assert_eq!(
            second.get(&path("general/theme"), Tier::Volatile).await,
            Some(json!("dark"))
        );
        assert!(backend.stored.lock().unwrap().is_empty());

        second.commit(Tier::Volatile).await.unwrap();

        assert!(!first.is_dirty(Tier::Volatile).await);
        assert_eq!(
            backend.stored.lock().unwrap()[&(Scope::Default, Tier::Volatile)],
            json!({ "general": { "theme": "dark" } })
        );
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let registry = SettingsRegistry::new(Arc::new(TestBackend::default()));
        let other = Scope::Store(StoreId::new(vec![0xab]));

        registry
            .open(&Scope::Default)
            .await
            .unwrap()
            .set(&path("a"), json!(1), Tier::Volatile)
            .await
            .unwrap();

        let other = registry.open(&other).await.unwrap();
        assert_eq!(other.get(&path("a"), Tier::Volatile).await, None);
    }

    #[tokio::test]
    async fn failed_commit_keeps_tier_dirty() {
        let backend = Arc::new(TestBackend {
            fail_saves: true,
            ..Default::default()
        });
        let registry = SettingsRegistry::new(backend);
        let settings = registry.open(&Scope::Default).await.unwrap();
        settings
            .set(&path("a"), json!(1), Tier::Persistent)
            .await
            .unwrap();

        let result = settings.commit(Tier::Persistent).await;

        assert!(matches!(
            result,
            Err(SettingsError::Persistence {
                tier: Tier::Persistent,
                ..
            })
        ));
        assert!(settings.is_dirty(Tier::Persistent).await);
        assert_eq!(
            settings.get(&path("a"), Tier::Persistent).await,
            Some(json!(1))
        );
    }

    #[tokio::test]
    async fn stored_non_object_tree_is_rejected() {
        let backend = Arc::new(TestBackend::default());
        backend
            .stored
            .lock()
            .unwrap()
            .insert((Scope::Default, Tier::Persistent), json!([1, 2, 3]));
        let registry = SettingsRegistry::new(backend);

        let result = registry.open(&Scope::Default).await;

        assert!(matches!(
            result,
            Err(SettingsError::InvalidTreeShape {
                tier: Tier::Persistent,
                ..
            })
        ));
        assert!(registry.loaded_scopes().await.is_empty());
    }

    #[tokio::test]
    async fn evict_forces_reload() {
        let backend = Arc::new(TestBackend::default());
        let registry = SettingsRegistry::new(backend.clone());
        let settings = registry.open(&Scope::Default).await.unwrap();
        settings
            .set(&path("a"), json!(1), Tier::Volatile)
            .await
            .unwrap();

        assert!(registry.evict(&Scope::Default).await);

        let reloaded = registry.open(&Scope::Default).await.unwrap();
        assert_eq!(reloaded.get(&path("a"), Tier::Volatile).await, None);
        assert_eq!(*backend.loads.lock().unwrap(), 4);
    }
}
