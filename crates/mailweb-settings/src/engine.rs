use std::sync::Arc;

use mailweb_state::{MergePrecedence, SettingPath, SettingsRegistry, Tier};
use mailweb_store::{ResolvedScope, RoutingCleanup, StoreScopeResolver};
use serde_json::Value;
use tracing::debug;

use crate::{Action, ActionError, PathPayloadError, SettingItem};

/// What a successful action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// The action succeeded without a payload.
    Acknowledged,
    /// The action succeeded and returned data.
    Data(Value),
}

/// Applies decoded actions to the settings of a resolved scope.
///
/// Every action applies all of its mutations in memory before it commits, and commits each tier
/// it touched at most once.
pub struct BatchMutationEngine {
    registry: Arc<SettingsRegistry>,
    resolver: Arc<StoreScopeResolver>,
    cleanup: Arc<dyn RoutingCleanup>,
    merge_precedence: MergePrecedence,
}

impl std::fmt::Debug for BatchMutationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchMutationEngine")
            .field("merge_precedence", &self.merge_precedence)
            .finish()
    }
}

impl BatchMutationEngine {
    #[allow(missing_docs)]
    pub fn new(
        registry: Arc<SettingsRegistry>,
        resolver: Arc<StoreScopeResolver>,
        cleanup: Arc<dyn RoutingCleanup>,
        merge_precedence: MergePrecedence,
    ) -> Self {
        Self {
            registry,
            resolver,
            cleanup,
            merge_precedence,
        }
    }

    /// Apply one action.
    pub async fn apply(
        &self,
        scope: &ResolvedScope,
        action: &Action,
    ) -> Result<ActionResult, ActionError> {
        match action {
            Action::RetrieveAll => self.retrieve_all(scope).await.map(ActionResult::Data),
            Action::Set {
                volatile,
                persistent,
            } => {
                self.set(scope, volatile.as_deref(), persistent.as_deref())
                    .await?;
                Ok(ActionResult::Acknowledged)
            }
            Action::Delete { paths } | Action::Reset { paths } => {
                self.delete(scope, paths.as_ref().map(Option::as_deref))
                    .await?;
                Ok(ActionResult::Acknowledged)
            }
            Action::Unknown(tag) => Err(ActionError::UnknownAction(tag.clone())),
        }
    }

    /// Both tiers of the scope merged by the configured precedence. Read only.
    pub async fn retrieve_all(&self, scope: &ResolvedScope) -> Result<Value, ActionError> {
        let settings = self.registry.open(scope.scope()).await?;
        Ok(settings.merged(self.merge_precedence).await)
    }

    /// Write all items, then commit every tier whose payload was present, volatile first.
    ///
    /// A failing item or commit aborts the action. Items applied before the failure stay in
    /// memory uncommitted.
    pub async fn set(
        &self,
        scope: &ResolvedScope,
        volatile: Option<&[SettingItem]>,
        persistent: Option<&[SettingItem]>,
    ) -> Result<(), ActionError> {
        if volatile.is_none() && persistent.is_none() {
            return Ok(());
        }

        let settings = self.registry.open(scope.scope()).await?;

        for (tier, items) in [(Tier::Volatile, volatile), (Tier::Persistent, persistent)] {
            for item in items.into_iter().flatten() {
                settings.set(&item.path, item.value.clone(), tier).await?;
            }
        }

        // Commit follows the payload keys, not the dirty flags.
        if volatile.is_some() {
            settings.commit(Tier::Volatile).await?;
        }
        if persistent.is_some() {
            settings.commit(Tier::Persistent).await?;
        }

        Ok(())
    }

    /// Clear the routing properties of the scope's store once, then remove `paths` from the
    /// volatile tier and commit it once.
    ///
    /// A path payload that failed to decode is reported after the cleanup ran, without touching
    /// the tree.
    pub async fn delete(
        &self,
        scope: &ResolvedScope,
        paths: Result<Option<&[SettingPath]>, &PathPayloadError>,
    ) -> Result<(), ActionError> {
        let store = self.resolver.store_for(scope).await?;
        self.cleanup.clear_routing_properties(&store).await?;

        let Some(paths) = paths.map_err(|error| ActionError::from(error.clone()))? else {
            return Ok(());
        };

        let settings = self.registry.open(scope.scope()).await?;
        for path in paths {
            let removed = settings.delete(path, Tier::Volatile).await;
            debug!(%path, removed, "Deleted setting");
        }
        settings.commit(Tier::Volatile).await?;

        Ok(())
    }
}
