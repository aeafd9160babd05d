use std::sync::Arc;

use async_trait::async_trait;
use mailweb_error::ErrorKind;
use mailweb_state::SettingsRegistry;
use mailweb_store::{RoutingCleanup, StoreLookup, StoreScopeResolver};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    Action, ActionError, ActionRequest, ActionResult, Batch, BatchMutationEngine, EngineSettings,
    FeedbackReporter, ResponseEnvelope,
};

/// Errors returned by a [`ResponseSink`].
#[derive(Debug, Error)]
pub enum PublishError {
    #[allow(missing_docs)]
    #[error("Failed to publish response: {0}")]
    Transport(String),
}

/// Hands a finished response envelope to the transport layer.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    #[allow(missing_docs)]
    async fn publish(&self, envelope: ResponseEnvelope) -> Result<(), PublishError>;
}

/// Runs a batch of actions and collects one outcome per action.
///
/// Actions run one after another in batch order. A failing action is recorded in the envelope and
/// the next action runs as if nothing happened.
pub struct ActionDispatcher {
    resolver: Arc<StoreScopeResolver>,
    engine: BatchMutationEngine,
    settings: EngineSettings,
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ActionDispatcher {
    /// Create a dispatcher with the default [`EngineSettings`].
    pub fn new(
        registry: Arc<SettingsRegistry>,
        lookup: Arc<dyn StoreLookup>,
        cleanup: Arc<dyn RoutingCleanup>,
    ) -> Self {
        Self::with_settings(registry, lookup, cleanup, EngineSettings::default())
    }

    #[allow(missing_docs)]
    pub fn with_settings(
        registry: Arc<SettingsRegistry>,
        lookup: Arc<dyn StoreLookup>,
        cleanup: Arc<dyn RoutingCleanup>,
        settings: EngineSettings,
    ) -> Self {
        let resolver = Arc::new(StoreScopeResolver::new(lookup));
        let engine = BatchMutationEngine::new(
            registry,
            Arc::clone(&resolver),
            cleanup,
            settings.merge_precedence,
        );

        Self {
            resolver,
            engine,
            settings,
        }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Execute every action of `batch`. Always returns an envelope covering every action id.
    pub async fn execute(&self, batch: &Batch) -> ResponseEnvelope {
        let mut feedback = FeedbackReporter::new();

        for (index, (id, request)) in batch.iter().enumerate() {
            let result = match self.settings.max_batch_size {
                Some(limit) if index >= limit => Err(ActionError::BatchLimitExceeded { limit }),
                _ => self.execute_action(id, request).await,
            };

            match result {
                Ok(ActionResult::Acknowledged) => feedback.record_success(id),
                Ok(ActionResult::Data(data)) => feedback.record_data(id, data),
                Err(error) => {
                    warn!(action = id, kind = error.error_kind(), %error, "Settings action failed");
                    feedback.record_error(id, &error);
                }
            }
        }

        let envelope = feedback.finalize();
        info!(
            actions = envelope.len(),
            failed = envelope.failure_count(),
            "Processed settings batch"
        );
        envelope
    }

    /// [`execute`](Self::execute) the batch and publish the envelope through `sink`.
    pub async fn execute_and_publish(
        &self,
        batch: &Batch,
        sink: &dyn ResponseSink,
    ) -> Result<(), PublishError> {
        let envelope = self.execute(batch).await;
        sink.publish(envelope).await
    }

    async fn execute_action(
        &self,
        id: &str,
        request: &ActionRequest,
    ) -> Result<ActionResult, ActionError> {
        let action = Action::decode(id, request, &self.settings);
        debug!(action = id, action_type = %action.action_type(), "Executing settings action");

        // Failures are logged once by `execute`.
        if let Action::Unknown(tag) = &action {
            return Err(ActionError::UnknownAction(tag.clone()));
        }

        let scope = self.resolver.resolve(request.store_token()).await;
        self.engine.apply(&scope, &action).await
    }
}
