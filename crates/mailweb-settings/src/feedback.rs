use std::fmt::Display;

use mailweb_error::{ErrorKind, ErrorReport};
use schemars::JsonSchema;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::Value;

/// The outcome of one action as sent to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ActionOutcome {
    #[allow(missing_docs)]
    pub success: bool,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

impl ActionOutcome {
    #[allow(missing_docs)]
    pub fn acknowledged() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    #[allow(missing_docs)]
    pub fn with_data(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[allow(missing_docs)]
    pub fn failed(report: ErrorReport) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(report),
        }
    }
}

/// Collects the outcome of every action of a batch.
///
/// Outcomes keep the order in which their action ids were first recorded. Recording again for the
/// same id replaces the earlier outcome in place.
#[derive(Debug, Default)]
pub struct FeedbackReporter {
    outcomes: Vec<(String, ActionOutcome)>,
}

impl FeedbackReporter {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the action as succeeded without a payload.
    pub fn record_success(&mut self, id: &str) {
        self.record(id, ActionOutcome::acknowledged());
    }

    /// Mark the action as succeeded with `data`.
    pub fn record_data(&mut self, id: &str, data: Value) {
        self.record(id, ActionOutcome::with_data(data));
    }

    /// Mark the action as failed.
    pub fn record_failure(&mut self, id: &str, kind: &str, message: impl Into<String>) {
        self.record(id, ActionOutcome::failed(ErrorReport::new(kind, message)));
    }

    /// [`record_failure`](Self::record_failure) with the kind and message taken from `error`.
    pub fn record_error<E: ErrorKind + Display + ?Sized>(&mut self, id: &str, error: &E) {
        self.record(id, ActionOutcome::failed(ErrorReport::from_error(error)));
    }

    /// Number of actions recorded so far.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Produce the response envelope.
    pub fn finalize(self) -> ResponseEnvelope {
        ResponseEnvelope {
            outcomes: self.outcomes,
        }
    }

    fn record(&mut self, id: &str, outcome: ActionOutcome) {
        match self.outcomes.iter_mut().find(|(recorded, _)| recorded == id) {
            Some((_, existing)) => *existing = outcome,
            None => self.outcomes.push((id.to_owned(), outcome)),
        }
    }
}

/// The response to a batch: one [`ActionOutcome`] per action id, in batch order.
///
/// Serializes as a JSON object keyed by action id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseEnvelope {
    outcomes: Vec<(String, ActionOutcome)>,
}

impl ResponseEnvelope {
    #[allow(missing_docs)]
    pub fn get(&self, id: &str) -> Option<&ActionOutcome> {
        self.outcomes
            .iter()
            .find(|(recorded, _)| recorded == id)
            .map(|(_, outcome)| outcome)
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of failed actions.
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.success)
            .count()
    }

    /// Outcomes in batch order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionOutcome)> {
        self.outcomes
            .iter()
            .map(|(id, outcome)| (id.as_str(), outcome))
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.outcomes.len()))?;
        for (id, outcome) in &self.outcomes {
            map.serialize_entry(id, outcome)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use mailweb_state::InvalidPathError;
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_keeps_recording_order() {
        let mut feedback = FeedbackReporter::new();
        feedback.record_success("z");
        feedback.record_data("a", json!({ "theme": "dark" }));
        feedback.record_failure("m", "UnknownAction", "Unknown action type 'm'");

        let envelope = feedback.finalize();

        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"z":{"success":true},"a":{"success":true,"data":{"theme":"dark"}},"m":{"success":false,"error":{"kind":"UnknownAction","message":"Unknown action type 'm'"}}}"#
        );
        assert_eq!(envelope.failure_count(), 1);
    }

    #[test]
    fn recording_an_id_again_replaces_its_outcome() {
        let mut feedback = FeedbackReporter::new();
        feedback.record_success("a1");
        feedback.record_success("a2");
        feedback.record_error("a1", &InvalidPathError::Empty);

        let envelope = feedback.finalize();

        assert_eq!(envelope.len(), 2);
        assert_eq!(envelope.iter().next().map(|(id, _)| id), Some("a1"));
        assert_eq!(
            envelope.get("a1"),
            Some(&ActionOutcome::failed(ErrorReport::new(
                "InvalidPathError",
                "Setting path is empty"
            )))
        );
    }

    #[test]
    fn empty_batch_gives_empty_envelope() {
        let envelope = FeedbackReporter::new().finalize();

        assert!(envelope.is_empty());
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({}));
    }
}
