#![doc = include_str!("../README.md")]

mod action;
mod config;
mod dispatcher;
mod engine;
mod error;
mod feedback;
mod request;

pub use action::{Action, ActionType, SettingItem};
pub use config::EngineSettings;
pub use dispatcher::{ActionDispatcher, PublishError, ResponseSink};
pub use engine::{ActionResult, BatchMutationEngine};
pub use error::{ActionError, PathPayloadError};
pub use feedback::{ActionOutcome, FeedbackReporter, ResponseEnvelope};
pub use request::{ActionRequest, Batch};
