use mailweb_state::{MergePrecedence, DEFAULT_SEPARATOR};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Behavior settings of the settings engine. They are optional and fixed once the
/// [`ActionDispatcher`](crate::ActionDispatcher) is created.
///
/// Defaults to
///
/// ```
/// # use mailweb_settings::EngineSettings;
/// # use mailweb_state::MergePrecedence;
/// let settings = EngineSettings {
///     path_separator: '/',
///     merge_precedence: MergePrecedence::VolatileWins,
///     legacy_delete_key: true,
///     max_batch_size: None,
/// };
/// let default = EngineSettings::default();
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineSettings {
    /// Separator between setting path segments. Defaults to `/`
    pub path_separator: char,
    /// How `retrieveAll` combines the volatile and persistent tiers. Defaults to volatile values
    /// overriding persistent ones
    pub merge_precedence: MergePrecedence,
    /// Whether `delete` and `reset` fall back to reading their paths from the `setting` key when
    /// `setting_path` is absent. Defaults to `true`
    pub legacy_delete_key: bool,
    /// Maximum number of actions executed per batch. Actions past the limit are reported as
    /// failed. Defaults to no limit
    pub max_batch_size: Option<usize>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            path_separator: DEFAULT_SEPARATOR,
            merge_precedence: MergePrecedence::VolatileWins,
            legacy_delete_key: true,
            max_batch_size: None,
        }
    }
}
