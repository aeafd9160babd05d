//! Hierarchical setting paths.

use std::{fmt, str::FromStr};

use mailweb_error::{kind, ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator used when no other separator is configured.
pub const DEFAULT_SEPARATOR: char = '/';

/// Errors produced when parsing a [`SettingPath`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidPathError {
    #[allow(missing_docs)]
    #[error("Setting path is empty")]
    Empty,
    #[allow(missing_docs)]
    #[error("Setting path '{0}' contains no segments")]
    NoSegments(String),
    #[allow(missing_docs)]
    #[error("Setting path contains an empty segment")]
    EmptySegment,
    /// A segment contains [`DEFAULT_SEPARATOR`], which would split it when the path is displayed
    /// and parsed again.
    #[error("Setting path segment '{0}' contains '/'")]
    SeparatorInSegment(String),
}

impl ErrorKind for InvalidPathError {
    fn error_kind(&self) -> &'static str {
        kind::INVALID_PATH
    }
}

/// A normalized location inside a settings tree.
///
/// A path is a non-empty sequence of non-empty segments, none of which contains
/// [`DEFAULT_SEPARATOR`]. Equality and ordering compare the segments one by one, so `a/b` sorts
/// before `a/b/c` and `a/c`. The string form always uses [`DEFAULT_SEPARATOR`] and parses back to
/// the same path.
///
/// ```
/// use mailweb_state::SettingPath;
///
/// let path: SettingPath = "general/theme".parse().unwrap();
/// assert_eq!(path.segments(), ["general", "theme"]);
/// assert!(SettingPath::parse("general").unwrap().is_ancestor_of(&path));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SettingPath {
    segments: Vec<String>,
}

impl SettingPath {
    /// Parse a path using [`DEFAULT_SEPARATOR`].
    pub fn parse(raw: &str) -> Result<Self, InvalidPathError> {
        Self::parse_with(raw, DEFAULT_SEPARATOR)
    }

    /// Parse a path using a custom separator.
    ///
    /// Empty segments are skipped, so leading, trailing and doubled separators are ignored. A
    /// segment containing [`DEFAULT_SEPARATOR`] is rejected.
    pub fn parse_with(raw: &str, separator: char) -> Result<Self, InvalidPathError> {
        if raw.is_empty() {
            return Err(InvalidPathError::Empty);
        }

        let segments: Vec<String> = raw
            .split(separator)
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();

        if segments.is_empty() {
            return Err(InvalidPathError::NoSegments(raw.to_owned()));
        }
        check_separators(&segments)?;

        Ok(Self { segments })
    }

    /// Build a path from already split segments. Unlike parsing, empty segments are rejected.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, InvalidPathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();

        if segments.is_empty() {
            return Err(InvalidPathError::Empty);
        }
        if segments.iter().any(String::is_empty) {
            return Err(InvalidPathError::EmptySegment);
        }
        check_separators(&segments)?;

        Ok(Self { segments })
    }

    #[allow(missing_docs)]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments, always at least one.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Split into the ancestor segments and the final segment.
    pub fn split_last(&self) -> (&[String], &str) {
        match self.segments.split_last() {
            Some((last, parents)) => (parents, last.as_str()),
            // Unreachable, constructors reject empty paths.
            None => (&[], ""),
        }
    }

    /// The path of the direct parent node, `None` for top level paths.
    pub fn parent(&self) -> Option<SettingPath> {
        match self.segments.len() {
            0 | 1 => None,
            len => Some(Self {
                segments: self.segments[..len - 1].to_vec(),
            }),
        }
    }

    /// The first `depth` segments of this path. `depth` is clamped to `1..=self.depth()`.
    pub fn prefix(&self, depth: usize) -> SettingPath {
        let depth = depth.clamp(1, self.segments.len());
        Self {
            segments: self.segments[..depth].to_vec(),
        }
    }

    /// Append a segment.
    pub fn join(&self, segment: &str) -> Result<SettingPath, InvalidPathError> {
        if segment.is_empty() {
            return Err(InvalidPathError::EmptySegment);
        }
        if segment.contains(DEFAULT_SEPARATOR) {
            return Err(InvalidPathError::SeparatorInSegment(segment.to_owned()));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Ok(Self { segments })
    }

    /// True if `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &SettingPath) -> bool {
        self.segments.len() < other.segments.len() && other.segments.starts_with(&self.segments)
    }
}

fn check_separators(segments: &[String]) -> Result<(), InvalidPathError> {
    match segments
        .iter()
        .find(|segment| segment.contains(DEFAULT_SEPARATOR))
    {
        Some(segment) => Err(InvalidPathError::SeparatorInSegment(segment.clone())),
        None => Ok(()),
    }
}

impl fmt::Display for SettingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, "{DEFAULT_SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for SettingPath {
    type Err = InvalidPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SettingPath {
    type Error = InvalidPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SettingPath> for String {
    fn from(value: SettingPath) -> Self {
        value.to_string()
    }
}
