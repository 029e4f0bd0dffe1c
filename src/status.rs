//! Per-operation outcomes collected during a run and their text rendering.

use crate::structure::Properties;
use std::fmt;

/// Result of one creation attempt. `T` is the assigned ID (`()` for the
/// properties upsert, which returns none).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Created(T),
    /// Dry run: nothing was sent.
    Planned,
    /// The call failed; holds the error text as returned by the API.
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Outcome::Created(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusEntry {
    Folder {
        name: String,
        parent_id: Option<u64>,
        outcome: Outcome<u64>,
    },
    Recipe {
        name: String,
        folder_id: Option<u64>,
        outcome: Outcome<u64>,
    },
    ProjectProperties {
        project_id: u64,
        properties: Properties,
        outcome: Outcome<()>,
    },
}

impl StatusEntry {
    pub fn is_created(&self) -> bool {
        match self {
            StatusEntry::Folder { outcome, .. } | StatusEntry::Recipe { outcome, .. } => outcome.is_created(),
            StatusEntry::ProjectProperties { outcome, .. } => outcome.is_created(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error().is_some()
    }

    /// ID assigned by the platform, for created folders and recipes.
    pub fn id(&self) -> Option<u64> {
        match self {
            StatusEntry::Folder {
                outcome: Outcome::Created(id),
                ..
            }
            | StatusEntry::Recipe {
                outcome: Outcome::Created(id),
                ..
            } => Some(*id),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StatusEntry::Folder { outcome, .. } | StatusEntry::Recipe { outcome, .. } => outcome.error(),
            StatusEntry::ProjectProperties { outcome, .. } => outcome.error(),
        }
    }
}

struct OrNone(Option<u64>);

impl fmt::Display for OrNone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => f.write_str("None"),
        }
    }
}

fn error_suffix(error: Option<&str>) -> String {
    error.map(|e| format!(" Error: {}", e)).unwrap_or_default()
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEntry::Folder {
                name,
                parent_id,
                outcome,
            } => match outcome {
                Outcome::Created(id) => write!(
                    f,
                    "Created folder: {} (ID: {}, Parent ID: {})",
                    name,
                    id,
                    OrNone(*parent_id)
                ),
                _ => write!(
                    f,
                    "Not created folder: {} (Parent ID: {}){}",
                    name,
                    OrNone(*parent_id),
                    error_suffix(outcome.error())
                ),
            },
            StatusEntry::Recipe {
                name,
                folder_id,
                outcome,
            } => match outcome {
                Outcome::Created(id) => write!(
                    f,
                    "Created recipe: {} (ID: {}, Folder ID: {})",
                    name,
                    id,
                    OrNone(*folder_id)
                ),
                _ => write!(
                    f,
                    "Not created recipe: {} (Folder ID: {}){}",
                    name,
                    OrNone(*folder_id),
                    error_suffix(outcome.error())
                ),
            },
            StatusEntry::ProjectProperties {
                project_id,
                properties,
                outcome,
            } => match outcome {
                Outcome::Created(()) => write!(
                    f,
                    "Upserted project properties for project_id {}: {}",
                    project_id,
                    serde_json::Value::Object(properties.clone())
                ),
                Outcome::Planned => write!(
                    f,
                    "Not upserted project properties for project_id {} (dry run)",
                    project_id
                ),
                Outcome::Failed(e) => write!(
                    f,
                    "Failed to upsert project properties for project_id {}: {}",
                    project_id, e
                ),
            },
        }
    }
}

/// Append-only record of every creation attempt, in the order attempted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatusLog {
    entries: Vec<StatusEntry>,
}

/// Tally of a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub planned: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} planned, {} failed",
            self.created, self.planned, self.failed
        )
    }
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: StatusEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatusEntry> {
        self.entries.iter()
    }

    pub fn summary(&self) -> Summary {
        self.entries.iter().fold(Summary::default(), |mut s, e| {
            if e.is_created() {
                s.created += 1;
            } else if e.is_failed() {
                s.failed += 1;
            } else {
                s.planned += 1;
            }
            s
        })
    }

    /// The report: one line per entry.
    pub fn render(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a StatusLog {
    type Item = &'a StatusEntry;
    type IntoIter = std::slice::Iter<'a, StatusEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
