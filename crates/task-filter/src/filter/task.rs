//! Read-only task projection consumed by the evaluator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::dates::Timestamp;

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    H,
    M,
    L,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::H => "H",
            Priority::M => "M",
            Priority::L => "L",
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
    Deleted,
    Waiting,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
            Status::Deleted => "deleted",
            Status::Waiting => "waiting",
        }
    }
}

/// Attribute access the evaluator needs from a task.
///
/// Hosts implement this over their own task type; [`Task`] is a ready-made
/// owned implementation. Virtual tags are computed by the host, never by the
/// filter engine.
pub trait TaskView {
    fn description(&self) -> &str;
    fn project(&self) -> Option<&str>;
    fn priority(&self) -> Option<Priority>;
    fn status(&self) -> Status;
    fn urgency(&self) -> f64;

    /// Value of a date attribute (`due`, `scheduled`, `entry`, `modified`,
    /// `wait`, `until`); `None` when unset or not a date attribute.
    fn date(&self, attribute: &str) -> Option<Timestamp>;

    fn tags(&self) -> &BTreeSet<String>;
    fn virtual_tags(&self) -> &BTreeSet<String>;

    /// Value of a user-defined attribute.
    fn uda(&self, name: &str) -> Option<&str>;
}

/// An owned task record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub urgency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<Timestamp>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub virtual_tags: BTreeSet<String>,
    #[serde(default)]
    pub uda: BTreeMap<String, String>,
}

impl Task {
    /// Creates a pending task with only a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

impl TaskView for Task {
    fn description(&self) -> &str {
        &self.description
    }

    fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    fn priority(&self) -> Option<Priority> {
        self.priority
    }

    fn status(&self) -> Status {
        self.status
    }

    fn urgency(&self) -> f64 {
        self.urgency
    }

    fn date(&self, attribute: &str) -> Option<Timestamp> {
        match attribute {
            "due" => self.due,
            "scheduled" => self.scheduled,
            "entry" => self.entry,
            "modified" => self.modified,
            "wait" => self.wait,
            "until" => self.until,
            _ => None,
        }
    }

    fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    fn virtual_tags(&self) -> &BTreeSet<String> {
        &self.virtual_tags
    }

    fn uda(&self, name: &str) -> Option<&str> {
        self.uda.get(name).map(String::as_str)
    }
}
