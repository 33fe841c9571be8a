use chrono::{NaiveDate, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ParallelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Requestor {
    Me,
    #[default]
    #[serde(rename = "Co-Parent")]
    CoParent,
    Other,
}

impl Requestor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requestor::Me => "Me",
            Requestor::CoParent => "Co-Parent",
            Requestor::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "me" | "self" => Some(Requestor::Me),
            "co-parent" | "coparent" => Some(Requestor::CoParent),
            "other" => Some(Requestor::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Requestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One recorded custody schedule change. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub requestor: Requestor,
    pub reason: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

/// User input for a new log entry, before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub date: Option<NaiveDate>,
    pub requestor: Requestor,
    pub reason: String,
    pub notes: String,
}

impl Default for NewLogEntry {
    fn default() -> Self {
        Self {
            date: Some(Utc::now().date_naive()),
            requestor: Requestor::CoParent,
            reason: String::new(),
            notes: String::new(),
        }
    }
}

impl NewLogEntry {
    /// Validates the draft and stamps it with a fresh id and timestamp.
    pub fn into_entry(self) -> Result<LogEntry> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(ParallelError::Validation(
                "A reason for the change is required".to_string(),
            ));
        }
        let date = self
            .date
            .ok_or_else(|| ParallelError::Validation("A date is required".to_string()))?;

        Ok(LogEntry {
            id: nanoid!(),
            date,
            requestor: self.requestor,
            reason: reason.to_string(),
            notes: self.notes.trim().to_string(),
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}

/// The single locally persisted profile.
///
/// Loading keeps whatever can be read: missing, `null` or mistyped fields
/// take their defaults, unreadable log entries are dropped, and unknown keys
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub co_parent_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub children_names: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub decree_context: String,
    #[serde(deserialize_with = "lenient_string")]
    pub parenting_plan_context: String,
    /// Newest first.
    #[serde(deserialize_with = "lenient_logs")]
    pub logs: Vec<LogEntry>,
}

impl UserProfile {
    pub fn decree_context(&self) -> Option<&str> {
        non_blank(&self.decree_context)
    }

    pub fn parenting_plan_context(&self) -> Option<&str> {
        non_blank(&self.parenting_plan_context)
    }

    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(co_parent_name) = patch.co_parent_name {
            self.co_parent_name = co_parent_name;
        }
        if let Some(children_names) = patch.children_names {
            self.children_names = children_names;
        }
        if let Some(decree_context) = patch.decree_context {
            self.decree_context = decree_context;
        }
        if let Some(parenting_plan_context) = patch.parenting_plan_context {
            self.parenting_plan_context = parenting_plan_context;
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Null => Ok(String::new()),
        other => {
            tracing::warn!(found = %value_kind(&other), "Expected text in stored profile, using default");
            Ok(String::new())
        }
    }
}

fn lenient_logs<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<LogEntry>, D::Error> {
    let values = match Value::deserialize(deserializer)? {
        Value::Array(values) => values,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!(found = %value_kind(&other), "Stored logs are not a list, dropping them");
            return Ok(Vec::new());
        }
    };

    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable log entry");
                None
            }
        })
        .collect())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_blank(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.trim().is_empty())
}

/// Field-by-field profile edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub co_parent_name: Option<String>,
    pub children_names: Option<String>,
    pub decree_context: Option<String>,
    pub parenting_plan_context: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
