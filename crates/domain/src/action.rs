//! Action lifecycle — status, legal transitions, and point-in-time snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::ActionId;
use crate::time::Timestamp;

/// Lifecycle status of one action invocation.
///
/// Transitions are monotonic:
/// `Pending → Running → Completed | Failed`, and `Pending | Running → Cancelled`.
/// Nothing leaves a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ActionStatus {
    /// Whether the action has finished for good.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running | Self::Cancelled)
                | (Self::Running, Self::Completed | Self::Failed | Self::Cancelled)
        )
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Immutable view of an action at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSnapshot {
    pub id: ActionId,
    pub name: String,
    pub input: serde_json::Value,
    pub status: ActionStatus,
    pub time_requested: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_started: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_completed: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionSnapshot {
    /// Path of this action request relative to the thing root.
    #[must_use]
    pub fn href(&self) -> String {
        format!("/actions/{}/{}", self.name, self.id)
    }

    /// Web Thing action description: `{ "<name>": { "input", "href", "status", … } }`.
    #[must_use]
    pub fn to_description(&self) -> serde_json::Value {
        let mut body = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        body.remove("name");
        body.insert("href".to_string(), serde_json::Value::String(self.href()));

        let mut wrapper = serde_json::Map::new();
        wrapper.insert(self.name.clone(), serde_json::Value::Object(body));
        serde_json::Value::Object(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    fn snapshot(status: ActionStatus) -> ActionSnapshot {
        ActionSnapshot {
            id: ActionId::new(),
            name: "word_tokenize".to_string(),
            input: serde_json::json!({"text": "hello world"}),
            status,
            time_requested: now(),
            time_started: None,
            time_completed: None,
            error: None,
        }
    }

    #[test]
    fn should_allow_forward_transitions() {
        assert!(ActionStatus::Pending.can_transition_to(ActionStatus::Running));
        assert!(ActionStatus::Running.can_transition_to(ActionStatus::Completed));
        assert!(ActionStatus::Running.can_transition_to(ActionStatus::Failed));
        assert!(ActionStatus::Pending.can_transition_to(ActionStatus::Cancelled));
        assert!(ActionStatus::Running.can_transition_to(ActionStatus::Cancelled));
    }

    #[test]
    fn should_forbid_skipping_running() {
        assert!(!ActionStatus::Pending.can_transition_to(ActionStatus::Completed));
        assert!(!ActionStatus::Pending.can_transition_to(ActionStatus::Failed));
    }

    #[test]
    fn should_forbid_leaving_terminal_status() {
        for terminal in [
            ActionStatus::Completed,
            ActionStatus::Failed,
            ActionStatus::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                ActionStatus::Pending,
                ActionStatus::Running,
                ActionStatus::Completed,
                ActionStatus::Failed,
                ActionStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn should_forbid_going_backwards() {
        assert!(!ActionStatus::Running.can_transition_to(ActionStatus::Pending));
        assert!(!ActionStatus::Running.can_transition_to(ActionStatus::Running));
    }

    #[test]
    fn should_build_href_from_name_and_id() {
        let snap = snapshot(ActionStatus::Pending);
        assert_eq!(snap.href(), format!("/actions/word_tokenize/{}", snap.id));
    }

    #[test]
    fn should_wrap_description_under_action_name() {
        let snap = snapshot(ActionStatus::Completed);
        let desc = snap.to_description();
        let body = &desc["word_tokenize"];
        assert_eq!(body["status"], "completed");
        assert_eq!(body["input"]["text"], "hello world");
        assert_eq!(body["href"], snap.href());
        assert!(body.get("timeRequested").is_some());
        assert!(body.get("timeCompleted").is_none());
        assert!(body.get("name").is_none());
    }
}
