//! Event — a change pushed to observers of a thing.
//!
//! Property writes and action status transitions are both announced as
//! [`ThingEvent`]s. The transport turns them into Web Thing messages with
//! [`ThingEvent::to_message`].

use serde_json::{Map, Value, json};

use crate::action::ActionSnapshot;
use crate::value::PropertyValue;

/// Something observable that happened on a thing.
#[derive(Debug, Clone, PartialEq)]
pub enum ThingEvent {
    /// A property took a new value.
    PropertyStatus { name: String, value: PropertyValue },
    /// An action changed status.
    ActionStatus(ActionSnapshot),
}

impl ThingEvent {
    /// Web Thing message type (`"propertyStatus"` or `"actionStatus"`).
    #[must_use]
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::PropertyStatus { .. } => "propertyStatus",
            Self::ActionStatus(_) => "actionStatus",
        }
    }

    /// Serialize as `{"messageType": …, "data": {…}}`.
    #[must_use]
    pub fn to_message(&self) -> Value {
        let data = match self {
            Self::PropertyStatus { name, value } => {
                let mut map = Map::new();
                map.insert(name.clone(), value.to_json());
                Value::Object(map)
            }
            Self::ActionStatus(snapshot) => snapshot.to_description(),
        };
        json!({
            "messageType": self.message_type(),
            "data": data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionStatus;
    use crate::id::ActionId;
    use crate::time::now;

    #[test]
    fn should_render_property_status_message() {
        let event = ThingEvent::PropertyStatus {
            name: "sentiments".to_string(),
            value: PropertyValue::Number(0.5),
        };
        assert_eq!(
            event.to_message(),
            json!({"messageType": "propertyStatus", "data": {"sentiments": 0.5}})
        );
    }

    #[test]
    fn should_render_action_status_message() {
        let snapshot = ActionSnapshot {
            id: ActionId::new(),
            name: "word_tokenize".to_string(),
            input: json!({"text": "a b"}),
            status: ActionStatus::Running,
            time_requested: now(),
            time_started: Some(now()),
            time_completed: None,
            error: None,
        };
        let message = ThingEvent::ActionStatus(snapshot).to_message();
        assert_eq!(message["messageType"], "actionStatus");
        assert_eq!(message["data"]["word_tokenize"]["status"], "running");
    }
}
