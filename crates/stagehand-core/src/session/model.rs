//! Session domain model.
//!
//! The session is the only state that survives across requests: which screen
//! the user is on, which stage of the conversation graph they are in, and an
//! open payload map for screen-scoped data.

use crate::action::UserId;
use crate::screen::ScreenId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-user persisted conversation state.
///
/// The payload is an open `serde_json` map: keys unknown to the running
/// binary are preserved across a load→mutate→save cycle, so screens can add
/// new payload keys over the system's lifetime without breaking old sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The owning user.
    pub user_id: UserId,
    /// The stage of the conversation graph the user is in.
    #[serde(rename = "current_stage")]
    pub stage: String,
    /// The screen currently displayed to the user.
    pub current_screen: ScreenId,
    /// Conversation-scoped data set by screens.
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// Timestamp of the last mutation (RFC 3339).
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates a fresh session positioned at a stage's entry screen.
    pub fn new(user_id: UserId, stage: impl Into<String>, entry_screen: ScreenId) -> Self {
        Self {
            user_id,
            stage: stage.into(),
            current_screen: entry_screen,
            payload: Map::new(),
            updated_at: Utc::now(),
        }
    }

    /// Stores a payload value under the given key.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.payload.insert(key.into(), value.into());
    }

    /// Reads a payload value.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Updates the mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_payload_keys_survive_round_trip() {
        let raw = r#"{
            "user_id": 42,
            "current_stage": "default",
            "current_screen": "main_menu",
            "payload": {"quiz_score": 3, "added_by_future_version": {"nested": true}},
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let mut session: Session = serde_json::from_str(raw).unwrap();
        session.set_value("quiz_score", 4);
        let serialized = serde_json::to_string(&session).unwrap();
        let reloaded: Session = serde_json::from_str(&serialized).unwrap();
        assert_eq!(reloaded.get_value("quiz_score"), Some(&Value::from(4)));
        assert!(reloaded.payload.contains_key("added_by_future_version"));
    }

    #[test]
    fn stage_serializes_under_its_persisted_name() {
        let session = Session::new(UserId(1), "default", ScreenId::new("main_menu"));
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["current_stage"], Value::from("default"));
        assert!(value.get("stage").is_none());
    }

    #[test]
    fn new_session_points_at_entry_screen() {
        let session = Session::new(UserId(1), "default", ScreenId::new("main_menu"));
        assert_eq!(session.current_screen, ScreenId::new("main_menu"));
        assert!(session.payload.is_empty());
    }
}
