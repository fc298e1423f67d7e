//! Inbound action types.
//!
//! An [`Action`] is the record the inbound transport hands to the navigation
//! engine: who acted, what kind of interaction it was, and the raw payload.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

/// A platform-assigned user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A reference to a message already displayed to the user, used to edit it
/// in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// The kind of inbound interaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// A bot command such as `/start`.
    Command,
    /// An inline keyboard button activation; the payload carries the target
    /// screen id.
    Button,
    /// Free-form text input.
    Text,
}

/// One inbound user action as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub user_id: UserId,
    pub kind: ActionKind,
    /// Command name, button payload, or message text depending on `kind`.
    pub payload: String,
    /// The message the user interacted with, if any. Enables in-place edits.
    pub message_ref: Option<MessageRef>,
}

impl Action {
    pub fn command(user_id: UserId, command: impl Into<String>) -> Self {
        Self {
            user_id,
            kind: ActionKind::Command,
            payload: command.into(),
            message_ref: None,
        }
    }

    pub fn button(user_id: UserId, payload: impl Into<String>, message_ref: MessageRef) -> Self {
        Self {
            user_id,
            kind: ActionKind::Button,
            payload: payload.into(),
            message_ref: Some(message_ref),
        }
    }
}
