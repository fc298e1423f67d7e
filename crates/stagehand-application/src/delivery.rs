//! Outbound delivery collaborator.

use async_trait::async_trait;
use stagehand_core::action::{MessageRef, UserId};
use stagehand_core::error::Result;
use stagehand_core::render::Message;

/// Delivers rendered messages to the chat platform.
///
/// Failures are reported as `StagehandError::Delivery` and are recoverable:
/// the engine falls back from a failed edit to one send-as-new before
/// surfacing the failure.
#[async_trait]
pub trait OutboundDelivery: Send + Sync {
    /// Sends a new message to the user, returning a reference to it.
    async fn send(&self, user_id: UserId, message: &Message) -> Result<MessageRef>;

    /// Edits an existing message in place.
    ///
    /// Fails with `StagehandError::Delivery` when the message no longer
    /// exists on the platform (e.g. deleted by the user).
    async fn edit(&self, message_ref: MessageRef, message: &Message) -> Result<MessageRef>;
}
