//! The render composer.
//!
//! Turns a screen's declared layout into a concrete message payload,
//! filtering out buttons the user's permissions forbid. Denied buttons are
//! omitted entirely, never shown disabled, so screens should keep a fallback
//! navigation path that is not gated.

use crate::action::MessageRef;
use crate::permission::{GlobalSwitches, PermissionEvaluator};
use crate::role::RoleSet;
use crate::screen::{ButtonTarget, Screen, ScreenId};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A rendered button target, ready for platform delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "target")]
pub enum RenderedTarget {
    /// Activating the button requests a transition to this screen.
    Transition(ScreenId),
    /// The platform client opens this URL.
    Url(String),
}

/// A button that survived permission filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedButton {
    pub label: String,
    #[serde(flatten)]
    pub target: RenderedTarget,
}

/// How the outbound collaborator should place the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyMode {
    /// Send a brand new message.
    SendNew,
    /// Edit the message the user is currently looking at.
    Edit(MessageRef),
}

/// A fully rendered message payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub keyboard: Vec<Vec<RenderedButton>>,
    pub reply: ReplyMode,
}

/// Per-render options. Constructed fresh per render call, never persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    /// Forces a new message even when an editable one exists.
    pub as_new_message: bool,
    /// The message currently displayed to the user, if known.
    pub edit_ref: Option<MessageRef>,
}

impl RenderConfig {
    pub fn new_message() -> Self {
        Self {
            as_new_message: true,
            edit_ref: None,
        }
    }

    pub fn edit(message_ref: MessageRef) -> Self {
        Self {
            as_new_message: false,
            edit_ref: Some(message_ref),
        }
    }

    fn reply_mode(&self) -> ReplyMode {
        match (self.as_new_message, self.edit_ref) {
            (false, Some(message_ref)) => ReplyMode::Edit(message_ref),
            _ => ReplyMode::SendNew,
        }
    }
}

/// Composes screens into message payloads.
#[derive(Clone)]
pub struct Renderer {
    evaluator: Arc<PermissionEvaluator>,
}

impl Renderer {
    pub fn new(evaluator: Arc<PermissionEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Renders a screen for a user.
    ///
    /// The text content is produced first, then each declared button is kept
    /// only if its permission rule (when present) allows this user.
    pub fn render(
        &self,
        screen: &Screen,
        session: &Session,
        roles: &RoleSet,
        switches: &GlobalSwitches,
        config: &RenderConfig,
    ) -> Message {
        let text = screen.content(session);
        let keyboard = if screen.hide_keyboard() {
            Vec::new()
        } else {
            self.compose_keyboard(screen, session, roles, switches)
        };
        Message {
            text,
            keyboard,
            reply: config.reply_mode(),
        }
    }

    /// Renders a notice over a screen's keyboard, e.g. a permission denial.
    /// The screen's navigation stays available while the text explains the
    /// denial.
    pub fn render_notice(
        &self,
        notice: impl Into<String>,
        screen: &Screen,
        session: &Session,
        roles: &RoleSet,
        switches: &GlobalSwitches,
        config: &RenderConfig,
    ) -> Message {
        let mut message = self.render(screen, session, roles, switches, config);
        message.text = notice.into();
        message
    }

    fn compose_keyboard(
        &self,
        screen: &Screen,
        session: &Session,
        roles: &RoleSet,
        switches: &GlobalSwitches,
    ) -> Vec<Vec<RenderedButton>> {
        let mut keyboard = Vec::new();
        for row in screen.keyboard(session) {
            let mut rendered_row = Vec::new();
            for button in row {
                if let Some(rule) = &button.required {
                    if !self.evaluator.evaluate(roles, switches, rule).is_allowed() {
                        continue;
                    }
                }
                let target = match button.target {
                    ButtonTarget::Transition(id) => RenderedTarget::Transition(id),
                    ButtonTarget::Url(url) => RenderedTarget::Url(url),
                };
                rendered_row.push(RenderedButton {
                    label: button.label,
                    target,
                });
            }
            if !rendered_row.is_empty() {
                keyboard.push(rendered_row);
            }
        }
        keyboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::UserId;
    use crate::permission::Rule;
    use crate::role::{Role, role_set};
    use crate::screen::Button;

    fn session() -> Session {
        Session::new(UserId(1), "default", ScreenId::new("main_menu"))
    }

    fn renderer() -> Renderer {
        Renderer::new(Arc::new(PermissionEvaluator::new()))
    }

    fn gated_screen() -> Screen {
        Screen::builder("main_menu")
            .text("Main menu")
            .buttons(vec![
                vec![Button::goto("Help", "help")],
                vec![Button::goto("Admin zone", "admin").require(Rule::HasRole(Role::Admin))],
            ])
            .build()
    }

    #[test]
    fn denied_buttons_are_omitted() {
        let message = renderer().render(
            &gated_screen(),
            &session(),
            &role_set(&[Role::Regular]),
            &GlobalSwitches::default(),
            &RenderConfig::new_message(),
        );
        assert_eq!(message.keyboard.len(), 1);
        assert_eq!(message.keyboard[0][0].label, "Help");
    }

    #[test]
    fn allowed_buttons_are_kept() {
        let message = renderer().render(
            &gated_screen(),
            &session(),
            &role_set(&[Role::Admin]),
            &GlobalSwitches::default(),
            &RenderConfig::new_message(),
        );
        assert_eq!(message.keyboard.len(), 2);
        assert_eq!(message.keyboard[1][0].label, "Admin zone");
    }

    #[test]
    fn hide_keyboard_strips_all_buttons() {
        let screen = Screen::builder("farewell")
            .text("Bye")
            .buttons(vec![vec![Button::goto("Back", "main_menu")]])
            .hide_keyboard()
            .build();
        let message = renderer().render(
            &screen,
            &session(),
            &role_set(&[Role::Regular]),
            &GlobalSwitches::default(),
            &RenderConfig::new_message(),
        );
        assert!(message.keyboard.is_empty());
    }

    #[test]
    fn edit_config_selects_edit_reply_mode() {
        let message_ref = MessageRef {
            chat_id: 7,
            message_id: 99,
        };
        let message = renderer().render(
            &gated_screen(),
            &session(),
            &role_set(&[Role::Regular]),
            &GlobalSwitches::default(),
            &RenderConfig::edit(message_ref),
        );
        assert_eq!(message.reply, ReplyMode::Edit(message_ref));
    }

    #[test]
    fn notice_replaces_text_but_keeps_navigation() {
        let message = renderer().render_notice(
            "access denied",
            &gated_screen(),
            &session(),
            &role_set(&[Role::Regular]),
            &GlobalSwitches::default(),
            &RenderConfig::new_message(),
        );
        assert_eq!(message.text, "access denied");
        assert!(!message.keyboard.is_empty());
    }
}
