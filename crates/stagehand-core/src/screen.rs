//! Screen definitions.
//!
//! A screen is an immutable view definition: a stable identifier, a content
//! producer, a keyboard producer and optional permission gates. Screens are
//! registered once at startup and shared read-only afterwards.

use crate::permission::Rule;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A stable screen identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(pub String);

impl ScreenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ScreenId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ScreenId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a button leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonTarget {
    /// A transition to another registered screen.
    Transition(ScreenId),
    /// An external URL opened by the platform client.
    Url(String),
}

/// One inline keyboard button.
#[derive(Debug, Clone)]
pub struct Button {
    pub label: String,
    pub target: ButtonTarget,
    /// When present, the button is omitted from the rendered keyboard for
    /// users the rule denies.
    pub required: Option<Rule>,
}

impl Button {
    /// A button that moves the user to another screen.
    pub fn goto(label: impl Into<String>, target: impl Into<ScreenId>) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Transition(target.into()),
            required: None,
        }
    }

    /// A button that opens an external URL.
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Url(url.into()),
            required: None,
        }
    }

    /// Gates the button behind a permission rule.
    pub fn require(mut self, rule: Rule) -> Self {
        self.required = Some(rule);
        self
    }
}

/// Ordered rows of buttons.
pub type Keyboard = Vec<Vec<Button>>;

/// Produces a screen's text content from the current session.
pub type ContentFn = Arc<dyn Fn(&Session) -> String + Send + Sync>;

/// Produces a screen's declared keyboard from the current session.
pub type KeyboardFn = Arc<dyn Fn(&Session) -> Keyboard + Send + Sync>;

/// Runs when the user enters the screen; may contribute payload state.
pub type EntryHook = Arc<dyn Fn(&mut Session) + Send + Sync>;

/// An immutable screen definition.
pub struct Screen {
    id: ScreenId,
    entry_permission: Option<Rule>,
    hide_keyboard: bool,
    content: ContentFn,
    keyboard: KeyboardFn,
    on_enter: Option<EntryHook>,
}

impl Screen {
    pub fn builder(id: impl Into<ScreenId>) -> ScreenBuilder {
        ScreenBuilder::new(id)
    }

    pub fn id(&self) -> &ScreenId {
        &self.id
    }

    /// The rule gating entry to this screen, if any.
    pub fn entry_permission(&self) -> Option<&Rule> {
        self.entry_permission.as_ref()
    }

    pub fn hide_keyboard(&self) -> bool {
        self.hide_keyboard
    }

    /// Produces the text content for the given session.
    pub fn content(&self, session: &Session) -> String {
        (self.content)(session)
    }

    /// Produces the declared keyboard for the given session.
    pub fn keyboard(&self, session: &Session) -> Keyboard {
        (self.keyboard)(session)
    }

    /// Runs the entry hook, letting the screen contribute session payload.
    pub fn enter(&self, session: &mut Session) {
        if let Some(hook) = &self.on_enter {
            hook(session);
        }
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("id", &self.id)
            .field("entry_permission", &self.entry_permission)
            .field("hide_keyboard", &self.hide_keyboard)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Screen`].
pub struct ScreenBuilder {
    id: ScreenId,
    entry_permission: Option<Rule>,
    hide_keyboard: bool,
    content: ContentFn,
    keyboard: KeyboardFn,
    on_enter: Option<EntryHook>,
}

impl ScreenBuilder {
    pub fn new(id: impl Into<ScreenId>) -> Self {
        Self {
            id: id.into(),
            entry_permission: None,
            hide_keyboard: false,
            content: Arc::new(|_| String::new()),
            keyboard: Arc::new(|_| Vec::new()),
            on_enter: None,
        }
    }

    /// Static text content.
    pub fn text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.content(move |_| text.clone())
    }

    /// Dynamic text content derived from the session.
    pub fn content(mut self, f: impl Fn(&Session) -> String + Send + Sync + 'static) -> Self {
        self.content = Arc::new(f);
        self
    }

    /// Static keyboard layout.
    pub fn buttons(self, keyboard: Keyboard) -> Self {
        self.keyboard(move |_| keyboard.clone())
    }

    /// Dynamic keyboard derived from the session.
    pub fn keyboard(mut self, f: impl Fn(&Session) -> Keyboard + Send + Sync + 'static) -> Self {
        self.keyboard = Arc::new(f);
        self
    }

    /// Requires the rule to pass before the screen can be entered.
    pub fn entry_permission(mut self, rule: Rule) -> Self {
        self.entry_permission = Some(rule);
        self
    }

    /// Renders the screen without any keyboard, whatever it declares.
    pub fn hide_keyboard(mut self) -> Self {
        self.hide_keyboard = true;
        self
    }

    /// Hook run whenever the user enters the screen.
    pub fn on_enter(mut self, f: impl Fn(&mut Session) + Send + Sync + 'static) -> Self {
        self.on_enter = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Screen {
        Screen {
            id: self.id,
            entry_permission: self.entry_permission,
            hide_keyboard: self.hide_keyboard,
            content: self.content,
            keyboard: self.keyboard,
            on_enter: self.on_enter,
        }
    }
}
