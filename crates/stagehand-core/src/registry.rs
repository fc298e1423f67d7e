//! The screen registry: the static conversation graph.
//!
//! Screens are registered per stage during startup, validated once, and the
//! resulting registry is immutable. Request-handling paths read it
//! concurrently without locking.

use crate::action::UserId;
use crate::error::{Result, StagehandError};
use crate::permission::PermissionEvaluator;
use crate::screen::{ButtonTarget, Screen, ScreenId};
use crate::session::Session;
use std::collections::HashMap;

/// The immutable screen graph, built once at startup.
#[derive(Debug)]
pub struct ScreenRegistry {
    screens: HashMap<ScreenId, Screen>,
    stages: HashMap<ScreenId, String>,
    entries: HashMap<String, ScreenId>,
    commands: HashMap<String, ScreenId>,
}

impl ScreenRegistry {
    pub fn builder() -> ScreenRegistryBuilder {
        ScreenRegistryBuilder::default()
    }

    /// Looks up a screen by id.
    pub fn get(&self, id: &ScreenId) -> Option<&Screen> {
        self.screens.get(id)
    }

    /// Resolves a stage to its designated entry screen.
    pub fn entry(&self, stage: &str) -> Option<&ScreenId> {
        self.entries.get(stage)
    }

    /// The stage a screen was registered under.
    pub fn stage_of(&self, id: &ScreenId) -> Option<&str> {
        self.stages.get(id).map(String::as_str)
    }

    /// Resolves a bot command (e.g. `/start`) to its bound screen.
    pub fn resolve_command(&self, command: &str) -> Option<&ScreenId> {
        self.commands.get(command)
    }

    pub fn contains(&self, id: &ScreenId) -> bool {
        self.screens.contains_key(id)
    }
}

/// Collects screen registrations and validates them into a [`ScreenRegistry`].
///
/// All validation failures are fatal configuration errors: the process must
/// refuse to start rather than defer them to request time.
#[derive(Default)]
pub struct ScreenRegistryBuilder {
    screens: HashMap<ScreenId, (String, Screen)>,
    entries: HashMap<String, Vec<ScreenId>>,
    commands: HashMap<String, ScreenId>,
    duplicates: Vec<ScreenId>,
}

impl ScreenRegistryBuilder {
    /// Registers a screen under a stage.
    pub fn register(mut self, stage: impl Into<String>, screen: Screen) -> Self {
        let stage = stage.into();
        let id = screen.id().clone();
        if self.screens.contains_key(&id) {
            self.duplicates.push(id);
        } else {
            self.screens.insert(id, (stage, screen));
        }
        self
    }

    /// Registers a screen and designates it as the stage's entry screen.
    pub fn register_entry(mut self, stage: impl Into<String>, screen: Screen) -> Self {
        let stage = stage.into();
        let id = screen.id().clone();
        self.entries.entry(stage.clone()).or_default().push(id);
        self.register(stage, screen)
    }

    /// Binds a bot command to a target screen.
    pub fn bind_command(mut self, command: impl Into<String>, target: impl Into<ScreenId>) -> Self {
        self.commands.insert(command.into(), target.into());
        self
    }

    /// Validates the collected registrations and builds the registry.
    ///
    /// Checks: no duplicate screen ids, exactly one entry screen per stage,
    /// every button transition target resolves, every command binding
    /// resolves, and every referenced permission rule is registered on the
    /// evaluator. Keyboard producers are invoked once with a probe session
    /// to collect their declared targets.
    pub fn build(self, evaluator: &PermissionEvaluator) -> Result<ScreenRegistry> {
        if let Some(id) = self.duplicates.first() {
            return Err(StagehandError::config(format!(
                "duplicate screen id '{id}'"
            )));
        }

        let mut entries = HashMap::new();
        for (stage, screens) in &self.entries {
            match screens.as_slice() {
                [entry] => {
                    entries.insert(stage.clone(), entry.clone());
                }
                [] => unreachable!("entry list is only created on insert"),
                many => {
                    return Err(StagehandError::config(format!(
                        "stage '{stage}' has {} entry screens, expected exactly one",
                        many.len()
                    )));
                }
            }
        }
        for (stage, _) in self.screens.values() {
            if !entries.contains_key(stage) {
                return Err(StagehandError::config(format!(
                    "stage '{stage}' has no entry screen"
                )));
            }
        }

        for (id, (stage, screen)) in &self.screens {
            if let Some(rule) = screen.entry_permission() {
                evaluator.validate_rule(rule)?;
            }

            let probe = Session::new(UserId(0), stage.clone(), id.clone());
            for row in screen.keyboard(&probe) {
                for button in row {
                    if let Some(rule) = &button.required {
                        evaluator.validate_rule(rule)?;
                    }
                    if let ButtonTarget::Transition(target) = &button.target {
                        if !self.screens.contains_key(target) {
                            return Err(StagehandError::config(format!(
                                "screen '{id}' declares a button targeting unknown screen '{target}'"
                            )));
                        }
                    }
                }
            }
        }

        for (command, target) in &self.commands {
            if !self.screens.contains_key(target) {
                return Err(StagehandError::config(format!(
                    "command '{command}' is bound to unknown screen '{target}'"
                )));
            }
        }

        evaluator.validate()?;

        let mut screens = HashMap::with_capacity(self.screens.len());
        let mut stages = HashMap::with_capacity(self.screens.len());
        for (id, (stage, screen)) in self.screens {
            stages.insert(id.clone(), stage);
            screens.insert(id, screen);
        }
        Ok(ScreenRegistry {
            screens,
            stages,
            entries,
            commands: self.commands,
        })
    }
}
