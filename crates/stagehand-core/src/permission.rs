//! Permission rules and their evaluator.
//!
//! Rules are first-class predicate values over (user roles, global switches)
//! that combine via explicit `AllOf`/`AnyOf`/`Not` combinators. Gating logic
//! such as "admin OR beta-tester" composes as data without touching the
//! evaluator. When several rules guard one screen they combine with AND
//! (`AllOf`): every rule must pass.

use crate::error::{Result, StagehandError};
use crate::role::{Role, RoleSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum_macros::{Display, EnumString};

/// A system-wide flag that can override per-role rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Switch {
    Maintenance,
    Paywall,
}

/// A snapshot of the global switches at evaluation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSwitches {
    #[serde(default)]
    pub maintenance: bool,
    #[serde(default)]
    pub paywall: bool,
}

impl GlobalSwitches {
    pub fn is_enabled(&self, switch: Switch) -> bool {
        match switch {
            Switch::Maintenance => self.maintenance,
            Switch::Paywall => self.paywall,
        }
    }
}

/// The outcome of a permission evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny {
            reason: reason.into(),
        }
    }
}

/// A composable permission predicate.
///
/// `Named` refers to a rule registered on the [`PermissionEvaluator`];
/// unresolved names are a configuration error caught by
/// [`PermissionEvaluator::validate`] at startup, never at evaluation time.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Always allows. Useful as an explicit "no gate" value in rule tables.
    Always,
    /// Allows when the user holds the given role.
    HasRole(Role),
    /// Allows when the given global switch is currently enabled.
    SwitchEnabled(Switch),
    /// Refers to a rule registered under this name.
    Named(String),
    /// Allows when every sub-rule allows.
    AllOf(Vec<Rule>),
    /// Allows when at least one sub-rule allows.
    AnyOf(Vec<Rule>),
    /// Inverts the sub-rule.
    Not(Box<Rule>),
}

impl Rule {
    pub fn named(name: impl Into<String>) -> Self {
        Rule::Named(name.into())
    }

    pub fn not(rule: Rule) -> Self {
        Rule::Not(Box::new(rule))
    }
}

/// A registered rule together with the human-readable reason reported when
/// it denies access.
#[derive(Debug, Clone)]
struct NamedRule {
    rule: Rule,
    denial_reason: String,
}

/// Evaluates permission rules against a user's resolved role set and the
/// current global switches.
///
/// The evaluator is pure: no I/O, no mutation, safe to call any number of
/// times per request. Its rule table is populated at startup and validated
/// once via [`PermissionEvaluator::validate`].
#[derive(Debug, Default)]
pub struct PermissionEvaluator {
    rules: HashMap<String, NamedRule>,
    gate: Option<NamedRule>,
}

impl PermissionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule under a stable name with its denial reason.
    pub fn register_rule(
        &mut self,
        name: impl Into<String>,
        rule: Rule,
        denial_reason: impl Into<String>,
    ) {
        self.rules.insert(
            name.into(),
            NamedRule {
                rule,
                denial_reason: denial_reason.into(),
            },
        );
    }

    /// Sets the global gate rule evaluated before any per-screen rule.
    ///
    /// The gate expresses switch overrides and their bypasses, e.g.
    /// `AnyOf[Not(SwitchEnabled(Maintenance)), HasRole(Admin)]` lets admins
    /// through while maintenance mode locks everyone else out.
    pub fn set_gate(&mut self, rule: Rule, denial_reason: impl Into<String>) {
        self.gate = Some(NamedRule {
            rule,
            denial_reason: denial_reason.into(),
        });
    }

    /// The default gate: maintenance mode locks out everyone except admins.
    pub fn with_default_gate(mut self) -> Self {
        self.set_gate(
            Rule::AnyOf(vec![
                Rule::not(Rule::SwitchEnabled(Switch::Maintenance)),
                Rule::HasRole(Role::Admin),
            ]),
            "the bot is under maintenance, please try again later",
        );
        self
    }

    /// Validates that every `Named` reference resolves and that no rule
    /// refers to itself through a cycle. Called once at startup; failure is
    /// fatal configuration.
    pub fn validate(&self) -> Result<()> {
        for (name, named) in &self.rules {
            let mut stack = HashSet::new();
            stack.insert(name.as_str());
            self.validate_refs(&named.rule, &mut stack)?;
        }
        if let Some(gate) = &self.gate {
            let mut stack = HashSet::new();
            self.validate_refs(&gate.rule, &mut stack)?;
        }
        Ok(())
    }

    /// Validates the `Named` references of a rule owned by a caller (e.g. a
    /// screen's entry permission) against this evaluator's table.
    pub fn validate_rule(&self, rule: &Rule) -> Result<()> {
        let mut stack = HashSet::new();
        self.validate_refs(rule, &mut stack)
    }

    fn validate_refs<'a>(&'a self, rule: &'a Rule, stack: &mut HashSet<&'a str>) -> Result<()> {
        match rule {
            Rule::Always | Rule::HasRole(_) | Rule::SwitchEnabled(_) => Ok(()),
            Rule::Named(name) => {
                let named = self.rules.get(name).ok_or_else(|| {
                    StagehandError::config(format!("permission rule '{name}' is unregistered"))
                })?;
                if !stack.insert(name.as_str()) {
                    return Err(StagehandError::config(format!(
                        "permission rule '{name}' refers to itself"
                    )));
                }
                self.validate_refs(&named.rule, stack)?;
                stack.remove(name.as_str());
                Ok(())
            }
            Rule::AllOf(rules) | Rule::AnyOf(rules) => {
                for rule in rules {
                    self.validate_refs(rule, stack)?;
                }
                Ok(())
            }
            Rule::Not(rule) => self.validate_refs(rule, stack),
        }
    }

    /// Evaluates an optional requirement, gate first.
    ///
    /// An absent requirement still passes through the gate, so a global
    /// switch locks every screen that does not carry an explicit bypass.
    pub fn check(
        &self,
        roles: &RoleSet,
        switches: &GlobalSwitches,
        required: Option<&Rule>,
    ) -> Decision {
        if let Some(gate) = &self.gate {
            if !self.evaluate(roles, switches, &gate.rule).is_allowed() {
                return Decision::deny(gate.denial_reason.clone());
            }
        }
        match required {
            Some(rule) => self.evaluate(roles, switches, rule),
            None => Decision::Allow,
        }
    }

    /// Evaluates a single rule. Pure; the gate is not consulted.
    pub fn evaluate(&self, roles: &RoleSet, switches: &GlobalSwitches, rule: &Rule) -> Decision {
        match rule {
            Rule::Always => Decision::Allow,
            Rule::HasRole(role) => {
                if roles.contains(role) {
                    Decision::Allow
                } else {
                    Decision::deny(format!("requires the {role} role"))
                }
            }
            Rule::SwitchEnabled(switch) => {
                if switches.is_enabled(*switch) {
                    Decision::Allow
                } else {
                    Decision::deny(format!("the {switch} switch is disabled"))
                }
            }
            Rule::Named(name) => match self.rules.get(name) {
                Some(named) => {
                    if self.evaluate(roles, switches, &named.rule).is_allowed() {
                        Decision::Allow
                    } else {
                        Decision::deny(named.denial_reason.clone())
                    }
                }
                // Unreachable after startup validation.
                None => Decision::deny(format!("permission rule '{name}' is unregistered")),
            },
            Rule::AllOf(rules) => {
                for rule in rules {
                    if let Decision::Deny { reason } = self.evaluate(roles, switches, rule) {
                        return Decision::Deny { reason };
                    }
                }
                Decision::Allow
            }
            Rule::AnyOf(rules) => {
                let mut last_reason = String::from("access denied");
                for rule in rules {
                    match self.evaluate(roles, switches, rule) {
                        Decision::Allow => return Decision::Allow,
                        Decision::Deny { reason } => last_reason = reason,
                    }
                }
                Decision::Deny {
                    reason: last_reason,
                }
            }
            Rule::Not(rule) => match self.evaluate(roles, switches, rule) {
                Decision::Allow => Decision::deny("access denied"),
                Decision::Deny { .. } => Decision::Allow,
            },
        }
    }
}
