//! The navigation engine.
//!
//! The state machine proper: states are screen identifiers scoped by stage,
//! transitions are button activations or bot commands bound to a target
//! screen. All durable state lives in the persisted session; no in-memory
//! handler object survives across requests.

use crate::delivery::OutboundDelivery;
use crate::locks::UserLocks;
use crate::roles::RoleResolver;
use stagehand_core::action::{Action, ActionKind, MessageRef, UserId};
use stagehand_core::config::{DenialPolicy, EngineConfig};
use stagehand_core::error::{Result, StagehandError};
use stagehand_core::permission::{Decision, GlobalSwitches, PermissionEvaluator};
use stagehand_core::registry::ScreenRegistry;
use stagehand_core::render::{Message, RenderConfig, Renderer};
use stagehand_core::role::RoleSet;
use stagehand_core::screen::{Screen, ScreenId};
use stagehand_core::session::{Session, SessionRepository};
use std::sync::{Arc, RwLock};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// What one handled action produced.
#[derive(Debug, Clone)]
pub struct NavigationOutcome {
    /// The rendered message, after permission filtering.
    pub message: Message,
    /// The screen the user ends up on.
    pub screen: ScreenId,
    /// `Allow` for a completed transition, `Deny` with the reason otherwise.
    /// A denial is a no-op transition, observable but not an error.
    pub decision: Decision,
    /// Reference to the delivered message.
    pub delivered: MessageRef,
}

/// The navigation state machine over a validated screen registry.
///
/// Requests for different users run concurrently; the load→mutate→save cycle
/// for a single user is serialized through a per-user lock held for the
/// whole critical section.
pub struct NavigationEngine {
    registry: Arc<ScreenRegistry>,
    permissions: Arc<PermissionEvaluator>,
    renderer: Renderer,
    sessions: Arc<dyn SessionRepository>,
    roles: Arc<dyn RoleResolver>,
    delivery: Arc<dyn OutboundDelivery>,
    locks: UserLocks,
    switches: RwLock<GlobalSwitches>,
    config: EngineConfig,
}

impl NavigationEngine {
    /// Builds the engine over startup-validated collaborators.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configured default stage has no
    /// entry screen in the registry.
    pub fn new(
        registry: Arc<ScreenRegistry>,
        permissions: Arc<PermissionEvaluator>,
        sessions: Arc<dyn SessionRepository>,
        roles: Arc<dyn RoleResolver>,
        delivery: Arc<dyn OutboundDelivery>,
        config: EngineConfig,
    ) -> Result<Self> {
        if registry.entry(&config.default_stage).is_none() {
            return Err(StagehandError::config(format!(
                "default stage '{}' has no entry screen",
                config.default_stage
            )));
        }
        Ok(Self {
            renderer: Renderer::new(permissions.clone()),
            registry,
            permissions,
            sessions,
            roles,
            delivery,
            locks: UserLocks::new(),
            switches: RwLock::new(config.switches),
            config,
        })
    }

    /// Flips maintenance mode for subsequent requests.
    pub fn set_maintenance(&self, enabled: bool) {
        self.switches
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .maintenance = enabled;
        info!(enabled, "maintenance mode toggled");
    }

    /// Flips the paywall switch for subsequent requests.
    pub fn set_paywall(&self, enabled: bool) {
        self.switches
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .paywall = enabled;
        info!(enabled, "paywall toggled");
    }

    fn switches_snapshot(&self) -> GlobalSwitches {
        *self.switches.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Handles one inbound user action end to end: load session, evaluate
    /// the requested transition, render, persist, deliver.
    pub async fn handle(&self, action: Action) -> Result<NavigationOutcome> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "action",
            %request_id,
            user = %action.user_id,
            kind = %action.kind,
        );
        let result = self.handle_inner(&action).instrument(span.clone()).await;
        if let Err(err) = &result {
            span.in_scope(|| error!(error = %err, "request failed"));
        }
        result
    }

    /// Programmatic transition outside direct user action, e.g. a scheduled
    /// notification moving a user to a new screen.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the target screen is not registered; an
    /// unknown target here is a caller bug, not a user action to excuse.
    pub async fn navigate(&self, user_id: UserId, target: ScreenId) -> Result<NavigationOutcome> {
        if !self.registry.contains(&target) {
            return Err(StagehandError::not_found("screen", target.to_string()));
        }
        let roles = self.roles.resolve_roles(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;
        let mut session = self.load_or_seed(user_id).await?;

        let (message, screen, decision) = self.apply_transition(
            &mut session,
            &target,
            &roles,
            &RenderConfig::new_message(),
        )?;
        self.sessions
            .save(&session, self.config.session_ttl())
            .await?;
        let delivered = self.deliver(user_id, &message).await?;
        Ok(NavigationOutcome {
            message,
            screen,
            decision,
            delivered,
        })
    }

    /// Drops the user's persisted session; their next action starts fresh at
    /// the entry screen.
    pub async fn reset(&self, user_id: UserId) -> Result<()> {
        let _guard = self.locks.acquire(user_id).await;
        self.sessions.delete(user_id).await
    }

    async fn handle_inner(&self, action: &Action) -> Result<NavigationOutcome> {
        let roles = self.roles.resolve_roles(action.user_id).await?;

        // The whole load→mutate→save cycle runs under the user lock so a
        // rapid double-tap cannot interleave a stale save.
        let _guard = self.locks.acquire(action.user_id).await;
        let mut session = self.load_or_seed(action.user_id).await?;

        let render_config = match (action.kind, action.message_ref) {
            (ActionKind::Button, Some(message_ref)) => RenderConfig::edit(message_ref),
            _ => RenderConfig::new_message(),
        };

        let (message, screen, decision) = match self.resolve_target(action) {
            Some(target) => {
                self.apply_transition(&mut session, &target, &roles, &render_config)?
            }
            None => {
                debug!(payload = %action.payload, "unknown transition");
                let current = self.current_screen(&session)?;
                let message = self.renderer.render_notice(
                    self.config.unknown_transition_notice.clone(),
                    current,
                    &session,
                    &roles,
                    &self.switches_snapshot(),
                    &render_config,
                );
                let screen = session.current_screen.clone();
                (message, screen, Decision::deny("unknown transition"))
            }
        };

        self.sessions
            .save(&session, self.config.session_ttl())
            .await?;
        let delivered = self.deliver(action.user_id, &message).await?;
        Ok(NavigationOutcome {
            message,
            screen,
            decision,
            delivered,
        })
    }

    /// Loads the user's session, seeding a fresh one at the default stage's
    /// entry screen for new users and store-expired sessions.
    async fn load_or_seed(&self, user_id: UserId) -> Result<Session> {
        if let Some(session) = self.sessions.find(user_id).await? {
            return Ok(session);
        }
        let stage = self.config.default_stage.clone();
        // Checked in `new`.
        let entry = self
            .registry
            .entry(&stage)
            .ok_or_else(|| StagehandError::Internal(format!("stage '{stage}' lost its entry")))?;
        debug!(%user_id, "seeding fresh session");
        Ok(Session::new(user_id, stage, entry.clone()))
    }

    /// Maps an inbound action to the screen it requests, if any.
    fn resolve_target(&self, action: &Action) -> Option<ScreenId> {
        match action.kind {
            ActionKind::Command => self.registry.resolve_command(&action.payload).cloned(),
            ActionKind::Button => {
                let target = ScreenId::new(action.payload.clone());
                self.registry.contains(&target).then_some(target)
            }
            ActionKind::Text => None,
        }
    }

    /// Evaluates the transition to `target` and renders the resulting view.
    /// On denial the session is left untouched and the current screen is
    /// re-rendered per the configured denial policy.
    fn apply_transition(
        &self,
        session: &mut Session,
        target: &ScreenId,
        roles: &RoleSet,
        render_config: &RenderConfig,
    ) -> Result<(Message, ScreenId, Decision)> {
        let switches = self.switches_snapshot();
        let target_screen = self
            .registry
            .get(target)
            .ok_or_else(|| StagehandError::Internal(format!("screen '{target}' vanished")))?;
        let target_stage = self
            .registry
            .stage_of(target)
            .ok_or_else(|| StagehandError::Internal(format!("screen '{target}' has no stage")))?;

        match self
            .permissions
            .check(roles, &switches, target_screen.entry_permission())
        {
            Decision::Allow => {
                session.current_screen = target.clone();
                session.stage = target_stage.to_string();
                target_screen.enter(session);
                session.touch();
                let message =
                    self.renderer
                        .render(target_screen, session, roles, &switches, render_config);
                Ok((message, target.clone(), Decision::Allow))
            }
            Decision::Deny { reason } => {
                debug!(%target, %reason, "transition denied");
                let current = self.current_screen(session)?;
                let message = match self.config.denial_policy {
                    DenialPolicy::Notice => self.renderer.render_notice(
                        reason.clone(),
                        current,
                        session,
                        roles,
                        &switches,
                        render_config,
                    ),
                    DenialPolicy::Redisplay => {
                        self.renderer
                            .render(current, session, roles, &switches, render_config)
                    }
                };
                let screen = session.current_screen.clone();
                Ok((message, screen, Decision::Deny { reason }))
            }
        }
    }

    fn current_screen(&self, session: &Session) -> Result<&Screen> {
        self.registry.get(&session.current_screen).ok_or_else(|| {
            StagehandError::Internal(format!(
                "session points at unregistered screen '{}'",
                session.current_screen
            ))
        })
    }

    /// Delivers the rendered message, falling back from a failed edit to one
    /// send-as-new before surfacing the failure.
    async fn deliver(&self, user_id: UserId, message: &Message) -> Result<MessageRef> {
        use stagehand_core::render::ReplyMode;

        match message.reply {
            ReplyMode::SendNew => self.delivery.send(user_id, message).await,
            ReplyMode::Edit(message_ref) => {
                match self.delivery.edit(message_ref, message).await {
                    Ok(delivered) => Ok(delivered),
                    Err(StagehandError::Delivery(cause)) => {
                        warn!(%cause, "edit failed, sending as new message");
                        let mut fallback = message.clone();
                        fallback.reply = ReplyMode::SendNew;
                        self.delivery.send(user_id, &fallback).await
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }
}
