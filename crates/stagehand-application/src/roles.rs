//! Role resolver collaborator.

use async_trait::async_trait;
use stagehand_core::action::UserId;
use stagehand_core::error::Result;
use stagehand_core::role::{Role, RoleSet};
use std::collections::HashMap;

/// Resolves the role set for a user.
///
/// Role membership lives outside this system (platform admin lists, billing
/// state, ...); the engine consumes one resolved set per request.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn resolve_roles(&self, user_id: UserId) -> Result<RoleSet>;
}

/// A fixed role table with a default for unlisted users.
///
/// Suitable for bots whose privileged user lists are part of configuration,
/// and as a test double.
#[derive(Debug, Default)]
pub struct StaticRoleResolver {
    users: HashMap<UserId, RoleSet>,
    fallback: RoleSet,
}

impl StaticRoleResolver {
    /// Unlisted users resolve to the `regular` role.
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            fallback: [Role::Regular].into_iter().collect(),
        }
    }

    pub fn with_user(mut self, user_id: UserId, roles: impl IntoIterator<Item = Role>) -> Self {
        self.users.insert(user_id, roles.into_iter().collect());
        self
    }
}

#[async_trait]
impl RoleResolver for StaticRoleResolver {
    async fn resolve_roles(&self, user_id: UserId) -> Result<RoleSet> {
        Ok(self
            .users
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}
