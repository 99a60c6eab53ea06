//! Moderation primitives with a permission-aware boolean contract.
//!
//! [`ModerationFacade`] issues exactly one remote call per operation and
//! reduces the outcome to:
//!
//! - `Ok(true)`: the chat service accepted the action.
//! - `Ok(false)`: the service refused because the bot lacks authority.
//! - `Err(HostError::Transport(..))`: any other failure (network, rate
//!   limit, unknown target, timeout).
//!
//! No retries are attempted; that decision belongs to the caller.

use std::fmt;
use std::sync::Arc;

use crate::domain::{TenantId, UserId};
use crate::error::HostError;
use crate::transport::Transport;

/// Maximum message-deletion window the chat service accepts on ban.
pub const MAX_DELETE_MESSAGE_DAYS: u8 = 7;

/// How many days of a banned user's messages are deleted.
///
/// Defaults to zero: no messages are deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageRetention(u8);

impl MessageRetention {
    /// Deletes nothing.
    pub const NONE: Self = Self(0);

    /// Creates a window of `days`, clamped to [`MAX_DELETE_MESSAGE_DAYS`].
    #[must_use]
    pub fn days(days: u8) -> Self {
        Self(days.min(MAX_DELETE_MESSAGE_DAYS))
    }

    /// Returns the window length in days.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// A moderation intent against one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    /// Ban and delete messages within the retention window.
    Ban(MessageRetention),
    /// Lift a ban.
    Unban,
    /// Remove from the tenant.
    Kick,
    /// Server-mute.
    Mute,
    /// Lift a server mute.
    Unmute,
}

impl ModerationAction {
    /// Returns the action name as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ban(_) => "ban",
            Self::Unban => "unban",
            Self::Kick => "kick",
            Self::Mute => "mute",
            Self::Unmute => "unmute",
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tenant-scoped moderation operations.
#[derive(Debug, Clone)]
pub struct ModerationFacade {
    tenant_id: TenantId,
    transport: Arc<dyn Transport>,
    ban_retention: MessageRetention,
}

impl ModerationFacade {
    /// Creates a facade acting on `tenant_id` through `transport`.
    ///
    /// `ban_retention` is the window applied by [`Self::ban`].
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        transport: Arc<dyn Transport>,
        ban_retention: MessageRetention,
    ) -> Self {
        Self {
            tenant_id,
            transport,
            ban_retention,
        }
    }

    /// Returns the retention window used by [`Self::ban`].
    #[must_use]
    pub const fn ban_retention(&self) -> MessageRetention {
        self.ban_retention
    }

    /// Performs `action` against `user_id`.
    ///
    /// Returns `Ok(false)` only when the service denied the bot's
    /// authority; every authority denial collapses this way, whatever
    /// permission it names.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] for any other remote failure.
    pub async fn perform(
        &self,
        action: ModerationAction,
        user_id: UserId,
    ) -> Result<bool, HostError> {
        let tenant_id = self.tenant_id;
        let result = match action {
            ModerationAction::Ban(retention) => {
                self.transport
                    .ban(tenant_id, user_id, retention.get())
                    .await
            }
            ModerationAction::Unban => self.transport.unban(tenant_id, user_id).await,
            ModerationAction::Kick => self.transport.kick(tenant_id, user_id).await,
            ModerationAction::Mute => self.transport.mute(tenant_id, user_id).await,
            ModerationAction::Unmute => self.transport.unmute(tenant_id, user_id).await,
        };

        match result {
            Ok(()) => {
                tracing::info!(%tenant_id, %user_id, action = %action, "moderation action applied");
                Ok(true)
            }
            Err(err) if err.is_authority_denied() => {
                tracing::info!(
                    %tenant_id,
                    %user_id,
                    action = %action,
                    reason = %err,
                    "moderation action refused: insufficient permission"
                );
                Ok(false)
            }
            Err(err) => {
                tracing::warn!(%tenant_id, %user_id, action = %action, error = %err, "moderation action failed");
                Err(HostError::Transport(err))
            }
        }
    }

    /// Bans a user using the configured retention window.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on non-authority remote failures.
    pub async fn ban(&self, user_id: UserId) -> Result<bool, HostError> {
        self.perform(ModerationAction::Ban(self.ban_retention), user_id)
            .await
    }

    /// Lifts a ban.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on non-authority remote failures.
    pub async fn unban(&self, user_id: UserId) -> Result<bool, HostError> {
        self.perform(ModerationAction::Unban, user_id).await
    }

    /// Kicks a member.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on non-authority remote failures.
    pub async fn kick(&self, user_id: UserId) -> Result<bool, HostError> {
        self.perform(ModerationAction::Kick, user_id).await
    }

    /// Mutes a member.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on non-authority remote failures.
    pub async fn mute(&self, user_id: UserId) -> Result<bool, HostError> {
        self.perform(ModerationAction::Mute, user_id).await
    }

    /// Unmutes a member.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on non-authority remote failures.
    pub async fn unmute(&self, user_id: UserId) -> Result<bool, HostError> {
        self.perform(ModerationAction::Unmute, user_id).await
    }
}
