use std::sync::Arc;
use std::time::Duration;

use serenity::all::{Context, EditMember, GuildId, RoleId, Timestamp, UserId};
use serenity::async_trait;
use serenity::gateway::ShardManager;
use serenity::prelude::TypeMapKey;

use crate::activity::StatusRequest;

/// Key for sharing the shard manager through the client data map, so the
/// serenity-backed platform can report gateway heartbeat latency.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

/// Every Discord side effect a command handler can perform. Handlers only
/// talk to Discord through this trait, which keeps them runnable against a
/// recording fake in tests.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn kick(&self, user: UserId, reason: &str) -> Result<(), serenity::Error>;
    async fn ban(&self, user: UserId, reason: &str) -> Result<(), serenity::Error>;
    async fn timeout_until(&self, user: UserId, until: Timestamp) -> Result<(), serenity::Error>;
    async fn add_role(&self, user: UserId, role: RoleId) -> Result<(), serenity::Error>;
    async fn remove_role(&self, user: UserId, role: RoleId) -> Result<(), serenity::Error>;
    fn set_presence(&self, status: &StatusRequest);
    async fn latency(&self) -> Option<Duration>;
}

/// Serenity-backed platform, scoped to the guild an invocation came from.
pub struct DiscordPlatform {
    pub ctx: Context,
    pub guild: GuildId,
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn kick(&self, user: UserId, reason: &str) -> Result<(), serenity::Error> {
        self.guild.kick_with_reason(&self.ctx.http, user, reason).await
    }

    async fn ban(&self, user: UserId, reason: &str) -> Result<(), serenity::Error> {
        self.guild
            .ban_with_reason(&self.ctx.http, user, 0, reason)
            .await
    }

    async fn timeout_until(&self, user: UserId, until: Timestamp) -> Result<(), serenity::Error> {
        self.guild
            .edit_member(
                &self.ctx,
                user,
                EditMember::new().disable_communication_until_datetime(until),
            )
            .await?;
        Ok(())
    }

    async fn add_role(&self, user: UserId, role: RoleId) -> Result<(), serenity::Error> {
        self.ctx
            .http
            .add_member_role(self.guild, user, role, None)
            .await
    }

    async fn remove_role(&self, user: UserId, role: RoleId) -> Result<(), serenity::Error> {
        self.ctx
            .http
            .remove_member_role(self.guild, user, role, None)
            .await
    }

    fn set_presence(&self, status: &StatusRequest) {
        self.ctx.set_activity(Some(status.to_activity_data()));
    }

    async fn latency(&self) -> Option<Duration> {
        let data = self.ctx.data.read().await;
        let shard_manager = data.get::<ShardManagerContainer>()?;
        let runners = shard_manager.runners.lock().await;
        runners
            .get(&self.ctx.shard_id)
            .and_then(|runner| runner.latency)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Mutex;

    use super::*;
    use crate::activity::ActivityKind;

    /// One recorded side effect, in the order the handler issued it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Kick { user: UserId, reason: String },
        Ban { user: UserId, reason: String },
        TimeoutUntil { user: UserId, until: i64 },
        AddRole { user: UserId, role: RoleId },
        RemoveRole { user: UserId, role: RoleId },
        SetPresence { kind: ActivityKind, message: String },
    }

    /// Records every platform call; optionally refuses them all, to exercise
    /// the dispatch error boundary.
    #[derive(Default)]
    pub struct RecordingPlatform {
        pub calls: Mutex<Vec<Call>>,
        pub fail: bool,
        pub latency: Option<Duration>,
    }

    impl RecordingPlatform {
        fn record(&self, call: Call) -> Result<(), serenity::Error> {
            if self.fail {
                return Err(serenity::Error::Other("refused by recording platform"));
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    #[async_trait]
    impl Platform for RecordingPlatform {
        async fn kick(&self, user: UserId, reason: &str) -> Result<(), serenity::Error> {
            self.record(Call::Kick {
                user,
                reason: reason.to_owned(),
            })
        }

        async fn ban(&self, user: UserId, reason: &str) -> Result<(), serenity::Error> {
            self.record(Call::Ban {
                user,
                reason: reason.to_owned(),
            })
        }

        async fn timeout_until(
            &self,
            user: UserId,
            until: Timestamp,
        ) -> Result<(), serenity::Error> {
            self.record(Call::TimeoutUntil {
                user,
                until: until.unix_timestamp(),
            })
        }

        async fn add_role(&self, user: UserId, role: RoleId) -> Result<(), serenity::Error> {
            self.record(Call::AddRole { user, role })
        }

        async fn remove_role(&self, user: UserId, role: RoleId) -> Result<(), serenity::Error> {
            self.record(Call::RemoveRole { user, role })
        }

        fn set_presence(&self, status: &StatusRequest) {
            self.calls.lock().unwrap().push(Call::SetPresence {
                kind: status.kind,
                message: status.message.clone(),
            });
        }

        async fn latency(&self) -> Option<Duration> {
            self.latency
        }
    }
}
