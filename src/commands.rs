//! The command surface: one handler per command and the registry that
//! enumerates them all. Adding a command means adding its spec here; both
//! the prefix parser and the slash definitions are driven from this table.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;
use serenity::all::{Colour, Mention, Timestamp};
use serenity::async_trait;

use crate::activity::build_activity;
use crate::args::{ArgKind, ArgSpec, BoundArgs};
use crate::dispatch::{CommandHandler, CommandSpec, Invocation, Privilege, Registry, Reply};
use crate::error::CommandError;
use crate::platform::Platform;

const EIGHTBALL_RESPONSES: [&str; 5] = ["Yes", "No", "Maybe", "Definitely", "Ask again later"];

struct Ping;

#[async_trait]
impl CommandHandler for Ping {
    async fn run(
        &self,
        _args: &BoundArgs,
        _invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        let reply = match platform.latency().await {
            Some(latency) => Reply::text(format!("Pong! {}ms", latency.as_millis())),
            None => Reply::text("Pong! Latency is not measured yet."),
        };
        Ok(reply)
    }
}

struct Afk;

#[async_trait]
impl CommandHandler for Afk {
    async fn run(
        &self,
        _args: &BoundArgs,
        invocation: &Invocation,
        _platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        Ok(Reply::text(format!(
            "{} is now AFK.",
            Mention::User(invocation.caller.id)
        )))
    }
}

struct EightBall;

#[async_trait]
impl CommandHandler for EightBall {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        _platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        // The question itself is required but does not sway the ball.
        args.str("question")?;
        let answer = pick_response(&mut rand::rng());
        Ok(Reply::text(format!("🎱 {answer}")))
    }
}

pub(crate) fn pick_response(rng: &mut impl Rng) -> &'static str {
    EIGHTBALL_RESPONSES
        .choose(rng)
        .copied()
        .unwrap_or(EIGHTBALL_RESPONSES[0])
}

struct Say;

#[async_trait]
impl CommandHandler for Say {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        _platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        Ok(Reply::text(args.str("message")?))
    }
}

struct Embed;

#[async_trait]
impl CommandHandler for Embed {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        _platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        Ok(Reply::embed(
            args.str("title")?,
            args.str("description")?,
            Colour::BLUE,
        ))
    }
}

struct Status;

#[async_trait]
impl CommandHandler for Status {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        let status = build_activity(args.str("type")?, args.str("message")?)?;
        platform.set_presence(&status);
        Ok(Reply::text(format!("Now {} {}.", status.kind, status.message)))
    }
}

struct AddRole;

#[async_trait]
impl CommandHandler for AddRole {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        let member = args.member("member")?;
        let role = args.role("role")?;
        platform.add_role(member, role).await?;
        Ok(Reply::text(format!(
            "✅ Added {} to {}",
            Mention::Role(role),
            Mention::User(member)
        )))
    }
}

struct RemoveRole;

#[async_trait]
impl CommandHandler for RemoveRole {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        let member = args.member("member")?;
        let role = args.role("role")?;
        platform.remove_role(member, role).await?;
        Ok(Reply::text(format!(
            "❌ Removed {} from {}",
            Mention::Role(role),
            Mention::User(member)
        )))
    }
}

struct Kick;

#[async_trait]
impl CommandHandler for Kick {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        let member = args.member("member")?;
        let reason = args.str("reason")?;
        platform.kick(member, reason).await?;
        Ok(Reply::text(format!(
            "{} was kicked. Reason: {reason}",
            Mention::User(member)
        )))
    }
}

struct Ban;

#[async_trait]
impl CommandHandler for Ban {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        let member = args.member("member")?;
        let reason = args.str("reason")?;
        platform.ban(member, reason).await?;
        Ok(Reply::text(format!(
            "{} was banned. Reason: {reason}",
            Mention::User(member)
        )))
    }
}

struct Timeout;

#[async_trait]
impl CommandHandler for Timeout {
    async fn run(
        &self,
        args: &BoundArgs,
        _invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        let member = args.member("member")?;
        let seconds = args.int("seconds")?;
        if seconds <= 0 {
            return Err(CommandError::InvalidArgument {
                name: "seconds",
                expected: "a positive number of seconds".to_owned(),
            });
        }
        let until = Timestamp::from_unix_timestamp(Timestamp::now().unix_timestamp() + seconds)
            .map_err(|_| CommandError::InvalidArgument {
                name: "seconds",
                expected: "a smaller number of seconds".to_owned(),
            })?;
        platform.timeout_until(member, until).await?;
        Ok(Reply::text(format!(
            "{} is timed out for {seconds} seconds.",
            Mention::User(member)
        )))
    }
}

const EIGHTBALL_ARGS: &[ArgSpec] = &[ArgSpec::required(
    "question",
    ArgKind::Text,
    "What to ask the ball",
)];

const SAY_ARGS: &[ArgSpec] = &[ArgSpec::required(
    "message",
    ArgKind::Text,
    "What the bot should say",
)];

const EMBED_ARGS: &[ArgSpec] = &[
    ArgSpec::required("title", ArgKind::Word, "Embed title"),
    ArgSpec::required("description", ArgKind::Text, "Embed description"),
];

const STATUS_ARGS: &[ArgSpec] = &[
    ArgSpec::required(
        "type",
        ArgKind::Word,
        "playing, watching, listening or competing",
    ),
    ArgSpec::required("message", ArgKind::Text, "The status text"),
];

const TIMEOUT_ARGS: &[ArgSpec] = &[
    ArgSpec::required("member", ArgKind::Member, "The member"),
    ArgSpec::required("seconds", ArgKind::Int, "How long, in seconds"),
];

const MEMBER_ROLE_ARGS: &[ArgSpec] = &[
    ArgSpec::required("member", ArgKind::Member, "The member"),
    ArgSpec::required("role", ArgKind::Role, "The role"),
];

const MEMBER_REASON_ARGS: &[ArgSpec] = &[
    ArgSpec::required("member", ArgKind::Member, "The member"),
    ArgSpec::optional("reason", ArgKind::Text, "Why", "No reason"),
];

/// Builds the full command table. Both surfaces are served from the
/// returned registry, so this list is the one source of truth for what the
/// bot can do.
pub fn registry() -> Registry {
    let mut registry = Registry::new();

    registry.register(CommandSpec {
        name: "ping",
        description: "Check bot latency",
        args: &[],
        privilege: Privilege::Everyone,
        handler: Arc::new(Ping),
    });
    registry.register(CommandSpec {
        name: "afk",
        description: "Announce that you are away",
        args: &[],
        privilege: Privilege::Everyone,
        handler: Arc::new(Afk),
    });
    registry.register(CommandSpec {
        name: "eightball",
        description: "Ask the magic eight ball a question",
        args: EIGHTBALL_ARGS,
        privilege: Privilege::Everyone,
        handler: Arc::new(EightBall),
    });
    registry.register(CommandSpec {
        name: "say",
        description: "Say something as the bot",
        args: SAY_ARGS,
        privilege: Privilege::Admin,
        handler: Arc::new(Say),
    });
    registry.register(CommandSpec {
        name: "embed",
        description: "Send an embed",
        args: EMBED_ARGS,
        privilege: Privilege::Admin,
        handler: Arc::new(Embed),
    });
    registry.register(CommandSpec {
        name: "status",
        description: "Set the bot's presence",
        args: STATUS_ARGS,
        privilege: Privilege::Admin,
        handler: Arc::new(Status),
    });
    registry.register(CommandSpec {
        name: "addrole",
        description: "Give a member a role",
        args: MEMBER_ROLE_ARGS,
        privilege: Privilege::Admin,
        handler: Arc::new(AddRole),
    });
    registry.register(CommandSpec {
        name: "removerole",
        description: "Take a role from a member",
        args: MEMBER_ROLE_ARGS,
        privilege: Privilege::Admin,
        handler: Arc::new(RemoveRole),
    });
    registry.register(CommandSpec {
        name: "kick",
        description: "Kick a member from the server",
        args: MEMBER_REASON_ARGS,
        privilege: Privilege::Admin,
        handler: Arc::new(Kick),
    });
    registry.register(CommandSpec {
        name: "ban",
        description: "Ban a member from the server",
        args: MEMBER_REASON_ARGS,
        privilege: Privilege::Admin,
        handler: Arc::new(Ban),
    });
    registry.register(CommandSpec {
        name: "timeout",
        description: "Time out a member",
        args: TIMEOUT_ARGS,
        privilege: Privilege::Admin,
        handler: Arc::new(Timeout),
    });

    registry
}
