//! Command routing, authorization, and the single error boundary.
//!
//! One [`Dispatcher`] is built at startup from the full command table and
//! shared by both command surfaces. An inbound event becomes an
//! [`Invocation`]; dispatching it resolves the registered [`CommandSpec`],
//! binds arguments, gates on privilege, runs the handler, and always comes
//! back with exactly one [`Reply`]. Gate failures and platform errors are
//! turned into corrective replies here and never propagate further.

use std::collections::HashMap;
use std::sync::Arc;

use serenity::all::{ChannelId, Colour, UserId};
use serenity::async_trait;

use crate::args::{self, ArgSource, ArgSpec, BoundArgs};
use crate::auth;
use crate::error::CommandError;
use crate::platform::Platform;

/// Identity and privilege snapshot of whoever issued an invocation. Derived
/// fresh from each inbound event; never cached, since privilege can change
/// between calls.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: UserId,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginKind {
    /// A `,name args` message; replies go to the origin channel.
    Prefix,
    /// A slash interaction; the reply is attached to the interaction token.
    Slash,
}

/// One request to run a command. Created per inbound event, consumed once.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    pub args: ArgSource,
    pub caller: Caller,
    pub channel: ChannelId,
    pub origin: OriginKind,
}

/// The single outbound message produced for an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Embed {
        title: String,
        description: String,
        color: Colour,
    },
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn embed(title: impl Into<String>, description: impl Into<String>, color: Colour) -> Self {
        Self::Embed {
            title: title.into(),
            description: description.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Everyone,
    /// Administrator permission, or the allowlisted override.
    Admin,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(
        &self,
        args: &BoundArgs,
        invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError>;
}

/// The registered definition of one command: its name, argument shape,
/// privilege requirement, and handler.
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgSpec],
    pub privilege: Privilege,
    pub handler: Arc<dyn CommandHandler>,
}

/// Command table, keyed by name. Built once at startup and read-only after;
/// registering a name twice replaces the earlier spec.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<&'static str, CommandSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: CommandSpec) {
        self.commands.insert(spec.name, spec);
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> + '_ {
        self.commands.values()
    }
}

pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs one invocation to completion. Infallible by construction: every
    /// failure mode maps to an error reply, and each invocation is attempted
    /// exactly once.
    pub async fn dispatch(&self, invocation: &Invocation, platform: &dyn Platform) -> Reply {
        tracing::debug!(
            command = %invocation.command,
            caller = %invocation.caller.id,
            origin = ?invocation.origin,
            "dispatching command"
        );

        match self.run(invocation, platform).await {
            Ok(reply) => reply,
            Err(error) => recover(&invocation.command, error),
        }
    }

    async fn run(
        &self,
        invocation: &Invocation,
        platform: &dyn Platform,
    ) -> Result<Reply, CommandError> {
        let spec = self
            .registry
            .lookup(&invocation.command)
            .ok_or_else(|| CommandError::Unknown(invocation.command.clone()))?;

        let args = args::bind(spec.args, &invocation.args)?;

        if spec.privilege == Privilege::Admin && !auth::is_privileged(&invocation.caller) {
            return Err(CommandError::Denied);
        }

        spec.handler.run(&args, invocation, platform).await
    }
}

fn recover(command: &str, error: CommandError) -> Reply {
    match error {
        CommandError::Unknown(name) => Reply::text(format!("Unknown command `{name}`.")),
        CommandError::MissingArgument(name) => {
            Reply::text(format!("Missing required argument `{name}`."))
        }
        CommandError::InvalidArgument { name, expected } => {
            Reply::text(format!("Argument `{name}` must be {expected}."))
        }
        CommandError::Denied => Reply::text("You do not have permission to use this command."),
        CommandError::Platform(error) => {
            tracing::error!(command, "command failed against the Discord API: {error:?}");
            Reply::text("An error occurred while running the command.")
        }
    }
}

#[cfg(test)]
pub(crate) fn prefix_invocation(command: &str, raw_args: &str, caller: Caller) -> Invocation {
    Invocation {
        command: command.to_owned(),
        args: ArgSource::Raw(raw_args.to_owned()),
        caller,
        channel: ChannelId::new(1),
        origin: OriginKind::Prefix,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::args::ArgKind;
    use crate::platform::mock::RecordingPlatform;

    struct Canned(&'static str);

    #[async_trait]
    impl CommandHandler for Canned {
        async fn run(
            &self,
            _args: &BoundArgs,
            _invocation: &Invocation,
            _platform: &dyn Platform,
        ) -> Result<Reply, CommandError> {
            Ok(Reply::text(self.0))
        }
    }

    struct Failing {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl CommandHandler for Failing {
        async fn run(
            &self,
            _args: &BoundArgs,
            _invocation: &Invocation,
            _platform: &dyn Platform,
        ) -> Result<Reply, CommandError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Err(CommandError::Platform(serenity::Error::Other("refused")))
        }
    }

    fn spec(name: &'static str, privilege: Privilege, handler: Arc<dyn CommandHandler>) -> CommandSpec {
        CommandSpec {
            name,
            description: "test command",
            args: &[],
            privilege,
            handler,
        }
    }

    fn admin() -> Caller {
        Caller {
            id: UserId::new(10),
            is_admin: true,
        }
    }

    fn pleb() -> Caller {
        Caller {
            id: UserId::new(11),
            is_admin: false,
        }
    }

    #[test]
    fn duplicate_registration_replaces_the_earlier_spec() {
        let mut registry = Registry::new();
        registry.register(spec("greet", Privilege::Everyone, Arc::new(Canned("first"))));
        registry.register(spec("greet", Privilege::Admin, Arc::new(Canned("second"))));

        let looked_up = registry.lookup("greet").unwrap();
        assert_eq!(looked_up.privilege, Privilege::Admin);
    }

    #[tokio::test]
    async fn unknown_command_is_recovered_without_side_effects() {
        let dispatcher = Dispatcher::new(Registry::new());
        let platform = RecordingPlatform::default();

        let reply = dispatcher
            .dispatch(&prefix_invocation("nosuch", "", pleb()), &platform)
            .await;

        assert_eq!(reply, Reply::text("Unknown command `nosuch`."));
        assert!(platform.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn argument_validation_runs_before_the_privilege_gate() {
        const ARGS: &[ArgSpec] = &[ArgSpec::required("target", ArgKind::Word, "Target")];
        let mut registry = Registry::new();
        let mut guarded = spec("purge", Privilege::Admin, Arc::new(Canned("done")));
        guarded.args = ARGS;
        registry.register(guarded);
        let dispatcher = Dispatcher::new(registry);
        let platform = RecordingPlatform::default();

        let reply = dispatcher
            .dispatch(&prefix_invocation("purge", "", pleb()), &platform)
            .await;

        assert_eq!(reply, Reply::text("Missing required argument `target`."));
    }

    #[tokio::test]
    async fn denied_caller_never_reaches_the_handler() {
        let runs = Arc::new(Failing {
            runs: AtomicUsize::new(0),
        });
        let mut registry = Registry::new();
        registry.register(spec("purge", Privilege::Admin, runs.clone()));
        let dispatcher = Dispatcher::new(registry);
        let platform = RecordingPlatform::default();

        let reply = dispatcher
            .dispatch(&prefix_invocation("purge", "", pleb()), &platform)
            .await;

        assert_eq!(
            reply,
            Reply::text("You do not have permission to use this command.")
        );
        assert_eq!(runs.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn platform_failure_yields_one_generic_reply_and_no_retry() {
        let failing = Arc::new(Failing {
            runs: AtomicUsize::new(0),
        });
        let mut registry = Registry::new();
        registry.register(spec("purge", Privilege::Admin, failing.clone()));
        let dispatcher = Dispatcher::new(registry);
        let platform = RecordingPlatform::default();

        let reply = dispatcher
            .dispatch(&prefix_invocation("purge", "", admin()), &platform)
            .await;

        assert_eq!(
            reply,
            Reply::text("An error occurred while running the command.")
        );
        assert_eq!(failing.runs.load(Ordering::SeqCst), 1);
    }
}
