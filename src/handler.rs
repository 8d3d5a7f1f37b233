//! Gateway event wiring. Translates serenity events into invocations for
//! the dispatcher and delivers the reply the way each surface expects:
//! a channel message for prefix commands, the initial interaction response
//! for slash commands.

use std::sync::Arc;

use serenity::all::{
    Command, CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    EventHandler, Interaction, Message, Ready, ResolvedValue,
};
use serenity::async_trait;

use crate::args::{ArgKind, ArgSource, ArgValue};
use crate::dispatch::{Caller, Dispatcher, Invocation, OriginKind, Registry, Reply};
use crate::platform::DiscordPlatform;

const COMMAND_PREFIX: char = ',';

pub struct Handler {
    dispatcher: Arc<Dispatcher>,
}

impl Handler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("{} is connected to Discord", ready.user.name);

        let definitions = slash_definitions(self.dispatcher.registry());
        match Command::set_global_commands(&ctx.http, definitions).await {
            Ok(commands) => tracing::info!("Registered {} slash commands", commands.len()),
            Err(error) => tracing::error!("Failed to register slash commands: {error:?}"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else { return };
        let Some(body) = msg.content.strip_prefix(COMMAND_PREFIX) else {
            return;
        };
        let body = body.trim();
        if body.is_empty() {
            return;
        }

        let (name, raw_args) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };

        let invocation = Invocation {
            command: name.to_lowercase(),
            args: ArgSource::Raw(raw_args.to_owned()),
            caller: message_caller(&ctx, &msg).await,
            channel: msg.channel_id,
            origin: OriginKind::Prefix,
        };

        let platform = DiscordPlatform {
            ctx: ctx.clone(),
            guild: guild_id,
        };
        let reply = self.dispatcher.dispatch(&invocation, &platform).await;

        let builder = match reply {
            Reply::Text(content) => CreateMessage::new().content(content),
            Reply::Embed {
                title,
                description,
                color,
            } => CreateMessage::new().embed(
                CreateEmbed::new()
                    .title(title)
                    .description(description)
                    .colour(color),
            ),
        };
        if let Err(error) = invocation.channel.send_message(&ctx.http, builder).await {
            tracing::error!("Failed to reply to ,{name}: {error:?}");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        let Some(guild_id) = command.guild_id else { return };

        let invocation = Invocation {
            command: command.data.name.clone(),
            args: ArgSource::Typed(typed_args(&command)),
            caller: interaction_caller(&command),
            channel: command.channel_id,
            origin: OriginKind::Slash,
        };

        let platform = DiscordPlatform {
            ctx: ctx.clone(),
            guild: guild_id,
        };
        let reply = self.dispatcher.dispatch(&invocation, &platform).await;

        let message = match reply {
            Reply::Text(content) => CreateInteractionResponseMessage::new().content(content),
            Reply::Embed {
                title,
                description,
                color,
            } => CreateInteractionResponseMessage::new().embed(
                CreateEmbed::new()
                    .title(title)
                    .description(description)
                    .colour(color),
            ),
        };
        // The interaction token admits one initial response.
        if let Err(error) = command
            .create_response(&ctx.http, CreateInteractionResponse::Message(message))
            .await
        {
            tracing::error!("Failed to respond to /{}: {error:?}", command.data.name);
        }
    }
}

/// Builds the slash-command definitions for upload from the same registry
/// the prefix surface dispatches against.
fn slash_definitions(registry: &Registry) -> Vec<CreateCommand> {
    registry
        .specs()
        .map(|spec| {
            let mut command = CreateCommand::new(spec.name).description(spec.description);
            for arg in spec.args {
                let kind = match arg.kind {
                    ArgKind::Word | ArgKind::Text => CommandOptionType::String,
                    ArgKind::Int => CommandOptionType::Integer,
                    ArgKind::Member => CommandOptionType::User,
                    ArgKind::Role => CommandOptionType::Role,
                };
                command = command.add_option(
                    CreateCommandOption::new(kind, arg.name, arg.description)
                        .required(arg.is_required()),
                );
            }
            command
        })
        .collect()
}

async fn message_caller(ctx: &Context, msg: &Message) -> Caller {
    let is_admin = match msg.member(ctx).await {
        Ok(member) => member
            .permissions(&ctx.cache)
            .map_or(false, |permissions| permissions.administrator()),
        Err(error) => {
            tracing::warn!("Could not resolve member for {}: {error:?}", msg.author.id);
            false
        }
    };
    Caller {
        id: msg.author.id,
        is_admin,
    }
}

/// Interactions carry the caller's resolved permissions in the payload, so
/// no extra fetch is needed on this surface.
fn interaction_caller(command: &CommandInteraction) -> Caller {
    let is_admin = command
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator());
    Caller {
        id: command.user.id,
        is_admin,
    }
}

fn typed_args(command: &CommandInteraction) -> Vec<(String, ArgValue)> {
    command
        .data
        .options()
        .into_iter()
        .filter_map(|option| {
            let value = match option.value {
                ResolvedValue::String(value) => ArgValue::Str(value.to_owned()),
                ResolvedValue::Integer(value) => ArgValue::Int(value),
                ResolvedValue::User(user, _) => ArgValue::Member(user.id),
                ResolvedValue::Role(role) => ArgValue::Role(role.id),
                _ => return None,
            };
            Some((option.name.to_owned(), value))
        })
        .collect()
}
