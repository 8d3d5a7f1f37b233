//! Argument declarations and binding.
//!
//! A command declares its shape as an ordered list of [`ArgSpec`]s. Prefix
//! invocations carry raw message text that is parsed positionally against
//! that shape; slash invocations arrive with typed values from the
//! interaction payload and are bound against the same shape. Either way the
//! handler sees one [`BoundArgs`] and cannot tell the surfaces apart.

use std::collections::HashMap;

use serenity::all::{RoleId, UserId};

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A single whitespace-delimited token.
    Word,
    /// Greedy: everything up to the end of the message.
    Text,
    Int,
    Member,
    Role,
}

#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub description: &'static str,
    /// Substituted when the argument is omitted; `None` means required.
    pub default: Option<&'static str>,
}

impl ArgSpec {
    pub const fn required(name: &'static str, kind: ArgKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
        }
    }

    pub const fn optional(
        name: &'static str,
        kind: ArgKind,
        description: &'static str,
        default: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            description,
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Member(UserId),
    Role(RoleId),
}

/// Where an invocation's arguments came from.
#[derive(Debug, Clone)]
pub enum ArgSource {
    /// Text after the command name in a prefix message.
    Raw(String),
    /// Name/value pairs from a slash interaction.
    Typed(Vec<(String, ArgValue)>),
}

/// Arguments validated against a command's shape.
#[derive(Debug, Default)]
pub struct BoundArgs(HashMap<&'static str, ArgValue>);

impl BoundArgs {
    pub fn str(&self, name: &'static str) -> Result<&str, CommandError> {
        match self.0.get(name) {
            Some(ArgValue::Str(value)) => Ok(value),
            _ => Err(CommandError::MissingArgument(name)),
        }
    }

    pub fn int(&self, name: &'static str) -> Result<i64, CommandError> {
        match self.0.get(name) {
            Some(ArgValue::Int(value)) => Ok(*value),
            _ => Err(CommandError::MissingArgument(name)),
        }
    }

    pub fn member(&self, name: &'static str) -> Result<UserId, CommandError> {
        match self.0.get(name) {
            Some(ArgValue::Member(value)) => Ok(*value),
            _ => Err(CommandError::MissingArgument(name)),
        }
    }

    pub fn role(&self, name: &'static str) -> Result<RoleId, CommandError> {
        match self.0.get(name) {
            Some(ArgValue::Role(value)) => Ok(*value),
            _ => Err(CommandError::MissingArgument(name)),
        }
    }
}

pub fn bind(specs: &[ArgSpec], source: &ArgSource) -> Result<BoundArgs, CommandError> {
    match source {
        ArgSource::Raw(text) => bind_raw(specs, text),
        ArgSource::Typed(values) => bind_typed(specs, values),
    }
}

fn bind_raw(specs: &[ArgSpec], text: &str) -> Result<BoundArgs, CommandError> {
    let mut bound = HashMap::new();
    let mut rest = text.trim();

    for spec in specs {
        if rest.is_empty() {
            match spec.default {
                Some(default) => {
                    bound.insert(spec.name, ArgValue::Str(default.to_owned()));
                    continue;
                }
                None => return Err(CommandError::MissingArgument(spec.name)),
            }
        }

        let (token, remainder) = match spec.kind {
            ArgKind::Text => (rest, ""),
            _ => rest
                .split_once(char::is_whitespace)
                .map(|(token, remainder)| (token, remainder.trim_start()))
                .unwrap_or((rest, "")),
        };

        bound.insert(spec.name, parse_token(spec, token)?);
        rest = remainder;
    }

    Ok(BoundArgs(bound))
}

fn bind_typed(specs: &[ArgSpec], values: &[(String, ArgValue)]) -> Result<BoundArgs, CommandError> {
    let mut bound = HashMap::new();

    for spec in specs {
        match values.iter().find(|(name, _)| name == spec.name) {
            Some((_, value)) if kind_matches(spec.kind, value) => {
                bound.insert(spec.name, value.clone());
            }
            Some(_) => {
                return Err(CommandError::InvalidArgument {
                    name: spec.name,
                    expected: expected_shape(spec.kind).to_owned(),
                })
            }
            None => match spec.default {
                Some(default) => {
                    bound.insert(spec.name, ArgValue::Str(default.to_owned()));
                }
                None => return Err(CommandError::MissingArgument(spec.name)),
            },
        }
    }

    Ok(BoundArgs(bound))
}

fn parse_token(spec: &ArgSpec, token: &str) -> Result<ArgValue, CommandError> {
    let invalid = || CommandError::InvalidArgument {
        name: spec.name,
        expected: expected_shape(spec.kind).to_owned(),
    };

    match spec.kind {
        ArgKind::Word | ArgKind::Text => Ok(ArgValue::Str(token.to_owned())),
        ArgKind::Int => token
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|_| invalid()),
        ArgKind::Member => parse_id(token, &["<@!", "<@"])
            .map(|id| ArgValue::Member(UserId::new(id)))
            .ok_or_else(invalid),
        ArgKind::Role => parse_id(token, &["<@&"])
            .map(|id| ArgValue::Role(RoleId::new(id)))
            .ok_or_else(invalid),
    }
}

/// Accepts Discord mention syntax (`<@123>`, `<@!123>`, `<@&123>`) or a bare
/// numeric id. Zero is not a valid snowflake.
fn parse_id(token: &str, mention_prefixes: &[&str]) -> Option<u64> {
    let digits = mention_prefixes
        .iter()
        .find_map(|prefix| token.strip_prefix(prefix))
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(token);

    match digits.parse::<u64>() {
        Ok(id) if id != 0 => Some(id),
        _ => None,
    }
}

fn kind_matches(kind: ArgKind, value: &ArgValue) -> bool {
    matches!(
        (kind, value),
        (ArgKind::Word | ArgKind::Text, ArgValue::Str(_))
            | (ArgKind::Int, ArgValue::Int(_))
            | (ArgKind::Member, ArgValue::Member(_))
            | (ArgKind::Role, ArgValue::Role(_))
    )
}

fn expected_shape(kind: ArgKind) -> &'static str {
    match kind {
        ArgKind::Word | ArgKind::Text => "text",
        ArgKind::Int => "a whole number",
        ArgKind::Member => "a member mention or user id",
        ArgKind::Role => "a role mention or role id",
    }
}
