use serenity::all::ActivityData;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::CommandError;

/// The activity kinds Discord can show in a presence line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActivityKind {
    Playing,
    Watching,
    Listening,
    Competing,
}

/// A validated presence change. The platform holds the current status once
/// it is applied; nothing is kept here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRequest {
    pub kind: ActivityKind,
    pub message: String,
}

impl StatusRequest {
    pub fn to_activity_data(&self) -> ActivityData {
        match self.kind {
            ActivityKind::Playing => ActivityData::playing(self.message.as_str()),
            ActivityKind::Watching => ActivityData::watching(self.message.as_str()),
            ActivityKind::Listening => ActivityData::listening(self.message.as_str()),
            ActivityKind::Competing => ActivityData::competing(self.message.as_str()),
        }
    }
}

/// Turns a user-supplied kind and message into a presence request. The kind
/// is matched case-insensitively; anything unrecognized is rejected with the
/// full allowed set so the caller can correct it.
pub fn build_activity(kind: &str, message: &str) -> Result<StatusRequest, CommandError> {
    kind.parse::<ActivityKind>()
        .map(|kind| StatusRequest {
            kind,
            message: message.to_owned(),
        })
        .map_err(|_| CommandError::InvalidArgument {
            name: "type",
            expected: format!("one of {}", allowed_kinds()),
        })
}

fn allowed_kinds() -> String {
    ActivityKind::iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_four_kinds_case_insensitively() {
        for (spelling, expected) in [
            ("playing", ActivityKind::Playing),
            ("Watching", ActivityKind::Watching),
            ("LISTENING", ActivityKind::Listening),
            ("cOmPeTiNg", ActivityKind::Competing),
        ] {
            let status = build_activity(spelling, "something").unwrap();
            assert_eq!(status.kind, expected);
            assert_eq!(status.message, "something");
        }
    }

    #[test]
    fn rejects_unknown_kind_with_the_allowed_set() {
        let error = build_activity("sleeping", "zzz").unwrap_err();
        let text = error.to_string();
        for kind in ["playing", "watching", "listening", "competing"] {
            assert!(text.contains(kind), "{text} should mention {kind}");
        }
    }

    #[test]
    fn rejects_empty_kind() {
        assert!(build_activity("", "zzz").is_err());
    }
}
