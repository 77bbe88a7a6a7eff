use std::borrow::Cow;
use std::collections::HashMap;

use derive_more::Display;

use crate::input::{Club, Event};
use crate::utils::Resources;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LunchMessage {
    #[display("Lunch will be provided.")]
    Provided,
    #[display("Feel free to bring your own lunch.")]
    BringYourOwn,
}

impl From<bool> for LunchMessage {
    fn from(lunch_provided: bool) -> Self {
        if lunch_provided {
            Self::Provided
        } else {
            Self::BringYourOwn
        }
    }
}

/// Something that can fill in the `{{key}}` placeholders of a template.
pub trait TemplateValues {
    fn value(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl TemplateValues for HashMap<&str, &str> {
    fn value(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(*value))
    }
}

/// Everything that is known about the meeting a notice is written for.
#[derive(Debug, Clone, Copy)]
pub struct NoticeFields<'a> {
    event: &'a Event,
    club: &'a Club,
    bio: &'a str,
    lunch: LunchMessage,
}

impl<'a> NoticeFields<'a> {
    #[must_use]
    pub fn new(event: &'a Event, club: &'a Club, bio: &'a str, lunch: LunchMessage) -> Self {
        Self {
            event,
            club,
            bio,
            lunch,
        }
    }
}

impl TemplateValues for NoticeFields<'_> {
    fn value(&self, key: &str) -> Option<Cow<'_, str>> {
        Some(match key {
            "club" => Cow::Borrowed(self.club.name()),
            "season" => Cow::Borrowed(self.club.season()),
            "date" => Cow::Owned(self.event.date().iso()),
            "topic" => Cow::Borrowed(self.event.topic()),
            "speaker" => Cow::Borrowed(self.event.speaker()),
            "location" => Cow::Borrowed(self.event.location()),
            "time" => Cow::Borrowed(self.event.time()),
            "lunch_message" => Cow::Owned(self.lunch.to_string()),
            // the bio is a sentence of its own, it brings the separating space
            "bio" if self.bio.trim().is_empty() => Cow::Borrowed(""),
            "bio" => Cow::Owned(format!("{} ", self.bio.trim())),
            _ => return None,
        })
    }
}

/// A text with `{{key}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeTemplate {
    source: Cow<'static, str>,
}

impl NoticeTemplate {
    #[must_use]
    pub fn new(source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The announcement template that ships with the binary.
    pub fn embedded() -> anyhow::Result<Self> {
        Ok(Self::new(Resources::text("notice.txt")?))
    }

    /// Replaces every placeholder in a single pass.
    ///
    /// Unknown keys become empty, and substituted values are never expanded
    /// again. An unterminated `{{` is kept as it is.
    #[must_use]
    pub fn render(&self, values: &impl TemplateValues) -> String {
        let mut output = String::with_capacity(self.source.len());
        let mut rest = self.source.as_ref();

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);

            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                output.push_str(&rest[start..]);
                rest = "";
                break;
            };

            if let Some(value) = values.value(after[..end].trim()) {
                output.push_str(&value);
            }

            rest = &after[end + 2..];
        }

        output.push_str(rest);
        output
    }
}
