use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// ICAP activity classification of a concept.
///
/// Only passive content carries attributes. On a description they are the
/// attribute values the content has; on a search request they are the
/// values the learner would ideally get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityType {
    Passive {
        #[serde(default)]
        attributes: BTreeSet<String>,
    },
    Active,
    Constructive,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Passive,
    Active,
    Constructive,
    Interactive,
}

impl ActivityType {
    pub fn passive<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ActivityType::Passive {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityType::Passive { .. } => ActivityKind::Passive,
            ActivityType::Active => ActivityKind::Active,
            ActivityType::Constructive => ActivityKind::Constructive,
            ActivityType::Interactive => ActivityKind::Interactive,
        }
    }

    pub fn is_passive(&self) -> bool {
        self.kind() == ActivityKind::Passive
    }

    pub fn same_kind(&self, other: &ActivityType) -> bool {
        self.kind() == other.kind()
    }

    /// Attribute values; always empty for non-passive activities.
    pub fn attributes(&self) -> Option<&BTreeSet<String>> {
        match self {
            ActivityType::Passive { attributes } => Some(attributes),
            _ => None,
        }
    }
}

/// A named unit of knowledge with its activity classification.
///
/// Used both for the concepts a description declares and for the required
/// concepts of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub name: String,
    pub activity: ActivityType,
}

impl Concept {
    pub fn new(name: impl Into<String>, activity: ActivityType) -> Self {
        Self {
            name: name.into(),
            activity,
        }
    }

    pub fn active(name: impl Into<String>) -> Self {
        Self::new(name, ActivityType::Active)
    }

    pub fn passive<I, S>(name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, ActivityType::passive(attributes))
    }

    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}

/// Concept names compare case-insensitively everywhere.
pub fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}
