//! Record identifiers
//!
//! ID Format:
//! - Project IDs: `P-{sequence}` (e.g., `P-001`)
//! - Requirement IDs: `R-{sequence}` (e.g., `R-012`)
//! - Task IDs: `T-{sequence}` (e.g., `T-007`)
//!
//! Sequences are zero-padded to at least three digits when displayed. Parsing
//! accepts any padding and a lowercase prefix, so `t-7` and `T-007` are the
//! same task.
//!
//! User IDs are free-form names (`alice`, `bob.chen`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid {kind} ID format: expected '{prefix}-{{sequence}}', got '{value}'")]
    InvalidFormat {
        kind: &'static str,
        prefix: char,
        value: String,
    },

    #[error("Invalid sequence number: {0}")]
    InvalidSequence(String),

    #[error("User ID cannot be empty")]
    EmptyUser,
}

fn parse_sequence(kind: &'static str, prefix: char, raw: &str) -> Result<u32, IdError> {
    let s = raw.trim();
    let mut chars = s.chars();
    let head = chars.next().map(|c| c.to_ascii_uppercase());
    let dash = chars.next();

    if head != Some(prefix) || dash != Some('-') {
        return Err(IdError::InvalidFormat {
            kind,
            prefix,
            value: s.to_string(),
        });
    }

    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(IdError::InvalidFormat {
            kind,
            prefix,
            value: s.to_string(),
        });
    }

    match digits.parse::<u32>() {
        Ok(0) | Err(_) => Err(IdError::InvalidSequence(digits.to_string())),
        Ok(seq) => Ok(seq),
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name {
            seq: u32,
        }

        impl $name {
            pub const PREFIX: char = $prefix;

            /// Creates an ID with the given sequence number
            pub fn new(seq: u32) -> Self {
                Self { seq }
            }

            /// Returns the sequence number
            pub fn seq(&self) -> u32 {
                self.seq
            }

            /// Returns the ID following the highest of `existing`
            pub fn next_after<'a>(existing: impl IntoIterator<Item = &'a Self>) -> Self {
                let max = existing.into_iter().map(Self::seq).max().unwrap_or(0);
                Self::new(max + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{:03}", Self::PREFIX, self.seq)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_sequence($kind, Self::PREFIX, s).map(Self::new)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

entity_id!(
    /// Project ID in the format `P-{sequence}`
    ProjectId,
    'P',
    "project"
);

entity_id!(
    /// Requirement ID in the format `R-{sequence}`
    RequirementId,
    'R',
    "requirement"
);

entity_id!(
    /// Task ID in the format `T-{sequence}`
    TaskId,
    'T',
    "task"
);

/// Identifier of the person a task is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::EmptyUser);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}
