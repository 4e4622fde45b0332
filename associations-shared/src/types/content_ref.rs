use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a content entity inside its owning subsystem.
pub type ContentId = i64;

const MAX_KIND_LEN: usize = 100;

/// Errors raised while building a `ContentKind` or `ContentRef` from raw input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentRefError {
    #[error("Content kind must not be empty")]
    EmptyKind,

    #[error("Content kind is longer than {MAX_KIND_LEN} characters: {0}")]
    KindTooLong(String),

    #[error("Content kind contains invalid characters: {0}")]
    InvalidKind(String),

    #[error("Content id must be positive, got {0}")]
    InvalidId(i64),
}

/// String discriminant naming a class of content entities (`"project"`, `"post"`, ...).
///
/// Kinds are lowercase ASCII words: letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentKind(String);

impl ContentKind {
    /// Validates and wraps a content kind.
    pub fn new(kind: impl Into<String>) -> Result<Self, ContentRefError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(ContentRefError::EmptyKind);
        }
        if kind.len() > MAX_KIND_LEN {
            return Err(ContentRefError::KindTooLong(kind));
        }
        let valid = kind
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
        if !valid {
            return Err(ContentRefError::InvalidKind(kind));
        }
        Ok(Self(kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentKind {
    type Err = ContentRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContentKind {
    type Error = ContentRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentKind> for String {
    fn from(kind: ContentKind) -> Self {
        kind.0
    }
}

/// Polymorphic reference to any addressable content entity.
///
/// The referenced entity is owned by another subsystem and may disappear at any
/// time; a `ContentRef` only guarantees that its kind was valid when it was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawContentRef")]
pub struct ContentRef {
    pub content_kind: ContentKind,
    pub content_id: ContentId,
}

impl ContentRef {
    /// Builds a reference, rejecting non-positive ids.
    pub fn new(content_kind: ContentKind, content_id: ContentId) -> Result<Self, ContentRefError> {
        if content_id <= 0 {
            return Err(ContentRefError::InvalidId(content_id));
        }
        Ok(Self {
            content_kind,
            content_id,
        })
    }

    /// Parses both halves of a reference from raw route parameters.
    pub fn parse(content_kind: &str, content_id: ContentId) -> Result<Self, ContentRefError> {
        Self::new(ContentKind::new(content_kind)?, content_id)
    }
}

/// Wire shape of a `ContentRef`, validated on conversion.
#[derive(Deserialize)]
struct RawContentRef {
    content_kind: ContentKind,
    content_id: ContentId,
}

impl TryFrom<RawContentRef> for ContentRef {
    type Error = ContentRefError;

    fn try_from(raw: RawContentRef) -> Result<Self, Self::Error> {
        Self::new(raw.content_kind, raw.content_id)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.content_kind, self.content_id)
    }
}

/// A content entity as returned by its owning subsystem's lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntity {
    pub content_ref: ContentRef,
    /// Human readable name, when the owning subsystem provides one.
    pub label: Option<String>,
}
