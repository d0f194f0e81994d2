//! Strongly-typed domain identifiers and primitives.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "550e8400-e29b-41d4-a716-446655440000")]
pub struct UserId(pub Uuid);

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<UserId> for Uuid {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Error for invalid LeetCode handles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeetCodeHandleError {
    #[error("LeetCode handle cannot be empty")]
    Empty,
    #[error("LeetCode handle cannot exceed {0} characters")]
    TooLong(usize),
}

/// Username a user registered on LeetCode for sync purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "tourist")]
pub struct LeetCodeHandle(String);

impl LeetCodeHandle {
    /// Matches the storage column width.
    pub const MAX_LEN: usize = 100;

    /// Creates a handle, rejecting blank or oversized values.
    pub fn new(value: impl Into<String>) -> Result<Self, LeetCodeHandleError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LeetCodeHandleError::Empty);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(LeetCodeHandleError::TooLong(Self::MAX_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LeetCodeHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for LeetCodeHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<LeetCodeHandle> for String {
    fn from(value: LeetCodeHandle) -> Self {
        value.0
    }
}

/// JWT subject claim value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "550e8400-e29b-41d4-a716-446655440000")]
pub struct JwtSubject(pub String);

impl Display for JwtSubject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for JwtSubject {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JwtSubject {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for JwtSubject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
