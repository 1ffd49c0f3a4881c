use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ParticipantId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A member of the team sharing expenses.
///
/// Participants are immutable once registered. The password digest is only
/// used to authenticate logins and is never exposed through views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub username: String,
    pub full_name: String,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        username: impl Into<String>,
        full_name: impl Into<String>,
        password_sha256: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            full_name: full_name.into(),
            password_sha256: password_sha256.into(),
        }
    }
}
