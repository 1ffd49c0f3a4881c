use crate::domain::participant::ParticipantId;

/// The authenticated participant a request acts on behalf of.
///
/// Passed explicitly into every service call that depends on "who is asking".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub participant: ParticipantId,
}

impl Session {
    pub fn new(participant: ParticipantId) -> Self {
        Self { participant }
    }
}
