//! Loading the participant roster and hashing passwords for it.
//!
//! A roster is a JSON array of participants:
//!
//! ```json
//! [{ "id": 1, "username": "alice", "full_name": "Alice Doe", "password_sha256": "…" }]
//! ```

use crate::domain::participant::Participant;
use crate::error::{LedgerError, Result};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::io::Read;

/// Lowercase hex SHA-256 digest of `password`, as stored in the roster.
pub fn password_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        // Writing into a String cannot fail.
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Parses and validates a roster.
pub fn read_roster<R: Read>(source: R) -> Result<Vec<Participant>> {
    let roster: Vec<Participant> = serde_json::from_reader(source)?;
    for participant in &roster {
        let digest = &participant.password_sha256;
        if digest.len() != 64 || !digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(LedgerError::validation(format!(
                "Participant {} has a malformed password digest",
                participant.id
            )));
        }
        if participant.full_name.trim().is_empty() {
            return Err(LedgerError::validation(format!(
                "Participant {} has no name",
                participant.id
            )));
        }
    }
    Ok(roster)
}
