// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity identifier scheme.
//!
//! All Relayhub entities (channels, conversations, messages, tenants) use
//! 24-character lowercase hex identifiers (12 random bytes). Caller-supplied
//! ids arrive as path segments and MUST be shape-checked with
//! [`is_well_formed`] before they reach a query.

use rand::RngCore;

/// Length in characters of a well-formed entity id.
pub const ENTITY_ID_LEN: usize = 24;

/// Generate a new 24-hex entity id from 12 random bytes.
pub fn generate() -> String {
    let mut bytes = [0u8; ENTITY_ID_LEN / 2];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Returns `true` if `candidate` has the shape of an entity id.
///
/// Accepts lowercase and uppercase hex; everything else (wrong length,
/// non-hex characters, embedded whitespace) is rejected.
pub fn is_well_formed(candidate: &str) -> bool {
    candidate.len() == ENTITY_ID_LEN && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_well_formed() {
        for _ in 0..32 {
            let id = generate();
            assert_eq!(id.len(), ENTITY_ID_LEN);
            assert!(is_well_formed(&id), "generated id `{id}` failed validation");
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_malformed_candidates() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("abc"));
        assert!(!is_well_formed("zzzzzzzzzzzzzzzzzzzzzzzz")); // 24 chars, not hex
        assert!(!is_well_formed("0123456789abcdef01234567x")); // 25 chars
        assert!(!is_well_formed("0123456789abcdef0123456")); // 23 chars
        assert!(!is_well_formed("0123456789abcdef 1234567")); // embedded space
    }

    #[test]
    fn accepts_uppercase_hex() {
        assert!(is_well_formed("0123456789ABCDEF01234567"));
    }
}
