use crate::error::{LevelupError, Result};
use crate::paths;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const INVITE_CODE_LEN: usize = 8;

/// Upper-case letters and digits without 0/O and 1/I (lower-case, and so
/// `l`, never appears), plus `_`.
pub const INVITE_ALPHABET: &[u8; 33] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789_";

/// An 8-character invite code. Not suitable as a secret.
pub fn generate_invite_code() -> String {
    generate_invite_code_with(&mut rand::thread_rng())
}

pub fn generate_invite_code_with<R: Rng>(rng: &mut R) -> String {
    let n = INVITE_ALPHABET.len();
    (0..INVITE_CODE_LEN)
        .map(|_| char::from(INVITE_ALPHABET[rng.gen_range(0..n)]))
        .collect()
}

pub fn is_valid_invite_code(code: &str) -> bool {
    code.len() == INVITE_CODE_LEN && code.bytes().all(|b| INVITE_ALPHABET.contains(&b))
}

// ---------------------------------------------------------------------------
// InviteBook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub code: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Codes issued so far. Uniqueness is enforced here, not by the generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InviteBook {
    #[serde(default)]
    pub invites: Vec<Invite>,
}

impl InviteBook {
    pub fn contains(&self, code: &str) -> bool {
        self.invites.iter().any(|i| i.code == code)
    }

    /// Draw codes until one is unused, giving up after `max_attempts`.
    pub fn issue(&mut self, note: Option<String>, max_attempts: u32) -> Result<&Invite> {
        self.issue_with(&mut rand::thread_rng(), note, max_attempts)
    }

    pub fn issue_with<R: Rng>(
        &mut self,
        rng: &mut R,
        note: Option<String>,
        max_attempts: u32,
    ) -> Result<&Invite> {
        for attempt in 1..=max_attempts {
            let code = generate_invite_code_with(rng);
            if self.contains(&code) {
                tracing::warn!(attempt, "invite code collision, retrying");
                continue;
            }
            self.invites.push(Invite {
                code,
                created_at: Utc::now(),
                note,
            });
            return Ok(&self.invites[self.invites.len() - 1]);
        }
        Err(LevelupError::InviteExhausted(max_attempts))
    }

    pub fn load(root: &Path) -> Result<Self> {
        crate::io::read_yaml_or_default(&paths::invites_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::invites_path(root), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn alphabet_has_no_lookalikes() {
        assert_eq!(INVITE_ALPHABET.len(), 33);
        for c in [b'0', b'O', b'1', b'I', b'l'] {
            assert!(!INVITE_ALPHABET.contains(&c), "{} in alphabet", c as char);
        }
        let unique: HashSet<_> = INVITE_ALPHABET.iter().collect();
        assert_eq!(unique.len(), 33);
    }

    #[test]
    fn codes_are_eight_allowed_chars() {
        for _ in 0..500 {
            let code = generate_invite_code();
            assert_eq!(code.len(), 8);
            assert!(is_valid_invite_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn every_symbol_is_reachable() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..400 {
            seen.extend(generate_invite_code_with(&mut rng).into_bytes());
        }
        assert_eq!(seen.len(), INVITE_ALPHABET.len());
    }

    #[test]
    fn validation_rejects_lookalikes_and_bad_lengths() {
        assert!(is_valid_invite_code("ABCD2345"));
        assert!(!is_valid_invite_code("ABCD234O"));
        assert!(!is_valid_invite_code("abcd2345"));
        assert!(!is_valid_invite_code("ABC"));
    }

    #[test]
    fn issue_retries_on_collision() {
        let mut book = InviteBook::default();
        let first = book
            .issue_with(&mut StdRng::seed_from_u64(1), None, 4)
            .unwrap()
            .code
            .clone();
        // Same seed draws the same first code, so the second call must retry.
        let second = book
            .issue_with(&mut StdRng::seed_from_u64(1), Some("grandma".into()), 4)
            .unwrap()
            .code
            .clone();
        assert_ne!(first, second);
        assert_eq!(book.invites.len(), 2);
    }

    #[test]
    fn issue_gives_up_after_max_attempts() {
        let mut book = InviteBook::default();
        book.issue_with(&mut StdRng::seed_from_u64(3), None, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let err = book.issue_with(&mut rng, None, 1).unwrap_err();
        assert!(matches!(err, LevelupError::InviteExhausted(1)));
    }

    #[test]
    fn book_persists() {
        let dir = TempDir::new().unwrap();
        assert!(InviteBook::load(dir.path()).unwrap().invites.is_empty());

        let mut book = InviteBook::default();
        book.issue(None, 8).unwrap();
        book.save(dir.path()).unwrap();
        assert_eq!(InviteBook::load(dir.path()).unwrap().invites, book.invites);
    }
}
