//! Collision-free pseudonym generation for de-identified subjects.

use std::collections::BTreeSet;

use rand::Rng;

use cohort_store::Store;

use crate::error::{ReconcileError, Result};

/// Alphanumerics minus the look-alikes `0`, `O`, `1`, `l`, `I`.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

const PSEUDONYM_LEN: usize = 10;

const MAX_ATTEMPTS: usize = 100;

fn candidate(rng: &mut impl Rng) -> String {
    (0..PSEUDONYM_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generate a pseudonym unused both in the store and in `reserved` (the
/// pseudonyms already assigned earlier in the current batch, which are
/// not yet visible to the store's uniqueness check).
pub fn unique_pseudonym(store: &Store, reserved: &BTreeSet<String>) -> Result<String> {
    let mut rng = rand::thread_rng();
    for _ in 0..MAX_ATTEMPTS {
        let pseudonym = candidate(&mut rng);
        if !reserved.contains(&pseudonym) && !store.pseudonym_exists(&pseudonym)? {
            return Ok(pseudonym);
        }
    }
    // 57^10 candidates; reaching this means the store or the RNG is broken.
    Err(ReconcileError::PseudonymExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_use_unambiguous_alphabet() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let pseudonym = candidate(&mut rng);
            assert_eq!(pseudonym.len(), PSEUDONYM_LEN);
            for c in pseudonym.chars() {
                assert!(ALPHABET.contains(&(c as u8)), "unexpected char {c}");
                assert!(!"0O1lI".contains(c));
            }
        }
    }

    #[test]
    fn reserved_pseudonyms_are_avoided() {
        let store = Store::open_in_memory().unwrap();
        let reserved = BTreeSet::new();
        let first = unique_pseudonym(&store, &reserved).unwrap();
        let mut reserved = BTreeSet::new();
        reserved.insert(first.clone());
        let second = unique_pseudonym(&store, &reserved).unwrap();
        assert_ne!(first, second);
    }
}
