//! Password and PIN hashing.
//!
//! Secrets are stored as `sha256$<rounds>$<salt hex>$<digest hex>`, where the
//! digest is SHA-256 iterated `rounds` times over `salt || secret`.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 16;

/// Hash a secret with a fresh random salt.
pub fn hash_secret(secret: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = stretch(&salt, secret, ROUNDS);
    format!("{SCHEME}${ROUNDS}${}${}", hex::encode(salt), hex::encode(digest))
}

/// Check a secret against a stored hash. Malformed hashes never verify.
pub fn verify_secret(secret: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(rounds), Some(salt), Some(digest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let (Ok(rounds), Ok(salt), Ok(expected)) =
        (rounds.parse::<u32>(), hex::decode(salt), hex::decode(digest))
    else {
        return false;
    };

    constant_time_eq(&stretch(&salt, secret, rounds), &expected)
}

/// PINs are exactly six ASCII digits.
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 6 && pin.bytes().all(|b| b.is_ascii_digit())
}

fn stretch(salt: &[u8], secret: &str, rounds: u32) -> Vec<u8> {
    let mut digest = Sha256::new()
        .chain_update(salt)
        .chain_update(secret.as_bytes())
        .finalize();
    for _ in 1..rounds {
        digest = Sha256::new().chain_update(salt).chain_update(digest).finalize();
    }
    digest.to_vec()
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
