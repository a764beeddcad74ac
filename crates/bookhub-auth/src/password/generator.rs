//! Random temporary secrets.

use rand::Rng;
use rand::rngs::OsRng;
use secrecy::SecretString;

use crate::temporary::TemporarySecret;

/// Characters a temporary secret is drawn from. Upper-case `I` is left out.
pub const TEMPORARY_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*?";

/// Draws fixed-length secrets from the operating system RNG.
#[derive(Debug, Clone, Copy)]
pub struct SecretGenerator {
    length: usize,
}

impl SecretGenerator {
    /// Creates a generator for secrets of `length` characters (at least 1).
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }

    /// Length of generated secrets.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates a fresh secret.
    pub fn generate(&self) -> TemporarySecret {
        let mut rng = OsRng;
        let secret: String = (0..self.length)
            .map(|_| char::from(TEMPORARY_ALPHABET[rng.gen_range(0..TEMPORARY_ALPHABET.len())]))
            .collect();
        TemporarySecret::new(SecretString::from(secret))
    }
}
