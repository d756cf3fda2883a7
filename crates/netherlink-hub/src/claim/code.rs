//! Claim code generation.
//!
//! Codes are short enough to type into a remote host's config and unambiguous
//! when read aloud or off a screen.

use rand::RngExt;

/// Code alphabet: uppercase letters and digits with the visually ambiguous
/// `0`, `1`, `I`, and `O` removed (32 symbols).
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Code length. 32^8 combinations keeps entropy at 40 bits, which together
/// with the short validity window and single-use redemption bounds online
/// guessing.
pub const CODE_LEN: usize = 8;

/// Generate a claim code from the thread-local CSPRNG.
///
/// Each character is drawn independently and uniformly from [`CODE_ALPHABET`].
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}
