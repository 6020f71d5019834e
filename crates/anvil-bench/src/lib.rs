//! Deterministic benchmark inputs for the Anvil containers.
//!
//! Every generator is seeded, so runs compare like with like:
//!
//! - [`random_keys`]: `u32` keys drawn from a bounded range (with repeats)
//! - [`random_words`]: short lowercase ASCII words
//! - [`mixed_code_points`]: code points mixing ASCII, Latin-1 and emoji

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `n` keys in `0..range`.
pub fn random_keys(n: usize, range: u32, seed: u64) -> Vec<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(0..range)).collect()
}

/// `n` words of 3 to 10 lowercase letters.
pub fn random_words(n: usize, seed: u64) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let len = rng.random_range(3..=10);
            (0..len)
                .map(|_| rng.random_range(b'a'..=b'z') as char)
                .collect()
        })
        .collect()
}

/// `n` code points: mostly ASCII, some Latin-1, a few supplementary.
pub fn mixed_code_points(n: usize, seed: u64) -> Vec<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| match rng.random_range(0..10u8) {
            0..=6 => rng.random_range(0x20..0x7F),
            7 | 8 => rng.random_range(0xC0..0x100),
            _ => rng.random_range(0x1F300..0x1F600),
        })
        .collect()
}
