//! Deterministic seeded shuffle
//!
//! The permutation depends only on the seed string and the number of items:
//! the seed is hashed to a 64-bit state, a linear congruential generator
//! advances it, and a Fisher-Yates pass applies the swaps. No wall clock,
//! no addresses, no hash-map iteration order. The same seed over the same
//! track list always produces the same order, on every platform.

use sha2::{Digest, Sha256};

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;

/// Normalize a user-supplied seed
///
/// Trims whitespace; an empty or absent seed is replaced with a freshly
/// generated decimal token so the effective seed can be shown and reused.
pub fn normalize_seed(seed: Option<&str>) -> String {
    match seed.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => rand::random::<u64>().to_string(),
    }
}

/// Derive the initial generator state from a seed string
fn seed_state(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let state = u64::from_be_bytes(bytes);
    // Zero would make the LCG degenerate on its first step
    if state == 0 {
        1
    } else {
        state
    }
}

/// Permute a slice with the seeded Fisher-Yates shuffle
pub fn shuffle_slice<T>(items: &mut [T], seed: &str) {
    if items.len() < 2 {
        return;
    }
    let mut state = seed_state(seed);
    for i in (1..items.len()).rev() {
        state = state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        let j = (state % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = items(20);
        let mut b = items(20);
        shuffle_slice(&mut a, "road-trip");
        shuffle_slice(&mut b, "road-trip");
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = items(20);
        let mut b = items(20);
        shuffle_slice(&mut a, "seed-one");
        shuffle_slice(&mut b, "seed-two");
        assert_ne!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut shuffled = items(50);
        shuffle_slice(&mut shuffled, "any seed");
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items(50));
    }

    #[test]
    fn tiny_slices_are_untouched() {
        let mut empty: Vec<usize> = vec![];
        shuffle_slice(&mut empty, "x");
        assert!(empty.is_empty());

        let mut one = vec![7];
        shuffle_slice(&mut one, "x");
        assert_eq!(one, vec![7]);
    }

    #[test]
    fn normalize_trims_and_generates() {
        assert_eq!(normalize_seed(Some("  mix  ")), "mix");

        let generated = normalize_seed(None);
        assert!(generated.parse::<u64>().is_ok());
        assert!(normalize_seed(Some("   ")).parse::<u64>().is_ok());
    }

    #[test]
    fn generated_seed_reproduces_the_order() {
        let seed = normalize_seed(None);
        let mut a = items(15);
        let mut b = items(15);
        shuffle_slice(&mut a, &seed);
        shuffle_slice(&mut b, &seed);
        assert_eq!(a, b);
    }
}
