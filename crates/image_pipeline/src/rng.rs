//! Randomness for random transforms.
//!
//! Random steps either own a seeded RNG or draw from a thread-local one. The
//! thread-local RNG can be seeded per thread by the surrounding loader, so
//! each worker gets unique but deterministic randomness.

use rand::rngs::StdRng;
use rand::Rng as _;
use rand::SeedableRng;
use std::cell::RefCell;
use std::ops::Range;

thread_local! {
    /// Thread-local RNG for deterministic randomness, unset until seeded.
    pub static THREAD_RNG: RefCell<Option<StdRng>> = const { RefCell::new(None) };
}

/// Seeds the calling thread's RNG.
/// Seed formula: base_seed + (epoch << 32) + worker_id
pub fn init_thread_rng(worker_id: usize, epoch: usize, base_seed: u64) {
    THREAD_RNG.with(|rng| {
        let seed = base_seed
            .wrapping_add((epoch as u64) << 32)
            .wrapping_add(worker_id as u64);
        *rng.borrow_mut() = Some(StdRng::seed_from_u64(seed));
    })
}

/// Clears the calling thread's RNG so draws fall back to `rand::rng()`.
pub fn reset_thread_rng() {
    THREAD_RNG.with(|rng| *rng.borrow_mut() = None);
}

/// Draws uniformly from `range` using the thread RNG, or `rand::rng()` if
/// the thread was never seeded.
pub fn thread_gen_range(range: Range<u32>) -> u32 {
    THREAD_RNG.with(|rng| match rng.borrow_mut().as_mut() {
        Some(rng) => rng.random_range(range),
        None => rand::rng().random_range(range),
    })
}
