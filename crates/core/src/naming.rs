//! Generation of names for synthetic (inferred, unrecorded) individuals.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// A supply of fresh node names for synthetic intermediate individuals.
///
/// The engine never cares *which* name it gets, only that names never
/// collide within a run. Injecting the namer keeps path synthesis
/// deterministic in tests.
pub trait SyntheticNamer {
    /// Produce a name that has not been produced before by this namer.
    fn fresh(&mut self) -> String;
}

/// Production namer: a random per-run prefix plus a monotonic counter.
///
/// The counter makes collisions between synthetic names impossible; the
/// random prefix makes a collision with a recorded individual's name
/// negligible rather than merely unlikely.
pub struct UniqueNamer {
    prefix: String,
    next: u64,
}

impl UniqueNamer {
    pub fn new() -> Self {
        let prefix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        Self { prefix, next: 0 }
    }
}

impl Default for UniqueNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticNamer for UniqueNamer {
    fn fresh(&mut self) -> String {
        let n = self.next;
        self.next += 1;
        format!("u{}-{}", self.prefix, n)
    }
}

/// Deterministic namer for tests: `U1`, `U2`, ...
pub struct SequentialNamer {
    next: u64,
}

impl SequentialNamer {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticNamer for SequentialNamer {
    fn fresh(&mut self) -> String {
        let n = self.next;
        self.next += 1;
        format!("U{}", n)
    }
}
