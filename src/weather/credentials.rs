//! Credential selection policies for quota-limited API keys.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use crate::core::config::CredentialStrategy;

/// Picks which of `count` configured credentials the next attempt uses.
pub trait CredentialSelector: Send + Sync {
    fn select(&self, count: usize) -> usize;
}

/// Uniformly random choice per attempt, spreading load across keys.
#[derive(Debug, Default)]
pub struct RandomSelector;

impl CredentialSelector for RandomSelector {
    fn select(&self, count: usize) -> usize {
        if count <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..count)
    }
}

#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    next: AtomicUsize,
}

impl CredentialSelector for RoundRobinSelector {
    fn select(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        self.next.fetch_add(1, Ordering::Relaxed) % count
    }
}

/// Always the same credential, clamped into range.
#[derive(Debug, Default)]
pub struct FixedSelector(pub usize);

impl CredentialSelector for FixedSelector {
    fn select(&self, count: usize) -> usize {
        self.0.min(count.saturating_sub(1))
    }
}

#[must_use]
pub fn selector_for(strategy: CredentialStrategy) -> Box<dyn CredentialSelector> {
    match strategy {
        CredentialStrategy::Random => Box::new(RandomSelector),
        CredentialStrategy::RoundRobin => Box::<RoundRobinSelector>::default(),
        CredentialStrategy::Fixed => Box::new(FixedSelector(0)),
    }
}
