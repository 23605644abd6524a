//! Per-step nonce search
//!
//! Scans nonces from zero upward and returns the first one whose digest
//! satisfies the difficulty predicate. This is the hot loop; nothing in it
//! allocates or performs I/O.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash::{meets_difficulty, ChainHasher};
use crate::input::HashInput;
use crate::types::{ChainDigest, Nonce};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Candidates tried between cancellation checks
pub const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Accepted nonce for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSolution {
    /// Smallest nonce satisfying the predicate
    pub nonce: Nonce,
    /// Digest of the step input with that nonce; the next running digest
    pub digest: ChainDigest,
    /// Hashes computed, `nonce + 1`
    pub hashes: u64,
}

/// Nonce search bound to one configuration
#[derive(Debug)]
pub struct NonceSearch<'a> {
    config: &'a Config,
    hasher: ChainHasher,
    mask: u32,
    max_nonce: u64,
    cancellation: Option<CancellationToken>,
}

impl<'a> NonceSearch<'a> {
    /// Create a search for the given configuration
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            hasher: config.algorithm().hasher(),
            mask: config.difficulty_mask(),
            max_nonce: config.max_nonce(),
            cancellation: None,
        }
    }

    /// Stop searching with [`Error::Cancelled`] once the token fires
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Find the smallest nonce for `step` chained from `last_digest`
    pub fn search(&mut self, last_digest: &ChainDigest, step: u32) -> Result<StepSolution> {
        let mut input = HashInput::new(last_digest, self.config.token(), step);
        let mut nonce = 0u64;

        loop {
            input.set_nonce(Nonce::new(nonce));
            let digest = self.hasher.digest(input.as_bytes());

            if meets_difficulty(&digest, self.mask) {
                trace!("Step {} solved with nonce {}", step, nonce);
                return Ok(StepSolution {
                    nonce: Nonce::new(nonce),
                    digest,
                    hashes: nonce + 1,
                });
            }

            if nonce == self.max_nonce {
                return Err(Error::exhausted(step, nonce.saturating_add(1)));
            }

            if nonce % CANCEL_CHECK_INTERVAL == CANCEL_CHECK_INTERVAL - 1 {
                if let Some(cancellation) = &self.cancellation {
                    if cancellation.is_cancelled() {
                        return Err(Error::cancelled(format!("nonce search in step {}", step)));
                    }
                }
            }

            nonce += 1;
        }
    }
}

/// Recompute the digest for an already chosen nonce
pub fn step_digest(
    hasher: &mut ChainHasher,
    config: &Config,
    last_digest: &ChainDigest,
    nonce: Nonce,
    step: u32,
) -> ChainDigest {
    let input = HashInput::assemble(last_digest, nonce, config.token(), step);
    hasher.digest(input.as_bytes())
}
