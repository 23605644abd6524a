//! Certificate verification
//!
//! Replays the chain exactly as the prover ran it: starting from the
//! configured initial digest, each step's nonce is unpacked, the step input
//! is reassembled and hashed, and the digest must pass the difficulty
//! predicate before it becomes the next running digest.

use crate::config::Config;
use crate::hash::{meets_difficulty, ChainHasher};
use crate::search::step_digest;
use crate::types::{ChainDigest, Nonce};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Why a certificate was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Structurally malformed: wrong number of bytes
    #[error("bad length: expected {expected} bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },

    /// Bits after the last step are not zero
    #[error("non-zero padding bits after the last step")]
    NonCanonicalPadding,

    /// Well-formed, but the digest of this step misses the difficulty
    #[error("predicate failed at step {step}")]
    PredicateFailed { step: u32 },
}

impl Rejection {
    /// Failing step, for predicate failures
    pub fn step(&self) -> Option<u32> {
        match self {
            Rejection::PredicateFailed { step } => Some(*step),
            _ => None,
        }
    }
}

/// Verification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every step passed
    Accept,
    /// The certificate is invalid under this configuration
    Reject(Rejection),
}

impl Verdict {
    /// Whether the certificate was accepted
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    /// Rejection reason, if any
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Verdict::Accept => None,
            Verdict::Reject(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "Valid"),
            Verdict::Reject(reason) => write!(f, "Invalid: {}", reason),
        }
    }
}

/// One replayed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayedStep {
    /// Step index
    pub step: u32,
    /// Nonce read from the certificate
    pub nonce: Nonce,
    /// Recomputed digest
    pub digest: ChainDigest,
    /// Whether the digest meets the difficulty
    pub passed: bool,
}

/// Certificate verifier for one configuration
#[derive(Debug)]
pub struct Verifier<'a> {
    config: &'a Config,
    hasher: ChainHasher,
}

impl<'a> Verifier<'a> {
    /// Create a verifier for a validated configuration
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            hasher: config.algorithm().hasher(),
        }
    }

    /// Check length and padding before any hashing
    fn check_structure(&self, certificate: &[u8]) -> Result<(), Rejection> {
        let layout = self.config.layout();
        let expected = layout.byte_len();
        if certificate.len() != expected {
            return Err(Rejection::BadLength {
                expected,
                actual: certificate.len(),
            });
        }
        if !layout.padding_is_canonical(certificate) {
            return Err(Rejection::NonCanonicalPadding);
        }
        Ok(())
    }

    /// Verify a certificate, stopping at the first failing step
    pub fn verify(&mut self, certificate: &[u8]) -> Verdict {
        if let Err(reason) = self.check_structure(certificate) {
            debug!("Certificate rejected before replay: {}", reason);
            return Verdict::Reject(reason);
        }

        let layout = self.config.layout();
        let mask = self.config.difficulty_mask();
        let mut digest = *self.config.initial_digest();

        for step in 0..self.config.steps() {
            let nonce = layout.unpack(certificate, step);
            digest = step_digest(&mut self.hasher, self.config, &digest, nonce, step);
            if !meets_difficulty(&digest, mask) {
                debug!("Certificate rejected at step {} (nonce {})", step, nonce);
                return Verdict::Reject(Rejection::PredicateFailed { step });
            }
        }

        Verdict::Accept
    }

    /// Replay every step for diagnostics, without stopping at failures.
    ///
    /// Returns the structural rejection instead when length or padding are
    /// wrong, since step boundaries are then meaningless.
    pub fn replay(&mut self, certificate: &[u8]) -> Result<Vec<ReplayedStep>, Rejection> {
        self.check_structure(certificate)?;

        let layout = self.config.layout();
        let mask = self.config.difficulty_mask();
        let mut digest = *self.config.initial_digest();
        let mut steps = Vec::with_capacity(self.config.steps() as usize);

        for step in 0..self.config.steps() {
            let nonce = layout.unpack(certificate, step);
            digest = step_digest(&mut self.hasher, self.config, &digest, nonce, step);
            steps.push(ReplayedStep {
                step,
                nonce,
                digest,
                passed: meets_difficulty(&digest, mask),
            });
        }

        Ok(steps)
    }
}

/// Verify `certificate` under `config`
pub fn verify(config: &Config, certificate: &[u8]) -> Verdict {
    Verifier::new(config).verify(certificate)
}
