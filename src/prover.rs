//! Chain driver
//!
//! Runs every step in order, threading the running digest from one step's
//! solution into the next step's input and packing each accepted nonce into
//! the certificate. Steps cannot run in parallel: the input of step `i + 1`
//! is only known once step `i` is solved.

use crate::certificate::Certificate;
use crate::config::Config;
use crate::error::Result;
use crate::search::NonceSearch;
use crate::types::{ChainDigest, Nonce};
use crate::utils::{compute_hash_rate, format_hash_rate};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn};

/// Progress of one solved step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Step index
    pub step: u32,
    /// Accepted nonce
    pub nonce: Nonce,
    /// Hashes spent on this step
    pub hashes: u64,
    /// Running digest after this step
    pub digest: ChainDigest,
}

/// Successful construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Packed nonces of all steps
    pub certificate: Certificate,
    /// Hashes attempted over the whole chain
    pub total_hashes: u64,
    /// Running digest after the last step
    pub final_digest: ChainDigest,
    /// Wall time of the construction
    pub elapsed: Duration,
}

impl Proof {
    /// Average hash rate over the construction
    pub fn hash_rate(&self) -> f64 {
        compute_hash_rate(self.total_hashes, self.elapsed)
    }
}

/// Certificate constructor for one configuration
#[derive(Debug, Clone)]
pub struct Prover<'a> {
    config: &'a Config,
    cancellation: Option<CancellationToken>,
}

impl<'a> Prover<'a> {
    /// Create a prover for a validated configuration
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            cancellation: None,
        }
    }

    /// Abort construction once the token is cancelled
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Build a certificate
    pub fn prove(&self) -> Result<Proof> {
        self.prove_with(|_| {})
    }

    /// Build a certificate, reporting each solved step to `on_step`.
    ///
    /// Fails with [`crate::Error::Exhausted`] naming the step whose nonce
    /// range ran out; no partial certificate is returned.
    pub fn prove_with<F>(&self, mut on_step: F) -> Result<Proof>
    where
        F: FnMut(&StepReport),
    {
        let config = self.config;
        let _span = info_span!(
            "prove",
            difficulty = config.difficulty(),
            safety = config.safety(),
            steps = config.steps(),
            algorithm = %config.algorithm(),
        )
        .entered();

        let layout = config.layout();
        let mut buffer = vec![0u8; layout.byte_len()];
        let mut search = NonceSearch::new(config);
        if let Some(cancellation) = &self.cancellation {
            search = search.with_cancellation(cancellation.clone());
        }

        let start = Instant::now();
        let mut digest = *config.initial_digest();
        let mut total_hashes = 0u64;

        for step in 0..config.steps() {
            let solution = search.search(&digest, step).inspect_err(|e| {
                warn!("Construction stopped in step {}: {}", step, e);
            })?;

            layout.pack(&mut buffer, step, solution.nonce);
            digest = solution.digest;
            total_hashes = total_hashes.saturating_add(solution.hashes);

            debug!(
                "Step {} solved: nonce={} hashes={}",
                step, solution.nonce, solution.hashes
            );
            on_step(&StepReport {
                step,
                nonce: solution.nonce,
                hashes: solution.hashes,
                digest,
            });
        }

        let proof = Proof {
            certificate: Certificate::from_bytes(buffer),
            total_hashes,
            final_digest: digest,
            elapsed: start.elapsed(),
        };

        info!(
            "Certificate of {} bytes found after {} hashes ({})",
            proof.certificate.len(),
            proof.total_hashes,
            format_hash_rate(proof.hash_rate())
        );

        Ok(proof)
    }
}

/// Build a certificate for `config`
pub fn prove(config: &Config) -> Result<Proof> {
    Prover::new(config).prove()
}
