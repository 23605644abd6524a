//! Parameter analysis
//!
//! Closed-form cost and failure estimates for a configuration, plus a local
//! hash rate measurement over the real step input.

use crate::config::Config;
use crate::hash::HashAlgorithm;
use crate::input::HashInput;
use crate::types::{ChainDigest, DomainToken, HashRate, Nonce, DIGEST_SIZE, TOKEN_SIZE};
use serde::Serialize;
use std::hint::black_box;
use std::time::{Duration, Instant};
use tracing::debug;

/// Derived figures for one configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterAnalysis {
    /// Required leading zero bits per step
    pub difficulty: u32,
    /// Extra nonce bits
    pub safety: u32,
    /// Number of steps
    pub steps: u32,
    /// Bits stored per step, `D + S`
    pub nonce_bits: u32,
    /// Candidates available per step, `2^(D+S)`
    pub search_space: f64,
    /// Expected hashes for the whole chain, `N * 2^D`
    pub expected_hashes: f64,
    /// Probability that some step has no solution is below `2^failure_bound_log2`
    pub failure_bound_log2: f64,
    /// Certificate size in bytes
    pub certificate_len: usize,
}

impl ParameterAnalysis {
    /// Analyze a validated configuration
    pub fn of(config: &Config) -> Self {
        let difficulty = config.difficulty();
        let safety = config.safety();
        let steps = config.steps();

        Self {
            difficulty,
            safety,
            steps,
            nonce_bits: config.nonce_bits(),
            search_space: 2f64.powi(config.nonce_bits() as i32),
            expected_hashes: f64::from(steps) * 2f64.powi(difficulty as i32),
            failure_bound_log2: f64::from(steps).log2() - 2f64.powi(safety as i32),
            certificate_len: config.certificate_len(),
        }
    }

    /// Expected wall time at the given rate
    pub fn estimated_duration(&self, rate: HashRate) -> Duration {
        let secs = self.expected_hashes / rate.value();
        if secs.is_finite() && secs >= 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        }
    }

    /// Probability bound as a plain number, underflowing to zero for large margins
    pub fn failure_bound(&self) -> f64 {
        2f64.powf(self.failure_bound_log2).min(1.0)
    }
}

/// Measure the local hash rate over `samples` step inputs
pub fn measure_hash_rate(algorithm: HashAlgorithm, samples: u64) -> HashRate {
    let mut hasher = algorithm.hasher();
    let mut input = HashInput::new(
        &ChainDigest::from_bytes([0u8; DIGEST_SIZE]),
        &DomainToken::from_bytes([0u8; TOKEN_SIZE]),
        0,
    );

    let start = Instant::now();
    for nonce in 0..samples {
        input.set_nonce(Nonce::new(nonce));
        black_box(hasher.digest(black_box(input.as_bytes())));
    }
    let elapsed = start.elapsed();

    let rate = crate::utils::compute_hash_rate(samples, elapsed);
    debug!(
        "Measured {} over {} samples in {:?}",
        crate::utils::format_hash_rate(rate),
        samples,
        elapsed
    );
    HashRate::new(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_INITIAL_DIGEST, DEFAULT_TOKEN};

    #[test]
    fn test_default_analysis() {
        let analysis = ParameterAnalysis::of(&Config::default());
        assert_eq!(analysis.nonce_bits, 20);
        assert_eq!(analysis.search_space, 1_048_576.0);
        assert_eq!(analysis.expected_hashes, 128.0 * 4096.0);
        assert_eq!(analysis.failure_bound_log2, 7.0 - 256.0);
        assert_eq!(analysis.certificate_len, 320);
    }

    #[test]
    fn test_small_margin_bound_is_not_meaningful() {
        let config = Config::new(8, 0, 16, &DEFAULT_TOKEN, &DEFAULT_INITIAL_DIGEST).unwrap();
        let analysis = ParameterAnalysis::of(&config);
        assert_eq!(analysis.failure_bound_log2, 3.0);
        assert_eq!(analysis.failure_bound(), 1.0);
    }

    #[test]
    fn test_estimated_duration() {
        let config = Config::new(10, 4, 1000, &DEFAULT_TOKEN, &DEFAULT_INITIAL_DIGEST).unwrap();
        let analysis = ParameterAnalysis::of(&config);
        let duration = analysis.estimated_duration(HashRate::new(1024.0));
        assert_eq!(duration, Duration::from_secs(1000));
    }

    #[test]
    fn test_measure_hash_rate_is_positive() {
        for algorithm in [HashAlgorithm::Sha256, HashAlgorithm::Blake2s] {
            assert!(measure_hash_rate(algorithm, 2000).value() > 0.0);
        }
    }
}
