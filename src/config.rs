//! Configuration management for spow
//!
//! Parameters come from command line flags, `SPOW_*` environment variables
//! and an optional configuration file (YAML or JSON), in that order of
//! precedence, falling back to built-in defaults. They are validated exactly
//! once into an immutable [`Config`] before any hashing happens.

use crate::certificate::CertificateLayout;
use crate::error::{ConfigError, Result};
use crate::hash::{difficulty_mask, HashAlgorithm, MAX_DIFFICULTY};
use crate::input::MAX_NONCE_BITS;
use crate::types::{ChainDigest, DomainToken, DIGEST_SIZE, TOKEN_SIZE};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default difficulty in bits
pub const DEFAULT_DIFFICULTY: u32 = 12;

/// Default safety margin in bits
pub const DEFAULT_SAFETY: u32 = 8;

/// Default number of sequential steps
pub const DEFAULT_STEPS: u32 = 128;

/// Default domain token
pub const DEFAULT_TOKEN: [u8; TOKEN_SIZE] = [0x3d, 0x91, 0x5a, 0x13, 0xfd, 0xc4, 0x04, 0xe4];

/// Default initial chain digest
pub const DEFAULT_INITIAL_DIGEST: [u8; DIGEST_SIZE] = [
    0x2c, 0xa7, 0xc6, 0x0f, 0x3a, 0x11, 0xd6, 0x8b, 0x10, 0xe2, 0xaa, 0x4d, 0x49, 0x8b, 0x7c, 0x78,
    0x5f, 0xf2, 0xb3, 0xeb, 0xe2, 0xd4, 0x1a, 0x94, 0x32, 0x1f, 0x85, 0x52, 0x27, 0x21, 0x70, 0x3e,
];

/// Validated, immutable certificate parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    difficulty: u32,
    safety: u32,
    steps: u32,
    token: DomainToken,
    initial_digest: ChainDigest,
    algorithm: HashAlgorithm,
}

impl Config {
    /// Validate raw parameters into a configuration using the default hash
    pub fn new(
        difficulty: u32,
        safety: u32,
        steps: u32,
        token: &[u8],
        initial_digest: &[u8],
    ) -> std::result::Result<Self, ConfigError> {
        Self::with_algorithm(
            difficulty,
            safety,
            steps,
            token,
            initial_digest,
            HashAlgorithm::default(),
        )
    }

    /// Validate raw parameters into a configuration for a specific hash
    pub fn with_algorithm(
        difficulty: u32,
        safety: u32,
        steps: u32,
        token: &[u8],
        initial_digest: &[u8],
        algorithm: HashAlgorithm,
    ) -> std::result::Result<Self, ConfigError> {
        let config = Self {
            difficulty,
            safety,
            steps,
            token: DomainToken::from_slice(token)?,
            initial_digest: ChainDigest::from_slice(initial_digest)?,
            algorithm,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric invariants
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::DifficultyTooHigh {
                difficulty: self.difficulty,
                max: MAX_DIFFICULTY,
            });
        }

        let bits = self.difficulty.saturating_add(self.safety);
        if bits > MAX_NONCE_BITS {
            return Err(ConfigError::NonceTooWide {
                bits,
                max: MAX_NONCE_BITS,
            });
        }
        if bits == 0 {
            return Err(ConfigError::EmptyNonce);
        }

        if self.steps == 0 {
            return Err(ConfigError::NoSteps);
        }

        let total_bits = u64::from(self.steps) * u64::from(bits);
        if usize::try_from(total_bits.div_ceil(8)).is_err() {
            return Err(ConfigError::CertificateTooLarge { bits: total_bits });
        }

        Ok(())
    }

    /// Required leading zero bits per step
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Extra nonce bits beyond the difficulty
    pub fn safety(&self) -> u32 {
        self.safety
    }

    /// Number of sequential steps
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Domain token
    pub fn token(&self) -> &DomainToken {
        &self.token
    }

    /// Digest the chain starts from
    pub fn initial_digest(&self) -> &ChainDigest {
        &self.initial_digest
    }

    /// Digest function
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Bits recorded per step (`difficulty + safety`)
    pub fn nonce_bits(&self) -> u32 {
        self.difficulty + self.safety
    }

    /// Largest nonce the search may try
    pub fn max_nonce(&self) -> u64 {
        crate::codec::low_bits_mask(self.nonce_bits())
    }

    /// Mask applied to the leading digest word
    pub fn difficulty_mask(&self) -> u32 {
        difficulty_mask(self.difficulty)
    }

    /// Bit layout of certificates under this configuration
    pub fn layout(&self) -> CertificateLayout {
        CertificateLayout::new(self.nonce_bits(), self.steps)
    }

    /// Certificate length in bytes, `ceil(steps * nonce_bits / 8)`
    pub fn certificate_len(&self) -> usize {
        self.layout().byte_len()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            safety: DEFAULT_SAFETY,
            steps: DEFAULT_STEPS,
            token: DomainToken::from_bytes(DEFAULT_TOKEN),
            initial_digest: ChainDigest::from_bytes(DEFAULT_INITIAL_DIGEST),
            algorithm: HashAlgorithm::default(),
        }
    }
}

/// Parameter overrides from the command line, environment or a file
#[derive(Debug, Clone, Default, PartialEq, Args, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigArgs {
    /// Configuration file path (YAML or JSON)
    #[arg(long, value_name = "FILE", env = "SPOW_CONFIG_FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Required leading zero bits per step [default: 12]
    #[arg(short = 'd', long, env = "SPOW_DIFFICULTY")]
    pub difficulty: Option<u32>,

    /// Extra nonce bits beyond the difficulty [default: 8]
    #[arg(short = 's', long, env = "SPOW_SAFETY")]
    pub safety: Option<u32>,

    /// Number of sequential steps [default: 128]
    #[arg(short = 'n', long, env = "SPOW_STEPS")]
    pub steps: Option<u32>,

    /// Domain token, 8 bytes as hex
    #[arg(short = 't', long, value_name = "HEX", env = "SPOW_TOKEN")]
    pub token: Option<String>,

    /// Initial chain digest, 32 bytes as hex
    #[arg(short = 'i', long, value_name = "HEX", env = "SPOW_INITIAL_DIGEST")]
    pub initial_digest: Option<String>,

    /// Digest function [default: sha256]
    #[arg(short = 'a', long, value_enum, env = "SPOW_ALGORITHM")]
    pub algorithm: Option<HashAlgorithm>,
}

impl ConfigArgs {
    /// Load the configuration file if specified, merge and validate
    pub async fn load(&self) -> Result<Config> {
        let merged = match &self.config_file {
            Some(path) => {
                let file_args = Self::load_from_file(path).await?;
                debug!("Loaded configuration file {}", path.display());
                self.clone().merge_with_file(file_args)
            }
            None => self.clone(),
        };

        Ok(merged.resolve()?)
    }

    /// Load overrides from a YAML or JSON file
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            // Default to YAML
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Merge CLI overrides with file values (CLI takes precedence)
    pub fn merge_with_file(self, file: Self) -> Self {
        Self {
            config_file: self.config_file,
            difficulty: self.difficulty.or(file.difficulty),
            safety: self.safety.or(file.safety),
            steps: self.steps.or(file.steps),
            token: self.token.or(file.token),
            initial_digest: self.initial_digest.or(file.initial_digest),
            algorithm: self.algorithm.or(file.algorithm),
        }
    }

    /// Apply defaults and validate
    pub fn resolve(&self) -> std::result::Result<Config, ConfigError> {
        let token = match &self.token {
            Some(hex) => DomainToken::from_hex(hex)?,
            None => DomainToken::from_bytes(DEFAULT_TOKEN),
        };
        let initial_digest = match &self.initial_digest {
            Some(hex) => ChainDigest::from_hex(hex)?,
            None => ChainDigest::from_bytes(DEFAULT_INITIAL_DIGEST),
        };

        let config = Config {
            difficulty: self.difficulty.unwrap_or(DEFAULT_DIFFICULTY),
            safety: self.safety.unwrap_or(DEFAULT_SAFETY),
            steps: self.steps.unwrap_or(DEFAULT_STEPS),
            token,
            initial_digest,
            algorithm: self.algorithm.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
