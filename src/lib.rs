//! Sequential proof-of-work certificates
//!
//! A prover solves `N` chained hash puzzles in order. Each step searches for
//! the smallest nonce whose digest, over the previous step's digest, a domain
//! token and the step index, has `D` leading zero bits. The accepted nonces
//! are bit-packed into a compact certificate that a verifier replays with one
//! hash per step.
//!
//! - Deterministic construction: equal configurations give equal certificates
//! - Non-malleable encoding: padding bits must be zero
//! - SHA-256 by default, Blake2s-256 as an alternative

pub mod analysis;
pub mod certificate;
pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod input;
pub mod logging;
pub mod prover;
pub mod search;
pub mod types;
pub mod utils;
pub mod verifier;

pub use analysis::ParameterAnalysis;
pub use certificate::{Certificate, CertificateLayout};
pub use config::{Config, ConfigArgs};
pub use error::{ConfigError, Error, Result};
pub use hash::HashAlgorithm;
pub use prover::{prove, Proof, Prover, StepReport};
pub use types::*;
pub use verifier::{verify, Rejection, Verdict, Verifier};

/// Application information
pub const APP_NAME: &str = "spow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
