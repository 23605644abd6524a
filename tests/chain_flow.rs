//! Integration tests for the complete prove / verify flow

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spow::{
    config::{DEFAULT_INITIAL_DIGEST, DEFAULT_TOKEN},
    prove, verify, Certificate, Config, HashAlgorithm, Nonce, Rejection, Verdict,
};

fn config(difficulty: u32, safety: u32, steps: u32) -> Config {
    Config::new(difficulty, safety, steps, &DEFAULT_TOKEN, &DEFAULT_INITIAL_DIGEST).unwrap()
}

#[test]
fn test_prover_and_verifier_agree() {
    let cases = [(1, 4, 3), (4, 4, 17), (8, 4, 4), (10, 6, 9), (3, 13, 7)];
    for algorithm in [HashAlgorithm::Sha256, HashAlgorithm::Blake2s] {
        for (difficulty, safety, steps) in cases {
            let config = Config::with_algorithm(
                difficulty,
                safety,
                steps,
                &DEFAULT_TOKEN,
                &DEFAULT_INITIAL_DIGEST,
                algorithm,
            )
            .unwrap();
            let proof = prove(&config).unwrap();
            assert_eq!(proof.certificate.len(), config.certificate_len());
            assert_eq!(
                verify(&config, proof.certificate.as_bytes()),
                Verdict::Accept,
                "{} D={} S={} N={}",
                algorithm,
                difficulty,
                safety,
                steps
            );
        }
    }
}

#[test]
fn test_algorithms_are_not_interchangeable() {
    let sha = config(8, 4, 8);
    let blake = Config::with_algorithm(
        8,
        4,
        8,
        &DEFAULT_TOKEN,
        &DEFAULT_INITIAL_DIGEST,
        HashAlgorithm::Blake2s,
    )
    .unwrap();
    let proof = prove(&sha).unwrap();
    assert!(!verify(&blake, proof.certificate.as_bytes()).is_accept());
}

#[test]
fn test_concrete_certificate_size() {
    let config = config(8, 4, 4);
    let proof = prove(&config).unwrap();
    assert_eq!(proof.certificate.len(), 6);
    assert_eq!(verify(&config, proof.certificate.as_bytes()), Verdict::Accept);
}

#[test]
fn test_zero_difficulty_boundary() {
    let config = config(0, 8, 16);
    let proof = prove(&config).unwrap();
    assert_eq!(proof.certificate.as_bytes(), &[0u8; 16][..]);
    assert_eq!(proof.total_hashes, 16);
    assert_eq!(verify(&config, proof.certificate.as_bytes()), Verdict::Accept);
}

#[test]
fn test_identical_configs_give_identical_certificates() {
    let a = prove(&config(7, 5, 20)).unwrap();
    let b = prove(&config(7, 5, 20)).unwrap();
    assert_eq!(a.certificate, b.certificate);
    assert_eq!(a.final_digest, b.final_digest);
}

#[test]
fn test_initial_digest_binds_certificate() {
    let config = config(8, 4, 8);
    let proof = prove(&config).unwrap();

    let mut other_digest = DEFAULT_INITIAL_DIGEST;
    other_digest[31] ^= 1;
    let other = Config::new(8, 4, 8, &DEFAULT_TOKEN, &other_digest).unwrap();
    assert!(!verify(&other, proof.certificate.as_bytes()).is_accept());
}

#[test]
fn test_single_bit_flips_are_rejected() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let config = config(8, 4, 16);
    let layout = config.layout();
    let proof = prove(&config).unwrap();
    let original = proof.certificate.as_bytes().to_vec();
    assert_eq!(layout.padding_bits(), 0);

    let mut accepted = 0;
    for _ in 0..200 {
        let bit = rng.random_range(0..original.len() * 8);
        let mut tampered = original.clone();
        tampered[bit / 8] ^= 0x80 >> (bit % 8);
        let flipped_step = (bit as u32) / layout.nonce_bits();

        match verify(&config, &tampered) {
            Verdict::Accept => accepted += 1,
            Verdict::Reject(Rejection::PredicateFailed { step }) => {
                // Steps before the flipped group are untouched
                assert!(step >= flipped_step);
            }
            Verdict::Reject(other) => panic!("unexpected rejection {:?}", other),
        }
    }
    assert!(accepted <= 5, "{} of 200 flips accepted", accepted);
}

#[test]
fn test_padding_flips_are_rejected() {
    let config = config(8, 4, 5);
    let layout = config.layout();
    assert_eq!(layout.padding_bits(), 4);

    let proof = prove(&config).unwrap();
    for bit in 0..layout.padding_bits() {
        let mut tampered = proof.certificate.as_bytes().to_vec();
        let last = tampered.len() - 1;
        tampered[last] ^= 1 << bit;
        assert_eq!(
            verify(&config, &tampered),
            Verdict::Reject(Rejection::NonCanonicalPadding)
        );
    }
}

#[test]
fn test_truncated_and_extended_certificates() {
    let config = config(8, 4, 4);
    let proof = prove(&config).unwrap();
    let bytes = proof.certificate.as_bytes();

    assert_eq!(
        verify(&config, &bytes[..5]),
        Verdict::Reject(Rejection::BadLength {
            expected: 6,
            actual: 5
        })
    );

    let mut extended = bytes.to_vec();
    extended.push(0);
    assert_eq!(
        verify(&config, &extended),
        Verdict::Reject(Rejection::BadLength {
            expected: 6,
            actual: 7
        })
    );
}

#[test]
fn test_certificate_text_roundtrip() {
    let config = config(9, 5, 11);
    let proof = prove(&config).unwrap();

    let from_escaped = Certificate::parse(&proof.certificate.to_escaped()).unwrap();
    let from_hex = Certificate::parse(&proof.certificate.to_hex()).unwrap();
    assert_eq!(from_escaped, proof.certificate);
    assert_eq!(from_hex, proof.certificate);
    assert_eq!(verify(&config, from_escaped.as_bytes()), Verdict::Accept);
}

#[test]
fn test_hand_packed_chain_is_verified() {
    // Rebuild the prover's certificate from its unpacked nonces
    let config = config(6, 6, 10);
    let layout = config.layout();
    let proof = prove(&config).unwrap();

    let nonces: Vec<Nonce> = layout.unpack_all(proof.certificate.as_bytes());
    let repacked = layout.pack_all(&nonces);
    assert_eq!(repacked, proof.certificate.as_bytes());
    assert_eq!(verify(&config, &repacked), Verdict::Accept);
}
