//! Configuration precedence: command line over file over defaults

use assert_matches::assert_matches;
use spow::{prove, verify, ConfigArgs, ConfigError, Error, HashAlgorithm, Verdict};
use std::io::Write;

#[tokio::test]
async fn test_file_parameters_drive_construction() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "difficulty: 5").unwrap();
    writeln!(file, "safety: 6").unwrap();
    writeln!(file, "steps: 12").unwrap();
    writeln!(
        file,
        "initial_digest: \"00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff\""
    )
    .unwrap();
    writeln!(file, "algorithm: blake2s").unwrap();

    let args = ConfigArgs {
        config_file: Some(file.path().to_path_buf()),
        steps: Some(3),
        ..Default::default()
    };
    let config = args.load().await.unwrap();
    assert_eq!(config.difficulty(), 5);
    assert_eq!(config.steps(), 3);
    assert_eq!(config.algorithm(), HashAlgorithm::Blake2s);
    assert_eq!(config.initial_digest().as_bytes()[1], 0x11);

    let proof = prove(&config).unwrap();
    assert_eq!(proof.certificate.len(), 5);
    assert_eq!(verify(&config, proof.certificate.as_bytes()), Verdict::Accept);
}

#[tokio::test]
async fn test_json_file_with_bad_token() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"token": "0011"}}"#).unwrap();

    let args = ConfigArgs {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    assert_matches!(
        args.load().await,
        Err(Error::Config(ConfigError::TokenLength {
            expected: 8,
            actual: 2
        }))
    );
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let args = ConfigArgs {
        config_file: Some("/nonexistent/spow.yaml".into()),
        ..Default::default()
    };
    assert_matches!(args.load().await, Err(Error::Io(_)));
}

#[test]
fn test_zero_steps_rejected_before_work() {
    let args = ConfigArgs {
        steps: Some(0),
        ..Default::default()
    };
    assert_matches!(args.resolve(), Err(ConfigError::NoSteps));
}
