use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tenantctl/tests/fixtures")
        .join(name)
}

fn tenantctl() -> Command {
    let mut cmd = Command::cargo_bin("tenantctl").unwrap();
    cmd.env_remove("TENANTCTL_POLICY_ALGORITHM")
        .env_remove("TENANTCTL_LOG");
    cmd
}

fn policy_in(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("policy.rego");
    fs::write(&path, "p == true").unwrap();
    path
}

#[test]
fn help_lists_commands() {
    tenantctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("verify"));

    tenantctl()
        .args(["create", "policy-jwt", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--policy-file"))
        .stdout(predicate::str::contains("--algorithm"));
}

#[test]
fn create_unsigned_policy_jwt() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_in(&dir);

    tenantctl()
        .args(["create", "policy-jwt", "--policy-file"])
        .arg(&policy)
        .assert()
        .success()
        .stdout(predicate::str::contains("Algorithm: none"))
        .stdout(predicate::str::contains("eyJhbGciOiJub25lIn0."));

    let token = fs::read_to_string(dir.path().join("policy.rego.jwt")).unwrap();
    assert!(token.starts_with("eyJhbGciOiJub25lIn0."));
    assert!(token.ends_with('.'));
}

#[test]
fn sign_requires_key_and_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_in(&dir);

    tenantctl()
        .args(["create", "policy-jwt", "--sign", "--policy-file"])
        .arg(&policy)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--private-key-file"));
}

#[test]
fn create_signed_then_verify() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_in(&dir);
    let output = dir.path().join("signed.jwt");

    tenantctl()
        .args(["create", "policy-jwt", "--sign", "--algorithm", "PS256"])
        .arg("--policy-file")
        .arg(&policy)
        .arg("--private-key-file")
        .arg(fixture("rsa-2048.key.pem"))
        .arg("--certificate-file")
        .arg(fixture("rsa-2048.cert.pem"))
        .arg("--output-file")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Algorithm: PS256"));

    tenantctl()
        .args(["verify", "policy-jwt", "--token-file"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"verified\": true"))
        .stdout(predicate::str::contains("\"algorithm\": \"PS256\""));
}

#[test]
fn algorithm_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_in(&dir);

    tenantctl()
        .env("TENANTCTL_POLICY_ALGORITHM", "RS384")
        .args(["create", "policy-jwt", "--sign", "--policy-file"])
        .arg(&policy)
        .arg("--private-key-file")
        .arg(fixture("rsa-2048.key.pem"))
        .arg("--certificate-file")
        .arg(fixture("rsa-2048.cert.pem"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Algorithm: RS384"));
}

#[test]
fn verify_unsigned_token_fails() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_in(&dir);

    tenantctl()
        .args(["create", "policy-jwt", "--policy-file"])
        .arg(&policy)
        .assert()
        .success();

    tenantctl()
        .args(["verify", "policy-jwt", "--token-file"])
        .arg(dir.path().join("policy.rego.jwt"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"signed\": false"));
}

#[test]
fn unsupported_algorithm_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_in(&dir);

    tenantctl()
        .args(["create", "policy-jwt", "--sign", "--algorithm", "ES256"])
        .arg("--policy-file")
        .arg(&policy)
        .arg("--private-key-file")
        .arg(fixture("rsa-2048.key.pem"))
        .arg("--certificate-file")
        .arg(fixture("rsa-2048.cert.pem"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported signing algorithm"));

    assert!(!dir.path().join("policy.rego.jwt").exists());
}

#[test]
fn empty_policy_fails() {
    let dir = tempfile::tempdir().unwrap();
    let policy = dir.path().join("empty.rego");
    fs::write(&policy, "").unwrap();

    tenantctl()
        .args(["create", "policy-jwt", "--policy-file"])
        .arg(&policy)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is empty"));
}

#[test]
fn ec_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let policy = policy_in(&dir);

    tenantctl()
        .args(["create", "policy-jwt", "--sign", "--policy-file"])
        .arg(&policy)
        .arg("--private-key-file")
        .arg(fixture("ec-p256.key.pem"))
        .arg("--certificate-file")
        .arg(fixture("rsa-2048.cert.pem"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not compatible with RSA"));
}
