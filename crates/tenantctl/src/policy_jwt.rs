//! Policy token construction.
//!
//! A policy file becomes a compact JWS: `base64url(header).base64url(claims).signature`.
//! Without signing options the header is `{"alg":"none"}` and the signature
//! segment is empty. With them, the token is RSA-signed and carries the signer
//! certificate in its header.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::crypto;
use crate::error::Error;
use crate::jwt;
use crate::path;
use crate::types::{PolicyClaims, SigningAlgorithm, UNSIGNED_ALG};

const TOKEN_FILE_SUFFIX: &str = ".jwt";

#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o400;

#[derive(Debug, Clone)]
pub struct SigningOptions {
    pub private_key_file: PathBuf,
    pub certificate_file: PathBuf,
    /// Algorithm label, validated when the token is built.
    pub algorithm: String,
}

#[derive(Debug, Clone)]
pub struct PolicyJwtRequest {
    pub policy_file: PathBuf,
    /// `None` produces an unsigned token.
    pub signing: Option<SigningOptions>,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyJwt {
    pub policy: String,
    pub algorithm: Option<SigningAlgorithm>,
    pub token: String,
    pub output_file: PathBuf,
}

impl PolicyJwt {
    pub fn algorithm_label(&self) -> &'static str {
        self.algorithm.map_or(UNSIGNED_ALG, |alg| alg.as_str())
    }
}

/// A policy file as named by the operator and as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySource {
    /// Cleaned form of the path the operator passed.
    pub path: PathBuf,
    /// Canonical location after following symlinks.
    pub real_path: PathBuf,
    pub policy: String,
}

/// Read a policy file. Empty files are rejected.
///
/// Contents are taken as bytes; invalid UTF-8 sequences become U+FFFD.
pub fn read_policy(policy_file: &Path) -> Result<PolicySource, Error> {
    let load_err = |source: io::Error| Error::PolicyLoad {
        path: policy_file.to_path_buf(),
        source,
    };

    let cleaned = path::validate_output_path(policy_file)?;
    let real_path = path::resolve(policy_file).map_err(|e| match e {
        Error::Io(source) => load_err(source),
        other => other,
    })?;
    let bytes = fs::read(&real_path).map_err(load_err)?;
    if bytes.is_empty() {
        return Err(Error::EmptyPolicy { path: cleaned });
    }
    let policy = String::from_utf8_lossy(&bytes).into_owned();

    tracing::debug!(path = %real_path.display(), bytes = bytes.len(), "Read policy file");
    Ok(PolicySource {
        path: cleaned,
        real_path,
        policy,
    })
}

/// `<policy file name>.jwt` next to the policy file.
pub fn derive_output_path(policy_file: &Path) -> PathBuf {
    let mut name = policy_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "policy".into());
    name.push(TOKEN_FILE_SUFFIX);
    policy_file.with_file_name(name)
}

/// Refuse an output path that resolves to one of the input files.
fn ensure_not_input(output_file: &Path, inputs: &[&Path]) -> Result<(), Error> {
    let Ok(target) = output_file.canonicalize() else {
        return Ok(());
    };
    for input in inputs {
        if path::resolve(input).ok().as_deref() == Some(target.as_path()) {
            return Err(Error::InvalidPath {
                path: output_file.display().to_string(),
                reason: format!("output file would overwrite input {}", input.display()),
            });
        }
    }
    Ok(())
}

/// Build the token for `request` without touching the output file.
pub fn build_policy_jwt(request: &PolicyJwtRequest) -> Result<PolicyJwt, Error> {
    let PolicySource { path: policy_path, policy, .. } = read_policy(&request.policy_file)?;

    let output_file = match &request.output_file {
        Some(explicit) => path::validate_output_path(explicit)?,
        None => derive_output_path(&policy_path),
    };

    let mut inputs = vec![request.policy_file.as_path()];
    if let Some(options) = &request.signing {
        inputs.push(&options.private_key_file);
        inputs.push(&options.certificate_file);
    }
    ensure_not_input(&output_file, &inputs)?;

    let claims = PolicyClaims {
        policy: policy.clone(),
    };

    let (algorithm, token) = match &request.signing {
        None => (None, jwt::encode_unsigned(&claims)?),
        Some(options) => {
            let alg: SigningAlgorithm = options.algorithm.parse()?;
            let key = crypto::load_private_key(&options.private_key_file)?;
            let certificate = crypto::load_certificate_pem(&options.certificate_file)?;
            let rsa_key = key.signing_key(alg)?;
            let token = jwt::encode_signed(&claims, alg, rsa_key, &certificate)?;
            (Some(alg), token)
        }
    };

    let jwt = PolicyJwt {
        policy,
        algorithm,
        token,
        output_file,
    };
    tracing::info!(alg = jwt.algorithm_label(), output = %jwt.output_file.display(), "Built policy token");
    Ok(jwt)
}

/// Write `token` to `path` readable only by its owner.
///
/// An existing file is replaced.
pub fn write_token_file(path: &Path, token: &str) -> Result<(), Error> {
    let write_err = |source: io::Error| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            return Err(write_err(io::Error::other("output path is a directory")))
        }
        Ok(_) => fs::remove_file(path).map_err(write_err)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(write_err(e)),
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(TOKEN_FILE_MODE);
    }

    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(token.as_bytes()).map_err(write_err)?;

    // umask may have narrowed the create mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(TOKEN_FILE_MODE))
            .map_err(write_err)?;
    }

    tracing::info!(output = %path.display(), bytes = token.len(), "Wrote policy token");
    Ok(())
}

/// Print the policy, algorithm, output path and token to `out`, then persist the token.
///
/// The report is written before the file so the token is never lost to a
/// failed write.
pub fn generate_policy_jwt<W: Write>(
    request: &PolicyJwtRequest,
    out: &mut W,
) -> Result<PolicyJwt, Error> {
    let jwt = build_policy_jwt(request)?;

    writeln!(out, "Policy:\n{}", jwt.policy)?;
    writeln!(out, "Algorithm: {}", jwt.algorithm_label())?;
    writeln!(out, "Output file: {}", jwt.output_file.display())?;
    writeln!(out, "Token:\n{}", jwt.token)?;
    out.flush()?;

    write_token_file(&jwt.output_file, &jwt.token)?;
    Ok(jwt)
}
