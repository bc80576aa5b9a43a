//! Executable integrity verification.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("unable to read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("checksum failed for \"{path}\"")]
    Mismatch { path: PathBuf },
}

/// Compare the SHA-256 digest of `path`'s full content against `expected_hex`,
/// case-insensitively. An empty `expected_hex` short-circuits to true without
/// touching the file; verification is opt-in per realm.
pub fn verify(path: &Path, expected_hex: &str) -> Result<bool, std::io::Error> {
    if expected_hex.is_empty() {
        return Ok(true);
    }

    let bytes = std::fs::read(path)?;
    let actual = hex::encode(Sha256::digest(&bytes));

    Ok(actual.eq_ignore_ascii_case(expected_hex))
}

/// [`verify`] folded into the launcher's error taxonomy: an unreadable file
/// and a wrong digest are distinct failures, but both refuse the launch.
pub fn ensure_integrity(path: &Path, expected_hex: &str) -> Result<(), IntegrityError> {
    let ok = verify(path, expected_hex).map_err(|source| IntegrityError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if ok {
        Ok(())
    } else {
        Err(IntegrityError::Mismatch {
            path: path.to_path_buf(),
        })
    }
}
