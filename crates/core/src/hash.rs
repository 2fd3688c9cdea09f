//! Content-address computation for blob files

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::Result;

/// Compute the SHA256 digest of a file and return it as a hex string
pub fn blob_digest(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();

    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Split a content-address file name `<alg>:<hexdigest>` into its parts
///
/// Returns `None` for names that are not content addresses (e.g. fragment
/// documents sitting next to blobs in a staged archive).
pub fn split_content_address(name: &str) -> Option<(&str, &str)> {
    let (alg, digest) = name.split_once(':')?;
    if alg.is_empty() || digest.is_empty() {
        return None;
    }
    if !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some((alg, digest))
}
