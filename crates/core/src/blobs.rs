//! Blob store merging
//!
//! Blobs are content-addressed, so a name collision between two staged copies
//! implies identical content and either copy may be kept. A producer emitting
//! different content under the same address violates that invariant; the
//! result is undefined and must be fixed on the producer side.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::hash::{blob_digest, split_content_address};
use crate::{CoreError, Result};

/// Move staged blob files into the shared blob directory
///
/// Union by content-address key: a blob already present in `blob_dir` is kept
/// and the staged copy is dropped, which makes the merge idempotent and
/// commutative. With `verify` set, each sha256-addressed blob is re-hashed
/// and checked against its file name before it enters the store.
///
/// Consumed staging directories are removed. Returns the number of blobs
/// newly added to the store.
pub fn merge_blobs(staging_dirs: &[PathBuf], blob_dir: &Path, verify: bool) -> Result<usize> {
    if staging_dirs.is_empty() {
        return Ok(0);
    }

    fs::create_dir_all(blob_dir)?;
    let mut moved = 0;

    for staging in staging_dirs {
        for entry in fs::read_dir(staging)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let Some((alg, digest)) = split_content_address(&name) else {
                continue;
            };

            let src = entry.path();

            if verify {
                if alg == "sha256" {
                    let actual = blob_digest(&src)?;
                    if actual != digest {
                        return Err(CoreError::BlobDigestMismatch {
                            blob: name.clone(),
                            expected: digest.to_string(),
                            actual,
                        });
                    }
                } else {
                    warn!("Cannot verify blob {} with algorithm '{}'", name, alg);
                }
            }

            let dest = blob_dir.join(&name);
            if dest.exists() {
                debug!("Blob {} already present, keeping existing copy", name);
                fs::remove_file(&src)?;
                continue;
            }

            // rename fails across filesystems, fall back to copy + remove
            if fs::rename(&src, &dest).is_err() {
                fs::copy(&src, &dest)?;
                fs::remove_file(&src)?;
            }
            moved += 1;
        }

        fs::remove_dir_all(staging)?;
    }

    info!("Merged {} blob(s) into {}", moved, blob_dir.display());
    Ok(moved)
}
