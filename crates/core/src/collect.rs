//! Fragment archive discovery and staging
//!
//! Build jobs each drop at most one `*.ocm-artefacts` archive into the search
//! directory. The collector expands every matching archive into its own
//! staging directory under the workspace and deletes the consumed archive, so
//! a re-run observes nothing left to do.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info};

use crate::descriptor::FRAGMENT_SUFFIX;
use crate::hash::split_content_address;
use crate::Result;

/// Staged fragment contents, ready for merging
#[derive(Debug, Default)]
pub struct CollectedFragments {
    /// Fragment documents, sorted lexicographically by path
    pub documents: Vec<PathBuf>,
    /// One staging directory per consumed archive, same order as the archives
    pub staging_dirs: Vec<PathBuf>,
}

impl CollectedFragments {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.staging_dirs.is_empty()
    }
}

/// Discover, expand, and consume fragment archives
///
/// Matches `<context>-*.ocm-artefacts` when a context token is given,
/// `*.ocm-artefacts` otherwise. Zero matches is a valid terminal state.
/// Document order is made explicit here: archives and the documents staged
/// from them are sorted lexicographically, independent of filesystem
/// listing order.
pub fn collect_fragments(
    search_dir: &Path,
    workspace: &Path,
    context: Option<&str>,
) -> Result<CollectedFragments> {
    let mut archives = Vec::new();

    if search_dir.exists() {
        for entry in fs::read_dir(search_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if matches_filter(&name, context) {
                archives.push(entry.path());
            }
        }
    }

    archives.sort();

    if archives.is_empty() {
        info!("No fragment archives found in {}", search_dir.display());
        return Ok(CollectedFragments::default());
    }

    let mut collected = CollectedFragments::default();
    let fragments_dir = workspace.join("fragments");

    for archive_path in &archives {
        let stem = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = stem.trim_end_matches(FRAGMENT_SUFFIX);

        let staging = fragments_dir.join(stem);
        unpack_fragment_archive(archive_path, &staging)?;
        fs::remove_file(archive_path)?;
        info!("Staged fragment archive {}", archive_path.display());

        for entry in fs::read_dir(&staging)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            // Blob files stay in the staging dir for the blob store merge
            if split_content_address(&name).is_none() {
                collected.documents.push(entry.path());
            }
        }

        collected.staging_dirs.push(staging);
    }

    collected.documents.sort();
    debug!(
        "Collected {} fragment document(s) from {} archive(s)",
        collected.documents.len(),
        archives.len()
    );

    Ok(collected)
}

fn matches_filter(name: &str, context: Option<&str>) -> bool {
    if !name.ends_with(FRAGMENT_SUFFIX) {
        return false;
    }
    match context {
        Some(ctx) => name.starts_with(&format!("{ctx}-")),
        None => true,
    }
}

fn unpack_fragment_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;

    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut archive = Archive::new(decoder);
    archive.unpack(dest)?;

    Ok(())
}
