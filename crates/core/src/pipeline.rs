//! The merge pipeline
//!
//! One sequential pass: resolve the base descriptor, collect fragment
//! archives, fold fragments and blobs in, back-fill versions, emit. Any
//! failure aborts the pass before the output descriptor is written. The
//! workspace and output directories are owned exclusively by one invocation;
//! concurrent invocations targeting the same output path are not supported.

use std::path::PathBuf;
use tracing::info;

use crate::blobs::merge_blobs;
use crate::collect::collect_fragments;
use crate::descriptor::BLOB_DIR;
use crate::emit::{Outputs, emit};
use crate::merge::merge_fragments;
use crate::patch::patch_versions;
use crate::resolve::{BaseOptions, resolve_base};
use crate::Result;

/// Everything one merge invocation needs, passed explicitly
///
/// No ambient working-directory state: all paths are carried here.
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    /// Scratch directory for staged descriptors and fragments
    pub workspace: PathBuf,
    /// Directory where producers dropped fragment archives
    pub search_dir: PathBuf,
    /// Directory receiving the final descriptor and blob store
    pub out_dir: PathBuf,
    /// Base descriptor source
    pub base: BaseOptions,
    /// Context token disambiguating archives from parallel pipelines
    pub context: Option<String>,
    /// Re-hash sha256 blobs against their file names before storing
    pub verify_blobs: bool,
}

/// Run the full merge pass and return the published outputs
pub fn run(request: &MergeRequest) -> Result<Outputs> {
    let mut descriptor = resolve_base(&request.workspace, &request.base)?;

    let collected = collect_fragments(
        &request.search_dir,
        &request.workspace,
        request.context.as_deref(),
    )?;

    let stats = merge_fragments(&mut descriptor, &collected.documents)?;
    merge_blobs(
        &collected.staging_dirs,
        &request.out_dir.join(BLOB_DIR),
        request.verify_blobs,
    )?;

    let patched = patch_versions(&mut descriptor.component);
    info!(
        "Merged {} fragment(s): +{} resource(s), +{} source(s), {} version(s) patched",
        stats.fragments, stats.resources_added, stats.sources_added, patched
    );

    emit(&descriptor, &request.out_dir)
}
