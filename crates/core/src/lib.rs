//! cdmerge-core: Component descriptor aggregation
//!
//! This crate folds independently-produced build fragments into one
//! authoritative component descriptor plus a merged content-addressed blob
//! store. See [`pipeline::run`] for the full pass.

mod blobs;
mod collect;
mod descriptor;
mod emit;
mod error;
mod hash;
mod merge;
mod patch;
mod pipeline;
mod resolve;

pub use blobs::merge_blobs;
pub use collect::{CollectedFragments, collect_fragments};
pub use descriptor::{
    Artefact, BLOB_DIR, Component, ComponentDescriptor, DESCRIPTOR_FILENAME, FRAGMENT_SUFFIX,
    Fragment, Label, Relation,
};
pub use emit::{Outputs, emit};
pub use error::CoreError;
pub use hash::{blob_digest, split_content_address};
pub use merge::{FragmentStats, merge_fragments};
pub use patch::patch_versions;
pub use pipeline::{MergeRequest, run};
pub use resolve::{BaseOptions, resolve_base};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
