//! Version back-filling
//!
//! Artefacts built by this component (`relation: local`) inherit the
//! component version when their producer left the version out. Everything
//! else is left alone.

use tracing::debug;

use crate::descriptor::{Component, Relation};

/// Back-fill missing versions on local artefacts
///
/// Writes `component.version` onto every artefact in sources and resources
/// that currently lacks a version and has `relation == local`. Artefacts that
/// already carry a version or are external are never touched. Idempotent.
/// Returns the number of artefacts patched.
pub fn patch_versions(component: &mut Component) -> usize {
    if component.version.is_empty() {
        return 0;
    }

    let version = component.version.clone();
    let mut patched = 0;

    for artefact in component.artefacts_mut() {
        if artefact.version.is_none() && artefact.relation == Relation::Local {
            debug!("Patching version {} onto artefact {}", version, artefact.name);
            artefact.version = Some(version.clone());
            patched += 1;
        }
    }

    patched
}
