//! Fragment merging
//!
//! Folds staged fragment documents into the base descriptor. Merging is
//! append-only and order-preserving: base entries first, then fragment
//! entries in document order. Artefacts with identical identity are kept as
//! distinct entries; there is deliberately no de-duplication.

use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::descriptor::{ComponentDescriptor, Fragment};
use crate::{CoreError, Result};

/// Counts gathered while absorbing fragments, for logging and post-checks
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FragmentStats {
    pub fragments: usize,
    pub resources_added: usize,
    pub sources_added: usize,
}

/// Absorb fragment documents into the descriptor, consuming each document
///
/// Documents are processed in the order given (the collector sorts them
/// lexicographically). A parse failure aborts the whole merge; the offending
/// file is named in the error and no further document is touched.
pub fn merge_fragments(
    descriptor: &mut ComponentDescriptor,
    documents: &[PathBuf],
) -> Result<FragmentStats> {
    let mut stats = FragmentStats::default();

    for doc_path in documents {
        let text = fs::read_to_string(doc_path)?;
        let fragment: Fragment =
            serde_yaml::from_str(&text).map_err(|source| CoreError::FragmentParse {
                file: doc_path.clone(),
                source,
            })?;

        if let Some(resources) = fragment.resources {
            stats.resources_added += resources.len();
            descriptor.component.resources.extend(resources);
        }
        if let Some(sources) = fragment.sources {
            stats.sources_added += sources.len();
            descriptor.component.sources.extend(sources);
        }

        fs::remove_file(doc_path)?;
        stats.fragments += 1;
        debug!("Absorbed fragment {}", doc_path.display());
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Relation;
    use tempfile::TempDir;

    fn base() -> ComponentDescriptor {
        ComponentDescriptor::skeleton("foo", "1.0.0")
    }

    fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_appends_resources_and_sources() {
        let temp = TempDir::new().unwrap();
        let doc = write_doc(
            &temp,
            "a.yaml",
            "resources:\n- name: img\n  type: ociImage\n  relation: local\nsources:\n- name: repo\n  type: git\n  relation: local\n",
        );

        let mut desc = base();
        let stats = merge_fragments(&mut desc, &[doc.clone()]).unwrap();

        assert_eq!(stats, FragmentStats { fragments: 1, resources_added: 1, sources_added: 1 });
        assert_eq!(desc.component.resources[0].name, "img");
        assert_eq!(desc.component.resources[0].relation, Relation::Local);
        assert_eq!(desc.component.sources[0].name, "repo");
        assert!(!doc.exists());
    }

    #[test]
    fn test_order_preserving_append_only() {
        let temp = TempDir::new().unwrap();
        let doc1 = write_doc(
            &temp,
            "f1.yaml",
            "resources:\n- name: one\n  type: ociImage\n  relation: local\n",
        );
        let doc2 = write_doc(
            &temp,
            "f2.yaml",
            "resources:\n- name: two\n  type: ociImage\n  relation: local\n",
        );

        let mut desc = base();
        desc.component
            .resources
            .push(crate::Artefact::new("zero", "ociImage", Relation::External));

        merge_fragments(&mut desc, &[doc1, doc2]).unwrap();

        let names: Vec<&str> = desc
            .component
            .resources
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["zero", "one", "two"]);
    }

    #[test]
    fn test_no_deduplication() {
        let temp = TempDir::new().unwrap();
        let doc1 = write_doc(
            &temp,
            "f1.yaml",
            "resources:\n- name: img\n  type: ociImage\n  relation: local\n",
        );
        let doc2 = write_doc(
            &temp,
            "f2.yaml",
            "resources:\n- name: img\n  type: ociImage\n  relation: local\n",
        );

        let mut desc = base();
        merge_fragments(&mut desc, &[doc1, doc2]).unwrap();
        assert_eq!(desc.component.resources.len(), 2);
    }

    #[test]
    fn test_malformed_fragment_names_file() {
        let temp = TempDir::new().unwrap();
        let doc = write_doc(&temp, "bad.yaml", "resources:\n- name: [broken\n");

        let mut desc = base();
        let err = merge_fragments(&mut desc, &[doc.clone()]).unwrap_err();
        match err {
            CoreError::FragmentParse { file, .. } => assert_eq!(file, doc),
            other => panic!("unexpected error: {other}"),
        }
        // Nothing was absorbed and the document is left in place
        assert!(desc.component.resources.is_empty());
        assert!(doc.exists());
    }

    #[test]
    fn test_empty_fragment_round_trip() {
        let mut merged = base();
        merge_fragments(&mut merged, &[]).unwrap();
        assert_eq!(merged.to_yaml().unwrap(), base().to_yaml().unwrap());
    }
}
