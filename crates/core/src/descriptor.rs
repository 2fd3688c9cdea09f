//! Component descriptor types
//!
//! The descriptor is the authoritative document naming a component's identity
//! and its sources/resources. Fragments are partial contributions produced by
//! independent build jobs; they only ever carry artefact lists.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::Result;

/// Canonical file name of a component descriptor, inside archives and on disk.
pub const DESCRIPTOR_FILENAME: &str = "component-descriptor.yaml";

/// File suffix of fragment archives produced by build jobs.
pub const FRAGMENT_SUFFIX: &str = ".ocm-artefacts";

/// Directory under the output path holding content-addressed blobs.
pub const BLOB_DIR: &str = "blobs.d";

/// Classifies an artefact as built by this component or consumed from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Local,
    External,
}

/// A key/value label attached to a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: serde_yaml::Value,
}

/// One entry in a descriptor's sources or resources list
///
/// Producers may attach extra metadata (access specs, labels, digests);
/// anything beyond the required fields rides in `extra` and is preserved
/// opaquely through merge and emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artefact {
    pub name: String,
    #[serde(rename = "type")]
    pub artefact_type: String,
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten, skip_serializing_if = "Mapping::is_empty")]
    pub extra: Mapping,
}

impl Artefact {
    pub fn new(name: &str, artefact_type: &str, relation: Relation) -> Self {
        Self {
            name: name.to_string(),
            artefact_type: artefact_type.to_string(),
            relation,
            version: None,
            extra: Mapping::new(),
        }
    }
}

/// The component section of a descriptor
///
/// `name` and `version` are set exactly once by the base descriptor and are
/// never overwritten by a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub sources: Vec<Artefact>,
    #[serde(default)]
    pub resources: Vec<Artefact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
    #[serde(flatten, skip_serializing_if = "Mapping::is_empty")]
    pub extra: Mapping,
}

impl Component {
    /// Iterate over all artefacts (sources then resources), mutably
    pub fn artefacts_mut(&mut self) -> impl Iterator<Item = &mut Artefact> {
        self.sources.iter_mut().chain(self.resources.iter_mut())
    }
}

/// The full descriptor document, `{ component: {...} }`
///
/// Unknown top-level keys (schema headers and the like) are preserved
/// opaquely so producers can evolve the format without losing data here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub component: Component,
    #[serde(flatten, skip_serializing_if = "Mapping::is_empty")]
    pub extra: Mapping,
}

impl ComponentDescriptor {
    /// Build a minimal skeleton descriptor with empty artefact lists
    pub fn skeleton(name: &str, version: &str) -> Self {
        Self {
            component: Component {
                name: name.to_string(),
                version: version.to_string(),
                sources: Vec::new(),
                resources: Vec::new(),
                labels: None,
                extra: Mapping::new(),
            },
            extra: Mapping::new(),
        }
    }

    /// Parse a descriptor from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Serialize the descriptor to canonical YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// A partial contribution to a descriptor's artefact lists
///
/// Consumed exactly once during a merge pass, then discarded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fragment {
    pub resources: Option<Vec<Artefact>>,
    pub sources: Option<Vec<Artefact>>,
}
