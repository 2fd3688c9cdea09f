//! Final descriptor emission
//!
//! The only place the output descriptor file is written. Every upstream stage
//! must have succeeded before this runs, so a failed merge never leaves a
//! partial descriptor behind.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::descriptor::{ComponentDescriptor, DESCRIPTOR_FILENAME};
use crate::{CoreError, Result};

/// Published outputs of a completed merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    /// Full canonical descriptor text
    pub descriptor: String,
    pub name: String,
    pub version: String,
    /// Combined identifier `"name:version"`
    pub component_version: String,
}

/// Serialize the final descriptor to `<out_dir>/component-descriptor.yaml`
///
/// Consumers rely on `name` and `version` being set; an unset value here is a
/// post-condition violation and nothing is written.
pub fn emit(descriptor: &ComponentDescriptor, out_dir: &Path) -> Result<Outputs> {
    let component = &descriptor.component;

    if component.name.is_empty() {
        return Err(CoreError::PostCondition(
            "component name is unset at emission".to_string(),
        ));
    }
    if component.version.is_empty() {
        return Err(CoreError::PostCondition(
            "component version is unset at emission".to_string(),
        ));
    }

    let text = descriptor.to_yaml()?;

    fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(DESCRIPTOR_FILENAME);
    fs::write(&out_path, &text)?;
    info!("Wrote descriptor to {}", out_path.display());

    Ok(Outputs {
        descriptor: text,
        name: component.name.clone(),
        version: component.version.clone(),
        component_version: format!("{}:{}", component.name, component.version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_emit_writes_descriptor_and_outputs() {
        let temp = TempDir::new().unwrap();
        let desc = ComponentDescriptor::skeleton("foo", "1.0.0");

        let outputs = emit(&desc, temp.path()).unwrap();
        assert_eq!(outputs.name, "foo");
        assert_eq!(outputs.version, "1.0.0");
        assert_eq!(outputs.component_version, "foo:1.0.0");

        let written = fs::read_to_string(temp.path().join(DESCRIPTOR_FILENAME)).unwrap();
        assert_eq!(written, outputs.descriptor);
    }

    #[test]
    fn test_unset_name_is_post_condition_error() {
        let temp = TempDir::new().unwrap();
        let desc = ComponentDescriptor::skeleton("", "1.0.0");

        let err = emit(&desc, temp.path()).unwrap_err();
        assert!(matches!(err, CoreError::PostCondition(_)));
        assert!(!temp.path().join(DESCRIPTOR_FILENAME).exists());
    }

    #[test]
    fn test_unset_version_is_post_condition_error() {
        let temp = TempDir::new().unwrap();
        let desc = ComponentDescriptor::skeleton("foo", "");

        let err = emit(&desc, temp.path()).unwrap_err();
        assert!(matches!(err, CoreError::PostCondition(_)));
    }
}
