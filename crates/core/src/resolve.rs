//! Base descriptor resolution
//!
//! Establishes the descriptor that fragments are merged into. Precedence,
//! first match wins: inline text, base archive, generated skeleton.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info};

use crate::descriptor::{ComponentDescriptor, DESCRIPTOR_FILENAME};
use crate::{CoreError, Result};

/// Where the base descriptor comes from
#[derive(Debug, Clone, Default)]
pub struct BaseOptions {
    /// Inline descriptor YAML text, takes precedence over everything else
    pub inline: Option<String>,
    /// Gzipped tar containing a `component-descriptor.yaml`
    pub archive: Option<PathBuf>,
    /// Component name for the generated skeleton fallback
    pub component_name: Option<String>,
    /// Component version for the generated skeleton fallback
    pub component_version: Option<String>,
}

/// Resolve the base descriptor and stage it into the workspace
///
/// Writes the resolved document to `<workspace>/component-descriptor.yaml`
/// for downstream mutation and returns the parsed descriptor.
pub fn resolve_base(workspace: &Path, opts: &BaseOptions) -> Result<ComponentDescriptor> {
    let descriptor = if let Some(text) = &opts.inline {
        debug!("Using inline base descriptor");
        ComponentDescriptor::from_yaml(text)?
    } else if let Some(archive) = &opts.archive {
        info!("Reading base descriptor from {}", archive.display());
        let text = read_descriptor_from_archive(archive)?;
        ComponentDescriptor::from_yaml(&text)?
    } else if let (Some(name), Some(version)) = (&opts.component_name, &opts.component_version) {
        info!("Generating minimal descriptor for {}:{}", name, version);
        ComponentDescriptor::skeleton(name, version)
    } else {
        return Err(CoreError::Configuration(
            "no base descriptor given and no component name/version to generate one".to_string(),
        ));
    };

    fs::create_dir_all(workspace)?;
    fs::write(workspace.join(DESCRIPTOR_FILENAME), descriptor.to_yaml()?)?;

    Ok(descriptor)
}

/// Extract the canonical descriptor document from a gzipped tar archive
fn read_descriptor_from_archive(archive_path: &Path) -> Result<String> {
    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        let is_descriptor = path
            .file_name()
            .is_some_and(|name| name == DESCRIPTOR_FILENAME);

        if is_descriptor {
            let mut text = String::new();
            entry.read_to_string(&mut text)?;
            return Ok(text);
        }
    }

    Err(CoreError::ArchiveFormat {
        archive: archive_path.to_path_buf(),
        expected: DESCRIPTOR_FILENAME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    const BASE_YAML: &str = "component:\n  name: foo\n  version: 1.0.0\n";

    fn write_archive(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_inline_takes_precedence() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("base.tar.gz");
        write_archive(
            &archive,
            &[(DESCRIPTOR_FILENAME, "component:\n  name: other\n  version: 2.0.0\n")],
        );

        let opts = BaseOptions {
            inline: Some(BASE_YAML.to_string()),
            archive: Some(archive),
            ..Default::default()
        };
        let desc = resolve_base(&temp.path().join("ws"), &opts).unwrap();
        assert_eq!(desc.component.name, "foo");
    }

    #[test]
    fn test_resolve_from_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("base.tar.gz");
        write_archive(&archive, &[("other.txt", "x"), (DESCRIPTOR_FILENAME, BASE_YAML)]);

        let opts = BaseOptions {
            archive: Some(archive),
            ..Default::default()
        };
        let workspace = temp.path().join("ws");
        let desc = resolve_base(&workspace, &opts).unwrap();
        assert_eq!(desc.component.version, "1.0.0");
        assert!(workspace.join(DESCRIPTOR_FILENAME).exists());
    }

    #[test]
    fn test_archive_missing_descriptor() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("base.tar.gz");
        write_archive(&archive, &[("unrelated.yaml", "a: 1\n")]);

        let opts = BaseOptions {
            archive: Some(archive),
            ..Default::default()
        };
        let workspace = temp.path().join("ws");
        let err = resolve_base(&workspace, &opts).unwrap_err();
        assert!(matches!(err, CoreError::ArchiveFormat { .. }));
        assert!(!workspace.join(DESCRIPTOR_FILENAME).exists());
    }

    #[test]
    fn test_skeleton_fallback() {
        let temp = TempDir::new().unwrap();
        let opts = BaseOptions {
            component_name: Some("foo".to_string()),
            component_version: Some("1.0.0".to_string()),
            ..Default::default()
        };
        let desc = resolve_base(temp.path(), &opts).unwrap();
        assert_eq!(desc.component.name, "foo");
        assert!(desc.component.resources.is_empty());
    }

    #[test]
    fn test_nothing_to_resolve() {
        let temp = TempDir::new().unwrap();
        let err = resolve_base(temp.path(), &BaseOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }
}
