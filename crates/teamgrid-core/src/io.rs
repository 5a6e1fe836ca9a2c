//! Local files under `.teamgrid/`: YAML documents replaced atomically.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Parse a YAML document, or return `T::default()` when the file is absent.
pub fn read_yaml_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match std::fs::read_to_string(path) {
        Ok(data) => Ok(serde_yaml::from_str(&data)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Serialize `value` and swap it into place. Readers never see a partial file.
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_yaml::to_string(value)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        #[serde(default)]
        port: u16,
    }

    #[test]
    fn missing_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let doc: Doc = read_yaml_or_default(&dir.path().join("none.yaml")).unwrap();
        assert_eq!(doc, Doc::default());
    }

    #[test]
    fn write_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".teamgrid/nested/doc.yaml");
        write_yaml(&path, &Doc { port: 1 }).unwrap();
        write_yaml(&path, &Doc { port: 2 }).unwrap();
        let doc: Doc = read_yaml_or_default(&path).unwrap();
        assert_eq!(doc.port, 2);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "port: [not a number").unwrap();
        assert!(read_yaml_or_default::<Doc>(&path).is_err());
    }
}
