use crate::error::{LevelupError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` in one step: the bytes go to a sibling tempfile which is
/// then renamed over the target, so readers never observe a half-written
/// store file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    Ok(std::fs::create_dir_all(path)?)
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}

/// Like [`read_yaml`], but a missing file means the store was never set up.
pub fn read_store_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(LevelupError::NotInitialized);
    }
    read_yaml(path)
}

/// Like [`read_yaml`], but a missing file yields `T::default()`.
pub fn read_yaml_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    read_yaml(path)
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    atomic_write(path, serde_yaml::to_string(value)?.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("player.yaml");
        atomic_write(&path, b"xp: 1\n").unwrap();
        atomic_write(&path, b"xp: 2\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "xp: 2\n");
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".levelup/quests/abc.yaml");
        atomic_write(&path, b"data").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_store_file_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let err = read_store_yaml::<BTreeMap<String, u32>>(&dir.path().join("nope.yaml"))
            .unwrap_err();
        assert!(matches!(err, LevelupError::NotInitialized));
    }

    #[test]
    fn missing_optional_file_is_default() {
        let dir = TempDir::new().unwrap();
        let m: BTreeMap<String, u32> = read_yaml_or_default(&dir.path().join("nope.yaml")).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn yaml_helpers_roundtrip_a_map() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("skills.yaml");
        let mut m = BTreeMap::new();
        m.insert("development".to_string(), 150u32);
        write_yaml(&path, &m).unwrap();
        let back: BTreeMap<String, u32> = read_yaml(&path).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "xp: [unclosed").unwrap();
        let err = read_yaml::<BTreeMap<String, u32>>(&path).unwrap_err();
        assert!(matches!(err, LevelupError::Yaml(_)));
    }
}
