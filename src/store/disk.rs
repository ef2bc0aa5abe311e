use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ObjectStore, StoreError, StoredObject, Visibility};

/// Blob store rooted at a directory; keys are slash-separated relative
/// paths. Writes go through a temp file and rename so a concurrent reader
/// never sees a partial object.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn io(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io { key: key.to_string(), source }
    }
}

impl ObjectStore for DiskStore {
    fn get(&self, key: &str) -> Result<StoredObject, StoreError> {
        match fs::read(self.full(key)) {
            Ok(bytes) => Ok(StoredObject::new(key, bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(err) => Err(Self::io(key, err)),
        }
    }

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
        _visibility: Visibility,
    ) -> Result<(), StoreError> {
        let path = self.full(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| Self::io(key, err))?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".partial");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, bytes).map_err(|err| Self::io(key, err))?;
        fs::rename(&tmp, &path).map_err(|err| Self::io(key, err))?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        // Walk from the deepest existing directory implied by the prefix.
        let dir = match prefix.rfind('/') {
            Some(pos) => self.root.join(&prefix[..pos]),
            None => self.root.clone(),
        };
        if dir.is_dir() {
            collect_keys(&self.root, &dir, prefix, &mut keys)
                .map_err(|err| Self::io(prefix, err))?;
        }
        keys.sort();
        Ok(keys)
    }
}

fn collect_keys(
    root: &Path,
    dir: &Path,
    prefix: &str,
    keys: &mut Vec<String>,
) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_keys(root, &path, prefix, keys)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());

        store
            .put("uploads/x/districts/0.json", b"{}", "text/json", Visibility::Private)
            .unwrap();
        let object = store.get("uploads/x/districts/0.json").unwrap();
        assert_eq!(object.into_bytes().unwrap(), b"{}");

        assert!(matches!(
            store.get("uploads/x/districts/1.json"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn lists_nested_keys_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());

        store.put("uploads/x/districts/0.json", b"{}", "text/json", Visibility::Private).unwrap();
        store.put("uploads/x/districts/1.json", b"{}", "text/json", Visibility::Private).unwrap();
        store.put("uploads/x/index.json", b"{}", "text/json", Visibility::Public).unwrap();

        let keys = store.list("uploads/x/districts/").unwrap();
        assert_eq!(
            keys,
            vec!["uploads/x/districts/0.json", "uploads/x/districts/1.json"]
        );
    }
}
