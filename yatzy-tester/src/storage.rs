use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use yatzy_game::GameStorage;

/// Stores each blob as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage and key that together address `path` (its extension is
    /// replaced by `.json`).
    pub fn for_file(path: &Path) -> (Self, String) {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let key = path
            .file_stem()
            .map_or_else(|| "state".to_string(), |stem| stem.to_string_lossy().into_owned());
        (Self::new(dir), key)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl GameStorage for FileStorage {
    type Error = io::Error;

    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), blob)
    }

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete(&self, key: &str) -> Result<(), Self::Error> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::scratch_dir;

    #[test]
    fn save_load_delete_roundtrip() {
        let storage = FileStorage::new(scratch_dir("storage", 1));
        assert!(storage.load("yatzy-state").unwrap().is_none());
        storage.save("yatzy-state", "{\"players\":[]}").unwrap();
        assert!(storage.path_for("yatzy-state").exists());
        assert_eq!(
            storage.load("yatzy-state").unwrap().as_deref(),
            Some("{\"players\":[]}")
        );
        storage.delete("yatzy-state").unwrap();
        storage.delete("yatzy-state").unwrap();
        assert!(storage.load("yatzy-state").unwrap().is_none());
        let _ = fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn for_file_splits_directory_and_stem() {
        let (storage, key) = FileStorage::for_file(Path::new("out/final.json"));
        assert_eq!(storage.dir(), Path::new("out"));
        assert_eq!(key, "final");
        let (storage, key) = FileStorage::for_file(Path::new("state.txt"));
        assert_eq!(storage.dir(), Path::new("."));
        assert_eq!(key, "state");
    }
}
