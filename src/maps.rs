use crate::form::FormFields;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

/// Location of the maps directory, relative to the store root.
pub const MAPS_DIR: [&str; 2] = ["data", "maps"];

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Please specify map name")]
    MissingName,
    #[error("Missing map data")]
    MissingData,
    #[error("invalid map name {0:?}")]
    InvalidName(String),
    #[error("map {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("storage failure on {}", .path.display())]
    StorageFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MapError {
    fn storage(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            // A missing maps directory is a storage problem, a missing map is not.
            if path.parent().map_or(false, Path::is_dir) {
                return Self::NotFound(path.to_path_buf());
            }
        }
        Self::StorageFailure {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A client supplied map name that is safe to use as a single file name
/// inside the maps directory.
#[repr(transparent)]
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct MapName(String);

impl Display for MapName {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl MapName {
    pub fn try_new(s: impl Into<String>) -> Result<Self, MapError> {
        let s = s.into();
        if !is_plain_file_name(&s) {
            return Err(MapError::InvalidName(s));
        }
        Ok(Self(s))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// True when `s` names a single entry of a directory: no separators, no
/// `.`/`..`, no NUL.
pub fn is_plain_file_name(s: &str) -> bool {
    !(s.is_empty()
        || s == "."
        || s == ".."
        || s.contains(|c| c == '/' || c == '\\' || c == '\0'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub name: String,
    pub data: String,
}

impl SaveRequest {
    /// Takes the first `name` and `data` values of a submission. The name is
    /// checked before the data.
    pub fn from_form(form: &FormFields) -> Result<Self, MapError> {
        let name = form.first("name").ok_or(MapError::MissingName)?;
        let data = form.first("data").ok_or(MapError::MissingData)?;
        Ok(Self {
            name: name.to_owned(),
            data: data.to_owned(),
        })
    }
}

/// Maps stored as plain files under `<root>/data/maps/`.
#[derive(Debug, Clone)]
pub struct MapStore {
    root: PathBuf,
    dir: PathBuf,
}

impl MapStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dir = MAPS_DIR.iter().fold(root.clone(), |dir, part| dir.join(part));
        Self { root, dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &MapName) -> PathBuf {
        self.dir.join(name.as_str())
    }

    /// Replaces the content of the named map with `data`, creating the file
    /// if needed. The maps directory itself must already exist.
    pub fn save(&self, request: &SaveRequest) -> Result<PathBuf, MapError> {
        let name = MapName::try_new(request.name.as_str())?;
        let path = self.path_of(&name);
        std::fs::write(&path, request.data.as_bytes())
            .map_err(|e| MapError::storage(&path, e))?;
        log::debug!("saved {} bytes to {}", request.data.len(), path.display());
        Ok(path)
    }

    pub fn load(&self, name: &MapName) -> Result<Vec<u8>, MapError> {
        let path = self.path_of(name);
        std::fs::read(&path).map_err(|e| MapError::storage(&path, e))
    }

    /// Sorted names of the visible entries of `relative`, a directory below
    /// the store root. Dot-entries are skipped, and a path that is missing or
    /// is not a directory lists as empty.
    pub fn list(&self, relative: &Path) -> Result<Vec<String>, MapError> {
        let dir = self.root.join(relative);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) if !dir.is_dir() => return Ok(vec![]),
            Err(e) => {
                return Err(MapError::StorageFailure {
                    path: dir,
                    source: e,
                })
            }
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MapError::StorageFailure {
                path: dir.clone(),
                source: e,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
