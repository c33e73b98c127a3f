use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use vpets_game::snapshot::{decode, encode};
use vpets_game::{Catalog, CatalogError, CatalogLoader, SessionSnapshot, SessionStorage, SnapshotError};

const SPECIES_FILE: &str = "species.json";
const FOODS_FILE: &str = "foods.json";
const TOYS_FILE: &str = "toys.json";
const SAVE_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid save slot name {0:?}")]
    InvalidSlot(String),
    #[error("snapshot in {} is unusable: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },
    #[error("catalog in {} is invalid: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads catalogs from disk, falling back to the bundled data when no
/// directory is configured.
#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    directory: Option<PathBuf>,
    custom: Option<PathBuf>,
}

impl AssetLoader {
    #[must_use]
    pub const fn new(directory: Option<PathBuf>, custom: Option<PathBuf>) -> Self {
        Self { directory, custom }
    }

    /// Missing files in a directory count as empty definition lists.
    fn read_dir(dir: &Path) -> Result<Catalog, StorageError> {
        let read = |file: &str| -> Result<String, StorageError> {
            let path = dir.join(file);
            match fs::read_to_string(&path) {
                Ok(text) => Ok(text),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    log::debug!("{} not found, treating as empty", path.display());
                    Ok(String::from("[]"))
                }
                Err(err) => Err(io_error(&path)(err)),
            }
        };
        let species = read(SPECIES_FILE)?;
        let foods = read(FOODS_FILE)?;
        let toys = read(TOYS_FILE)?;
        Catalog::from_json_parts(&species, &foods, &toys).map_err(|source| StorageError::Catalog {
            path: dir.to_path_buf(),
            source,
        })
    }
}

impl CatalogLoader for AssetLoader {
    type Error = StorageError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        match &self.directory {
            Some(dir) => {
                log::info!("loading catalog from {}", dir.display());
                Self::read_dir(dir)
            }
            None => Ok(Catalog::load_from_static()),
        }
    }

    fn load_custom_assets(&self) -> Result<Option<Catalog>, Self::Error> {
        self.custom.as_deref().map(Self::read_dir).transpose()
    }
}

/// One snapshot file per slot under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.root.join(slot).with_extension(SAVE_EXTENSION))
    }
}

impl SessionStorage for FileStorage {
    type Error = StorageError;

    fn save_session(&self, slot: &str, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.root).map_err(io_error(&self.root))?;
        let text = encode(snapshot).map_err(|source| StorageError::Snapshot {
            path: path.clone(),
            source,
        })?;
        // write then rename so a crash never leaves half a save behind
        let staging = path.with_extension("tmp");
        fs::write(&staging, text).map_err(io_error(&staging))?;
        fs::rename(&staging, &path).map_err(io_error(&path))?;
        log::debug!("saved slot {slot} to {}", path.display());
        Ok(())
    }

    fn load_session(&self, slot: &str) -> Result<Option<SessionSnapshot>, Self::Error> {
        let path = self.slot_path(slot)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&path)(err)),
        };
        decode(&text)
            .map(Some)
            .map_err(|source| StorageError::Snapshot { path, source })
    }

    fn delete_session(&self, slot: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path)(err)),
        }
    }
}
