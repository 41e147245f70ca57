use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

use crate::character::Player;
use crate::error::StoreError;

/// Where player records live between battles.
///
/// Callers save after every state-changing action and load when a session starts; the engine
/// itself never touches a store.
pub trait PlayerStore {
    fn save(&mut self, player: &Player) -> Result<(), StoreError>;
    fn load(&self, id: &str) -> Result<Player, StoreError>;
    fn list(&self) -> Result<Vec<String>, StoreError>;
}

fn check_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid { Ok(()) } else { Err(StoreError::InvalidId(id.to_string())) }
}

/// One pretty-printed JSON file per player, named `<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Creates `root` if it does not exist yet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io { path: root.clone(), source })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        check_id(id)?;
        Ok(self.root.join(format!("{}.json", id)))
    }
}

impl PlayerStore for JsonFileStore {
    fn save(&mut self, player: &Player) -> Result<(), StoreError> {
        let path = self.path_for(&player.id)?;
        let text = serde_json::to_string_pretty(player)?;
        fs::write(&path, text).map_err(|source| StoreError::Io { path: path.clone(), source })?;
        debug!(id = %player.id, path = %path.display(), "player saved");
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Player, StoreError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let text =
            fs::read_to_string(&path).map_err(|source| StoreError::Io { path: path.clone(), source })?;
        Ok(serde_json::from_str(&text)?)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let dir = fs::read_dir(&self.root)
            .map_err(|source| StoreError::Io { path: self.root.clone(), source })?;
        let mut ids = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|source| StoreError::Io { path: self.root.clone(), source })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Keeps serialized records in memory, so a load goes through the same bytes a file would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: IndexMap<String, String>,
}

impl MemoryStore {
    pub fn raw(&self, id: &str) -> Option<&str> {
        self.records.get(id).map(String::as_str)
    }
}

impl PlayerStore for MemoryStore {
    fn save(&mut self, player: &Player) -> Result<(), StoreError> {
        check_id(&player.id)?;
        self.records.insert(player.id.clone(), serde_json::to_string(player)?);
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Player, StoreError> {
        let text = self.records.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(text)?)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.keys().cloned().collect())
    }
}
