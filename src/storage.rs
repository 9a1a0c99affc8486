use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::entities::error::BwError;
use crate::environment;

pub const AI_SETTINGS_SLOT: &str = "ai-settings";
pub const PRODUCTS_SLOT: &str = "products";

/// Two named JSON slots on disk. Each save is a full overwrite of its slot,
/// last write wins. A slot that is absent or fails to parse yields the
/// caller's defaults; the corrupt file is left in place untouched.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Store {
        Store { dir: dir.into() }
    }

    pub fn from_env() -> Store {
        Store::new(environment::get_store_dir())
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slot))
    }

    pub fn read_slot<T: DeserializeOwned>(&self, slot: &str) -> Option<T> {
        let data = fs::read_to_string(self.slot_path(slot)).ok()?;
        match serde_json::from_str(&data) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(slot, error = %err, "stored slot failed to parse, using defaults");
                None
            }
        }
    }

    pub fn write_slot<T: Serialize>(&self, slot: &str, value: &T) -> Result<(), BwError> {
        fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_string_pretty(value)?;
        fs::write(self.slot_path(slot), data)?;
        Ok(())
    }
}
