//! # Cart Store
//!
//! Where a session keeps its cart between visits.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Saved Cart Location                               │
//! │                                                                         │
//! │  JsonFileStore (default)                                                │
//! │  • macOS:   ~/Library/Application Support/com.storefront.checkout/      │
//! │  • Windows: %APPDATA%\storefront\checkout\data\                         │
//! │  • Linux:   ~/.local/share/checkout/                                    │
//! │             └── cart.json   (array of CartLineSnapshot, pretty JSON)    │
//! │                                                                         │
//! │  MemoryStore                                                            │
//! │  • Same JSON, held in memory (tests, ephemeral sessions)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes go to a sibling temp file that is then renamed over `cart.json`,
//! so a crash mid-write leaves the previous cart intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use directories::ProjectDirs;
use storefront_core::snapshot::{self, CartLineSnapshot};
use tracing::debug;

use crate::error::StoreError;

/// File name of the saved cart.
pub const CART_FILE_NAME: &str = "cart.json";

/// Persistence collaborator for a [`CartSession`](crate::session::CartSession).
pub trait CartStore: Send + Sync {
    /// Loads the saved lines. `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<Vec<CartLineSnapshot>>, StoreError>;

    /// Replaces the saved lines.
    fn save(&self, lines: &[CartLineSnapshot]) -> Result<(), StoreError>;
}

// =============================================================================
// JSON File Store
// =============================================================================

/// Saves the cart as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. Nothing is touched until the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// Creates a store in the platform data directory.
    ///
    /// ## Errors
    /// `Io` if no home directory can be determined.
    pub fn at_default_location() -> Result<Self, StoreError> {
        Ok(JsonFileStore::new(default_cart_path()?))
    }

    /// Path of the saved cart.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| CART_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<CartLineSnapshot>>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No saved cart");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let lines = snapshot::from_json(&json)?;
        debug!(path = ?self.path, lines = lines.len(), "Loaded saved cart");
        Ok(Some(lines))
    }

    fn save(&self, lines: &[CartLineSnapshot]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let json = snapshot::to_json(lines)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        debug!(path = ?self.path, lines = lines.len(), "Saved cart");
        Ok(())
    }
}

/// Determines the saved cart path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.storefront.checkout/cart.json`
/// - **Windows**: `%APPDATA%\storefront\checkout\data\cart.json`
/// - **Linux**: `~/.local/share/checkout/cart.json`
pub fn default_cart_path() -> Result<PathBuf, StoreError> {
    let proj_dirs = ProjectDirs::from("com", "storefront", "checkout").ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine app data directory",
        )
    })?;

    Ok(proj_dirs.data_dir().join(CART_FILE_NAME))
}

// =============================================================================
// Memory Store
// =============================================================================

/// Keeps the saved cart JSON in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a saved cart.
    pub fn with_json(json: impl Into<String>) -> Self {
        MemoryStore {
            json: Mutex::new(Some(json.into())),
        }
    }

    /// The saved JSON, if any.
    pub fn json(&self) -> Option<String> {
        self.json
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CartStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<CartLineSnapshot>>, StoreError> {
        let json = self.json.lock().unwrap_or_else(PoisonError::into_inner);
        match json.as_deref() {
            Some(json) => Ok(Some(snapshot::from_json(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, lines: &[CartLineSnapshot]) -> Result<(), StoreError> {
        let encoded = snapshot::to_json(lines)?;
        *self.json.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{Cart, Currency, Money, ProductRef, ProductType};

    fn saved_lines() -> Vec<CartLineSnapshot> {
        let mut cart = Cart::new(Currency::Usd);
        let course = ProductRef::new(
            "course-1",
            "Guitar Foundations",
            ProductType::Course,
            Money::from_minor(9700, Currency::Usd),
        );
        cart.add_item(course, 2, None).unwrap();
        cart.to_snapshot()
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cart.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("cart.json"));

        store.save(&saved_lines()).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, saved_lines());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cart.json"));

        store.save(&saved_lines()).unwrap();
        store.save(&[]).unwrap();

        assert_eq!(store.load().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFileStore::new(path).load();
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_file_store_writes_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cart.json"));
        store.save(&saved_lines()).unwrap();

        let json = fs::read_to_string(store.path()).unwrap();
        assert!(json.contains("\"productId\": \"course-1\""));
        assert!(json.contains("\"quantity\": 2"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&saved_lines()).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), saved_lines());
        assert!(store.json().unwrap().contains("Guitar Foundations"));
    }

    #[test]
    fn test_memory_store_with_bad_json() {
        let store = MemoryStore::with_json("[1, 2]");
        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
    }
}
