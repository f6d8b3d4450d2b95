//! File-backed template store.
//!
//! Templates are named groups of serialized items keyed by
//! `(category, item_id)`, stored one JSON file per template. Loading is
//! tolerant: a missing or malformed file is ignored, not an error.

use crate::codec::{self, SerializedRecord};
use crate::items::Item;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Template store errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no serializable items in template")]
    Empty,
}

pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMeta {
    pub category: String,
    pub item_id: String,
}

/// On-disk template payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateFile {
    pub meta: TemplateMeta,
    pub items: Vec<SerializedRecord>,
}

/// Stores templates as `{category}__{item_id}.json` under a root directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Per-user default template directory.
    pub fn default_location() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("croquis").join("templates"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, category: &str, item_id: &str) -> PathBuf {
        self.root.join(format!("{category}__{item_id}.json"))
    }

    /// Encode a group of items and write it out. Items that do not encode
    /// are skipped; a template with nothing left is refused.
    pub fn export(
        &self,
        category: &str,
        item_id: &str,
        items: &[Item],
    ) -> TemplateResult<PathBuf> {
        let records: Vec<SerializedRecord> = items.iter().filter_map(codec::encode).collect();
        if records.is_empty() {
            return Err(TemplateError::Empty);
        }
        fs::create_dir_all(&self.root)?;
        let payload = TemplateFile {
            meta: TemplateMeta {
                category: category.to_string(),
                item_id: item_id.to_string(),
            },
            items: records,
        };
        let path = self.file_path(category, item_id);
        fs::write(&path, serde_json::to_string_pretty(&payload)?)?;
        Ok(path)
    }

    /// Load and decode a template. Missing or malformed templates yield
    /// `None`; records are decoded in ascending z order, skipping any that
    /// do not decode.
    pub fn load(&self, category: &str, item_id: &str) -> Option<Vec<Item>> {
        let path = self.file_path(category, item_id);
        let text = fs::read_to_string(&path).ok()?;
        let mut file: TemplateFile = match serde_json::from_str(&text) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("ignoring malformed template {}: {err}", path.display());
                return None;
            }
        };
        file.items
            .sort_by(|a, b| a.z.partial_cmp(&b.z).unwrap_or(Ordering::Equal));
        Some(file.items.iter().filter_map(codec::decode).collect())
    }

    /// Enumerate stored template keys from the filename scheme.
    pub fn list(&self) -> Vec<TemplateMeta> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut keys: Vec<TemplateMeta> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?;
                let (category, item_id) = stem.split_once("__")?;
                Some(TemplateMeta {
                    category: category.to_string(),
                    item_id: item_id.to_string(),
                })
            })
            .collect();
        keys.sort_by(|a, b| (&a.category, &a.item_id).cmp(&(&b.category, &b.item_id)));
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ItemShape, Rectangle};
    use kurbo::Point;

    fn rect_item(z: f64) -> Item {
        let mut item = Item::new(ItemShape::Rect(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        item.z = z;
        item
    }

    #[test]
    fn test_export_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        let path = store
            .export("Porte", "door_test", &[rect_item(0.0), rect_item(1.0)])
            .unwrap();
        assert!(path.exists());

        let items = store.load("Porte", "door_test").unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_load_sorts_by_z() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        store
            .export("Roue", "stacked", &[rect_item(5.0), rect_item(-1.0), rect_item(2.0)])
            .unwrap();

        let items = store.load("Roue", "stacked").unwrap();
        let zs: Vec<f64> = items.iter().map(|i| i.z).collect();
        assert_eq!(zs, vec![-1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_missing_and_malformed_templates_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        assert!(store.load("Porte", "missing").is_none());

        fs::write(dir.path().join("Porte__broken.json"), "{not json").unwrap();
        assert!(store.load("Porte", "broken").is_none());
    }

    #[test]
    fn test_export_refuses_empty_group() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        assert!(matches!(
            store.export("Porte", "empty", &[]),
            Err(TemplateError::Empty)
        ));
    }

    #[test]
    fn test_list_reads_filename_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        store.export("Porte", "a", &[rect_item(0.0)]).unwrap();
        store.export("Roue", "b", &[rect_item(0.0)]).unwrap();

        let keys = store.list();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].category, "Porte");
        assert_eq!(keys[1].item_id, "b");
    }
}
