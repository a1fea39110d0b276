//! Photo metadata list
//!
//! An ordered JSON array of records, index-aligned with the embeddings file.
//! Only the image locator is read; any other fields are ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Image URL or path
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoCatalog {
    records: Vec<PhotoRecord>,
}

impl PhotoCatalog {
    pub fn new(records: Vec<PhotoRecord>) -> Self {
        Self { records }
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_json_slice(&bytes)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhotoRecord> {
        self.records.get(index)
    }

    /// Fail unless the first `items` records exist.
    pub fn ensure_covers(&self, items: usize) -> Result<()> {
        if self.records.len() < items {
            return Err(LayoutError::Catalog(format!(
                "{} photo records for {} laid out items",
                self.records.len(),
                items
            )));
        }
        Ok(())
    }

    /// Locator for a square thumbnail of at most `size` pixels.
    pub fn thumbnail_url(&self, index: usize, size: u32) -> Option<String> {
        self.get(index)
            .map(|r| format!("{}?w={}&h={}&fit=max&q=90", r.url, size, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTOS: &str = r#"[
        { "url": "https://images.example.com/a", "id": "a", "likes": 3 },
        { "url": "https://images.example.com/b" }
    ]"#;

    #[test]
    fn parses_and_ignores_extra_fields() {
        let catalog = PhotoCatalog::from_json_slice(PHOTOS.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().url, "https://images.example.com/a");
    }

    #[test]
    fn thumbnail_query() {
        let catalog = PhotoCatalog::from_json_slice(PHOTOS.as_bytes()).unwrap();
        assert_eq!(
            catalog.thumbnail_url(0, 50).unwrap(),
            "https://images.example.com/a?w=50&h=50&fit=max&q=90"
        );
        assert_eq!(
            catalog.thumbnail_url(1, 100).unwrap(),
            "https://images.example.com/b?w=100&h=100&fit=max&q=90"
        );
        assert!(catalog.thumbnail_url(2, 50).is_none());
    }

    #[test]
    fn coverage_check() {
        let catalog = PhotoCatalog::from_json_slice(PHOTOS.as_bytes()).unwrap();
        assert!(catalog.ensure_covers(2).is_ok());
        assert!(matches!(
            catalog.ensure_covers(3),
            Err(LayoutError::Catalog(_))
        ));
    }

    #[test]
    fn missing_url_is_json_error() {
        let result = PhotoCatalog::from_json_slice(br#"[{ "id": "x" }]"#);
        assert!(matches!(result, Err(LayoutError::Json(_))));
    }
}
