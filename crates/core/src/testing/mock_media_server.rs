//! Mock media server for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::media_server::{LibraryItem, LibrarySection, MediaServer, MediaServerError};

/// A summary write performed through the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub item_id: String,
    pub summary: String,
}

/// Mock implementation of the MediaServer trait.
///
/// Summary writes are applied to the stored items, so a second run sees
/// the result of the first.
#[derive(Debug, Default)]
pub struct MockMediaServer {
    sections: Arc<RwLock<Vec<LibrarySection>>>,
    items: Arc<RwLock<Vec<LibraryItem>>>,
    updates: Arc<RwLock<Vec<RecordedUpdate>>>,
    /// Item IDs whose summary writes fail.
    failing_items: Arc<RwLock<HashSet<String>>>,
    /// Section keys whose listing fails.
    failing_sections: Arc<RwLock<HashSet<String>>>,
    sections_fail: Arc<RwLock<bool>>,
}

impl MockMediaServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_section(&self, section: LibrarySection) {
        self.sections.write().await.push(section);
    }

    pub async fn add_item(&self, item: LibraryItem) {
        self.items.write().await.push(item);
    }

    /// Current state of an item.
    pub async fn item(&self, id: &str) -> Option<LibraryItem> {
        self.items.read().await.iter().find(|i| i.id == id).cloned()
    }

    pub async fn recorded_updates(&self) -> Vec<RecordedUpdate> {
        self.updates.read().await.clone()
    }

    /// Make summary writes for `item_id` fail.
    pub async fn fail_updates_for(&self, item_id: &str) {
        self.failing_items.write().await.insert(item_id.to_string());
    }

    /// Make listing the items of `section_key` fail.
    pub async fn fail_items_for(&self, section_key: &str) {
        self.failing_sections
            .write()
            .await
            .insert(section_key.to_string());
    }

    /// Make listing sections fail.
    pub async fn fail_section_listing(&self) {
        *self.sections_fail.write().await = true;
    }
}

#[async_trait]
impl MediaServer for MockMediaServer {
    async fn sections(&self) -> Result<Vec<LibrarySection>, MediaServerError> {
        if *self.sections_fail.read().await {
            return Err(MediaServerError::Unauthorized("mock".to_string()));
        }
        Ok(self.sections.read().await.clone())
    }

    async fn items(&self, section: &LibrarySection) -> Result<Vec<LibraryItem>, MediaServerError> {
        if self.failing_sections.read().await.contains(&section.key) {
            return Err(MediaServerError::ApiError {
                status: 500,
                message: "mock".to_string(),
            });
        }
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|i| i.section_key == section.key)
            .cloned()
            .collect())
    }

    async fn update_summary(
        &self,
        item: &LibraryItem,
        summary: &str,
    ) -> Result<(), MediaServerError> {
        if self.failing_items.read().await.contains(&item.id) {
            return Err(MediaServerError::ApiError {
                status: 500,
                message: format!("mock write failure for {}", item.id),
            });
        }

        let mut items = self.items.write().await;
        let stored = items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| MediaServerError::NotFound(format!("item {}", item.id)))?;
        stored.summary = summary.to_string();

        self.updates.write().await.push(RecordedUpdate {
            item_id: item.id.clone(),
            summary: summary.to_string(),
        });
        Ok(())
    }
}
