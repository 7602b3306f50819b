//! In-memory template store for tests and offline tooling.
//!
//! Mirrors the REST store's observable behavior: sequential numeric ids,
//! section rows appended with fresh ids, 1-based pagination in id order.

use std::collections::BTreeMap;

use template_canvas::doc::SectionId;
use template_canvas::wire::{NewSection, TemplateMeta, TemplateSummary, WireSection, WireTemplate};
use tokio::sync::Mutex;

use super::{StoreError, TemplateStore};

#[derive(Debug, Clone)]
struct StoredTemplate {
    meta: TemplateMeta,
    sections: Vec<WireSection>,
}

#[derive(Debug, Default)]
struct Inner {
    templates: BTreeMap<u64, StoredTemplate>,
    images: Vec<(String, usize)>,
    next_id: u64,
}

impl Inner {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn template_mut(&mut self, id: &str) -> Result<&mut StoredTemplate, StoreError> {
        id.parse::<u64>()
            .ok()
            .and_then(|key| self.templates.get_mut(&key))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn template_count(&self) -> usize {
        self.inner.lock().await.templates.len()
    }

    /// Total section rows across all templates.
    pub async fn section_count(&self) -> usize {
        self.inner.lock().await.templates.values().map(|t| t.sections.len()).sum()
    }

    /// File names and byte sizes of uploaded images, in upload order.
    pub async fn uploaded_images(&self) -> Vec<(String, usize)> {
        self.inner.lock().await.images.clone()
    }
}

#[async_trait::async_trait]
impl TemplateStore for MemoryStore {
    async fn list_templates(&self, page: u32, limit: u32) -> Result<Vec<TemplateSummary>, StoreError> {
        let inner = self.inner.lock().await;
        let skip = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(inner
            .templates
            .iter()
            .skip(skip.saturating_mul(take))
            .take(take)
            .map(|(id, t)| TemplateSummary { id: id.to_string(), meta: t.meta.clone() })
            .collect())
    }

    async fn get_template_by_id(&self, id: &str) -> Result<WireTemplate, StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner.template_mut(id)?;
        Ok(WireTemplate { id: Some(id.to_string()), meta: stored.meta.clone(), sections: stored.sections.clone() })
    }

    async fn create_template(&self, meta: &TemplateMeta) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.allocate_id();
        inner.templates.insert(id, StoredTemplate { meta: meta.clone(), sections: Vec::new() });
        tracing::debug!(template_id = id, "memory store: template created");
        Ok(id.to_string())
    }

    async fn update_template(&self, id: &str, meta: &TemplateMeta) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner.template_mut(id)?;
        // Update never touches the stored metaData blob.
        let meta_data = stored.meta.meta_data.take();
        stored.meta = TemplateMeta { meta_data, ..meta.clone() };
        Ok(())
    }

    async fn delete_template_by_id(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let key = id.parse::<u64>().map_err(|_| StoreError::NotFound(id.to_string()))?;
        inner.templates.remove(&key).map(|_| ()).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn duplicate_template(&self, id: &str) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        let mut copy = inner.template_mut(id)?.clone();
        copy.meta.name = format!("{} (copy)", copy.meta.name);
        for section in &mut copy.sections {
            section.id = Some(SectionId::generate());
        }
        let new_id = inner.allocate_id();
        inner.templates.insert(new_id, copy);
        Ok(new_id.to_string())
    }

    async fn create_section(&self, section: &NewSection) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner.template_mut(&section.template_id)?;
        stored.sections.push(WireSection {
            id: Some(SectionId::generate()),
            position: section.position,
            metadata: section.metadata.clone(),
        });
        Ok(())
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.images.push((file_name.to_string(), bytes.len()));
        Ok(format!("memory://images/{}/{file_name}", inner.images.len()))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
