//! HTTP adapter for the template store REST API.
//!
//! Thin wrapper over `reqwest`. Responses arrive either bare or wrapped in a
//! `{ "data": ... }` envelope; decoding is pure (`decode_body`) for
//! testability.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use template_canvas::wire::{NewSection, TemplateMeta, TemplateSummary, WireTemplate};

use super::{StoreError, TemplateStore};
use crate::config::{StoreTimeouts, StudioConfig};

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// # Errors
    ///
    /// Returns [`StoreError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(base_url: impl Into<String>, timeouts: StoreTimeouts) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| StoreError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// # Errors
    ///
    /// Returns [`StoreError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn from_config(config: &StudioConfig) -> Result<Self, StoreError> {
        Self::new(config.api_url.clone(), config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and return the status code and raw body.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), StoreError> {
        let response = request.send().await.map_err(|e| StoreError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| StoreError::Request(e.to_string()))?;
        tracing::debug!(status, bytes = text.len(), "store response");
        Ok((status, text))
    }
}

#[async_trait::async_trait]
impl TemplateStore for HttpStore {
    async fn list_templates(&self, page: u32, limit: u32) -> Result<Vec<TemplateSummary>, StoreError> {
        let request = self.http.get(self.url("/templates")).query(&[("page", page), ("limit", limit)]);
        let (status, body) = self.send(request).await?;
        decode_body(status, &body)
    }

    async fn get_template_by_id(&self, id: &str) -> Result<WireTemplate, StoreError> {
        let (status, body) = self.send(self.http.get(self.url(&template_path(id)))).await?;
        if status == 404 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        decode_body(status, &body)
    }

    async fn create_template(&self, meta: &TemplateMeta) -> Result<String, StoreError> {
        let form = template_form(meta, true);
        let (status, body) = self.send(self.http.post(self.url("/templates")).multipart(form)).await?;
        let created: TemplateSummary = decode_body(status, &body)?;
        Ok(created.id)
    }

    async fn update_template(&self, id: &str, meta: &TemplateMeta) -> Result<(), StoreError> {
        let form = template_form(meta, false);
        let (status, body) = self.send(self.http.patch(self.url(&template_path(id))).multipart(form)).await?;
        check_status(status, body)
    }

    async fn delete_template_by_id(&self, id: &str) -> Result<(), StoreError> {
        let (status, body) = self.send(self.http.delete(self.url(&template_path(id)))).await?;
        if status == 404 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        check_status(status, body)
    }

    async fn duplicate_template(&self, id: &str) -> Result<String, StoreError> {
        let path = format!("{}/duplicate", template_path(id));
        let (status, body) = self.send(self.http.post(self.url(&path))).await?;
        if status == 404 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let created: TemplateSummary = decode_body(status, &body)?;
        Ok(created.id)
    }

    async fn create_section(&self, section: &NewSection) -> Result<(), StoreError> {
        let (status, body) = self.send(self.http.post(self.url("/sections")).json(section)).await?;
        check_status(status, body)
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let (status, body) = self.send(self.http.post(self.url("/uploads/images")).multipart(form)).await?;
        let uploaded: UploadedImage = decode_body(status, &body)?;
        Ok(uploaded.url)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Response body, bare or wrapped in `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
struct UploadedImage {
    url: String,
}

fn template_path(id: &str) -> String {
    format!("/templates/{id}")
}

/// Multipart body for template create/update. `metaData` is only sent on create.
fn template_form(meta: &TemplateMeta, include_meta_data: bool) -> Form {
    let mut form = Form::new()
        .text("name", meta.name.clone())
        .text("description", meta.description.clone())
        .text("accessType", meta.access_type.as_str());
    if let Some(url) = &meta.thumbnail_url {
        form = form.text("thumbnailUrl", url.clone());
    }
    if include_meta_data {
        form = form.text("metaData", meta.meta_data.clone().unwrap_or_default());
    }
    form
}

// =============================================================================
// PARSING
// =============================================================================

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn check_status(status: u16, body: String) -> Result<(), StoreError> {
    if is_success(status) {
        Ok(())
    } else {
        Err(StoreError::Status { status, body })
    }
}

fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, StoreError> {
    if !is_success(status) {
        return Err(StoreError::Status { status, body: body.to_string() });
    }
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(envelope.into_inner())
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
