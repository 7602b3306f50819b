//! Save, load and upload workflows between an engine and a template store.
//!
//! Each workflow brackets its store calls with the engine's begin/finish
//! pair, so the in-flight save guard and upload tickets behave the same for
//! the browser host and for the CLI.

use template_canvas::doc::ComponentAddr;
use template_canvas::engine::{Action, EngineCore, Notice, SavePayload};
use template_canvas::render::{RenderedTemplate, render_template};
use template_canvas::wire::NewSection;

use crate::store::{StoreError, TemplateStore};

/// Write a save payload: one template row, then one section row per section
/// with `position` equal to its index.
///
/// A failed section write deletes the partially written template before the
/// error is returned.
///
/// # Errors
///
/// Returns the first [`StoreError`] from the store.
pub async fn save_template(store: &dyn TemplateStore, payload: &SavePayload) -> Result<String, StoreError> {
    let template_id = store.create_template(&payload.meta).await?;
    for (metadata, position) in payload.sections.iter().zip(0_i64..) {
        let section = NewSection { template_id: template_id.clone(), position, metadata: metadata.clone() };
        if let Err(e) = store.create_section(&section).await {
            tracing::warn!(template_id = %template_id, position, error = %e, "section write failed; rolling back");
            if let Err(cleanup) = store.delete_template_by_id(&template_id).await {
                tracing::warn!(template_id = %template_id, error = %cleanup, "rollback failed");
            }
            return Err(e);
        }
    }
    tracing::info!(template_id = %template_id, section_count = payload.sections.len(), "template saved");
    Ok(template_id)
}

/// Run the guarded save for `core`'s document.
///
/// Returns a warning notice without touching the store when a save is
/// already in flight.
pub async fn save(store: &dyn TemplateStore, core: &mut EngineCore) -> Vec<Action> {
    let Some(payload) = core.begin_save() else {
        return vec![Action::Notify(Notice::warn("A save is already in progress"))];
    };
    let result = save_template(store, &payload).await.map_err(|e| e.to_string());
    core.finish_save(result)
}

/// Fetch a stored template and load it into `core`.
///
/// # Errors
///
/// Returns [`StoreError`] if the fetch fails; `core` is left untouched.
pub async fn open_template(
    store: &dyn TemplateStore,
    core: &mut EngineCore,
    template_id: &str,
) -> Result<Vec<Action>, StoreError> {
    let template = store.get_template_by_id(template_id).await?;
    tracing::info!(template_id, section_count = template.sections.len(), "template loaded");
    Ok(core.load_template(template))
}

/// Upload image bytes for an image or circle component and write the URL back.
///
/// Returns no actions when the component cannot take an image.
pub async fn upload_image(
    store: &dyn TemplateStore,
    core: &mut EngineCore,
    target: &ComponentAddr,
    file_name: &str,
    bytes: Vec<u8>,
) -> Vec<Action> {
    let Some(ticket) = core.begin_upload(target) else {
        return vec![];
    };
    let result = store.upload_image(file_name, bytes).await.map_err(|e| e.to_string());
    if let Err(e) = &result {
        tracing::warn!(component_id = %target.component_id, error = %e, "image upload failed");
    }
    core.finish_upload(&ticket, result)
}

/// Fetch a stored template and resolve it for a viewer `viewport_width` pixels wide.
///
/// # Errors
///
/// Returns [`StoreError`] if the fetch fails.
pub async fn render(
    store: &dyn TemplateStore,
    template_id: &str,
    viewport_width: f64,
) -> Result<RenderedTemplate, StoreError> {
    let template = store.get_template_by_id(template_id).await?;
    Ok(render_template(&template, viewport_width))
}

#[cfg(test)]
#[path = "publish_test.rs"]
mod tests;
