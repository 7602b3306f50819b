use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, WheelEvent};

use crate::doc::{Component, ComponentAddr, ComponentId, ComponentKind, Document, SectionId};
use crate::hit::{Hit, HitPart, hit_test};
use crate::input::{
    Button, Guides, InputState, Key, Modifiers, UiState, WheelDelta, drag_geometry, exceeds_click_slop,
    resize_geometry,
};
use crate::layers::{LayerPanel, LayerRow};
use crate::layout::{Rect, frame_at, section_frames};
use crate::selection::{ActiveItem, ActiveStyles, Selection};
use crate::style::{GeometryPatch, StyleKey, StyleValue};
use crate::viewport::{Point, Viewport};
use crate::wire::{SectionMetadata, TemplateExport, TemplateMeta, WireTemplate};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

const CURSOR_DEFAULT: &str = "default";
const CURSOR_MOVE: &str = "move";
const CURSOR_GRABBING: &str = "grabbing";

/// Actions returned from engine entry points for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    SectionCreated { section_id: SectionId },
    #[serde(rename_all = "camelCase")]
    SectionUpdated { section_id: SectionId },
    #[serde(rename_all = "camelCase")]
    ComponentCreated { section_id: SectionId, component: Component },
    #[serde(rename_all = "camelCase")]
    ComponentUpdated { section_id: SectionId, component_id: ComponentId },
    #[serde(rename_all = "camelCase")]
    ComponentDeleted { section_id: SectionId, component_id: ComponentId },
    /// Z-order of a section's components changed.
    #[serde(rename_all = "camelCase")]
    ComponentsReordered { section_id: SectionId },
    SelectionChanged { active: Option<ActiveItem> },
    ViewportChanged { viewport: Viewport },
    /// The host should open its inline text editor for a text component.
    #[serde(rename_all = "camelCase")]
    EditTextRequested { section_id: SectionId, component_id: ComponentId, text: String },
    /// The host should open the component menu at a screen point.
    #[serde(rename_all = "camelCase")]
    ContextMenuRequested {
        section_id: SectionId,
        component_id: ComponentId,
        x: f64,
        y: f64,
        items: Vec<ContextMenuItem>,
    },
    /// Alignment guides moved or were cleared.
    GuidesChanged { guides: Option<Guides> },
    SetCursor { cursor: String },
    Notify(Notice),
    RenderNeeded,
}

/// An entry in the component context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMenuItem {
    EditText,
    UploadImage,
    Delete,
}

impl ContextMenuItem {
    /// Menu entries for a component type. Every component can be deleted.
    #[must_use]
    pub fn for_kind(kind: &ComponentKind) -> Vec<Self> {
        let mut items = Vec::with_capacity(2);
        if kind.carries_text() {
            items.push(Self::EditText);
        }
        if kind.carries_image() {
            items.push(Self::UploadImage);
        }
        items.push(Self::Delete);
        items
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// A message the host shows as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    #[must_use]
    pub fn warn(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warn, message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Detached snapshot handed to the save workflow.
///
/// Sections are in document order; the workflow stores section `i` at
/// `position = i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub meta: TemplateMeta,
    pub sections: Vec<SectionMetadata>,
}

/// Handle for an image upload in flight. The result is written back to the
/// component by id, so the ticket stays valid while the user keeps editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub id: u64,
    pub target: ComponentAddr,
}

/// Core engine state: all logic that doesn't depend on the browser.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: Document,
    pub viewport: Viewport,
    pub selection: Selection,
    pub ui: UiState,
    pub input: InputState,
    pub layers: LayerPanel,
    pub meta: TemplateMeta,
    /// Id of the stored template this document was loaded from or last saved as.
    pub template_id: Option<String>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    save_in_flight: bool,
    pending_uploads: HashSet<u64>,
    next_upload: u64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: Document::new(),
            viewport: Viewport::default(),
            selection: Selection::default(),
            ui: UiState { hovered: None, cursor: CURSOR_DEFAULT.to_string(), guides: None },
            input: InputState::default(),
            layers: LayerPanel::new(),
            meta: TemplateMeta::default(),
            template_id: None,
            viewport_width: 0.0,
            viewport_height: 0.0,
            save_in_flight: false,
            pending_uploads: HashSet::new(),
            next_upload: 1,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the document with a template fetched from the store.
    pub fn load_template(&mut self, template: WireTemplate) -> Vec<Action> {
        let id = template.id.clone();
        let (meta, doc) = template.into_document();
        self.replace_document(id, meta, doc)
    }

    /// Replace the document with a previously exported one.
    pub fn load_export(&mut self, export: TemplateExport) -> Vec<Action> {
        let (meta, doc) = export.into_document();
        self.replace_document(None, meta, doc)
    }

    fn replace_document(&mut self, id: Option<String>, meta: TemplateMeta, doc: Document) -> Vec<Action> {
        log::info!("loading template: {} sections, {} components", doc.len(), doc.component_count());
        self.doc = doc;
        self.meta = meta;
        self.template_id = id;
        self.input = InputState::Idle;
        self.ui.hovered = None;
        self.layers.retain_existing(&self.doc);

        let mut actions = self.set_guides(None);
        if self.selection.prune(&self.doc) {
            actions.push(Action::SelectionChanged { active: None });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The whole document in export form.
    #[must_use]
    pub fn export(&self) -> TemplateExport {
        TemplateExport::new(self.meta.clone(), &self.doc)
    }

    /// Replace template-level fields (name, description, access tier, ...).
    pub fn set_meta(&mut self, meta: TemplateMeta) {
        self.meta = meta;
    }

    /// Update the host viewport size in CSS pixels.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
    }

    // --- Document edits ---

    /// Append a new empty section.
    pub fn add_section(&mut self) -> Vec<Action> {
        let section_id = self.doc.add_section();
        vec![Action::SectionCreated { section_id }, Action::RenderNeeded]
    }

    /// Drop a palette item at `screen_pt`.
    ///
    /// `grab_offset` is where inside the dragged palette preview the pointer
    /// held it, in screen pixels. The component lands in the section under the
    /// pointer with its top-left corner under the preview's top-left corner,
    /// clamped to the section origin. Drops outside every section are ignored.
    pub fn drop_component(&mut self, kind: ComponentKind, screen_pt: Point, grab_offset: Point) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);
        let frames = section_frames(&self.doc);
        let Some(frame) = frame_at(&frames, world) else {
            log::debug!("drop outside every section ignored");
            return vec![];
        };
        let position = Point::new(
            (world.x - frame.rect.x - grab_offset.x / self.viewport.scale).max(0.0),
            (world.y - frame.rect.y - grab_offset.y / self.viewport.scale).max(0.0),
        );
        let section_id = frame.section_id.clone();
        let Some(component_id) = self.doc.add_component(&section_id, kind, position) else {
            return vec![];
        };

        let addr = ComponentAddr::new(section_id.clone(), component_id);
        let mut actions = Vec::new();
        if let Some(component) = self.doc.component(&addr) {
            actions.push(Action::ComponentCreated { section_id, component: component.clone() });
        }
        actions.extend(self.select_component(&addr));
        if !actions.contains(&Action::RenderNeeded) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Route a style-panel edit to the active item.
    ///
    /// No-op while idle. A key that does not apply to the active item is
    /// reported as a warning notice and leaves the document untouched.
    pub fn set_active_style(&mut self, key: StyleKey, value: StyleValue) -> Vec<Action> {
        match self.selection.apply_style(&mut self.doc, key, value) {
            Ok(true) => {}
            Ok(false) => return vec![],
            Err(e) => {
                log::warn!("style edit rejected: {e}");
                return vec![Action::Notify(Notice::warn(e.to_string()))];
            }
        }
        let Some(active) = self.selection.active() else {
            return vec![];
        };
        let updated = match &active.component_id {
            Some(component_id) => {
                Action::ComponentUpdated { section_id: active.section_id.clone(), component_id: component_id.clone() }
            }
            None => Action::SectionUpdated { section_id: active.section_id.clone() },
        };
        vec![updated, Action::RenderNeeded]
    }

    /// Delete a component, clearing the selection and hover if they pointed at it.
    pub fn delete_component(&mut self, addr: &ComponentAddr) -> Vec<Action> {
        if self.doc.delete_component(addr).is_none() {
            return vec![];
        }
        let mut actions = vec![Action::ComponentDeleted {
            section_id: addr.section_id.clone(),
            component_id: addr.component_id.clone(),
        }];
        if self.selection.clear_if_component(addr) {
            actions.push(Action::SelectionChanged { active: None });
        }
        if self.ui.hovered.as_ref() == Some(addr) {
            self.ui.hovered = None;
        }
        actions.extend(self.set_guides(None));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Commit text from the host editor back into a text component.
    pub fn set_text(&mut self, addr: &ComponentAddr, text: String) -> Vec<Action> {
        if !self.doc.set_component_text(addr, text) {
            return vec![];
        }
        vec![
            Action::ComponentUpdated { section_id: addr.section_id.clone(), component_id: addr.component_id.clone() },
            Action::RenderNeeded,
        ]
    }

    /// Set or clear a section's responsive variant.
    pub fn set_section_responsive(&mut self, section_id: &SectionId, variant: Option<String>) -> Vec<Action> {
        if !self.doc.set_section_responsive(section_id, variant) {
            return vec![];
        }
        vec![Action::SectionUpdated { section_id: section_id.clone() }]
    }

    // --- Selection (shared by canvas and layer panel) ---

    /// Make a component the active item.
    pub fn select_component(&mut self, addr: &ComponentAddr) -> Vec<Action> {
        if self.doc.component(addr).is_none() || !self.selection.select_component(addr) {
            return vec![];
        }
        self.selection_changed()
    }

    /// Make a section's background the active item.
    pub fn select_section(&mut self, section_id: &SectionId) -> Vec<Action> {
        if self.doc.section(section_id).is_none() || !self.selection.select_section(section_id) {
            return vec![];
        }
        self.selection_changed()
    }

    /// Clear the active item.
    pub fn deselect(&mut self) -> Vec<Action> {
        let mut actions = self.set_guides(None);
        if self.selection.deselect() {
            actions.extend(self.selection_changed());
        }
        actions
    }

    fn selection_changed(&self) -> Vec<Action> {
        vec![Action::SelectionChanged { active: self.selection.active().cloned() }, Action::RenderNeeded]
    }

    // --- Layer panel ---

    #[must_use]
    pub fn layer_rows(&self) -> Vec<LayerRow> {
        self.layers.rows(&self.doc, &self.selection)
    }

    pub fn layer_toggle(&mut self, section_id: &SectionId) -> Vec<Action> {
        self.layers.toggle(section_id);
        vec![Action::RenderNeeded]
    }

    pub fn layer_begin_drag(&mut self, section_id: &SectionId, index: usize) {
        self.layers.begin_drag(section_id, index);
    }

    /// The dragged layer row is over the row at `index`.
    pub fn layer_hover(&mut self, section_id: &SectionId, index: usize) -> Vec<Action> {
        if !self.layers.hover(&mut self.doc, section_id, index) {
            return vec![];
        }
        vec![Action::ComponentsReordered { section_id: section_id.clone() }, Action::RenderNeeded]
    }

    pub fn layer_end_drag(&mut self) {
        self.layers.end_drag();
    }

    // --- Persistence ---

    /// Snapshot the document for saving. `None` while a save is already in flight.
    pub fn begin_save(&mut self) -> Option<SavePayload> {
        if self.save_in_flight {
            log::warn!("save already in flight");
            return None;
        }
        self.save_in_flight = true;
        Some(SavePayload {
            meta: self.meta.clone(),
            sections: self.doc.sections().iter().map(SectionMetadata::from).collect(),
        })
    }

    /// Record the outcome of the save started by [`Self::begin_save`].
    pub fn finish_save(&mut self, result: Result<String, String>) -> Vec<Action> {
        self.save_in_flight = false;
        match result {
            Ok(template_id) => {
                log::info!("template saved as {template_id}");
                self.template_id = Some(template_id);
                vec![Action::Notify(Notice::info("Template saved"))]
            }
            Err(e) => {
                log::warn!("save failed: {e}");
                vec![Action::Notify(Notice::error(format!("Save failed: {e}")))]
            }
        }
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    /// Start an image upload for an image or circle component.
    pub fn begin_upload(&mut self, addr: &ComponentAddr) -> Option<UploadTicket> {
        let component = self.doc.component(addr)?;
        if !component.kind.carries_image() {
            log::warn!("upload target {} is a {} component", addr.component_id, component.kind);
            return None;
        }
        let id = self.next_upload;
        self.next_upload += 1;
        self.pending_uploads.insert(id);
        Some(UploadTicket { id, target: addr.clone() })
    }

    /// Apply an upload result. The URL goes to whichever component currently
    /// has the ticket's id; if it is gone the result is dropped.
    pub fn finish_upload(&mut self, ticket: &UploadTicket, result: Result<String, String>) -> Vec<Action> {
        if !self.pending_uploads.remove(&ticket.id) {
            log::warn!("unknown upload ticket {}", ticket.id);
            return vec![];
        }
        let url = match result {
            Ok(url) => url,
            Err(e) => {
                log::warn!("upload {} failed: {e}", ticket.id);
                return vec![Action::Notify(Notice::error(format!("Image upload failed: {e}")))];
            }
        };
        let addr = &ticket.target;
        if !self.doc.set_component_src(addr, url) {
            return vec![Action::Notify(Notice::warn("Uploaded image discarded: the component no longer exists"))];
        }
        vec![
            Action::ComponentUpdated { section_id: addr.section_id.clone(), component_id: addr.component_id.clone() },
            Action::RenderNeeded,
        ]
    }

    #[must_use]
    pub fn pending_uploads(&self) -> usize {
        self.pending_uploads.len()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        match button {
            Button::Primary => {}
            Button::Secondary => return self.open_context_menu(screen_pt),
            Button::Middle => return vec![],
        }
        if modifiers.shift {
            self.input = InputState::Panning { last_screen: screen_pt };
            return self.set_cursor(CURSOR_GRABBING);
        }

        let world = self.viewport.screen_to_world(screen_pt);
        let Some(hit) = self.hit(world) else {
            self.input = InputState::PressedBackground { start_screen: screen_pt, section_id: None };
            return vec![];
        };
        match hit {
            Hit::Section { section_id } => {
                self.input = InputState::PressedBackground { start_screen: screen_pt, section_id: Some(section_id) };
                vec![]
            }
            Hit::Component { addr, part } => {
                let Some(component) = self.doc.component(&addr) else {
                    return vec![];
                };
                let orig = Rect::of_style(&component.style);
                let mut actions = self.select_component(&addr);
                let cursor = match part {
                    HitPart::Body => {
                        self.input =
                            InputState::DraggingComponent { addr, start_screen: screen_pt, orig, moved: false };
                        CURSOR_MOVE
                    }
                    HitPart::Handle(handle) => {
                        self.input = InputState::ResizingComponent { addr, handle, start_screen: screen_pt, orig };
                        handle.cursor()
                    }
                };
                actions.extend(self.set_cursor(cursor));
                actions
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let scale = self.viewport.scale;
        match &mut self.input {
            InputState::Idle => self.update_hover(screen_pt),
            InputState::PressedBackground { .. } => vec![],
            InputState::Panning { last_screen } => {
                let dx = screen_pt.x - last_screen.x;
                let dy = screen_pt.y - last_screen.y;
                *last_screen = screen_pt;
                self.viewport.pan_by(dx, dy);
                vec![Action::ViewportChanged { viewport: self.viewport }, Action::RenderNeeded]
            }
            InputState::DraggingComponent { addr, start_screen, orig, moved } => {
                if !*moved && !exceeds_click_slop(*start_screen, screen_pt) {
                    return vec![];
                }
                *moved = true;
                let patch = drag_geometry(
                    *orig,
                    (screen_pt.x - start_screen.x) / scale,
                    (screen_pt.y - start_screen.y) / scale,
                );
                let addr = addr.clone();
                let mut actions = self.apply_geometry(&addr, &patch);
                let guides = self
                    .doc
                    .component(&addr)
                    .map(|c| Guides::centred_on(addr.section_id.clone(), Rect::of_style(&c.style)));
                actions.extend(self.set_guides(guides));
                actions
            }
            InputState::ResizingComponent { addr, handle, start_screen, orig } => {
                let patch = resize_geometry(
                    *handle,
                    *orig,
                    (screen_pt.x - start_screen.x) / scale,
                    (screen_pt.y - start_screen.y) / scale,
                );
                let addr = addr.clone();
                self.apply_geometry(&addr, &patch)
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::PressedBackground { start_screen, section_id } => {
                if exceeds_click_slop(start_screen, screen_pt) {
                    return vec![];
                }
                match section_id {
                    Some(section_id) => self.select_section(&section_id),
                    None => self.deselect(),
                }
            }
            InputState::Panning { .. } => self.set_cursor(CURSOR_DEFAULT),
            InputState::DraggingComponent { .. } | InputState::ResizingComponent { .. } => {
                // Leave the cursor for the next hover update.
                self.set_guides(None)
            }
            InputState::Idle => vec![],
        }
    }

    /// Select the component under a secondary press and ask the host for its
    /// menu. Presses on a section or the canvas root do nothing.
    fn open_context_menu(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);
        let Some(Hit::Component { addr, .. }) = self.hit(world) else {
            return vec![];
        };
        let Some(items) = self.doc.component(&addr).map(|c| ContextMenuItem::for_kind(&c.kind)) else {
            return vec![];
        };
        let mut actions = self.select_component(&addr);
        actions.push(Action::ContextMenuRequested {
            section_id: addr.section_id,
            component_id: addr.component_id,
            x: screen_pt.x,
            y: screen_pt.y,
            items,
        });
        actions
    }

    /// The pointer left the canvas. Ends panning and background presses;
    /// drags and resizes keep tracking until pointer-up.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if matches!(self.input, InputState::Panning { .. } | InputState::PressedBackground { .. }) {
            self.input = InputState::Idle;
            actions.extend(self.set_cursor(CURSOR_DEFAULT));
        }
        if self.ui.hovered.take().is_some() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if !self.viewport.zoom_notch(delta.dy) {
            return vec![];
        }
        vec![Action::ViewportChanged { viewport: self.viewport }, Action::RenderNeeded]
    }

    /// Double-click selects what is under the pointer; on a text component it
    /// also asks the host to open the text editor.
    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);
        match hit_test(world, &self.doc, &self.viewport, &[]) {
            Some(Hit::Component { addr, .. }) => {
                let mut actions = self.select_component(&addr);
                if let Some(component) = self.doc.component(&addr) {
                    if component.kind.carries_text() {
                        actions.push(Action::EditTextRequested {
                            section_id: addr.section_id.clone(),
                            component_id: addr.component_id.clone(),
                            text: component.text.clone().unwrap_or_default(),
                        });
                    }
                }
                actions
            }
            Some(Hit::Section { section_id }) => self.select_section(&section_id),
            None => vec![],
        }
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => {
                if self.input.is_active() {
                    self.cancel_gesture()
                } else {
                    self.deselect()
                }
            }
            "Delete" | "Backspace" => {
                if self.input.is_active() {
                    return vec![];
                }
                match self.selection.active_component() {
                    Some(addr) => self.delete_component(&addr),
                    None => vec![],
                }
            }
            _ => vec![],
        }
    }

    /// Abort the current gesture, putting a dragged or resized component back
    /// where it started.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        let mut actions = match std::mem::take(&mut self.input) {
            InputState::DraggingComponent { addr, orig, .. } | InputState::ResizingComponent { addr, orig, .. } => {
                let patch = GeometryPatch::bounds(orig.x, orig.y, orig.width, orig.height);
                self.apply_geometry(&addr, &patch)
            }
            InputState::Idle | InputState::PressedBackground { .. } | InputState::Panning { .. } => vec![],
        };
        actions.extend(self.set_guides(None));
        actions.extend(self.set_cursor(CURSOR_DEFAULT));
        actions
    }

    // --- Helpers ---

    /// Hit-test with handles enabled for the hovered and active components.
    fn hit(&self, world: Point) -> Option<Hit> {
        let active = self.selection.active_component();
        let mut with_handles: Vec<&ComponentAddr> = Vec::with_capacity(2);
        if let Some(addr) = active.as_ref() {
            with_handles.push(addr);
        }
        if let Some(addr) = self.ui.hovered.as_ref() {
            if active.as_ref() != Some(addr) {
                with_handles.push(addr);
            }
        }
        hit_test(world, &self.doc, &self.viewport, &with_handles)
    }

    fn update_hover(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);
        let (hovered, cursor) = match self.hit(world) {
            Some(Hit::Component { addr, part: HitPart::Handle(handle) }) => (Some(addr), handle.cursor()),
            Some(Hit::Component { addr, part: HitPart::Body }) => (Some(addr), CURSOR_MOVE),
            Some(Hit::Section { .. }) | None => (None, CURSOR_DEFAULT),
        };
        let mut actions = Vec::new();
        if self.ui.hovered != hovered {
            self.ui.hovered = hovered;
            actions.push(Action::RenderNeeded);
        }
        actions.extend(self.set_cursor(cursor));
        actions
    }

    fn apply_geometry(&mut self, addr: &ComponentAddr, patch: &GeometryPatch) -> Vec<Action> {
        if !self.doc.update_component_geometry_at(addr, patch) {
            return vec![];
        }
        vec![
            Action::ComponentUpdated { section_id: addr.section_id.clone(), component_id: addr.component_id.clone() },
            Action::RenderNeeded,
        ]
    }

    fn set_guides(&mut self, guides: Option<Guides>) -> Vec<Action> {
        if self.ui.guides == guides {
            return vec![];
        }
        self.ui.guides.clone_from(&guides);
        vec![Action::GuidesChanged { guides }]
    }

    fn set_cursor(&mut self, cursor: &str) -> Vec<Action> {
        if self.ui.cursor == cursor {
            return vec![];
        }
        self.ui.cursor = cursor.to_string();
        vec![Action::SetCursor { cursor: cursor.to_string() }]
    }

    // --- Queries ---

    /// The current active item, if any.
    #[must_use]
    pub fn active(&self) -> Option<&ActiveItem> {
        self.selection.active()
    }

    /// Style of the active item for the style panel.
    #[must_use]
    pub fn active_styles(&self) -> Option<ActiveStyles> {
        self.selection.active_styles(&self.doc)
    }

    /// Look up a component by address.
    #[must_use]
    pub fn component(&self, addr: &ComponentAddr) -> Option<&Component> {
        self.doc.component(addr)
    }
}

/// The browser-facing engine. Wraps `EngineCore` and speaks JSON strings to
/// the host page; every mutating call returns the resulting actions as JSON.
#[wasm_bindgen]
pub struct Engine {
    core: EngineCore,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsError> {
    Ok(serde_json::to_string(value)?)
}

fn modifiers_of(event: &MouseEvent) -> Modifiers {
    Modifiers { shift: event.shift_key(), ctrl: event.ctrl_key(), alt: event.alt_key(), meta: event.meta_key() }
}

/// Pointer position relative to the element the listener is bound to, the
/// canvas root. `offsetX/Y` would measure from whichever child was hit.
fn point_of(event: &MouseEvent) -> Point {
    let client = Point::new(f64::from(event.client_x()), f64::from(event.client_y()));
    match event.current_target().as_ref().and_then(|target| target.dyn_ref::<Element>()) {
        Some(root) => {
            let bounds = root.get_bounding_client_rect();
            client.relative_to(Point::new(bounds.left(), bounds.top()))
        }
        None => client,
    }
}

fn outcome(result: Option<String>, error: Option<String>) -> Result<String, String> {
    match (result, error) {
        (_, Some(e)) => Err(e),
        (Some(v), None) => Ok(v),
        (None, None) => Err("no result".to_string()),
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self { core: EngineCore::new() }
    }

    // --- Data inputs ---

    /// Load a template as returned by the store's get-by-id endpoint.
    pub fn load_template(&mut self, json: &str) -> Result<String, JsError> {
        let template: WireTemplate = serde_json::from_str(json)?;
        to_json(&self.core.load_template(template))
    }

    /// Load a template from the editor's export format.
    pub fn load_export(&mut self, json: &str) -> Result<String, JsError> {
        let export: TemplateExport = serde_json::from_str(json)?;
        to_json(&self.core.load_export(export))
    }

    pub fn export(&self) -> Result<String, JsError> {
        to_json(&self.core.export())
    }

    pub fn set_meta(&mut self, json: &str) -> Result<(), JsError> {
        self.core.set_meta(serde_json::from_str(json)?);
        Ok(())
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64) {
        self.core.set_viewport(width_css, height_css);
    }

    // --- Document edits ---

    pub fn add_section(&mut self) -> Result<String, JsError> {
        to_json(&self.core.add_section())
    }

    pub fn drop_component(
        &mut self,
        kind: &str,
        x: f64,
        y: f64,
        grab_x: f64,
        grab_y: f64,
    ) -> Result<String, JsError> {
        to_json(&self.core.drop_component(ComponentKind::from(kind), Point::new(x, y), Point::new(grab_x, grab_y)))
    }

    /// `value_json` is a JSON number or string.
    pub fn set_active_style(&mut self, key: &str, value_json: &str) -> Result<String, JsError> {
        let key: StyleKey = key.parse()?;
        let value: StyleValue = serde_json::from_str(value_json)?;
        to_json(&self.core.set_active_style(key, value))
    }

    pub fn active_styles(&self) -> Result<String, JsError> {
        to_json(&self.core.active_styles())
    }

    pub fn delete_component(&mut self, section_id: &str, component_id: &str) -> Result<String, JsError> {
        let addr = ComponentAddr::new(section_id.into(), component_id.into());
        to_json(&self.core.delete_component(&addr))
    }

    pub fn set_text(&mut self, section_id: &str, component_id: &str, text: String) -> Result<String, JsError> {
        let addr = ComponentAddr::new(section_id.into(), component_id.into());
        to_json(&self.core.set_text(&addr, text))
    }

    pub fn set_section_responsive(&mut self, section_id: &str, variant: Option<String>) -> Result<String, JsError> {
        to_json(&self.core.set_section_responsive(&section_id.into(), variant))
    }

    // --- Selection ---

    pub fn select_component(&mut self, section_id: &str, component_id: &str) -> Result<String, JsError> {
        let addr = ComponentAddr::new(section_id.into(), component_id.into());
        to_json(&self.core.select_component(&addr))
    }

    pub fn select_section(&mut self, section_id: &str) -> Result<String, JsError> {
        to_json(&self.core.select_section(&section_id.into()))
    }

    pub fn deselect(&mut self) -> Result<String, JsError> {
        to_json(&self.core.deselect())
    }

    pub fn active(&self) -> Result<String, JsError> {
        to_json(&self.core.active())
    }

    // --- Layer panel ---

    pub fn layer_rows(&self) -> Result<String, JsError> {
        to_json(&self.core.layer_rows())
    }

    pub fn layer_toggle(&mut self, section_id: &str) -> Result<String, JsError> {
        to_json(&self.core.layer_toggle(&section_id.into()))
    }

    pub fn layer_begin_drag(&mut self, section_id: &str, index: usize) {
        self.core.layer_begin_drag(&section_id.into(), index);
    }

    pub fn layer_hover(&mut self, section_id: &str, index: usize) -> Result<String, JsError> {
        to_json(&self.core.layer_hover(&section_id.into(), index))
    }

    pub fn layer_end_drag(&mut self) {
        self.core.layer_end_drag();
    }

    // --- Persistence ---

    /// JSON save payload, or `undefined` while a save is in flight.
    pub fn begin_save(&mut self) -> Result<Option<String>, JsError> {
        self.core.begin_save().map(|payload| to_json(&payload)).transpose()
    }

    pub fn finish_save(&mut self, template_id: Option<String>, error: Option<String>) -> Result<String, JsError> {
        to_json(&self.core.finish_save(outcome(template_id, error)))
    }

    /// JSON upload ticket, or `undefined` when the component cannot take an image.
    pub fn begin_upload(&mut self, section_id: &str, component_id: &str) -> Result<Option<String>, JsError> {
        let addr = ComponentAddr::new(section_id.into(), component_id.into());
        self.core.begin_upload(&addr).map(|ticket| to_json(&ticket)).transpose()
    }

    pub fn finish_upload(
        &mut self,
        ticket_json: &str,
        url: Option<String>,
        error: Option<String>,
    ) -> Result<String, JsError> {
        let ticket: UploadTicket = serde_json::from_str(ticket_json)?;
        to_json(&self.core.finish_upload(&ticket, outcome(url, error)))
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, event: &MouseEvent) -> Result<String, JsError> {
        let actions = self.core.on_pointer_down(point_of(event), Button::from_dom(event.button()), modifiers_of(event));
        to_json(&actions)
    }

    pub fn on_pointer_move(&mut self, event: &MouseEvent) -> Result<String, JsError> {
        to_json(&self.core.on_pointer_move(point_of(event)))
    }

    pub fn on_pointer_up(&mut self, event: &MouseEvent) -> Result<String, JsError> {
        to_json(&self.core.on_pointer_up(point_of(event)))
    }

    pub fn on_pointer_leave(&mut self) -> Result<String, JsError> {
        to_json(&self.core.on_pointer_leave())
    }

    /// Keep the browser menu closed over the canvas; the secondary press has
    /// already produced the engine's own menu.
    #[allow(clippy::unused_self)]
    pub fn on_context_menu(&self, event: &MouseEvent) {
        event.prevent_default();
    }

    pub fn on_double_click(&mut self, event: &MouseEvent) -> Result<String, JsError> {
        to_json(&self.core.on_double_click(point_of(event)))
    }

    /// Zoom by one notch. Page scrolling is suppressed over the canvas.
    pub fn on_wheel(&mut self, event: &WheelEvent) -> Result<String, JsError> {
        event.prevent_default();
        to_json(&self.core.on_wheel(WheelDelta { dx: event.delta_x(), dy: event.delta_y() }))
    }

    pub fn on_key_down(&mut self, key: &str) -> Result<String, JsError> {
        to_json(&self.core.on_key_down(&Key(key.to_string())))
    }

    // --- Queries ---

    pub fn viewport(&self) -> Result<String, JsError> {
        to_json(&self.core.viewport)
    }

    /// Alignment guides for the drag in progress, or `null`.
    pub fn guides(&self) -> Result<String, JsError> {
        to_json(&self.core.ui.guides)
    }

    /// CSS `transform` for the canvas root.
    #[must_use]
    pub fn css_transform(&self) -> String {
        self.core.viewport.css_transform()
    }

    #[must_use]
    pub fn cursor(&self) -> String {
        self.core.ui.cursor.clone()
    }
}
