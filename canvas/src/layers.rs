//! Layer panel: a nested list view of the same document.
//!
//! Rows mirror sections and their components in z-order. Expand/collapse is
//! local UI state and never persisted. Reordering follows the panel's hover
//! behaviour: while a row is dragged, hovering another row of the same
//! section moves the dragged component there immediately and the drag
//! continues from its new index.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use std::collections::HashSet;

use serde::Serialize;

use crate::doc::{ComponentId, Document, SectionId};
use crate::selection::Selection;

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "row", rename_all = "camelCase")]
pub enum LayerRow {
    #[serde(rename_all = "camelCase")]
    Section { section_id: SectionId, label: String, detail: String, expanded: bool, active: bool },
    #[serde(rename_all = "camelCase")]
    Component {
        section_id: SectionId,
        component_id: ComponentId,
        index: usize,
        label: String,
        detail: String,
        active: bool,
    },
}

/// A row being dragged for reordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDrag {
    pub section_id: SectionId,
    pub index: usize,
}

/// Layer panel state.
#[derive(Debug, Clone, Default)]
pub struct LayerPanel {
    expanded: HashSet<SectionId>,
    drag: Option<LayerDrag>,
}

impl LayerPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_expanded(&self, section_id: &SectionId) -> bool {
        self.expanded.contains(section_id)
    }

    /// Flip a section's expanded state, returning the new state.
    pub fn toggle(&mut self, section_id: &SectionId) -> bool {
        if self.expanded.remove(section_id) {
            false
        } else {
            self.expanded.insert(section_id.clone());
            true
        }
    }

    /// Rows to display. Components of collapsed sections are omitted.
    #[must_use]
    pub fn rows(&self, doc: &Document, selection: &Selection) -> Vec<LayerRow> {
        let active = selection.active();
        let mut rows = Vec::new();
        for section in doc.sections() {
            let expanded = self.is_expanded(&section.id);
            rows.push(LayerRow::Section {
                section_id: section.id.clone(),
                label: format!("Section: {}", section.id),
                detail: format!("Components: {}", section.components.len()),
                expanded,
                active: active.is_some_and(|a| a.section_id == section.id && a.component_id.is_none()),
            });
            if !expanded {
                continue;
            }
            for (index, component) in section.components.iter().enumerate() {
                rows.push(LayerRow::Component {
                    section_id: section.id.clone(),
                    component_id: component.id.clone(),
                    index,
                    label: format!("Component: {}", component.id),
                    detail: format!("Type: {}", component.kind),
                    active: active.is_some_and(|a| {
                        a.section_id == section.id && a.component_id.as_ref() == Some(&component.id)
                    }),
                });
            }
        }
        rows
    }

    /// Start dragging the row at `index`.
    pub fn begin_drag(&mut self, section_id: &SectionId, index: usize) {
        self.drag = Some(LayerDrag { section_id: section_id.clone(), index });
    }

    #[must_use]
    pub fn drag(&self) -> Option<&LayerDrag> {
        self.drag.as_ref()
    }

    /// The dragged row is over the row at `index`. Moves the component when
    /// the hovered row is a different index in the same section. Returns
    /// whether the document changed.
    pub fn hover(&mut self, doc: &mut Document, section_id: &SectionId, index: usize) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        if &drag.section_id != section_id || drag.index == index {
            return false;
        }
        if !doc.move_component(section_id, drag.index, index) {
            return false;
        }
        drag.index = index;
        true
    }

    /// Finish the drag.
    pub fn end_drag(&mut self) -> Option<LayerDrag> {
        self.drag.take()
    }

    /// Forget sections that no longer exist.
    pub fn retain_existing(&mut self, doc: &Document) {
        self.expanded.retain(|id| doc.section(id).is_some());
        if self.drag.as_ref().is_some_and(|d| doc.section(&d.section_id).is_none()) {
            self.drag = None;
        }
    }
}
