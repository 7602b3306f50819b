//! Active-item state machine linking the canvas to the style panel.
//!
//! At most one entity is active: a component, or a section (for background
//! editing). The style the panel shows is read back from the document on
//! every call rather than cached, so an edit routed through
//! [`Selection::apply_style`] is visible to the canvas and the panel at once.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use serde::{Deserialize, Serialize};

use crate::doc::{ComponentAddr, ComponentId, Document, SectionId};
use crate::style::{ComponentStyle, StyleError, StyleKey, StyleValue};

/// The selected `(section, component)` pair. `component_id == None` selects
/// the section itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveItem {
    pub section_id: SectionId,
    pub component_id: Option<ComponentId>,
}

impl ActiveItem {
    /// The component address, when a component is selected.
    #[must_use]
    pub fn component_addr(&self) -> Option<ComponentAddr> {
        self.component_id
            .as_ref()
            .map(|c| ComponentAddr::new(self.section_id.clone(), c.clone()))
    }
}

/// Style exposed to the style panel for the active item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum ActiveStyles {
    /// The selected component's full style.
    Component { style: ComponentStyle },
    /// Section-level selection exposes only the background.
    #[serde(rename_all = "camelCase")]
    Section { background_color: String },
}

/// Selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Selected(ActiveItem),
}

impl Selection {
    #[must_use]
    pub fn active(&self) -> Option<&ActiveItem> {
        match self {
            Self::Idle => None,
            Self::Selected(item) => Some(item),
        }
    }

    /// Address of the selected component, if a component is selected.
    #[must_use]
    pub fn active_component(&self) -> Option<ComponentAddr> {
        self.active().and_then(ActiveItem::component_addr)
    }

    #[must_use]
    pub fn is_component_active(&self, addr: &ComponentAddr) -> bool {
        self.active().is_some_and(|a| {
            a.section_id == addr.section_id && a.component_id.as_ref() == Some(&addr.component_id)
        })
    }

    /// Select a component. Returns whether the selection changed.
    pub fn select_component(&mut self, addr: &ComponentAddr) -> bool {
        self.set(ActiveItem { section_id: addr.section_id.clone(), component_id: Some(addr.component_id.clone()) })
    }

    /// Select a section's background. Returns whether the selection changed.
    pub fn select_section(&mut self, section_id: &SectionId) -> bool {
        self.set(ActiveItem { section_id: section_id.clone(), component_id: None })
    }

    /// Return to idle. Returns whether anything was selected.
    pub fn deselect(&mut self) -> bool {
        let was_selected = matches!(self, Self::Selected(_));
        *self = Self::Idle;
        was_selected
    }

    fn set(&mut self, item: ActiveItem) -> bool {
        if self.active() == Some(&item) {
            return false;
        }
        *self = Self::Selected(item);
        true
    }

    /// Clear the selection if it points at `addr`, e.g. after a delete.
    pub fn clear_if_component(&mut self, addr: &ComponentAddr) -> bool {
        if self.is_component_active(addr) {
            *self = Self::Idle;
            return true;
        }
        false
    }

    /// Drop a selection whose target no longer exists in `doc`.
    pub fn prune(&mut self, doc: &Document) -> bool {
        let stale = match self.active() {
            None => false,
            Some(item) => match item.component_addr() {
                Some(addr) => doc.component(&addr).is_none(),
                None => doc.section(&item.section_id).is_none(),
            },
        };
        if stale {
            *self = Self::Idle;
        }
        stale
    }

    /// The style of whatever is selected, read live from `doc`.
    #[must_use]
    pub fn active_styles(&self, doc: &Document) -> Option<ActiveStyles> {
        let item = self.active()?;
        match item.component_addr() {
            Some(addr) => doc
                .component(&addr)
                .map(|c| ActiveStyles::Component { style: c.style.clone() }),
            None => doc
                .section(&item.section_id)
                .map(|s| ActiveStyles::Section { background_color: s.style.background_color.clone() }),
        }
    }

    /// Route a style-panel edit to the active entity.
    ///
    /// `Ok(false)` when idle or when the selection no longer resolves; the
    /// document is untouched in both cases.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError`] when the key does not apply to the active entity.
    pub fn apply_style(&self, doc: &mut Document, key: StyleKey, value: StyleValue) -> Result<bool, StyleError> {
        let Some(item) = self.active() else {
            return Ok(false);
        };
        match item.component_addr() {
            Some(addr) => doc.update_component_style(&addr, key, value),
            None => doc.update_section_style(&item.section_id, key, value),
        }
    }
}
