//! Document model: sections, components, and the mutations the editor performs.
//!
//! A template is an ordered list of [`Section`]s, each an ordered list of
//! [`Component`]s. List order is render order and z-order: a component's
//! `z_index` is always its index plus one, renumbered after every structural
//! change.
//!
//! Every mutation addresses its target by id. A miss (stale selection, a
//! component deleted while an upload was in flight) is a silent no-op that
//! returns `false`/`None`; nothing here panics or errors on a missing target.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::consts::{DEFAULT_FONT_SIZE, DEFAULT_HEIGHT, DEFAULT_WIDTH, DIAMOND_SIZE, LINE_HEIGHT};
use crate::style::{ComponentStyle, GeometryPatch, SectionStyle, StyleError, StyleKey, StyleValue};
use crate::viewport::Point;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// A fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        // Older templates used `Date.now()` numbers as ids.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                match Value::deserialize(d)? {
                    Value::String(s) => Ok(Self(s)),
                    Value::Number(n) => Ok(Self(n.to_string())),
                    other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
                }
            }
        }
    };
}

entity_id!(
    /// Identifier of a section, unique within a template.
    SectionId
);

entity_id!(
    /// Identifier of a component, unique within its section.
    ComponentId
);

/// Fully qualified address of a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAddr {
    pub section_id: SectionId,
    pub component_id: ComponentId,
}

impl ComponentAddr {
    #[must_use]
    pub fn new(section_id: SectionId, component_id: ComponentId) -> Self {
        Self { section_id, component_id }
    }
}

/// The visual primitive a component draws.
///
/// Unrecognised type strings from the store are kept as [`ComponentKind::Other`]
/// so they round-trip; they cannot be created and the viewer skips them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Text,
    Image,
    /// Rectangle; `"rectangle"` is accepted as an alias on input.
    Rect,
    /// Circle, optionally filled with an image.
    Circle,
    Line,
    Diamond,
    Other(String),
}

impl ComponentKind {
    /// Kinds offered by the shape palette.
    pub const PALETTE: [ComponentKind; 6] =
        [Self::Text, Self::Image, Self::Rect, Self::Circle, Self::Line, Self::Diamond];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Diamond => "diamond",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Whether the component carries a `text` payload.
    #[must_use]
    pub fn carries_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    /// Whether the component carries an image `src` payload.
    #[must_use]
    pub fn carries_image(&self) -> bool {
        matches!(self, Self::Image | Self::Circle)
    }

    /// Width and height given to a freshly dropped component.
    #[must_use]
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            Self::Diamond => (DIAMOND_SIZE, DIAMOND_SIZE),
            Self::Line => (DEFAULT_WIDTH, LINE_HEIGHT),
            _ => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }

    /// Whether the style panel may set `key` on this kind.
    #[must_use]
    pub fn accepts(&self, key: StyleKey) -> bool {
        match key {
            StyleKey::Left
            | StyleKey::Top
            | StyleKey::Width
            | StyleKey::Height
            | StyleKey::Opacity
            | StyleKey::BorderWidth
            | StyleKey::BorderStyle
            | StyleKey::BorderColor
            | StyleKey::BorderRadius => self.is_known(),
            StyleKey::FontSize | StyleKey::FontFamily | StyleKey::Color => matches!(self, Self::Text),
            StyleKey::FillColor => self.is_known() && !matches!(self, Self::Line),
            StyleKey::LineColor => matches!(self, Self::Line),
            StyleKey::BackgroundColor => false,
        }
    }

    /// Creation-time style for this kind with its top-left corner at `position`.
    #[must_use]
    pub fn default_style(&self, position: Point) -> ComponentStyle {
        let (width, height) = self.default_size();
        let mut style = ComponentStyle::at(position.x, position.y, width, height);
        if self.carries_text() {
            style.font_size = Some(DEFAULT_FONT_SIZE);
            style.color = Some("#000".to_string());
        }
        style
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ComponentKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => Self::Text,
            "image" => Self::Image,
            "rect" | "rectangle" => Self::Rect,
            "circle" => Self::Circle,
            "line" => Self::Line,
            "diamond" => Self::Diamond,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for ComponentKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// A single positioned visual primitive inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    /// Immutable after creation.
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Stacking order within the section, 1-based.
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub style: ComponentStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Narrow-screen override stored beside `style` rather than inside it.
    /// Takes precedence over `style.responsiveStyle` in the viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive_style: Option<ComponentStyle>,
    /// Component keys the editor does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A vertically stacked region of the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    #[serde(default)]
    pub style: SectionStyle,
    #[serde(default)]
    pub components: Vec<Component>,
    /// Responsive variant chosen in the layer panel, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<String>,
}

impl Section {
    /// An empty section with default style.
    #[must_use]
    pub fn new(id: SectionId) -> Self {
        Self { id, style: SectionStyle::default(), components: Vec::new(), responsive: None }
    }

    #[must_use]
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| &c.id == id)
    }

    fn component_mut(&mut self, id: &ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| &c.id == id)
    }

    /// Position of a component in the list.
    #[must_use]
    pub fn index_of(&self, id: &ComponentId) -> Option<usize> {
        self.components.iter().position(|c| &c.id == id)
    }

    fn renumber(&mut self) {
        for (i, c) in self.components.iter_mut().enumerate() {
            c.z_index = i64::try_from(i).map_or(i64::MAX, |i| i + 1);
        }
    }

    fn fresh_component_id(&self) -> ComponentId {
        loop {
            let id = ComponentId::generate();
            if self.component(&id).is_none() {
                return id;
            }
        }
    }
}

/// The editable document: the single source of truth for every view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from loaded sections, restoring the z-order invariant.
    #[must_use]
    pub fn from_sections(mut sections: Vec<Section>) -> Self {
        for section in &mut sections {
            section.renumber();
        }
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    #[must_use]
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    fn section_mut(&mut self, id: &SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn component(&self, addr: &ComponentAddr) -> Option<&Component> {
        self.section(&addr.section_id)?.component(&addr.component_id)
    }

    fn component_mut(&mut self, addr: &ComponentAddr) -> Option<&mut Component> {
        self.section_mut(&addr.section_id)?.component_mut(&addr.component_id)
    }

    /// Locate a component by id alone, returning its full address.
    #[must_use]
    pub fn find_component(&self, id: &ComponentId) -> Option<ComponentAddr> {
        self.sections
            .iter()
            .find(|s| s.component(id).is_some())
            .map(|s| ComponentAddr::new(s.id.clone(), id.clone()))
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of components across all sections.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.sections.iter().map(|s| s.components.len()).sum()
    }

    // --- Sections ---

    /// Append a new section with a fresh id and default style.
    pub fn add_section(&mut self) -> SectionId {
        let id = loop {
            let id = SectionId::generate();
            if self.section(&id).is_none() {
                break id;
            }
        };
        log::debug!("add_section {id}");
        self.sections.push(Section::new(id.clone()));
        id
    }

    /// Apply a section-level style edit. `Ok(false)` when the section is gone.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError`] when the key is not editable on a section.
    pub fn update_section_style(
        &mut self,
        section_id: &SectionId,
        key: StyleKey,
        value: StyleValue,
    ) -> Result<bool, StyleError> {
        let Some(section) = self.section_mut(section_id) else {
            log::warn!("update_section_style: no section {section_id}");
            return Ok(false);
        };
        section.style.set(key, value)?;
        Ok(true)
    }

    /// Set or clear the responsive variant of a section.
    pub fn set_section_responsive(&mut self, section_id: &SectionId, variant: Option<String>) -> bool {
        let Some(section) = self.section_mut(section_id) else {
            return false;
        };
        section.responsive = variant.filter(|v| !v.is_empty());
        true
    }

    // --- Components ---

    /// Create a component of `kind` with its top-left corner at `position`
    /// (section-local) and append it on top of the section's stack.
    ///
    /// Returns `None` without mutating anything when the section does not
    /// exist or `kind` is not a creatable type.
    pub fn add_component(&mut self, section_id: &SectionId, kind: ComponentKind, position: Point) -> Option<ComponentId> {
        if !kind.is_known() {
            log::warn!("add_component: refusing unknown kind {kind}");
            return None;
        }
        let Some(section) = self.section_mut(section_id) else {
            log::warn!("add_component: no section {section_id}");
            return None;
        };
        let id = section.fresh_component_id();
        let style = kind.default_style(position);
        let text = kind.carries_text().then(String::new);
        section.components.push(Component {
            id: id.clone(),
            kind,
            z_index: 0,
            style,
            text,
            src: None,
            responsive_style: None,
            extra: Map::new(),
        });
        section.renumber();
        log::debug!("add_component {id} in {section_id}");
        Some(id)
    }

    /// Move the component at `from` to `to` within one section and renumber
    /// z-order. No-op when the indices are equal or out of range.
    pub fn move_component(&mut self, section_id: &SectionId, from: usize, to: usize) -> bool {
        if from == to {
            return false;
        }
        let Some(section) = self.section_mut(section_id) else {
            return false;
        };
        let len = section.components.len();
        if from >= len || to >= len {
            return false;
        }
        let moved = section.components.remove(from);
        section.components.insert(to, moved);
        section.renumber();
        true
    }

    /// Merge one style key into a component's style.
    ///
    /// Returns `Ok(false)` when the address no longer resolves.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError`] when the key does not apply to the component's
    /// type or the value has the wrong shape; the style is left unchanged.
    pub fn update_component_style(
        &mut self,
        addr: &ComponentAddr,
        key: StyleKey,
        value: StyleValue,
    ) -> Result<bool, StyleError> {
        let Some(component) = self.component_mut(addr) else {
            log::warn!("update_component_style: no component {}", addr.component_id);
            return Ok(false);
        };
        if !component.kind.accepts(key) {
            return Err(StyleError::NotApplicable { key, target: format!("a {} component", component.kind) });
        }
        component.style.set(key, value)?;
        Ok(true)
    }

    /// Merge position/size fields into the component with `id`, wherever it lives.
    pub fn update_component_geometry(&mut self, id: &ComponentId, patch: &GeometryPatch) -> bool {
        let Some(component) = self.sections.iter_mut().find_map(|s| s.component_mut(id)) else {
            return false;
        };
        component.style.apply_geometry(patch);
        true
    }

    /// Merge position/size fields into the component at `addr`. Component ids
    /// are only unique within a section, so gestures resolve by full address.
    pub fn update_component_geometry_at(&mut self, addr: &ComponentAddr, patch: &GeometryPatch) -> bool {
        let Some(component) = self.component_mut(addr) else {
            return false;
        };
        component.style.apply_geometry(patch);
        true
    }

    /// Remove a component and renumber the remaining stack.
    pub fn delete_component(&mut self, addr: &ComponentAddr) -> Option<Component> {
        let section = self.section_mut(&addr.section_id)?;
        let index = section.index_of(&addr.component_id)?;
        let removed = section.components.remove(index);
        section.renumber();
        log::debug!("delete_component {}", addr.component_id);
        Some(removed)
    }

    /// Commit edited text. Only text components carry text.
    pub fn set_component_text(&mut self, addr: &ComponentAddr, text: String) -> bool {
        match self.component_mut(addr) {
            Some(c) if c.kind.carries_text() => {
                c.text = Some(text);
                true
            }
            _ => false,
        }
    }

    /// Point an image or circle component at a new image URL.
    pub fn set_component_src(&mut self, addr: &ComponentAddr, src: String) -> bool {
        match self.component_mut(addr) {
            Some(c) if c.kind.carries_image() => {
                c.src = Some(src);
                true
            }
            _ => false,
        }
    }
}
