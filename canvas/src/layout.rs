//! Section stacking and world-space bounds.
//!
//! Sections stack top to bottom from the world origin, each separated by its
//! `margin_bottom`. A section is at least `min_height` tall and grows to hold
//! its lowest component plus padding. Components are absolutely positioned
//! relative to their section's top-left corner, so `style.left/top` are
//! section-local and never offset by padding.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::doc::{Component, Document, Section, SectionId};
use crate::style::ComponentStyle;
use crate::viewport::Point;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Geometry of a component style, in section-local coordinates.
    #[must_use]
    pub fn of_style(style: &ComponentStyle) -> Self {
        Self::new(style.left, style.top, style.width, style.height)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Translate by `offset`.
    #[must_use]
    pub fn offset(&self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }
}

/// World-space placement of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionFrame {
    pub section_id: SectionId,
    pub rect: Rect,
}

/// Height a section occupies: its minimum height or enough to hold its content.
#[must_use]
pub fn section_height(section: &Section) -> f64 {
    let content = section
        .components
        .iter()
        .map(|c| c.style.top + c.style.height)
        .fold(0.0_f64, f64::max);
    let padded = if section.components.is_empty() { 0.0 } else { content + section.style.padding };
    section.style.min_height.max(padded)
}

/// Lay out every section of the document in order.
#[must_use]
pub fn section_frames(doc: &Document) -> Vec<SectionFrame> {
    let mut y = 0.0;
    doc.sections()
        .iter()
        .map(|section| {
            let height = section_height(section);
            let frame = SectionFrame {
                section_id: section.id.clone(),
                rect: Rect::new(0.0, y, section.style.width, height),
            };
            y += height + section.style.margin_bottom;
            frame
        })
        .collect()
}

/// World-space bounds of a component placed in `frame`.
#[must_use]
pub fn component_rect(frame: &SectionFrame, component: &Component) -> Rect {
    Rect::of_style(&component.style).offset(frame.rect.origin())
}

/// The frame whose rectangle contains `world`, if any.
#[must_use]
pub fn frame_at(frames: &[SectionFrame], world: Point) -> Option<&SectionFrame> {
    frames.iter().find(|f| f.rect.contains(world))
}
