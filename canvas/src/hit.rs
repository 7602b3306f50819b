#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::{Deserialize, Serialize};

use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{ComponentAddr, Document, SectionId};
use crate::layout::{Rect, component_rect, section_frames};
use crate::viewport::{Point, Viewport};

/// Which part of a component was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(ResizeHandle),
}

/// One of the eight resize handles around a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
    ];

    /// Handle drags the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft | Self::Left)
    }

    /// Handle drags the right edge.
    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight | Self::Right)
    }

    /// Handle drags the top edge.
    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::Top)
    }

    /// Handle drags the bottom edge.
    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight | Self::Bottom)
    }

    /// Where the handle sits on `rect`.
    #[must_use]
    pub fn position(self, rect: &Rect) -> Point {
        let x = if self.moves_left() {
            rect.x
        } else if self.moves_right() {
            rect.right()
        } else {
            rect.x + rect.width / 2.0
        };
        let y = if self.moves_top() {
            rect.y
        } else if self.moves_bottom() {
            rect.bottom()
        } else {
            rect.y + rect.height / 2.0
        };
        Point::new(x, y)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::TopLeft | Self::BottomRight => "nwse-resize",
            Self::TopRight | Self::BottomLeft => "nesw-resize",
            Self::Top | Self::Bottom => "ns-resize",
            Self::Left | Self::Right => "ew-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    /// A component body or one of its handles.
    Component { addr: ComponentAddr, part: HitPart },
    /// Section background outside every component.
    Section { section_id: SectionId },
}

/// Test what is under `world_pt`.
///
/// Handles are only considered for components listed in `with_handles` (the
/// hovered and active components); they win over bodies so a handle that
/// overlaps a neighbour is still grabbable. Among bodies the topmost
/// component (last in its section) wins. `None` means the canvas root
/// outside every section.
#[must_use]
pub fn hit_test(world_pt: Point, doc: &Document, viewport: &Viewport, with_handles: &[&ComponentAddr]) -> Option<Hit> {
    let frames = section_frames(doc);
    let slop = viewport.screen_dist_to_world(HANDLE_RADIUS_PX);

    for addr in with_handles {
        let Some(frame) = frames.iter().find(|f| f.section_id == addr.section_id) else {
            continue;
        };
        let Some(component) = doc.component(addr) else {
            continue;
        };
        let rect = component_rect(frame, component);
        for handle in ResizeHandle::ALL {
            if handle.position(&rect).distance(world_pt) <= slop {
                return Some(Hit::Component { addr: (*addr).clone(), part: HitPart::Handle(handle) });
            }
        }
    }

    for (frame, section) in frames.iter().zip(doc.sections()) {
        let topmost = section
            .components
            .iter()
            .rev()
            .find(|c| component_rect(frame, c).contains(world_pt));
        if let Some(component) = topmost {
            return Some(Hit::Component {
                addr: ComponentAddr::new(section.id.clone(), component.id.clone()),
                part: HitPart::Body,
            });
        }
    }

    frames
        .iter()
        .find(|f| f.rect.contains(world_pt))
        .map(|f| Hit::Section { section_id: f.section_id.clone() })
}
