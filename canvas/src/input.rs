//! Input model: modifier keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the input engine. `Modifiers`
//! captures the keys held at the time of a pointer event. `InputState` is the
//! active gesture being tracked between pointer-down and pointer-up, carrying
//! all context needed to compute deltas from the gesture's start, tell a click
//! from a drag, and restore geometry if the gesture is cancelled.
//!
//! The geometry functions at the bottom are pure so drag/resize bounds can be
//! checked without driving pointer events.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::Serialize;

use crate::consts::{CLICK_SLOP_PX, MIN_COMPONENT_SIZE};
use crate::doc::{ComponentAddr, SectionId};
use crate::hit::ResizeHandle;
use crate::layout::Rect;
use crate::style::GeometryPatch;
use crate::viewport::Point;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held; arms panning on pointer-down.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Transient pointer state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Component under the pointer while idle; its handles are shown.
    pub hovered: Option<ComponentAddr>,
    /// Last cursor requested from the host.
    pub cursor: String,
    /// Centre lines shown while a component is dragged.
    pub guides: Option<Guides>,
}

/// Alignment guides through the centre of a dragged component, in the
/// coordinates of its section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guides {
    pub section_id: SectionId,
    /// x of the vertical line.
    pub vertical: f64,
    /// y of the horizontal line.
    pub horizontal: f64,
}

impl Guides {
    #[must_use]
    pub fn centred_on(section_id: SectionId, bounds: Rect) -> Self {
        Self {
            section_id,
            vertical: bounds.x + bounds.width / 2.0,
            horizontal: bounds.y + bounds.height / 2.0,
        }
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Pointer went down on a section background or the canvas root. Released
    /// within the click threshold it selects the section (or deselects).
    PressedBackground {
        /// Screen-space position of the pointer-down.
        start_screen: Point,
        /// Section under the pointer, `None` for the canvas root.
        section_id: Option<SectionId>,
    },
    /// The user is panning the viewport with shift held.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// The user is moving a component.
    DraggingComponent {
        addr: ComponentAddr,
        /// Screen-space position of the pointer-down.
        start_screen: Point,
        /// Component geometry at the start of the drag, used to compute and revert.
        orig: Rect,
        /// Whether the pointer has left the click threshold yet.
        moved: bool,
    },
    /// The user is resizing a component by one of its eight handles.
    ResizingComponent {
        addr: ComponentAddr,
        handle: ResizeHandle,
        /// Screen-space position of the pointer-down.
        start_screen: Point,
        /// Component geometry at the start of the resize.
        orig: Rect,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Whether the pointer travelled far enough from `start` to count as a drag.
#[must_use]
pub fn exceeds_click_slop(start: Point, current: Point) -> bool {
    start.distance(current) >= CLICK_SLOP_PX
}

/// New origin for a component dragged by a world-space delta. The result is
/// clamped so the component never moves above or left of its section origin.
#[must_use]
pub fn drag_geometry(orig: Rect, dx: f64, dy: f64) -> GeometryPatch {
    GeometryPatch::position((orig.x + dx).max(0.0), (orig.y + dy).max(0.0))
}

/// New bounds for a component resized by `handle` with a world-space delta.
///
/// Edges touching the top or left move the origin and keep the opposite edge
/// fixed. A moving top/left edge stops at the section origin. Neither
/// dimension ends below [`MIN_COMPONENT_SIZE`], whichever edges the handle
/// drags: a 5 px line stretched sideways comes out 50 px tall.
#[must_use]
pub fn resize_geometry(handle: ResizeHandle, orig: Rect, dx: f64, dy: f64) -> GeometryPatch {
    let (left, width) = resize_axis(orig.x, orig.width, dx, handle.moves_left(), handle.moves_right());
    let (top, height) = resize_axis(orig.y, orig.height, dy, handle.moves_top(), handle.moves_bottom());
    GeometryPatch::bounds(left, top, width, height)
}

fn resize_axis(start: f64, size: f64, delta: f64, moves_start: bool, moves_end: bool) -> (f64, f64) {
    if moves_start {
        let end = start + size;
        let next = (start + delta).min(end - MIN_COMPONENT_SIZE).max(0.0);
        (next, (end - next).max(MIN_COMPONENT_SIZE))
    } else if moves_end {
        (start, (size + delta).max(MIN_COMPONENT_SIZE))
    } else {
        (start, size.max(MIN_COMPONENT_SIZE))
    }
}
