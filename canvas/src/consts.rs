//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed viewport scale.
pub const ZOOM_MIN: f64 = 0.5;

/// Largest allowed viewport scale.
pub const ZOOM_MAX: f64 = 3.0;

/// Scale change applied per wheel notch.
pub const ZOOM_STEP: f64 = 0.1;

// ── Gestures ────────────────────────────────────────────────────

/// Pointer travel in screen pixels below which a press/release pair is a click.
pub const CLICK_SLOP_PX: f64 = 4.0;

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Minimum width and height of a component after a resize.
pub const MIN_COMPONENT_SIZE: f64 = 50.0;

// ── Component defaults ──────────────────────────────────────────

/// Default component width for most types.
pub const DEFAULT_WIDTH: f64 = 100.0;

/// Default component height for most types.
pub const DEFAULT_HEIGHT: f64 = 50.0;

/// Diamonds are created square.
pub const DIAMOND_SIZE: f64 = 50.0;

/// Lines are created as a thin bar.
pub const LINE_HEIGHT: f64 = 5.0;

/// Font size given to new text components.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

// ── Sections ────────────────────────────────────────────────────

/// Default section width, matching the editor page width.
pub const SECTION_WIDTH: f64 = 800.0;

/// Default section minimum height.
pub const SECTION_MIN_HEIGHT: f64 = 200.0;

/// Default inner padding of a section.
pub const SECTION_PADDING: f64 = 16.0;

/// Default vertical gap below each section.
pub const SECTION_GAP: f64 = 16.0;

// ── Viewer ──────────────────────────────────────────────────────

/// Viewport widths at or below this use a component's responsive style.
pub const RESPONSIVE_BREAKPOINT_PX: f64 = 700.0;
