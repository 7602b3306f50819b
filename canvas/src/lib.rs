//! Editing engine for the invitation template studio.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! editable template document and everything that changes it: palette drops,
//! drag/resize gestures, pan/zoom, the active-item selection that feeds the
//! style panel, and the layer panel's reordering. The host page wires DOM
//! events to [`engine::Engine`], renders from the document, and applies the
//! returned [`engine::Action`]s. Persistence is the host's job; the engine
//! only hands out save snapshots and accepts upload results.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Browser-facing [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`doc`] | Sections, components, and document mutations |
//! | [`style`] | Typed component and section styles |
//! | [`selection`] | Active-item state machine behind the style panel |
//! | [`viewport`] | Pan/zoom transform and coordinate conversions |
//! | [`input`] | Input event types, the gesture state machine, drag/resize geometry |
//! | [`hit`] | Hit-testing against components, handles, and sections |
//! | [`layout`] | Section stacking and world-space bounds |
//! | [`layers`] | Layer panel rows and drag-reorder |
//! | [`wire`] | Persisted template and section shapes |
//! | [`render`] | Read-only rendering for the template viewer |
//! | [`consts`] | Shared numeric constants (zoom limits, default sizes, etc.) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod layers;
pub mod layout;
pub mod render;
pub mod selection;
pub mod style;
pub mod viewport;
pub mod wire;
