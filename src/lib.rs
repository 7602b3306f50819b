//! Invite Studio: persistence and workflows for invitation templates.
//!
//! The editing engine lives in the `template-canvas` crate and never touches
//! the network. This crate supplies the other half:
//!
//! | Module    | Role                                                    |
//! |-----------|---------------------------------------------------------|
//! | `config`  | Environment configuration (`STUDIO_*` variables)        |
//! | `store`   | `TemplateStore` trait with HTTP and in-memory adapters  |
//! | `publish` | Save, load and image-upload workflows over an engine    |
//!
//! Workflows drive `EngineCore`'s begin/finish pairs so the engine's
//! in-flight guards and notifications apply no matter which store is used.

pub mod config;
pub mod publish;
pub mod store;
