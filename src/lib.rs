//! Annotation and editable-bounding-box engine for asset review surfaces.
//!
//! The crate owns everything between raw pointer events over a displayed image
//! or video frame and the persistence calls that follow: coordinate mapping,
//! shape geometry, the drawing-tool state machine, the creation gesture, the
//! overlay render list, and per-finding edit sessions. The host UI layer wires
//! DOM (or native) events into [`engine::EngineCore`], draws the returned
//! [`overlay::OverlayItem`]s, and executes the [`engine::Action`]s it emits,
//! optionally through [`persistence::Bridge`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Event routing and the [`engine::Action`] protocol |
//! | [`transform`] | Natural/display coordinate mapping and layout |
//! | [`geometry`] | Per-tool renderable geometry (arrows, dots, boxes) |
//! | [`tool`] | Active tool, color, brush size, and exclusive modes |
//! | [`gesture`] | Pointer-down/move/up creation gesture |
//! | [`input`] | Buttons, keys, modifiers, pointer ownership |
//! | [`doc`] | Annotation and finding types, annotation store |
//! | [`overlay`] | Visibility, paint order, badges, tooltips |
//! | [`hit`] | Hit-testing shapes and resize handles |
//! | [`session`] | Per-finding edit-session state machine and resize math |
//! | [`writes`] | Per-annotation write status, retry, and discard |
//! | [`persistence`] | Async bridge traits and dispatcher |
//! | [`config`] | Environment-driven surface configuration |
//! | [`error`] | Error enums and stable error codes |
//! | [`consts`] | Shared numeric constants |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod overlay;
pub mod persistence;
pub mod session;
pub mod tool;
pub mod transform;
pub mod writes;
