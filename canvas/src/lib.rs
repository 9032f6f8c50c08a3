//! Story compositing and layer-manipulation engine.
//!
//! This crate renders a fixed 1080×1920 "story" image from property data and
//! two uploaded images, and lets the user drag and resize those images with a
//! pointer. It compiles to WebAssembly for the browser and to a native library
//! for command-line export. The host layer is responsible only for wiring DOM
//! events to the engine and persisting the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] controller |
//! | [`render`] | Compositor: draws the six story layers onto a surface |
//! | [`export`] | Clean (chrome-free) render and PNG encoding |
//! | [`layout`] | Placement rectangles, clamping rules, aspect-fit |
//! | [`input`] | Cursor hints and the gesture state machine |
//! | [`hit`] | Hit-testing layer bodies and resize handles |
//! | [`viewport`] | Display-to-canvas coordinate mapping |
//! | [`debounce`] | Virtual-clock debouncer for layout notifications |
//! | [`source`] | Encoded source images, deferred decoding, upload sequencing |
//! | [`property`] | Property data snapshot and number formatting |
//! | [`config`] | Injected labels and fonts |
//! | [`consts`] | Shared numeric constants (canvas size, minimums, timing) |

pub mod config;
pub mod consts;
pub mod debounce;
pub mod engine;
pub mod export;
pub mod hit;
pub mod input;
pub mod layout;
pub mod property;
pub mod render;
pub mod source;
pub mod viewport;
