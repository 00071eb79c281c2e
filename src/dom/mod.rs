// ============================================================================
// DOM MODULE - Helpers para manipulación DOM (solo wasm32)
// ============================================================================

pub mod builder;
pub mod element;
pub mod events;
pub mod outside_click;

pub use builder::*;
pub use element::*;
pub use events::*;
pub use outside_click::{classify_pointer, OutsidePointerListener};
