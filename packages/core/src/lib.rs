//! Angular Core Runtime
//!
//! Slot-based rendering and change detection for compiled Angular templates,
//! written against an abstract renderer.

#![deny(clippy::all)]

// Core modules (root level - mirrors packages/core/src/*.ts)
pub mod core;
pub mod error;
pub mod selector_parser;

// Rendering runtime (mirrors packages/core/src/render3)
pub mod render3;

pub use error::{RenderError, Result, SelectorParseError};
pub use render3::Runtime;
pub use selector_parser::parse_selector_to_r3_selector;
