//! Runtime data structures shared by all instructions.

pub mod definition;
pub mod node;
pub mod projection;
pub mod renderer;
pub mod view;
