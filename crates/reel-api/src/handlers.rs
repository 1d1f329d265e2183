//! Request handlers.

pub mod health;
pub mod render;

pub use health::health;
pub use render::{render, render_batch};
