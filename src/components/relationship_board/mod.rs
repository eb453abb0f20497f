//! Canvas board of tasks, users and groups with drag-to-assign.
//!
//! Everything except `component`, the panels and `render` is plain Rust and is
//! driven by tests without a browser.

mod component;
mod detail_panel;
mod filter_panel;
pub mod filter;
pub mod geometry;
pub mod interaction;
pub mod node;
pub mod render;
pub mod resolver;
pub mod state;
pub mod sync;

pub use component::{BoardHandle, RelationshipBoard};
pub use detail_panel::DetailView;
pub use state::BoardState;
