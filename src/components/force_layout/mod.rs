//! Force-directed graph view with hover highlighting, a radial context menu
//! and pan/zoom.
//!
//! The kernel (sync, layout, drawing, interaction) is plain Rust over a
//! retained [`Scene`](surface::Scene); only `component` and `render` touch
//! the browser.

pub mod bundle;
mod component;
pub mod config;
pub mod error;
pub mod highlight;
pub mod interaction;
pub mod layout;
pub mod menu;
pub mod model;
pub mod pipeline;
mod render;
pub mod state;
pub mod surface;
pub mod types;

pub use component::ForceLayout;
pub use config::LayoutMode;
pub use interaction::ContextAction;
pub use types::{GraphData, GraphLink, GraphNode};
