//! AgentInterface: agent JSON in, component trees out.
//!
//! Agents answer with structured JSON describing typed UI fragments. This
//! crate turns that JSON into a rendered tree and, at build time, discovers
//! which component types exist and what data each one requires.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              AgentInterface             │
//! │                                         │
//! │  discover  - TSX scan → registry        │
//! │  manifest  - ai.json read/write         │
//! │  schema    - required-field store       │
//! │  render    - JSON → rendered tree       │
//! │  protocol  - agent instructions         │
//! │                                         │
//! ├─────────────────────────────────────────┤
//! │     Renderable units (caller-defined)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Composition language
//!
//! A node is `{"type": "card", "data": {...}}`. A JSON array is a layout:
//! the outermost array stacks its items, nested arrays place them side by
//! side. Node fields may hold further nodes, rendered in place:
//!
//! ```json
//! [
//!   {"type": "card", "data": {"title": "Sales", "content": {"type": "markdown", "data": {"content": "Up 12%"}}}},
//!   [{"type": "card", "data": {"title": "EU"}}, {"type": "card", "data": {"title": "US"}}]
//! ]
//! ```

pub mod discover;
pub mod manifest;
pub mod protocol;
pub mod render;
pub mod schema;
pub mod types;

pub use discover::{Discovery, DiscoveryConfig, DiscoveryError};
pub use manifest::{Manifest, ManifestEntry, ManifestError};
pub use render::{
    render, ComponentMap, Composition, Layout, Placeholder, Prop, Props, RenderError, Rendered,
    Renderer,
};
pub use schema::{FieldHint, Schema, SchemaStore};
pub use types::{
    describe_event, CallbackEvent, ComponentMetadata, ComponentNode, EventKind, EventSink,
};
