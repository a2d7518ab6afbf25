//! Composition Interpreter
//!
//! Resolves agent JSON into a tree of rendered units.
//!
//! # Example
//!
//! ```ignore
//! use agentinterface::render::{text, Renderer};
//! use agentinterface::EventSink;
//!
//! let defaults = text::defaults();
//! let tree = Renderer::new(&defaults)
//!     .with_sink(EventSink::new(|event| println!("{event:?}")))
//!     .render(r#"[{"type": "card", "data": {"title": "Revenue"}}]"#)?;
//!
//! println!("{}", text::print(&tree));
//! ```
//!
//! # Rules
//!
//! 1. **Rows**: a sequence renders as a layout container whose children are
//!    the elements rendered in order. The child's index is its key.
//! 2. **Nodes**: `{ type, data }`. Every `data` value that is itself a node is
//!    rendered in place; sequences inside `data` get the same check per
//!    element. Everything else passes through untouched.
//! 3. **Validation**: with a schema store, the first missing required field
//!    renders an error placeholder instead of the unit.
//! 4. **Dispatch**: unknown types render an "Unknown" placeholder.
//!
//! Placeholders are local; one bad node never aborts the rest of the tree.
//! Only unparsable input text is fatal.

mod error;
pub mod text;

pub use error::RenderError;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::SchemaStore;
use crate::types::{json_kind, EventSink, NodeRef, Shape};

// ============================================================================
// Component Map
// ============================================================================

/// A renderable unit: processed data plus the shared event sink in, output out.
pub type RenderFn<O> = Arc<dyn Fn(&Props<O>, &EventSink) -> O + Send + Sync>;

/// Mapping from component type to its renderable unit.
pub struct ComponentMap<O> {
    units: HashMap<String, RenderFn<O>>,
}

impl<O> ComponentMap<O> {
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Register a unit for `kind`, replacing any previous one.
    pub fn with<F>(mut self, kind: impl Into<String>, unit: F) -> Self
    where
        F: Fn(&Props<O>, &EventSink) -> O + Send + Sync + 'static,
    {
        self.insert(kind, unit);
        self
    }

    pub fn insert<F>(&mut self, kind: impl Into<String>, unit: F)
    where
        F: Fn(&Props<O>, &EventSink) -> O + Send + Sync + 'static,
    {
        self.units.insert(kind.into(), Arc::new(unit));
    }

    /// A new map holding `self` with `overrides` applied on top.
    ///
    /// On a key collision the override wins. Neither input is modified.
    pub fn merge(&self, overrides: &ComponentMap<O>) -> ComponentMap<O> {
        let mut units = self.units.clone();
        for (kind, unit) in &overrides.units {
            units.insert(kind.clone(), Arc::clone(unit));
        }
        ComponentMap { units }
    }

    pub fn get(&self, kind: &str) -> Option<&RenderFn<O>> {
        self.units.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.units.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Registered type names, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.units.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<O> Default for ComponentMap<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for ComponentMap<O> {
    fn clone(&self) -> Self {
        Self {
            units: self.units.clone(),
        }
    }
}

impl<O> fmt::Debug for ComponentMap<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentMap")
            .field("types", &self.types())
            .finish()
    }
}

// ============================================================================
// Processed Data
// ============================================================================

/// A node's data after nested components have been rendered in place.
pub type Props<O> = IndexMap<String, Prop<O>>;

/// One processed data value.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop<O> {
    /// Passed through unchanged. Sequences without any nested node stay here too.
    Value(Value),
    /// A nested component rendered in place.
    Component(Rendered<O>),
    /// A sequence holding at least one nested component.
    List(Vec<Prop<O>>),
}

impl<O> Prop<O> {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Prop::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_component(&self) -> Option<&Rendered<O>> {
        match self {
            Prop::Component(tree) => Some(tree),
            _ => None,
        }
    }
}

// ============================================================================
// Rendered Tree
// ============================================================================

/// Orientation of a layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Outermost sequence: siblings stacked vertically.
    Stack,
    /// Nested sequence: siblings side by side.
    Row,
}

/// A visible stand-in for a node that could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// No unit is registered for the type.
    Unknown { component: String },
    /// The node lacks a field its schema requires.
    MissingField { component: String, field: String },
    /// The value is neither a sequence nor a node.
    NotANode { found: &'static str },
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Unknown { component } => write!(f, "Unknown: {component}"),
            Placeholder::MissingField { component, field } => {
                write!(f, "Error: Missing required data for {component} ({field})")
            }
            Placeholder::NotANode { found } => write!(f, "Error: Expected a component, found {found}"),
        }
    }
}

/// The result of a render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<O> {
    /// Layout container. A child's key is its index in `children`.
    Row {
        layout: Layout,
        children: Vec<Rendered<O>>,
    },
    /// Output of a renderable unit.
    Unit { component: String, output: O },
    Placeholder(Placeholder),
}

impl<O> Rendered<O> {
    pub fn output(&self) -> Option<&O> {
        match self {
            Rendered::Unit { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        match self {
            Rendered::Placeholder(placeholder) => Some(placeholder),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Rendered<O>] {
        match self {
            Rendered::Row { children, .. } => children,
            _ => &[],
        }
    }

    /// Children paired with their identity key.
    pub fn keyed(&self) -> impl Iterator<Item = (usize, &Rendered<O>)> {
        self.children().iter().enumerate()
    }
}

// ============================================================================
// Interpreter
// ============================================================================

/// Input to a render call: JSON text or an already parsed value.
#[derive(Debug, Clone)]
pub enum Composition<'a> {
    Text(&'a str),
    Value(&'a Value),
}

impl<'a> From<&'a str> for Composition<'a> {
    fn from(text: &'a str) -> Self {
        Composition::Text(text)
    }
}

impl<'a> From<&'a String> for Composition<'a> {
    fn from(text: &'a String) -> Self {
        Composition::Text(text)
    }
}

impl<'a> From<&'a Value> for Composition<'a> {
    fn from(value: &'a Value) -> Self {
        Composition::Value(value)
    }
}

/// Render entry point holding the merged component map, sink, and schemas.
pub struct Renderer<'s, O> {
    components: ComponentMap<O>,
    sink: EventSink,
    schemas: Option<&'s SchemaStore>,
}

impl<'s, O> Renderer<'s, O> {
    /// Start from a default registry.
    pub fn new(defaults: &ComponentMap<O>) -> Self {
        Self {
            components: defaults.clone(),
            sink: EventSink::disconnected(),
            schemas: None,
        }
    }

    /// Apply caller overrides on top of the defaults.
    pub fn with_overrides(mut self, overrides: &ComponentMap<O>) -> Self {
        self.components = self.components.merge(overrides);
        self
    }

    pub fn with_sink(mut self, sink: EventSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_schemas(mut self, schemas: &'s SchemaStore) -> Self {
        self.schemas = Some(schemas);
        self
    }

    pub fn components(&self) -> &ComponentMap<O> {
        &self.components
    }

    /// Render a composition.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::MalformedInput` if text input is not JSON.
    /// Every other failure is rendered as a placeholder.
    pub fn render<'a>(&self, input: impl Into<Composition<'a>>) -> Result<Rendered<O>, RenderError> {
        match input.into() {
            Composition::Text(text) => {
                let value: Value = serde_json::from_str(text)?;
                Ok(self.render_value(&value))
            }
            Composition::Value(value) => Ok(self.render_value(value)),
        }
    }

    /// Render an already parsed value. Infallible.
    pub fn render_value(&self, value: &Value) -> Rendered<O> {
        match Shape::of(value) {
            Shape::Sequence(items) => self.row(Layout::Stack, items),
            _ => self.item(value),
        }
    }

    fn item(&self, value: &Value) -> Rendered<O> {
        match Shape::of(value) {
            Shape::Sequence(items) => self.row(Layout::Row, items),
            Shape::Node(node) => self.node(node),
            Shape::Other(other) => Rendered::Placeholder(Placeholder::NotANode {
                found: json_kind(other),
            }),
        }
    }

    fn row(&self, layout: Layout, items: &[Value]) -> Rendered<O> {
        Rendered::Row {
            layout,
            children: items.iter().map(|item| self.item(item)).collect(),
        }
    }

    fn node(&self, node: NodeRef<'_>) -> Rendered<O> {
        let props: Props<O> = node
            .entries()
            .map(|(key, value)| (key.clone(), self.prop(value)))
            .collect();

        if let Some(schema) = self.schemas.and_then(|store| store.get(node.kind)) {
            if let Some(field) = schema.first_missing(|name| props.contains_key(name)) {
                tracing::warn!(component = node.kind, field, "missing required field");
                return Rendered::Placeholder(Placeholder::MissingField {
                    component: node.kind.to_string(),
                    field: field.to_string(),
                });
            }
        }

        match self.components.get(node.kind) {
            Some(unit) => Rendered::Unit {
                component: node.kind.to_string(),
                output: unit(&props, &self.sink),
            },
            None => {
                tracing::debug!(component = node.kind, "no unit registered");
                Rendered::Placeholder(Placeholder::Unknown {
                    component: node.kind.to_string(),
                })
            }
        }
    }

    fn prop(&self, value: &Value) -> Prop<O> {
        match Shape::of(value) {
            Shape::Node(node) => Prop::Component(self.node(node)),
            Shape::Sequence(items) if items.iter().any(|item| Shape::of(item).is_node()) => {
                Prop::List(
                    items
                        .iter()
                        .map(|item| match Shape::of(item) {
                            Shape::Node(node) => Prop::Component(self.node(node)),
                            _ => Prop::Value(item.clone()),
                        })
                        .collect(),
                )
            }
            _ => Prop::Value(value.clone()),
        }
    }
}

/// One-shot render with an explicit component map, sink and optional schemas.
pub fn render<'a, O>(
    input: impl Into<Composition<'a>>,
    components: &ComponentMap<O>,
    sink: EventSink,
    schemas: Option<&SchemaStore>,
) -> Result<Rendered<O>, RenderError> {
    let mut renderer = Renderer::new(components).with_sink(sink);
    if let Some(store) = schemas {
        renderer = renderer.with_schemas(store);
    }
    renderer.render(input)
}
