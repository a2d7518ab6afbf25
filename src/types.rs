//! Composition Data Model
//!
//! Types shared between the interpreter and the discovery pipeline:
//! - **ComponentNode**: `{ type, data }`, the unit of agent output
//! - **Shape**: explicit classification of any JSON value before recursion
//! - **CallbackEvent** / **EventSink**: interaction notifications flowing back
//!   from rendered units to the caller
//! - **ComponentMetadata**: one discovered component declaration

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Component Nodes
// ============================================================================

/// A typed, data-bearing node of the composition language.
///
/// This is the owned form used by producers. The interpreter itself walks
/// borrowed `serde_json::Value`s through [`Shape`] and never mutates input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ComponentNode {
    /// Create a node with empty data.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: Map::new(),
        }
    }

    /// Set one data field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Convert into the JSON value the interpreter consumes.
    pub fn into_value(self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::String(self.kind));
        object.insert("data".to_string(), Value::Object(self.data));
        Value::Object(object)
    }
}

impl From<ComponentNode> for Value {
    fn from(node: ComponentNode) -> Self {
        node.into_value()
    }
}

/// Borrowed view of a value classified as a component node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub kind: &'a str,
    /// `None` when `data` is absent or not an object; both mean "no fields".
    pub data: Option<&'a Map<String, Value>>,
}

impl<'a> NodeRef<'a> {
    /// Iterate data entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.data.into_iter().flat_map(|data| data.iter())
    }
}

/// Classification of a JSON value, decided before every recursion step.
///
/// Sequence-ness is checked before node-ness. A node is any object carrying
/// a non-empty string `type` key. That heuristic is kept for compatibility
/// with existing agent output, and it means a plain data payload that happens
/// to have a `type` field is rendered as a nested component. There is no
/// marker to opt out.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Sequence(&'a [Value]),
    Node(NodeRef<'a>),
    Other(&'a Value),
}

impl<'a> Shape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Shape::Sequence(items),
            Value::Object(object) => match object.get("type") {
                Some(Value::String(kind)) if !kind.is_empty() => Shape::Node(NodeRef {
                    kind,
                    data: object.get("data").and_then(Value::as_object),
                }),
                _ => Shape::Other(value),
            },
            other => Shape::Other(other),
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Shape::Node(_))
    }
}

/// Short JSON kind name, used in placeholders.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Callback Events
// ============================================================================

/// The kind of user interaction a rendered unit reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    Change,
    Select,
    Toggle,
}

impl EventKind {
    /// Past-tense verb for agent-facing descriptions.
    pub fn verb(self) -> &'static str {
        match self {
            EventKind::Click => "clicked",
            EventKind::Change => "changed",
            EventKind::Select => "selected",
            EventKind::Toggle => "toggled",
        }
    }
}

/// An interaction notification emitted by a rendered unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub component: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl CallbackEvent {
    pub fn new(kind: EventKind, component: impl Into<String>) -> Self {
        Self {
            kind,
            component: component.into(),
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Describe an event the way it is fed back to an agent.
///
/// `"User clicked card: Quarterly update"`. The detail is the first
/// non-empty string among `title`, `text`, `id` and `label`.
pub fn describe_event(event: &CallbackEvent) -> String {
    let detail = ["title", "text", "id", "label"]
        .iter()
        .filter_map(|key| event.data.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty());

    match detail {
        Some(detail) => format!(
            "User {} {}: {}",
            event.kind.verb(),
            event.component,
            detail
        ),
        None => format!("User {} {}", event.kind.verb(), event.component),
    }
}

type SinkFn = dyn Fn(CallbackEvent) + Send + Sync;

/// The single event channel threaded through every rendered unit.
///
/// Cloning shares the same underlying consumer, so an interaction anywhere
/// in the tree reaches the one caller-supplied callback. A disconnected sink
/// drops events.
#[derive(Clone, Default)]
pub struct EventSink(Option<Arc<SinkFn>>);

impl EventSink {
    pub fn new(consumer: impl Fn(CallbackEvent) + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(consumer)))
    }

    /// A sink that discards everything.
    pub fn disconnected() -> Self {
        Self(None)
    }

    pub fn is_connected(&self) -> bool {
        self.0.is_some()
    }

    pub fn emit(&self, event: CallbackEvent) {
        if let Some(consumer) = &self.0 {
            consumer(event);
        }
    }

    /// Whether both handles feed the same consumer.
    pub fn same_channel(&self, other: &EventSink) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventSink")
            .field(&if self.is_connected() {
                "connected"
            } else {
                "disconnected"
            })
            .finish()
    }
}

// ============================================================================
// Component Metadata
// ============================================================================

/// Category used when a declaration omits one.
pub const DEFAULT_CATEGORY: &str = "general";

/// One component declaration found during discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    /// The declared schema literal, copied verbatim.
    #[serde(default)]
    pub schema: Value,
    pub category: String,
    /// Path relative to the discovery root.
    pub file: PathBuf,
    /// Scan root tag: the library, the consuming project, or a dependency.
    #[serde(default)]
    pub source: String,
}

impl ComponentMetadata {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn shape_checks_sequence_before_node() {
        let value = json!([{ "type": "card" }]);
        assert!(matches!(Shape::of(&value), Shape::Sequence(items) if items.len() == 1));
        assert!(Shape::of(&value[0]).is_node());
    }

    #[test]
    fn shape_requires_string_type() {
        assert!(!Shape::of(&json!({ "type": 3 })).is_node());
        assert!(!Shape::of(&json!({ "type": "" })).is_node());
        assert!(!Shape::of(&json!({ "title": "x" })).is_node());
        assert!(matches!(Shape::of(&json!("card")), Shape::Other(_)));
    }

    #[test]
    fn shape_ignores_non_object_data() {
        let value = json!({ "type": "card", "data": [1, 2] });
        let Shape::Node(node) = Shape::of(&value) else {
            panic!("expected node");
        };
        assert_eq!(node.kind, "card");
        assert!(node.data.is_none());
        assert_eq!(node.entries().count(), 0);
    }

    #[test]
    fn component_node_deserializes_without_data() {
        let node: ComponentNode = serde_json::from_value(json!({ "type": "ghost" })).expect("node");
        assert_eq!(node.kind, "ghost");
        assert!(node.data.is_empty());
    }

    #[test]
    fn callback_event_wire_format() {
        let event = CallbackEvent::new(EventKind::Select, "tabs").with("id", "overview");
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(
            value,
            json!({ "type": "select", "component": "tabs", "data": { "id": "overview" } })
        );
    }

    #[test]
    fn describe_event_prefers_title() {
        let event = CallbackEvent::new(EventKind::Click, "card")
            .with("id", "c1")
            .with("title", "Quarterly update");
        assert_eq!(describe_event(&event), "User clicked card: Quarterly update");

        let bare = CallbackEvent::new(EventKind::Toggle, "accordion").with("title", "");
        assert_eq!(describe_event(&bare), "User toggled accordion");
    }

    #[test]
    fn sink_clones_share_one_consumer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let sink = EventSink::new(move |event| recorder.lock().unwrap().push(event.component));

        let copy = sink.clone();
        copy.emit(CallbackEvent::new(EventKind::Click, "card"));
        sink.emit(CallbackEvent::new(EventKind::Change, "table"));

        assert!(sink.same_channel(&copy));
        assert_eq!(*seen.lock().unwrap(), vec!["card", "table"]);
        assert!(!sink.same_channel(&EventSink::disconnected()));
    }
}
