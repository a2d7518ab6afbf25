//! Plain-text renderable units.
//!
//! The default registry for terminals and logs. Each unit turns its props
//! into a block of text; [`print`] lays a rendered tree out with indentation.

use serde_json::Value;

use super::{ComponentMap, Layout, Prop, Props, Rendered};
use crate::types::EventSink;

/// The default plain-text registry: `card`, `markdown` and `suggestions`.
pub fn defaults() -> ComponentMap<String> {
    ComponentMap::new()
        .with("card", card)
        .with("markdown", markdown)
        .with("suggestions", suggestions)
}

fn card(props: &Props<String>, _sink: &EventSink) -> String {
    let mut lines = Vec::new();
    if let Some(title) = props.get("title").and_then(Prop::as_str) {
        lines.push(format!("# {title}"));
    }
    if let Some(content) = props.get("content") {
        lines.push(prop_text(content));
    }
    if let Some(actions) = props.get("actions") {
        let labels: Vec<String> = items(actions)
            .into_iter()
            .map(|action| match action {
                Prop::Value(value) => value
                    .get("label")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| scalar_text(&value)),
                other => prop_text(&other),
            })
            .collect();
        if !labels.is_empty() {
            lines.push(format!("[{}]", labels.join("] [")));
        }
    }
    lines.join("\n")
}

fn markdown(props: &Props<String>, _sink: &EventSink) -> String {
    props.get("content").map(prop_text).unwrap_or_default()
}

fn suggestions(props: &Props<String>, _sink: &EventSink) -> String {
    props
        .get("suggestions")
        .map(|list| {
            items(list)
                .into_iter()
                .map(|item| format!("> {}", prop_text(&item)))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

/// Elements of a list-valued prop, whichever form it arrived in.
fn items(prop: &Prop<String>) -> Vec<Prop<String>> {
    match prop {
        Prop::List(items) => items.clone(),
        Prop::Value(Value::Array(values)) => values.iter().cloned().map(Prop::Value).collect(),
        other => vec![other.clone()],
    }
}

fn prop_text(prop: &Prop<String>) -> String {
    match prop {
        Prop::Value(value) => scalar_text(value),
        Prop::Component(tree) => print(tree),
        Prop::List(items) => items.iter().map(prop_text).collect::<Vec<_>>().join("\n"),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Lay out a rendered tree as indented text.
pub fn print(tree: &Rendered<String>) -> String {
    let mut out = String::new();
    write_tree(tree, 0, &mut out);
    out.trim_end().to_string()
}

fn write_tree(tree: &Rendered<String>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match tree {
        Rendered::Row {
            layout: Layout::Stack,
            children,
        } => {
            for child in children {
                write_tree(child, depth, out);
                out.push('\n');
            }
        }
        Rendered::Row {
            layout: Layout::Row,
            children,
        } => {
            out.push_str(&format!("{indent}[row]\n"));
            for child in children {
                write_tree(child, depth + 1, out);
            }
        }
        Rendered::Unit { output, .. } => {
            for line in output.lines() {
                out.push_str(&format!("{indent}{line}\n"));
            }
        }
        Rendered::Placeholder(placeholder) => {
            out.push_str(&format!("{indent}{placeholder}\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use serde_json::json;

    #[test]
    fn renders_nested_card_content() {
        let map = defaults();
        let tree = Renderer::new(&map).render_value(&json!({
            "type": "card",
            "data": {
                "title": "Sales",
                "content": { "type": "markdown", "data": { "content": "Up 12%" } },
                "actions": [{ "label": "Open" }, { "label": "Share" }]
            }
        }));

        assert_eq!(print(&tree), "# Sales\nUp 12%\n[Open] [Share]");
    }

    #[test]
    fn prints_rows_indented() {
        let map = defaults();
        let tree = Renderer::new(&map).render_value(&json!([
            { "type": "markdown", "data": { "content": "intro" } },
            [
                { "type": "card", "data": { "title": "Left" } },
                { "type": "ghost" }
            ]
        ]));

        assert_eq!(
            print(&tree),
            "intro\n\n[row]\n  # Left\n  Unknown: ghost"
        );
    }

    #[test]
    fn suggestions_list_each_item() {
        let map = defaults();
        let tree = Renderer::new(&map).render_value(&json!({
            "type": "suggestions",
            "data": { "suggestions": ["Show Q3", "Compare regions"] }
        }));
        assert_eq!(print(&tree), "> Show Q3\n> Compare regions");
    }

    #[test]
    fn list_props_mix_components_and_values() {
        let map = defaults();
        let tree = Renderer::new(&map).render_value(&json!({
            "type": "card",
            "data": {
                "actions": [
                    { "type": "markdown", "data": { "content": "Details" } },
                    { "label": "Open" },
                    "Close"
                ]
            }
        }));
        assert_eq!(print(&tree), "[Details] [Open] [Close]");

        let tree = Renderer::new(&map).render_value(&json!({
            "type": "suggestions",
            "data": {
                "suggestions": [
                    { "type": "markdown", "data": { "content": "Drill down" } },
                    "Export"
                ]
            }
        }));
        assert_eq!(print(&tree), "> Drill down\n> Export");
    }
}
