//! Agent-facing component instructions.
//!
//! Produces the text an agent is prompted with so that its output uses only
//! components the registry knows about.

use crate::manifest::Manifest;
use crate::schema::Schema;

/// Line used when there is no usable registry.
const FALLBACK: &str = "markdown: Text content with formatting";

/// Number of schema properties listed per component.
const KEY_PROPERTIES: usize = 3;

/// Build instructions for the agent.
///
/// If `only` is non-empty it names the available types directly; otherwise
/// the manifest's components are described. Without either, a single
/// `markdown` fallback is offered.
pub fn instructions(manifest: Option<&Manifest>, only: &[String]) -> String {
    let specs: Vec<String> = if !only.is_empty() {
        only.iter()
            .map(|kind| format!("{kind}: Available component"))
            .collect()
    } else {
        manifest.map(describe).unwrap_or_default()
    };

    let specs = if specs.is_empty() {
        tracing::warn!("no component registry available, offering markdown only");
        vec![FALLBACK.to_string()]
    } else {
        specs
    };

    let examples: Vec<&str> = if !only.is_empty() {
        only.iter().map(String::as_str).collect()
    } else {
        vec!["card", "table", "markdown"]
    };
    let first = examples.first().copied().unwrap_or("card");
    let second = examples.get(1).copied().unwrap_or(first);
    let third = examples.get(2).copied().unwrap_or(first);

    let list = specs
        .iter()
        .map(|spec| format!("- {spec}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Available components:
{list}

Composition patterns:
- Single: [{{"type": "{first}", "data": {{"title": "Revenue", "value": "$5M"}}}}]
- Multiple: [{{"type": "{first}", "data": {{...}}}}, {{"type": "{second}", "data": {{...}}}}]
- Horizontal: [[{{"type": "{first}", "data": {{...}}}}, {{"type": "{first}", "data": {{...}}}}]]
- Mixed: [{{"type": "{first}", "data": {{...}}}}, [comp1, comp2], {{"type": "{third}", "data": {{...}}}}]

Return JSON array format only."#
    )
}

fn describe(manifest: &Manifest) -> Vec<String> {
    manifest
        .components
        .iter()
        .map(|(kind, entry)| {
            let schema = Schema::from_value(&entry.schema);
            let uses: Vec<&str> = schema.key_properties(KEY_PROPERTIES).collect();
            if uses.is_empty() {
                format!("{kind}: {}", entry.description)
            } else {
                format!("{kind}: {} (uses: {})", entry.description, uses.join(", "))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComponentMetadata;
    use serde_json::json;
    use std::path::PathBuf;

    fn manifest() -> Manifest {
        Manifest::from_components(vec![ComponentMetadata {
            kind: "card".to_string(),
            description: "Generic card".to_string(),
            schema: json!({
                "properties": {
                    "title": { "type": "string" },
                    "variant": { "type": "string", "optional": true },
                    "content": { "type": "string" },
                    "actions": { "type": "array" }
                }
            }),
            category: "layout".to_string(),
            file: PathBuf::from("src/ai/card.tsx"),
            source: "agentinterface".to_string(),
        }])
    }

    #[test]
    fn describes_manifest_components() {
        let text = instructions(Some(&manifest()), &[]);
        assert!(text.starts_with("Available components:\n- card: Generic card (uses: title, content)\n"));
        assert!(text.contains(r#"- Single: [{"type": "card", "data": {"title": "Revenue", "value": "$5M"}}]"#));
        assert!(text.ends_with("Return JSON array format only."));
    }

    #[test]
    fn explicit_types_drive_examples() {
        let only = vec!["chart".to_string(), "tabs".to_string()];
        let text = instructions(Some(&manifest()), &only);
        assert!(text.contains("- chart: Available component\n- tabs: Available component"));
        assert!(text.contains(r#"{"type": "tabs", "data": {...}}"#));
        assert!(!text.contains("Generic card"));
    }

    #[test]
    fn falls_back_to_markdown() {
        let text = instructions(None, &[]);
        assert!(text.contains("- markdown: Text content with formatting"));
    }
}
