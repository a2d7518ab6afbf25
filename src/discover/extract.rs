//! Metadata Extractor
//!
//! Finds an exported component metadata declaration in a TSX file:
//!
//! ```tsx
//! export const CardMetadata = {
//!   type: 'card',
//!   description: 'Generic card layout',
//!   category: 'layout',
//!   schema: { type: 'object', properties: { title: { type: 'string' } }, required: ['title'] },
//! };
//! ```
//!
//! The declaration name must be `metadata` or end in `Metadata`. Its
//! initializer is evaluated as a static literal (see [`super::literal`]).

use std::path::Path;

use serde_json::{Number, Value};
use tree_sitter::{Language, Node, Parser};

use super::literal::{evaluate, parse_number, unescape, Literal, SyntaxNode};
use super::DiscoveryError;
use crate::types::{ComponentMetadata, DEFAULT_CATEGORY};

/// Whether an exported binding name marks component metadata.
pub fn is_metadata_name(name: &str) -> bool {
    name == "metadata" || name.ends_with("Metadata")
}

/// Reusable TSX metadata extractor.
pub struct Extractor {
    parser: Parser,
}

impl Extractor {
    pub fn new() -> Result<Self, DiscoveryError> {
        let language: Language = tree_sitter_typescript::LANGUAGE_TSX.into();
        let mut parser = Parser::new();
        parser.set_language(&language)?;
        Ok(Self { parser })
    }

    /// Extract metadata from one file's text.
    ///
    /// Returns `None` for files without a metadata export, for literals with
    /// no `type`, and for files that do not parse (logged as a warning).
    /// `file` is recorded relative to `root`. The returned `source` is empty
    /// until the caller tags it.
    pub fn extract(&mut self, source: &str, file: &Path, root: &Path) -> Option<ComponentMetadata> {
        let Some(tree) = self.parser.parse(source, None) else {
            tracing::warn!(file = %file.display(), "failed to parse metadata: parser gave no tree");
            return None;
        };

        let program = tree.root_node();
        if program.has_error() {
            tracing::warn!(file = %file.display(), "failed to parse metadata: syntax error");
            return None;
        }

        let mut cursor = program.walk();
        for statement in program.named_children(&mut cursor) {
            if statement.kind() != "export_statement" {
                continue;
            }
            let Some(declaration) = statement.child_by_field_name("declaration") else {
                continue;
            };
            if !matches!(declaration.kind(), "lexical_declaration" | "variable_declaration") {
                continue;
            }

            let mut inner = declaration.walk();
            for declarator in declaration.named_children(&mut inner) {
                if let Some(literal) = metadata_literal(declarator, source) {
                    if let Some(metadata) = into_metadata(literal, file, root) {
                        return Some(metadata);
                    }
                }
            }
        }

        None
    }
}

/// The evaluated initializer of a `metadata`/`*Metadata` declarator.
fn metadata_literal(declarator: Node<'_>, source: &str) -> Option<Value> {
    if declarator.kind() != "variable_declarator" {
        return None;
    }
    let name = declarator.child_by_field_name("name")?;
    if name.kind() != "identifier" || !is_metadata_name(text(name, source)) {
        return None;
    }
    let value = declarator.child_by_field_name("value")?;
    Some(evaluate(&TsxNode { node: value, source }))
}

fn into_metadata(literal: Value, file: &Path, root: &Path) -> Option<ComponentMetadata> {
    let Value::Object(mut fields) = literal else {
        return None;
    };

    let kind = match fields.remove("type") {
        Some(Value::String(kind)) if !kind.is_empty() => kind,
        _ => {
            tracing::debug!(file = %file.display(), "metadata export has no type");
            return None;
        }
    };

    let string_field = |name: &str| fields.get(name).and_then(Value::as_str).map(str::to_string);
    let description = string_field("description").unwrap_or_default();
    let category = string_field("category")
        .filter(|category| !category.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let schema = fields.remove("schema").unwrap_or(Value::Null);

    Some(ComponentMetadata {
        kind,
        description,
        schema,
        category,
        file: file
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| file.to_path_buf()),
        source: String::new(),
    })
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

// ============================================================================
// Grammar adapter
// ============================================================================

/// A tree-sitter TSX node viewed through the literal grammar.
struct TsxNode<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> TsxNode<'t> {
    fn wrap(&self, node: Node<'t>) -> Self {
        Self {
            node,
            source: self.source,
        }
    }

    fn text(&self) -> &'t str {
        text(self.node, self.source)
    }

    fn children(&self) -> Vec<Node<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect()
    }

    fn string_value(&self) -> String {
        let raw = self.text();
        unescape(raw.get(1..raw.len().saturating_sub(1)).unwrap_or(""))
    }

    /// The static text before the first `${...}`.
    fn template_head(&self) -> String {
        let start = self.node.start_byte() + 1;
        let end = self
            .children()
            .into_iter()
            .find(|child| child.kind() == "template_substitution")
            .map(|child| child.start_byte())
            .unwrap_or_else(|| self.node.end_byte().saturating_sub(1));
        unescape(self.source.get(start..end).unwrap_or(""))
    }

    fn signed_number(&self) -> Option<Number> {
        let operator = self.node.child_by_field_name("operator")?;
        let argument = self.node.child_by_field_name("argument")?;
        if argument.kind() != "number" {
            return None;
        }
        match operator.kind() {
            "-" => parse_number(text(argument, self.source), true),
            "+" => parse_number(text(argument, self.source), false),
            _ => None,
        }
    }

    fn property_key(&self, key: Node<'t>) -> Option<String> {
        match key.kind() {
            "property_identifier" | "number" => Some(text(key, self.source).to_string()),
            "string" => Some(self.wrap(key).string_value()),
            "computed_property_name" => {
                let inner = self.wrap(key).children().into_iter().next()?;
                (inner.kind() == "string").then(|| self.wrap(inner).string_value())
            }
            _ => None,
        }
    }

    fn properties(&self) -> Vec<(String, Option<Self>)> {
        let mut properties = Vec::new();
        for child in self.children() {
            match child.kind() {
                "pair" => {
                    let key = child
                        .child_by_field_name("key")
                        .and_then(|key| self.property_key(key));
                    if let Some(key) = key {
                        let value = child.child_by_field_name("value").map(|v| self.wrap(v));
                        properties.push((key, value));
                    }
                }
                "shorthand_property_identifier" => {
                    properties.push((text(child, self.source).to_string(), None));
                }
                _ => {}
            }
        }
        properties
    }
}

impl SyntaxNode for TsxNode<'_> {
    fn literal(&self) -> Literal<Self> {
        match self.node.kind() {
            "string" => Literal::Str(self.string_value()),
            "template_string" => Literal::Str(self.template_head()),
            "number" => parse_number(self.text(), false)
                .map(Literal::Number)
                .unwrap_or(Literal::Unsupported),
            "unary_expression" => self
                .signed_number()
                .map(Literal::Number)
                .unwrap_or(Literal::Unsupported),
            "true" => Literal::Bool(true),
            "false" => Literal::Bool(false),
            "null" => Literal::Null,
            "array" => Literal::Array(
                self.children()
                    .into_iter()
                    .map(|child| self.wrap(child))
                    .collect(),
            ),
            "object" => Literal::Object(self.properties()),
            "parenthesized_expression" | "as_expression" | "satisfies_expression"
            | "non_null_expression" => match self.children().into_iter().next() {
                Some(inner) => self.wrap(inner).literal(),
                None => Literal::Unsupported,
            },
            _ => Literal::Unsupported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    const CARD: &str = r#"
import React from 'react';
import type { CallbackEvent } from '../types';

export interface CardProps {
  title?: string;
  onCallback?: (event: CallbackEvent) => void;
}

// Discovered by the registry.
export const CardMetadata = {
  type: 'card',
  description: `Generic card layout`,
  category: 'layout',
  schema: {
    type: 'object',
    properties: {
      title: { type: 'string' },
      variant: { type: 'string', optional: true, enum: ['default', 'outlined'] },
    },
    required: ['title'],
  },
};

export function Card({ title }: CardProps) {
  return <div className="card">{title}</div>;
}
"#;

    fn extract(source: &str) -> Option<ComponentMetadata> {
        let root = PathBuf::from("/project");
        let file = root.join("src/ai/card.tsx");
        Extractor::new().expect("grammar").extract(source, &file, &root)
    }

    #[test]
    fn extracts_suffix_metadata() {
        let metadata = extract(CARD).expect("metadata");
        assert_eq!(metadata.kind, "card");
        assert_eq!(metadata.description, "Generic card layout");
        assert_eq!(metadata.category, "layout");
        assert_eq!(metadata.file, PathBuf::from("src/ai/card.tsx"));
        assert_eq!(
            metadata.schema,
            json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "variant": { "type": "string", "optional": true, "enum": ["default", "outlined"] }
                },
                "required": ["title"]
            })
        );
    }

    #[test]
    fn plain_metadata_name_and_defaults() {
        let source = r#"
export const metadata = {
  type: "timeline",
  description: "Events in order",
  schema: { type: "object" },
} as const;
"#;
        let metadata = extract(source).expect("metadata");
        assert_eq!(metadata.kind, "timeline");
        assert_eq!(metadata.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn typed_declaration_with_non_literal_parts() {
        let source = r#"
import { shared } from './shared';

export const TabsMetadata: ComponentMetadata = {
  type: 'tabs',
  description: `Tabs for ${shared}`,
  category: 'navigation',
  schema: {
    type: 'object',
    properties: { ...shared, items: { type: 'array', minItems: -1 } },
    required: ['items', shared],
    defaults: { shared },
  },
};
"#;
        let metadata = extract(source).expect("metadata");
        assert_eq!(metadata.description, "Tabs for ");
        assert_eq!(
            metadata.schema,
            json!({
                "type": "object",
                "properties": { "items": { "type": "array", "minItems": -1 } },
                "required": ["items"],
                "defaults": { "shared": null }
            })
        );
    }

    #[test]
    fn ignores_unexported_and_unrelated_declarations() {
        let source = r#"
const CardMetadata = { type: 'hidden', description: 'not exported' };
export const config = { type: 'config' };
export const Card = () => <div />;
"#;
        assert!(extract(source).is_none());
    }

    #[test]
    fn literal_without_type_is_absent() {
        let source = "export const metadata = { description: 'no type' };\n";
        assert!(extract(source).is_none());
    }

    #[test]
    fn syntax_error_is_absent() {
        let source = "export const metadata = { type: 'broken', \n";
        assert!(extract(source).is_none());
    }

    #[test]
    fn metadata_names() {
        assert!(is_metadata_name("metadata"));
        assert!(is_metadata_name("FancyMetadata"));
        assert!(!is_metadata_name("metadataFor"));
        assert!(!is_metadata_name("Metadata_v2"));
    }
}
