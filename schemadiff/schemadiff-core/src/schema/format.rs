use std::fmt::{Error, Result, Write as _};

use super::{SchemaNode, SchemaTree};

/// Format a schema tree in a readable style:
/// scalar fields are rendered in one line, compound fields open an indented block.
/// Array elements are rendered under the label `item`.
pub fn format_schema_tree(tree: &SchemaTree) -> std::result::Result<String, Error> {
    let mut out = String::new();

    for (name, node) in tree.iter() {
        format_labeled_node(name, node, 0, &mut out)?;
    }

    Ok(out)
}

fn format_labeled_node(label: &str, node: &SchemaNode, indent: usize, out: &mut String) -> Result {
    let pad = " ".repeat(indent);
    writeln!(out, "{pad}{label}: {}", node.type_of())?;

    match node {
        SchemaNode::Scalar(_) => {}
        SchemaNode::Object(fields) => {
            for (name, child) in fields.iter() {
                format_labeled_node(name, child, indent + 4, out)?;
            }
        }
        SchemaNode::Array { element, .. } => {
            format_labeled_node("item", element, indent + 4, out)?;
        }
    }

    Ok(())
}
