//! Tree dump of a parsed node, one node per line.
//!
//! Children are indented two spaces below their parent. Each line
//! carries the node kind, its payload, and its token range.

use std::fmt::Write as _;

use crate::ast::Node;

/// Render a node and all its descendants.
#[must_use]
pub fn format(node: &Node) -> String {
    let mut out = String::new();
    format_node(&mut out, node, 0);
    out
}

fn format_node(out: &mut String, node: &Node, indent: usize) {
    out.push_str(&"  ".repeat(indent));

    match node {
        Node::Empty(_) => out.push_str("Empty"),
        Node::Block(block) => {
            let _ = write!(out, "Block ({})", block.content.len());
        }
        Node::String(string) => {
            let _ = write!(out, "String {:?}", string.text());
        }
        Node::Identifier(ident) => {
            let _ = write!(out, "Identifier {}", ident.name);
        }
        Node::Execution(exec) => {
            let _ = write!(out, "Execution ({} args)", exec.args.len());
        }
        Node::NamedFunctionDefinition(def) => {
            let _ = write!(out, "NamedFunctionDefinition {}", def.name);
        }
        Node::InlineFunctionDefinition(_) => out.push_str("InlineFunctionDefinition"),
    }

    let position = node.position();
    let _ = writeln!(out, " [{}..{}]", position.start, position.end);

    for child in node.children() {
        format_node(out, child, indent + 1);
    }
}
