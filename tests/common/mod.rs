#![allow(dead_code)]

use fcl_syntax::{Ast, Node, ParseError};

/// Parse a source unit and return the statements of its implicit block.
pub fn statements(source: &str) -> Vec<Node> {
    let ast = Ast::parse(source).unwrap_or_else(|e| {
        panic!("failed to parse: {e}\n--- source ---\n{source}");
    });
    match ast.into_root() {
        Node::Block(block) => block.content,
        other => panic!("expected a block root, got {other:?}"),
    }
}

/// Parse a source unit holding exactly one statement.
pub fn single(source: &str) -> Node {
    let mut nodes = statements(source);
    assert_eq!(
        nodes.len(),
        1,
        "expected one statement\n--- source ---\n{source}\n--- got ---\n{nodes:?}"
    );
    nodes.remove(0)
}

pub fn parse_err(source: &str) -> ParseError {
    match Ast::parse(source) {
        Ok(ast) => panic!("expected an error, got {:?}", ast.root()),
        Err(e) => e,
    }
}
