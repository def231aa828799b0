//! Structural invariants of parsed trees.

mod common;

use common::statements;
use fcl_syntax::{Ast, Node, NodeKind, Token, TokenType};

fn walk<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    out.push(node);
    for child in node.children() {
        walk(child, out);
    }
}

#[test]
fn positions_are_ordered() {
    let ast = Ast::parse("int main() { print('a', f(b)); x() => (y) }").expect("parse");
    let mut nodes = Vec::new();
    walk(ast.root(), &mut nodes);
    assert!(nodes.len() > 5);
    for node in nodes {
        let position = node.position();
        assert!(position.end >= position.start, "{node:?}");
        assert!(position.end <= ast.tokens().len(), "{node:?}");
    }
}

#[test]
fn children_in_source_order() {
    let nodes = statements("c; b; a");
    let names: Vec<_> = nodes.iter().filter_map(Node::as_identifier).collect();
    assert_eq!(names, vec!["c", "b", "a"]);
    assert!(nodes[0].position().end <= nodes[1].position().start);
}

#[test]
fn string_excludes_delimiters() {
    let nodes = statements("\"a b\"");
    let Node::String(text) = &nodes[0] else {
        panic!("expected string");
    };
    assert_eq!(
        text.tokens,
        vec![
            Token::Text("a".to_string()),
            Token::Symbol(TokenType::Space),
            Token::Text("b".to_string()),
        ]
    );
}

#[test]
fn token_stream_is_wrapped() {
    let ast = Ast::parse("x").expect("parse");
    assert_eq!(ast.tokens().first(), Some(&Token::Symbol(TokenType::OpenCurly)));
    assert_eq!(ast.tokens().last(), Some(&Token::Symbol(TokenType::CloseCurly)));
    assert_eq!(ast.tokens().len(), 3);
}

#[test]
fn literal_kinds() {
    let nodes = statements("'s'; f(); x() => y; int g() {}");
    let literal: Vec<_> = nodes.iter().map(Node::is_literal).collect();
    assert_eq!(literal, vec![true, false, true, true]);
    assert_eq!(nodes[2].kind(), NodeKind::FunctionDefinition);
    assert_eq!(nodes[3].kind(), NodeKind::FunctionDefinition);
}

#[test]
fn locate_node_in_source() {
    let ast = Ast::parse("a;\n  f()").expect("parse");
    let Node::Block(root) = ast.root() else {
        panic!("expected block");
    };
    let span = ast.locate(root.content[1].position().start);
    assert_eq!((span.line, span.column), (2, 3));
}
