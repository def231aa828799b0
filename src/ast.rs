//! Node tree produced by the parser.
//!
//! Positions are token-stream offsets, not byte offsets. Use
//! [`crate::lexer::locate`] to turn them into lines and columns.

use crate::token::Token;

/// Half-open token range `[start, end)` a node was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tag used to select grammar rules.
///
/// Both function definition variants share the `FunctionDefinition` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Empty,
    Block,
    String,
    Execution,
    Identifier,
    FunctionDefinition,
}

/// Ordered set of node kinds a parse is allowed to produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeFilter {
    pub kinds: Vec<NodeKind>,
    /// Also allow the untagged parenthesized-grouping rule.
    pub fallback: bool,
}

impl NodeFilter {
    #[must_use]
    pub fn only(kind: NodeKind) -> Self {
        Self {
            kinds: vec![kind],
            fallback: false,
        }
    }

    /// Nodes that can name a type.
    #[must_use]
    pub fn types() -> Self {
        Self::only(NodeKind::Identifier)
    }

    /// Nodes that can be called.
    #[must_use]
    pub fn executables() -> Self {
        Self {
            kinds: vec![NodeKind::Identifier, NodeKind::FunctionDefinition],
            fallback: true,
        }
    }

    #[must_use]
    pub fn allows(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Empty {
    pub position: Position,
}

/// Brace-delimited statement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub position: Position,
    pub content: Vec<Node>,
}

/// Quoted text captured verbatim, without the delimiting quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str {
    pub position: Position,
    pub tokens: Vec<Token>,
}

impl Str {
    /// Captured content as source text.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens.iter().map(Token::raw).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub position: Position,
    pub name: String,
}

/// Call of `func` with `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub position: Position,
    pub func: Box<Node>,
    pub args: Vec<Node>,
}

/// `type name() body` or `name() { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFunctionDefinition {
    pub position: Position,
    pub name: String,
    pub content: Box<Node>,
}

/// `type() => body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFunctionDefinition {
    pub position: Position,
    pub content: Box<Node>,
}

/// A parsed syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Empty(Empty),
    Block(Block),
    String(Str),
    Identifier(Identifier),
    Execution(Execution),
    NamedFunctionDefinition(NamedFunctionDefinition),
    InlineFunctionDefinition(InlineFunctionDefinition),
}

impl Node {
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Empty(n) => n.position,
            Self::Block(n) => n.position,
            Self::String(n) => n.position,
            Self::Identifier(n) => n.position,
            Self::Execution(n) => n.position,
            Self::NamedFunctionDefinition(n) => n.position,
            Self::InlineFunctionDefinition(n) => n.position,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Empty(_) => NodeKind::Empty,
            Self::Block(_) => NodeKind::Block,
            Self::String(_) => NodeKind::String,
            Self::Identifier(_) => NodeKind::Identifier,
            Self::Execution(_) => NodeKind::Execution,
            Self::NamedFunctionDefinition(_) | Self::InlineFunctionDefinition(_) => {
                NodeKind::FunctionDefinition
            }
        }
    }

    /// Strings and function definitions are literal values.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::String(_) | Self::NamedFunctionDefinition(_) | Self::InlineFunctionDefinition(_)
        )
    }

    /// Body of a function definition.
    #[must_use]
    pub fn function_body(&self) -> Option<&Self> {
        match self {
            Self::NamedFunctionDefinition(def) => Some(&def.content),
            Self::InlineFunctionDefinition(def) => Some(&def.content),
            _ => None,
        }
    }

    /// Name of an identifier node.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(ident) => Some(&ident.name),
            _ => None,
        }
    }

    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Empty(_) | Self::String(_) | Self::Identifier(_) => Vec::new(),
            Self::Block(block) => block.content.iter().collect(),
            Self::Execution(exec) => std::iter::once(exec.func.as_ref())
                .chain(exec.args.iter())
                .collect(),
            Self::NamedFunctionDefinition(def) => vec![def.content.as_ref()],
            Self::InlineFunctionDefinition(def) => vec![def.content.as_ref()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: usize) -> Node {
        Node::Identifier(Identifier {
            position: Position::new(start, start + 1),
            name: name.to_string(),
        })
    }

    #[test]
    fn function_definitions_share_kind() {
        let named = Node::NamedFunctionDefinition(NamedFunctionDefinition {
            position: Position::new(0, 5),
            name: "main".to_string(),
            content: Box::new(ident("x", 4)),
        });
        let inline = Node::InlineFunctionDefinition(InlineFunctionDefinition {
            position: Position::new(0, 5),
            content: Box::new(ident("x", 4)),
        });
        assert_eq!(named.kind(), NodeKind::FunctionDefinition);
        assert_eq!(inline.kind(), NodeKind::FunctionDefinition);
        assert!(named.is_literal());
        assert_eq!(inline.function_body().and_then(Node::as_identifier), Some("x"));
    }

    #[test]
    fn execution_children() {
        let call = Node::Execution(Execution {
            position: Position::new(0, 6),
            func: Box::new(ident("f", 0)),
            args: vec![ident("a", 2), ident("b", 4)],
        });
        let names: Vec<_> = call
            .children()
            .into_iter()
            .filter_map(Node::as_identifier)
            .collect();
        assert_eq!(names, vec!["f", "a", "b"]);
        assert!(!call.is_literal());
    }

    #[test]
    fn filters() {
        assert!(NodeFilter::types().allows(NodeKind::Identifier));
        assert!(!NodeFilter::types().fallback);
        assert!(NodeFilter::executables().fallback);
        assert!(!NodeFilter::executables().allows(NodeKind::Execution));
    }

    #[test]
    fn position_len() {
        assert_eq!(Position::new(2, 5).len(), 3);
        assert!(Position::new(4, 4).is_empty());
    }
}
