//! Lexer and backtracking parser for FCL scripts.
//!
//! Source text is split into raw tokens, classified into typed
//! [`Token`]s, and parsed into a [`Node`] tree. Code generation
//! backends consume the tree by matching on [`Node`] variants.
//!
//! # Quick start
//!
//! ```
//! use fcl_syntax::{Ast, Node};
//!
//! let ast = Ast::parse("main(){ print('hi') }").unwrap();
//! let Node::Block(root) = ast.root() else { panic!("expected a block") };
//! let Node::NamedFunctionDefinition(main) = &root.content[0] else {
//!     panic!("expected a function")
//! };
//! assert_eq!(main.name, "main");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod token;

use tracing::debug;

pub use ast::{
    Block, Empty, Execution, Identifier, InlineFunctionDefinition, NamedFunctionDefinition, Node,
    NodeFilter, NodeKind, Position, Str,
};
pub use formatter::format;
pub use lexer::{locate, split, tokenize};
pub use parser::{
    Cursor, DEFAULT_MAX_NESTING, ParseError, ParseErrorKind, Parsed, Parser, ParserOptions,
    parse_tokens,
};
pub use token::{QuoteType, Span, Token, TokenKind, TokenType, classify};

/// A parsed source unit: the token stream and the tree built from it.
///
/// The source is parsed as the body of an implicit top-level block, so
/// token offsets are shifted by one relative to the source and the
/// root is a [`Node::Block`], or [`Node::Empty`] for empty input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    tokens: Vec<Token>,
    root: Node,
}

impl Ast {
    /// Parse source text with default options.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Self::parse_with(source, &ParserOptions::default())
    }

    /// Parse source text.
    pub fn parse_with(source: &str, options: &ParserOptions) -> Result<Self, ParseError> {
        let body = tokenize(source);
        let is_empty = body.is_empty();

        let mut tokens = Vec::with_capacity(body.len() + 2);
        tokens.push(Token::Symbol(TokenType::OpenCurly));
        tokens.extend(body);
        tokens.push(Token::Symbol(TokenType::CloseCurly));

        let root = if is_empty {
            Node::Empty(Empty {
                position: Position::new(0, tokens.len()),
            })
        } else {
            let parser = Parser::with_options(&tokens, options.clone());
            let parsed = parser.parse_node(0, None)?;
            if let Some(extra) = tokens.get(parsed.cursor.token) {
                // a stray `}` closed the implicit block early
                return Err(ParseError {
                    kind: ParseErrorKind::Unexpected {
                        found: Some(extra.describe()),
                    },
                    position: parsed.cursor.token,
                });
            }
            parsed.node
        };

        debug!(
            tokens = tokens.len(),
            statements = root.children().len(),
            "parsed source"
        );
        Ok(Self { tokens, root })
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Token stream including the implicit outer braces.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Source line and column of a token offset.
    #[must_use]
    pub fn locate(&self, index: usize) -> Span {
        // skip the implicit opening brace
        locate(&self.tokens[1..], index.saturating_sub(1))
    }

    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }
}

/// Parse source text into its root node in one step.
pub fn parse_str(source: &str) -> Result<Node, ParseError> {
    Ast::parse(source).map(Ast::into_root)
}
