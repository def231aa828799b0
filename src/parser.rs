use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::ast::{
    Block, Empty, Execution, Identifier, InlineFunctionDefinition, NamedFunctionDefinition, Node,
    NodeFilter, NodeKind, Position, Str,
};
use crate::token::{QuoteType, Token, TokenType};

/// Nesting level past which parsing stops with
/// [`ParseErrorKind::NestingTooDeep`].
pub const DEFAULT_MAX_NESTING: usize = 256;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No grammar rule matched. `None` means end of input.
    Unexpected { found: Option<String> },
    /// A block or call continued with something other than its
    /// separator or closer.
    ExpectedSeparator {
        expected: &'static str,
        found: Option<String>,
    },
    /// `type name()` where `name` is not an identifier.
    InvalidFunctionName { found: Option<String> },
    /// Input ended inside a quoted string.
    UnterminatedString { quote: QuoteType },
    /// Input nests deeper than the configured limit.
    NestingTooDeep { limit: usize },
}

fn found_or_eof(found: Option<&String>) -> &str {
    found.map_or("end of input", String::as_str)
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unexpected { found } => {
                write!(f, "unexpected {}", found_or_eof(found.as_ref()))
            }
            Self::ExpectedSeparator { expected, found } => {
                write!(
                    f,
                    "expected {expected}, got {}",
                    found_or_eof(found.as_ref())
                )
            }
            Self::InvalidFunctionName { found } => {
                write!(f, "invalid function name {}", found_or_eof(found.as_ref()))
            }
            Self::UnterminatedString { quote } => {
                write!(f, "unterminated string, expected {}", quote.as_char())
            }
            Self::NestingTooDeep { limit } => {
                write!(f, "input nests deeper than {limit} levels")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at token {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Token offset the error was detected at.
    pub position: usize,
}

impl ParseError {
    /// `false` for resource exhaustion, which says nothing about
    /// whether the input is well formed.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        !matches!(self.kind, ParseErrorKind::NestingTooDeep { .. })
    }
}

/// Parser tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum recursion level before giving up.
    pub max_nesting: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// Scan state of one parse invocation.
///
/// `depth` counts brackets opened outside quotes by the tokens this
/// invocation consumed itself. A rule's own opening delimiter is not
/// counted, and every child starts from a fresh cursor, so separators
/// seen by a block or call loop are always at its own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Next unread token.
    pub token: usize,
    pub depth: usize,
    /// Quote currently open, if any.
    pub quote: Option<QuoteType>,
}

impl Cursor {
    #[must_use]
    pub const fn at(token: usize) -> Self {
        Self {
            token,
            depth: 0,
            quote: None,
        }
    }

    #[must_use]
    pub const fn inside_quote(&self) -> bool {
        self.quote.is_some()
    }

    /// Update quote and bracket state for a consumed token.
    pub fn account(&mut self, token: &Token) {
        let Some(ty) = token.token_type() else {
            return;
        };

        if let Some(quote) = ty.quote() {
            match self.quote {
                None => self.quote = Some(quote),
                Some(open) if open == quote => self.quote = None,
                Some(_) => {}
            }
        }

        if self.quote.is_none() {
            if ty.is_opening_bracket() {
                self.depth += 1;
            } else if ty.is_closing_bracket() {
                self.depth = self.depth.saturating_sub(1);
            }
        }
    }
}

/// A node together with the cursor state right after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub node: Node,
    pub cursor: Cursor,
}

/// Parse a whole token stream starting at offset 0.
///
/// # Errors
///
/// Returns `ParseError` when no grammar rule matches or a construct
/// is left unterminated.
pub fn parse_tokens(tokens: &[Token]) -> Result<Node, ParseError> {
    Parser::new(tokens).parse_node(0, None).map(|parsed| parsed.node)
}

type MemoKey = (usize, Option<NodeFilter>);

/// Backtracking recursive-descent parser over a fixed token stream.
///
/// Every [`parse_node`](Self::parse_node) call starts from a fresh
/// cursor, so its outcome depends only on the start offset and filter.
/// Outcomes are cached on that key for the life of the parser.
pub struct Parser<'a> {
    tokens: &'a [Token],
    options: ParserOptions,
    memo: RefCell<HashMap<MemoKey, Result<Parsed, ParseError>>>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_options(tokens, ParserOptions::default())
    }

    #[must_use]
    pub fn with_options(tokens: &'a [Token], options: ParserOptions) -> Self {
        Self {
            tokens,
            options,
            memo: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    /// Parse one node at `start`, optionally restricted to `filter`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` when no allowed rule matches, when a rule
    /// fails past its point of commitment, or when nesting exceeds
    /// [`ParserOptions::max_nesting`].
    pub fn parse_node(
        &self,
        start: usize,
        filter: Option<&NodeFilter>,
    ) -> Result<Parsed, ParseError> {
        self.parse_at(start, filter, 0)
    }

    fn parse_at(
        &self,
        start: usize,
        filter: Option<&NodeFilter>,
        level: usize,
    ) -> Result<Parsed, ParseError> {
        if level > self.options.max_nesting {
            return Err(ParseError {
                kind: ParseErrorKind::NestingTooDeep {
                    limit: self.options.max_nesting,
                },
                position: start,
            });
        }

        let key = (start, filter.cloned());
        let cached = self.memo.borrow().get(&key).cloned();
        if let Some(result) = cached {
            return result;
        }

        let result = Frame::new(self, start, level).run(filter);

        // exhaustion depends on the path taken, not on the input
        if !matches!(&result, Err(err) if !err.is_syntax()) {
            self.memo.borrow_mut().insert(key, result.clone());
        }
        result
    }
}

/// Grammar alternatives in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Block,
    String,
    NamedFunction,
    InlineFunction,
    Execution,
    Grouping,
    Identifier,
}

impl Rule {
    const ORDER: [Self; 7] = [
        Self::Block,
        Self::String,
        Self::NamedFunction,
        Self::InlineFunction,
        Self::Execution,
        Self::Grouping,
        Self::Identifier,
    ];

    const fn tag(self) -> Option<NodeKind> {
        match self {
            Self::Block => Some(NodeKind::Block),
            Self::String => Some(NodeKind::String),
            Self::NamedFunction | Self::InlineFunction => Some(NodeKind::FunctionDefinition),
            Self::Execution => Some(NodeKind::Execution),
            Self::Grouping => None,
            Self::Identifier => Some(NodeKind::Identifier),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::String => "string",
            Self::NamedFunction => "named function",
            Self::InlineFunction => "inline function",
            Self::Execution => "execution",
            Self::Grouping => "grouping",
            Self::Identifier => "identifier",
        }
    }

    fn candidates(filter: Option<&NodeFilter>) -> Vec<Self> {
        let Some(filter) = filter else {
            return Self::ORDER.to_vec();
        };

        let mut rules: Vec<Self> = filter
            .kinds
            .iter()
            .flat_map(|kind| {
                Self::ORDER
                    .into_iter()
                    .filter(move |rule| rule.tag() == Some(*kind))
            })
            .collect();
        if filter.fallback {
            rules.push(Self::Grouping);
        }
        rules
    }

    fn apply(self, frame: &mut Frame<'_, '_>) -> Attempt {
        match self {
            Self::Block => frame.block(),
            Self::String => frame.string(),
            Self::NamedFunction => frame.named_function(),
            Self::InlineFunction => frame.inline_function(),
            Self::Execution => frame.execution(),
            Self::Grouping => frame.grouping(),
            Self::Identifier => Ok(frame.identifier()),
        }
    }
}

/// `Ok(None)` is a soft miss: the rule does not apply here.
type Attempt = Result<Option<Node>, ParseError>;

/// One `parse_node` invocation.
struct Frame<'p, 'a> {
    parser: &'p Parser<'a>,
    start: usize,
    level: usize,
    cursor: Cursor,
}

impl<'p, 'a> Frame<'p, 'a> {
    const fn new(parser: &'p Parser<'a>, start: usize, level: usize) -> Self {
        Self {
            parser,
            start,
            level,
            cursor: Cursor::at(start),
        }
    }

    fn run(mut self, filter: Option<&NodeFilter>) -> Result<Parsed, ParseError> {
        let len = self.parser.tokens.len();
        if self.start >= len {
            return match filter {
                None => Ok(Parsed {
                    node: Node::Empty(Empty {
                        position: Position::new(0, len),
                    }),
                    cursor: self.cursor,
                }),
                Some(_) => Err(self.error(ParseErrorKind::Unexpected { found: None })),
            };
        }

        trace!(level = self.level, start = self.start, ?filter, "parse node");
        self.skip_whitespace();

        for rule in Rule::candidates(filter) {
            let snapshot = self.cursor;
            if let Some(node) = rule.apply(&mut self)? {
                trace!(
                    level = self.level,
                    rule = rule.name(),
                    end = self.cursor.token,
                    "rule matched"
                );
                return Ok(Parsed {
                    node,
                    cursor: self.cursor,
                });
            }
            trace!(level = self.level, rule = rule.name(), "rule declined");
            self.cursor = snapshot;
        }

        Err(self.error(ParseErrorKind::Unexpected {
            found: self.peek().map(Token::describe),
        }))
    }

    // -- cursor helpers --

    fn peek(&self) -> Option<&'a Token> {
        let tokens: &'a [Token] = self.parser.tokens;
        tokens.get(self.cursor.token)
    }

    fn peek_is(&self, ty: TokenType) -> bool {
        self.peek().is_some_and(|token| token.is(ty))
    }

    fn take(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.cursor.token += 1;
        self.cursor.account(token);
        Some(token)
    }

    /// Consume the next token without touching quote or bracket state.
    /// Used for a rule's own opening delimiter.
    const fn skip(&mut self) {
        self.cursor.token += 1;
    }

    fn eat(&mut self, ty: TokenType) -> bool {
        if self.peek_is(ty) {
            self.take();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(Token::is_whitespace) {
            self.take();
        }
    }

    const fn position(&self) -> Position {
        Position::new(self.start, self.cursor.token)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            position: self.cursor.token,
        }
    }

    fn expected(&self, expected: &'static str) -> ParseError {
        self.error(ParseErrorKind::ExpectedSeparator {
            expected,
            found: self.peek().map(Token::describe),
        })
    }

    /// Parse a child node here and move past it.
    fn consume_node(&mut self, filter: Option<&NodeFilter>) -> Result<Node, ParseError> {
        let parsed = self
            .parser
            .parse_at(self.cursor.token, filter, self.level + 1)?;
        self.cursor.token = parsed.cursor.token;
        Ok(parsed.node)
    }

    /// Like [`consume_node`](Self::consume_node), but a syntax error is
    /// a soft miss.
    fn probe_node(&mut self, filter: &NodeFilter) -> Attempt {
        match self.consume_node(Some(filter)) {
            Ok(node) => Ok(Some(node)),
            Err(err) if err.is_syntax() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Check that a child is followed by one of a list's delimiters.
    fn expect_delimiter(
        &mut self,
        separator: TokenType,
        closer: TokenType,
        expected: &'static str,
    ) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.peek_is(separator) || self.peek_is(closer) {
            Ok(())
        } else {
            Err(self.expected(expected))
        }
    }

    // -- rules --

    fn block(&mut self) -> Attempt {
        if !self.peek_is(TokenType::OpenCurly) {
            return Ok(None);
        }
        self.skip();

        let mut content = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(token) = self.peek() else {
                return Err(self.expected("; or }"));
            };

            if token.is(TokenType::SemiColon) {
                self.take();
            } else if token.is(TokenType::CloseCurly) {
                self.take();
                return Ok(Some(Node::Block(Block {
                    position: self.position(),
                    content,
                })));
            } else {
                content.push(self.consume_node(None)?);
                self.expect_delimiter(TokenType::SemiColon, TokenType::CloseCurly, "; or }")?;
            }
        }
    }

    fn string(&mut self) -> Attempt {
        let Some(quote) = self
            .peek()
            .and_then(Token::token_type)
            .and_then(TokenType::quote)
        else {
            return Ok(None);
        };
        self.take();

        let mut tokens = Vec::new();
        loop {
            let Some(token) = self.take() else {
                return Err(self.error(ParseErrorKind::UnterminatedString { quote }));
            };
            if !self.cursor.inside_quote() {
                return Ok(Some(Node::String(Str {
                    position: self.position(),
                    tokens,
                })));
            }
            tokens.push(token.clone());
        }
    }

    /// `type name() body`, or `name() { ... }` without a type.
    fn named_function(&mut self) -> Attempt {
        let Some(first) = self.probe_node(&NodeFilter::types())? else {
            return Ok(None);
        };

        let typed = self.peek_is(TokenType::Space);
        let name = if typed {
            self.take();
            // a word followed by a closer or separator is not a definition
            if self.peek().is_none_or(|token| token.text().is_none()) {
                return Ok(None);
            }
            self.function_name()?
        } else {
            match first {
                Node::Identifier(ident) => ident.name,
                _ => return Ok(None),
            }
        };

        // TODO: parse parameters once the parameter syntax is settled
        if !self.eat(TokenType::OpenParen) || !self.eat(TokenType::CloseParen) {
            return Ok(None);
        }
        self.skip_whitespace();

        if !typed && !self.peek_is(TokenType::OpenCurly) {
            return Ok(None);
        }

        let content = self.consume_node(None)?;
        Ok(Some(Node::NamedFunctionDefinition(NamedFunctionDefinition {
            position: self.position(),
            name,
            content: Box::new(content),
        })))
    }

    fn function_name(&mut self) -> Result<String, ParseError> {
        let at = self.cursor.token;
        let found = self.peek().map(Token::describe);
        let invalid = ParseError {
            kind: ParseErrorKind::InvalidFunctionName { found },
            position: at,
        };

        match self.consume_node(Some(&NodeFilter::only(NodeKind::Identifier))) {
            Ok(Node::Identifier(ident)) => Ok(ident.name),
            Ok(_) => Err(invalid),
            Err(err) if err.is_syntax() => Err(invalid),
            Err(err) => Err(err),
        }
    }

    /// `type() => body`.
    fn inline_function(&mut self) -> Attempt {
        if self.probe_node(&NodeFilter::types())?.is_none() {
            return Ok(None);
        }

        if !self.eat(TokenType::OpenParen) || !self.eat(TokenType::CloseParen) {
            return Ok(None);
        }
        self.skip_whitespace();

        if !self.eat(TokenType::Equal) || !self.eat(TokenType::RightChevron) {
            return Ok(None);
        }
        self.skip_whitespace();

        let content = self.consume_node(None)?;
        Ok(Some(Node::InlineFunctionDefinition(
            InlineFunctionDefinition {
                position: self.position(),
                content: Box::new(content),
            },
        )))
    }

    fn execution(&mut self) -> Attempt {
        let Some(func) = self.probe_node(&NodeFilter::executables())? else {
            return Ok(None);
        };

        self.skip_whitespace();
        if !self.peek_is(TokenType::OpenParen) {
            return Ok(None);
        }
        self.skip();

        let mut args = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(token) = self.peek() else {
                return Err(self.expected(", or )"));
            };

            if token.is(TokenType::Comma) {
                self.take();
            } else if token.is(TokenType::CloseParen) {
                self.take();
                return Ok(Some(Node::Execution(Execution {
                    position: self.position(),
                    func: Box::new(func),
                    args,
                })));
            } else {
                args.push(self.consume_node(None)?);
                self.expect_delimiter(TokenType::Comma, TokenType::CloseParen, ", or )")?;
            }
        }
    }

    /// `( node )`, yielding the inner node unwrapped.
    fn grouping(&mut self) -> Attempt {
        if !self.eat(TokenType::OpenParen) {
            return Ok(None);
        }
        let node = self.consume_node(None)?;
        self.skip_whitespace();
        Ok(self.eat(TokenType::CloseParen).then_some(node))
    }

    fn identifier(&mut self) -> Option<Node> {
        match self.take()? {
            Token::Text(text) if is_word(text) => Some(Node::Identifier(Identifier {
                position: self.position(),
                name: text.clone(),
            })),
            _ => None,
        }
    }
}

/// One or more ASCII letters, digits, or underscores.
fn is_word(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
