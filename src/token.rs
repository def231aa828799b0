use std::fmt;

/// Source location for error reporting (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

/// Broad token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Arbitrary run of characters with no entry in the symbol table.
    Text,
    /// Single punctuation or operator character.
    Symbol,
    /// Space or newline.
    Whitespace,
}

/// Specific symbol carried by `Symbol` and `Whitespace` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Equal,

    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,

    SemiColon,
    Comma,
    Period,
    Colon,

    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenCurly,
    CloseCurly,
    LeftChevron,
    RightChevron,

    Backslash,
    SingleQuote,
    DoubleQuote,
    BackQuote,

    Space,
    Newline,
}

/// Character that opened a quoted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteType {
    /// `'hi'`
    Single,
    /// `"hi"`
    Double,
    /// `` `hi` ``
    Back,
}

/// Every classifiable symbol with its source character.
pub const SYMBOLS: [(char, TokenType); 25] = [
    ('=', TokenType::Equal),
    ('+', TokenType::Add),
    ('-', TokenType::Sub),
    ('*', TokenType::Mul),
    ('/', TokenType::Div),
    ('^', TokenType::Pow),
    ('%', TokenType::Mod),
    (';', TokenType::SemiColon),
    (',', TokenType::Comma),
    ('.', TokenType::Period),
    (':', TokenType::Colon),
    ('(', TokenType::OpenParen),
    (')', TokenType::CloseParen),
    ('[', TokenType::OpenSquare),
    (']', TokenType::CloseSquare),
    ('{', TokenType::OpenCurly),
    ('}', TokenType::CloseCurly),
    ('<', TokenType::LeftChevron),
    ('>', TokenType::RightChevron),
    ('\\', TokenType::Backslash),
    ('\'', TokenType::SingleQuote),
    ('"', TokenType::DoubleQuote),
    ('`', TokenType::BackQuote),
    (' ', TokenType::Space),
    ('\n', TokenType::Newline),
];

impl TokenType {
    /// Look up the symbol for a single character.
    #[must_use]
    pub fn from_char(ch: char) -> Option<Self> {
        SYMBOLS.iter().find(|(c, _)| *c == ch).map(|(_, ty)| *ty)
    }

    /// Source character of this symbol.
    #[must_use]
    pub fn as_char(self) -> char {
        SYMBOLS
            .iter()
            .find(|(_, ty)| *ty == self)
            .map_or('?', |(c, _)| *c)
    }

    #[must_use]
    pub const fn kind(self) -> TokenKind {
        match self {
            Self::Space | Self::Newline => TokenKind::Whitespace,
            _ => TokenKind::Symbol,
        }
    }

    /// Quote style opened or closed by this symbol, if any.
    #[must_use]
    pub const fn quote(self) -> Option<QuoteType> {
        match self {
            Self::SingleQuote => Some(QuoteType::Single),
            Self::DoubleQuote => Some(QuoteType::Double),
            Self::BackQuote => Some(QuoteType::Back),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_opening_bracket(self) -> bool {
        matches!(self, Self::OpenParen | Self::OpenSquare | Self::OpenCurly)
    }

    #[must_use]
    pub const fn is_closing_bracket(self) -> bool {
        matches!(self, Self::CloseParen | Self::CloseSquare | Self::CloseCurly)
    }
}

impl QuoteType {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
            Self::Back => '`',
        }
    }
}

/// A classified lexer token.
///
/// Symbols and whitespace carry their [`TokenType`], everything else
/// carries the raw text it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Text(String),
    Symbol(TokenType),
}

impl Token {
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Text(_) => TokenKind::Text,
            Self::Symbol(ty) => ty.kind(),
        }
    }

    /// Symbol type; `None` for text tokens.
    #[must_use]
    pub const fn token_type(&self) -> Option<TokenType> {
        match self {
            Self::Text(_) => None,
            Self::Symbol(ty) => Some(*ty),
        }
    }

    /// Text content; `None` for symbol and whitespace tokens.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Symbol(_) => None,
        }
    }

    #[must_use]
    pub fn is(&self, ty: TokenType) -> bool {
        self.token_type() == Some(ty)
    }

    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.kind() == TokenKind::Whitespace
    }

    /// Exact source substring this token was classified from.
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Symbol(ty) => ty.as_char().to_string(),
        }
    }

    /// Name used in diagnostics: `space`, `newline`, `;`, `token foo`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) => format!("token {text}"),
            Self::Symbol(TokenType::Space) => "space".to_string(),
            Self::Symbol(TokenType::Newline) => "newline".to_string(),
            Self::Symbol(ty) => ty.as_char().to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "token<Text>{{ {text} }}"),
            Self::Symbol(ty) => write!(f, "token<{:?}>{{ {ty:?} }}", ty.kind()),
        }
    }
}

/// Classify one raw substring.
///
/// Only single characters present in [`SYMBOLS`] become symbols; any
/// other substring, including multi-character operator runs, is text.
#[must_use]
pub fn classify(raw: &str) -> Token {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => {
            TokenType::from_char(ch).map_or_else(|| Token::Text(raw.to_string()), Token::Symbol)
        }
        _ => Token::Text(raw.to_string()),
    }
}
