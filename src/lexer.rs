use crate::token::{Span, Token, classify};

/// Characters that glue onto an adjacent run of the same class,
/// so `+=` lexes as a single raw token.
const COMBINING: [char; 7] = ['=', '+', '-', '*', '/', '^', '%'];

/// Characters that always stand alone as a one-character raw token.
const SEPARATING: [char; 20] = [
    ';', ',', '.', ':', '!', '?', '(', ')', '[', ']', '{', '}', '<', '>', '\\', '\'', '"', '`',
    ' ', '\n',
];

#[must_use]
pub fn is_combining(ch: char) -> bool {
    COMBINING.contains(&ch)
}

#[must_use]
pub fn is_separating(ch: char) -> bool {
    SEPARATING.contains(&ch)
}

/// Split source text into raw, unclassified substrings.
///
/// Concatenating the result reproduces `input` exactly. No raw token
/// is ever empty. A combining run always ends at the next
/// non-combining character, so `a+=b` splits into `a`, `+=`, `b`.
#[must_use]
pub fn split(input: &str) -> Vec<String> {
    Lexer::default().split(input)
}

/// Split and classify source text into tokens.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    split(input).iter().map(|raw| classify(raw)).collect()
}

/// Map a token offset back to a line and column in the source the
/// tokens were produced from.
///
/// Offsets past the end map to the position just after the last token.
#[must_use]
pub fn locate(tokens: &[Token], index: usize) -> Span {
    let mut span = Span { line: 1, column: 1 };
    for token in tokens.iter().take(index) {
        for ch in token.raw().chars() {
            if ch == '\n' {
                span.line += 1;
                span.column = 1;
            } else {
                span.column += 1;
            }
        }
    }
    span
}

#[derive(Default)]
struct Lexer {
    raw: Vec<String>,
    buffer: String,
    combining: bool,
}

impl Lexer {
    fn split(mut self, input: &str) -> Vec<String> {
        for ch in input.chars() {
            if is_combining(ch) {
                // extend an operator run, or end the text run before it
                if !self.combining {
                    self.flush();
                }
                self.buffer.push(ch);
                self.combining = true;
            } else if is_separating(ch) {
                self.flush();
                self.raw.push(ch.to_string());
            } else {
                if self.combining {
                    self.flush();
                }
                self.buffer.push(ch);
            }
        }

        self.flush();
        self.raw
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.raw.push(std::mem::take(&mut self.buffer));
        }
        self.combining = false;
    }
}
