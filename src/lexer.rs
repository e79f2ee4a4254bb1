use crate::error::{Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Float,
    Boolean,
    String,
    LeftCurly,
    RightCurly,
    LeftBracket,
    RightBracket,
    Equal,
    Comma,
    End,
    Unexpected,
}

impl TokenKind {
    /// Human-readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "an identifier",
            TokenKind::Integer => "an integer",
            TokenKind::Float => "a float",
            TokenKind::Boolean => "a boolean",
            TokenKind::String => "a string",
            TokenKind::LeftCurly => "'{'",
            TokenKind::RightCurly => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Equal => "'='",
            TokenKind::Comma => "','",
            TokenKind::End => "end of input",
            TokenKind::Unexpected => "an unrecognized character",
        }
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Integer | TokenKind::Float | TokenKind::Boolean | TokenKind::String
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Span,
    /// Source text covered by `span`.
    pub text: &'a str,
    /// Position of the token's first byte.
    pub position: Position,
}

/// Pull-based tokenizer: each call to [`Lexer::next_token`] yields one token.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            line: 0,
            column: 0,
            finished: false,
        }
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.pos,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_byte_at(&self, ahead: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + ahead).copied()
    }

    fn bump(&mut self) {
        if let Some(byte) = self.peek_byte() {
            self.pos += 1;
            if byte == b'\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    fn bump_while(&mut self, pred: impl Fn(u8) -> bool) {
        while let Some(byte) = self.peek_byte() {
            if !pred(byte) {
                break;
            }
            self.bump();
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.bump_while(|b| b.is_ascii_whitespace());
            if self.peek_byte() == Some(b'#') {
                self.bump_while(|b| b != b'\n');
            } else {
                break;
            }
        }
    }

    fn make(&self, kind: TokenKind, start: Position) -> Token<'a> {
        Token {
            kind,
            span: Span {
                start: start.offset,
                end: self.pos,
            },
            text: &self.input[start.offset..self.pos],
            position: start,
        }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_trivia();
        let start = self.cursor();

        let Some(byte) = self.peek_byte() else {
            self.finished = true;
            return self.make(TokenKind::End, start);
        };

        let kind = match byte {
            b'{' => self.atom(TokenKind::LeftCurly),
            b'}' => self.atom(TokenKind::RightCurly),
            b'[' => self.atom(TokenKind::LeftBracket),
            b']' => self.atom(TokenKind::RightBracket),
            b'=' => self.atom(TokenKind::Equal),
            b',' => self.atom(TokenKind::Comma),
            b'"' => self.string(),
            b'-' if self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.bump();
                self.number()
            }
            b if b.is_ascii_digit() => self.number(),
            b if b.is_ascii_alphabetic() || b == b'_' => self.identifier(start),
            _ => {
                // Consume the whole character so the token text stays valid UTF-8.
                let width = self.input[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                for _ in 0..width {
                    self.bump();
                }
                TokenKind::Unexpected
            }
        };

        self.make(kind, start)
    }

    fn atom(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn identifier(&mut self, start: Position) -> TokenKind {
        self.bump_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        match &self.input[start.offset..self.pos] {
            "true" | "false" => TokenKind::Boolean,
            _ => TokenKind::Identifier,
        }
    }

    fn number(&mut self) -> TokenKind {
        let digits_start = self.pos;
        self.bump_while(|b| b.is_ascii_digit() || b == b'.');
        let run = &self.input[digits_start..self.pos];
        match run.bytes().filter(|&b| b == b'.').count() {
            0 => TokenKind::Integer,
            1 => TokenKind::Float,
            _ => TokenKind::Unexpected,
        }
    }

    /// The span runs through the closing quote, or to end of input when
    /// there is none.
    fn string(&mut self) -> TokenKind {
        self.bump();
        self.bump_while(|b| b != b'"');
        self.bump();
        TokenKind::String
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            None
        } else {
            Some(self.next_token())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_assignment_tokens() {
        assert_eq!(
            kinds("name = \"x\", n = 1"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::String,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Integer,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_comments_and_whitespace_are_skipped() {
        assert_eq!(
            kinds("# header\n  a # trailing\n\t# only a comment"),
            vec![TokenKind::Identifier, TokenKind::End]
        );
    }

    #[test]
    fn test_booleans_are_classified() {
        assert_eq!(
            kinds("true false truth"),
            vec![
                TokenKind::Boolean,
                TokenKind::Boolean,
                TokenKind::Identifier,
                TokenKind::End
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42"), vec![TokenKind::Integer, TokenKind::End]);
        assert_eq!(kinds("-42"), vec![TokenKind::Integer, TokenKind::End]);
        assert_eq!(kinds("0.5"), vec![TokenKind::Float, TokenKind::End]);
        assert_eq!(kinds("-1."), vec![TokenKind::Float, TokenKind::End]);
        assert_eq!(kinds("1.2.3"), vec![TokenKind::Unexpected, TokenKind::End]);
        assert_eq!(
            kinds("- 1"),
            vec![TokenKind::Unexpected, TokenKind::Integer, TokenKind::End]
        );
    }

    #[test]
    fn test_string_span_includes_quotes() {
        let token = Lexer::new("  \"a \\ b\" ").next_token();
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.text, "\"a \\ b\"");
        assert_eq!(token.span, Span { start: 2, end: 9 });
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let mut lexer = Lexer::new("\"abc\ndef");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.text, "\"abc\ndef");
        assert_eq!(lexer.next_token().kind, TokenKind::End);
    }

    #[test]
    fn test_positions_track_lines() {
        let tokens: Vec<_> = Lexer::new("a\n  bb = 1").collect();
        assert_eq!(tokens[1].text, "bb");
        assert_eq!(tokens[1].position.line, 1);
        assert_eq!(tokens[1].position.column, 2);
        assert_eq!(tokens[1].position.offset, 4);
    }

    #[test]
    fn test_cursor_advances_past_each_token() {
        let mut lexer = Lexer::new("ab =\n 1");
        assert_eq!(lexer.cursor(), Position::default());
        lexer.next_token();
        assert_eq!(lexer.cursor().offset, 2);
        lexer.next_token();
        lexer.next_token();
        let end = lexer.cursor();
        assert_eq!((end.line, end.column, end.offset), (1, 2, 7));
    }

    #[test]
    fn test_non_ascii_is_one_unexpected_token() {
        let token = Lexer::new("é = 1").next_token();
        assert_eq!(token.kind, TokenKind::Unexpected);
        assert_eq!(token.text, "é");
    }
}
