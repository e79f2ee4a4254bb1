use tracing::{debug, trace};

use crate::error::Error;
use crate::group::{Group, InsertError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::tree::{Array, ArrayValues, Kind, Node, Scalar};

/// Initial capacity of an array's element buffer; it doubles when full.
const ARRAY_INITIAL_CAPACITY: usize = 4;

/// Knobs for [`parse_with_options`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Maximum number of nested groups below the root. `None` accepts any
    /// depth; set it to cap the memory spent on untrusted input.
    pub max_depth: Option<usize>,
}

/// A group whose body is still being parsed. The stack of open frames is
/// the parent chain: closing a frame inserts its group into the frame below
/// (or the root).
struct Frame<'a> {
    name: Token<'a>,
    group: Group,
}

/// Parser state: the token stream plus the scope stack.
struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token<'a>>,
    options: &'a ParseOptions,
    root: Group,
    open: Vec<Frame<'a>>,
}

/// Parse a Noodle document into its root group.
pub fn parse(input: &str) -> Result<Group, Error> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Group, Error> {
    debug!(len = input.len(), "parsing document");
    let parser = Parser {
        lexer: Lexer::new(input),
        peeked: None,
        options,
        root: Group::new(),
        open: Vec::new(),
    };
    match parser.parse_document() {
        Ok(root) => {
            debug!(entries = root.count(), "parsed document");
            Ok(root)
        }
        Err(err) => {
            debug!(code = err.code(), "parse failed: {}", err);
            Err(err)
        }
    }
}

fn unexpected(token: &Token<'_>, expected: impl Into<String>) -> Error {
    Error::UnexpectedToken {
        found: token.text.to_string(),
        expected: expected.into(),
        position: token.position,
        span: token.span,
    }
}

impl<'a> Parser<'a> {
    // ── Tokens ──────────────────────────────────────────────────────

    fn next(&mut self) -> Token<'a> {
        match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Token<'a> {
        match self.peeked {
            Some(token) => token,
            None => {
                let token = self.lexer.next_token();
                self.peeked = Some(token);
                token
            }
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.peeked = None;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, Error> {
        let token = self.next();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(&token, kind.describe()))
        }
    }

    // ── Scope ───────────────────────────────────────────────────────

    fn current(&mut self) -> &mut Group {
        match self.open.last_mut() {
            Some(frame) => &mut frame.group,
            None => &mut self.root,
        }
    }

    fn insert(&mut self, name: &Token<'a>, node: Node) -> Result<(), Error> {
        self.current()
            .insert(name.text, node)
            .map_err(|err| match err {
                InsertError::Duplicate(name_text) => Error::DuplicateName {
                    name: name_text,
                    position: name.position,
                },
                InsertError::OutOfMemory(_) => Error::OutOfMemory,
            })
    }

    // ── Document ────────────────────────────────────────────────────

    fn parse_document(mut self) -> Result<Group, Error> {
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::Identifier => self.parse_assignment(token)?,
                TokenKind::RightCurly => self.close_group(&token)?,
                TokenKind::End => {
                    if self.open.is_empty() {
                        return Ok(self.root);
                    }
                    return Err(unexpected(&token, TokenKind::RightCurly.describe()));
                }
                _ if self.open.is_empty() => {
                    return Err(unexpected(&token, TokenKind::Identifier.describe()));
                }
                _ => return Err(unexpected(&token, "an identifier or '}'")),
            }
        }
    }

    fn parse_assignment(&mut self, name: Token<'a>) -> Result<(), Error> {
        self.expect(TokenKind::Equal)?;
        let token = self.next();
        match token.kind {
            kind if kind.is_literal() => {
                let scalar = convert_literal(&token)?;
                self.insert(&name, Node::Scalar(scalar))?;
            }
            TokenKind::LeftCurly => return self.open_group(name, &token),
            TokenKind::LeftBracket => {
                let array = self.parse_array()?;
                self.insert(&name, Node::Array(array))?;
            }
            _ => return Err(unexpected(&token, "a value")),
        }
        self.eat(TokenKind::Comma);
        Ok(())
    }

    fn open_group(&mut self, name: Token<'a>, brace: &Token<'a>) -> Result<(), Error> {
        if self.current().contains(name.text) {
            return Err(Error::DuplicateName {
                name: name.text.to_string(),
                position: name.position,
            });
        }
        if let Some(limit) = self.options.max_depth {
            if self.open.len() >= limit {
                return Err(Error::DepthLimit {
                    limit,
                    position: brace.position,
                });
            }
        }
        trace!(name = name.text, depth = self.open.len() + 1, "open group");
        self.open.try_reserve(1)?;
        self.open.push(Frame {
            name,
            group: Group::new(),
        });
        Ok(())
    }

    fn close_group(&mut self, brace: &Token<'a>) -> Result<(), Error> {
        let Some(frame) = self.open.pop() else {
            return Err(unexpected(brace, TokenKind::Identifier.describe()));
        };
        trace!(
            name = frame.name.text,
            entries = frame.group.count(),
            "close group"
        );
        self.insert(&frame.name, Node::Group(frame.group))?;
        self.eat(TokenKind::Comma);
        Ok(())
    }

    // ── Arrays ──────────────────────────────────────────────────────

    fn parse_array(&mut self) -> Result<Array, Error> {
        let first = self.next();
        if !first.kind.is_literal() {
            return Err(unexpected(&first, "an array element"));
        }
        let mut builder = ArrayBuilder::new(convert_literal(&first)?)?;

        loop {
            let token = self.next();
            match token.kind {
                TokenKind::RightBracket => break,
                TokenKind::Comma => {
                    if self.eat(TokenKind::RightBracket) {
                        break;
                    }
                    let element = self.next();
                    if element.kind != builder.token_kind() {
                        return Err(unexpected(&element, builder.kind().to_string()));
                    }
                    builder.push(convert_literal(&element)?)?;
                }
                _ => return Err(unexpected(&token, "',' or ']'")),
            }
        }

        let array = builder.finish();
        trace!(kind = %array.kind(), len = array.count(), "parsed array");
        Ok(array)
    }
}

/// Growable element buffer whose kind is fixed by the first element.
struct ArrayBuilder {
    values: ArrayValues,
}

impl ArrayBuilder {
    fn new(first: Scalar) -> Result<Self, Error> {
        let mut builder = ArrayBuilder {
            values: match first.kind() {
                Kind::Integer => ArrayValues::Integer(Vec::new()),
                Kind::Float => ArrayValues::Float(Vec::new()),
                Kind::Boolean => ArrayValues::Boolean(Vec::new()),
                _ => ArrayValues::String(Vec::new()),
            },
        };
        builder.push(first)?;
        Ok(builder)
    }

    fn kind(&self) -> Kind {
        match self.values {
            ArrayValues::Integer(_) => Kind::Integer,
            ArrayValues::Float(_) => Kind::Float,
            ArrayValues::Boolean(_) => Kind::Boolean,
            ArrayValues::String(_) => Kind::String,
        }
    }

    fn token_kind(&self) -> TokenKind {
        match self.values {
            ArrayValues::Integer(_) => TokenKind::Integer,
            ArrayValues::Float(_) => TokenKind::Float,
            ArrayValues::Boolean(_) => TokenKind::Boolean,
            ArrayValues::String(_) => TokenKind::String,
        }
    }

    /// The caller has already checked that `value` matches the array kind.
    fn push(&mut self, value: Scalar) -> Result<(), Error> {
        match (&mut self.values, value) {
            (ArrayValues::Integer(v), Scalar::Integer(n)) => push_grow(v, n),
            (ArrayValues::Float(v), Scalar::Float(n)) => push_grow(v, n),
            (ArrayValues::Boolean(v), Scalar::Boolean(b)) => push_grow(v, b),
            (ArrayValues::String(v), Scalar::String(s)) => push_grow(v, s),
            _ => unreachable!("array element kind checked before push"),
        }
    }

    fn finish(self) -> Array {
        Array::new(self.values)
    }
}

fn push_grow<T>(values: &mut Vec<T>, value: T) -> Result<(), Error> {
    if values.len() == values.capacity() {
        let additional = values.capacity().max(ARRAY_INITIAL_CAPACITY);
        values.try_reserve_exact(additional)?;
    }
    values.push(value);
    Ok(())
}

/// Convert a literal token to its native value.
fn convert_literal(token: &Token<'_>) -> Result<Scalar, Error> {
    match token.kind {
        TokenKind::Integer => token
            .text
            .parse::<i32>()
            .map(Scalar::Integer)
            .map_err(|_| unexpected(token, "an integer in 32-bit range")),
        TokenKind::Float => match token.text.parse::<f32>() {
            Ok(n) if n.is_finite() => Ok(Scalar::Float(n)),
            _ => Err(unexpected(token, "a float in 32-bit range")),
        },
        TokenKind::Boolean => Ok(Scalar::Boolean(token.text == "true")),
        TokenKind::String => {
            let text = token.text;
            if text.len() < 2 || !text.ends_with('"') {
                return Err(unexpected(token, "a closing '\"'"));
            }
            Ok(Scalar::String(text[1..text.len() - 1].to_string()))
        }
        _ => Err(unexpected(token, "a literal")),
    }
}
