use std::collections::VecDeque;
use std::fmt;

use logos::{Lexer, Logos};
use tracing::trace;

use crate::error::{BareError, Location};

/// A single lexical token of a BARE schema document.
///
/// `Name` covers user type names, field names and enum value names alike;
/// telling them apart is the parser's job.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("type")]
    Type,
    #[token("enum")]
    Enum,

    #[token("uint")]
    Uint,
    #[token("u8")]
    U8,
    #[token("u16")]
    U16,
    #[token("u32")]
    U32,
    #[token("u64")]
    U64,
    #[token("int")]
    Int,
    #[token("i8")]
    I8,
    #[token("i16")]
    I16,
    #[token("i32")]
    I32,
    #[token("i64")]
    I64,
    #[token("f32")]
    F32,
    #[token("f64")]
    F64,
    #[token("bool")]
    Bool,
    #[token("string")]
    String,
    #[token("data")]
    Data,
    #[token("void")]
    Void,
    #[token("optional")]
    Optional,
    #[token("map")]
    Map,

    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("|")]
    Pipe,
    #[token("=")]
    Equal,
    #[token(":")]
    Colon,

    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Name(std::string::String),
    #[regex(r"[0-9]+", |lex| lex.slice().to_owned())]
    Integer(std::string::String),
}

impl Token {
    /// The literal text carried by `Name` and `Integer`; empty for every other token.
    pub fn literal(&self) -> &str {
        match self {
            Token::Name(text) | Token::Integer(text) => text,
            _ => "",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Type     => "type",
            Token::Enum     => "enum",
            Token::Uint     => "uint",
            Token::U8       => "u8",
            Token::U16      => "u16",
            Token::U32      => "u32",
            Token::U64      => "u64",
            Token::Int      => "int",
            Token::I8       => "i8",
            Token::I16      => "i16",
            Token::I32      => "i32",
            Token::I64      => "i64",
            Token::F32      => "f32",
            Token::F64      => "f64",
            Token::Bool     => "bool",
            Token::String   => "string",
            Token::Data     => "data",
            Token::Void     => "void",
            Token::Optional => "optional",
            Token::Map      => "map",
            Token::LAngle   => "<",
            Token::RAngle   => ">",
            Token::LBrace   => "{",
            Token::RBrace   => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LParen   => "(",
            Token::RParen   => ")",
            Token::Pipe     => "|",
            Token::Equal    => "=",
            Token::Colon    => ":",
            Token::Name(text) | Token::Integer(text) => text,
        };
        f.write_str(text)
    }
}

/// Reads tokens from a schema document one at a time.
///
/// Tokens handed to [`Scanner::push_back`] are replayed first-in first-out
/// before any fresh input is read. The grammar never needs more than one
/// token of lookahead.
pub struct Scanner<'src> {
    lexer:      Lexer<'src, Token>,
    pushback:   VecDeque<(Token, Location)>,
    location:   Location,
    scanned:    usize,
    line:       usize,
    line_start: usize,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Scanner {
            lexer:      Token::lexer(source),
            pushback:   VecDeque::with_capacity(1),
            location:   Location::new(1, 1),
            scanned:    0,
            line:       1,
            line_start: 0,
        }
    }

    /// Returns the next token, or `Ok(None)` once the document is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, BareError> {
        if let Some((token, location)) = self.pushback.pop_front() {
            self.location = location;
            return Ok(Some(token));
        }

        match self.lexer.next() {
            None => {
                let end = self.lexer.source().len();
                self.location = self.locate(end);
                Ok(None)
            }
            Some(result) => {
                let start = self.lexer.span().start;
                self.location = self.locate(start);
                match result {
                    Ok(token) => Ok(Some(token)),
                    Err(()) => Err(BareError::UnknownToken {
                        token:    self.lexer.slice().chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
                        location: self.location,
                    }),
                }
            }
        }
    }

    /// Queues `token` so a later `next_token` returns it before reading fresh input.
    pub fn push_back(&mut self, token: Token) {
        trace!(%token, "push back");
        self.pushback.push_back((token, self.location));
    }

    /// Location of the token most recently returned by `next_token`.
    pub fn location(&self) -> Location {
        self.location
    }

    fn locate(&mut self, offset: usize) -> Location {
        let source = self.lexer.source();
        for (i, ch) in source[self.scanned..offset].char_indices() {
            if ch == '\n' {
                self.line += 1;
                self.line_start = self.scanned + i + 1;
            }
        }
        self.scanned = offset;
        Location::new(self.line, source[self.line_start..offset].chars().count() + 1)
    }
}
