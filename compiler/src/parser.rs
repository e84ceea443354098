use std::io::Read;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    error::{BareError, NameKind},
    tokenizer::{Scanner, Token},
    types::{
        EnumValue, PrimitiveKind, SchemaType, StructField, Type, UnionSubtype, UserDefinedEnum,
        UserDefinedType,
    },
};

lazy_static! {
    static ref USER_TYPE_NAME: Regex = Regex::new(r"^[A-Z][A-Za-z0-9]*$").unwrap();
    static ref USER_ENUM_NAME: Regex = Regex::new(r"^[A-Z][A-Za-z0-9]*$").unwrap();
    static ref FIELD_NAME:     Regex = Regex::new(r"^[a-z][A-Za-z0-9]*$").unwrap();
    static ref ENUM_VALUE:     Regex = Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap();
}

/// Parses a schema document and returns its declarations in document order.
///
/// The first error aborts the whole document; no partial result is returned.
pub fn parse_schema(text: &str) -> Result<Vec<SchemaType>, BareError> {
    Parser::new(text).parse_document()
}

/// Reads a whole schema document from `reader` and parses it.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Vec<SchemaType>, BareError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_schema(&text)
}

struct Parser<'src> {
    scanner: Scanner<'src>,
}

impl<'src> Parser<'src> {
    fn new(text: &'src str) -> Self {
        Parser { scanner: Scanner::new(text) }
    }

    // -- Token helpers --

    /// Reads the next token. Running out of input here is a truncated document.
    fn next(&mut self, expected: &str) -> Result<Token, BareError> {
        match self.scanner.next_token()? {
            Some(token) => Ok(token),
            None => Err(BareError::UnexpectedEndOfInput {
                expected: expected.to_string(),
                location: self.scanner.location(),
            }),
        }
    }

    fn unexpected(&self, got: Token, expected: &str) -> BareError {
        BareError::UnexpectedToken {
            got,
            expected: expected.to_string(),
            location: self.scanner.location(),
        }
    }

    fn expect(&mut self, want: Token, expected: &str) -> Result<(), BareError> {
        let token = self.next(expected)?;
        if token != want {
            return Err(self.unexpected(token, expected));
        }
        Ok(())
    }

    /// Reads a `Name` and checks it against `pattern` right away.
    fn expect_name(&mut self, expected: &str, pattern: &Regex, kind: NameKind) -> Result<String, BareError> {
        match self.next(expected)? {
            Token::Name(name) => self.check_name(name, pattern, kind),
            other => Err(self.unexpected(other, expected)),
        }
    }

    fn check_name(&self, name: String, pattern: &Regex, kind: NameKind) -> Result<String, BareError> {
        if !pattern.is_match(&name) {
            return Err(BareError::InvalidName {
                kind,
                name,
                location: self.scanner.location(),
            });
        }
        Ok(name)
    }

    fn expect_integer(&mut self) -> Result<u64, BareError> {
        match self.next("integer")? {
            Token::Integer(text) => text.parse::<u64>().map_err(|e| BareError::InvalidInteger {
                reason:   e.to_string(),
                text,
                location: self.scanner.location(),
            }),
            other => Err(self.unexpected(other, "integer")),
        }
    }

    /// Resolves an optional `= N` override. Without one, the value is one past
    /// `previous`, or zero for the first entry.
    fn assign_value(&mut self, previous: Option<u64>) -> Result<u64, BareError> {
        let token = self.next("'=' or next entry")?;
        if token == Token::Equal {
            return self.expect_integer();
        }
        self.scanner.push_back(token);
        match previous {
            None => Ok(0),
            Some(value) => value.checked_add(1).ok_or_else(|| BareError::InvalidInteger {
                text:     value.to_string(),
                reason:   "implicit successor overflows u64".to_string(),
                location: self.scanner.location(),
            }),
        }
    }

    // -- Grammar productions --

    /// document = declaration*
    fn parse_document(&mut self) -> Result<Vec<SchemaType>, BareError> {
        let mut types = Vec::new();
        // End of input between declarations is the only clean way out.
        while let Some(token) = self.scanner.next_token()? {
            self.scanner.push_back(token);
            let declaration = self.parse_schema_type()?;
            debug!(name = declaration.name(), "parsed declaration");
            types.push(declaration);
        }
        Ok(types)
    }

    /// declaration = 'type' Name type | 'enum' Name [kind] '{' value+ '}'
    fn parse_schema_type(&mut self) -> Result<SchemaType, BareError> {
        match self.next("'type' or 'enum'")? {
            Token::Type => self.parse_user_type().map(SchemaType::UserType),
            Token::Enum => self.parse_user_enum().map(SchemaType::UserEnum),
            other => Err(self.unexpected(other, "'type' or 'enum'")),
        }
    }

    fn parse_user_type(&mut self) -> Result<UserDefinedType, BareError> {
        let name = self.expect_name("type name", &USER_TYPE_NAME, NameKind::UserType)?;
        let type_ = self.parse_type()?;
        Ok(UserDefinedType { name, type_ })
    }

    fn parse_user_enum(&mut self) -> Result<UserDefinedEnum, BareError> {
        let name = self.expect_name("enum name", &USER_ENUM_NAME, NameKind::UserEnum)?;

        let kind = match self.next("enum kind or '{'")? {
            Token::Uint => PrimitiveKind::Uint,
            Token::U8   => PrimitiveKind::U8,
            Token::U16  => PrimitiveKind::U16,
            Token::U32  => PrimitiveKind::U32,
            Token::U64  => PrimitiveKind::U64,
            other => {
                self.scanner.push_back(other);
                PrimitiveKind::Uint
            }
        };
        let max = kind.unsigned_max().unwrap_or(u64::MAX);

        self.expect(Token::LBrace, "'{'")?;

        let mut values: Vec<EnumValue> = Vec::new();
        loop {
            let value_name = self.expect_name("value name", &ENUM_VALUE, NameKind::EnumValue)?;
            let value = self.assign_value(values.last().map(|ev| ev.value))?;
            if value > max {
                return Err(BareError::InvalidInteger {
                    text:     value.to_string(),
                    reason:   format!("value of {} does not fit {}", value_name, kind.keyword()),
                    location: self.scanner.location(),
                });
            }
            values.push(EnumValue { name: value_name, value });

            match self.next("value name or '}'")? {
                Token::RBrace => break,
                token @ Token::Name(_) => self.scanner.push_back(token),
                other => return Err(self.unexpected(other, "value name or '}'")),
            }
        }

        Ok(UserDefinedEnum { name, kind, values })
    }

    fn parse_type(&mut self) -> Result<Type, BareError> {
        let token = self.next("type")?;
        let primitive = match token {
            Token::Uint   => PrimitiveKind::Uint,
            Token::U8     => PrimitiveKind::U8,
            Token::U16    => PrimitiveKind::U16,
            Token::U32    => PrimitiveKind::U32,
            Token::U64    => PrimitiveKind::U64,
            Token::Int    => PrimitiveKind::Int,
            Token::I8     => PrimitiveKind::I8,
            Token::I16    => PrimitiveKind::I16,
            Token::I32    => PrimitiveKind::I32,
            Token::I64    => PrimitiveKind::I64,
            Token::F32    => PrimitiveKind::F32,
            Token::F64    => PrimitiveKind::F64,
            Token::Bool   => PrimitiveKind::Bool,
            Token::String => PrimitiveKind::String,
            Token::Void   => PrimitiveKind::Void,
            Token::Optional => return self.parse_optional_type(),
            Token::Data     => return self.parse_data_type(),
            Token::Map      => return self.parse_map_type(),
            Token::LBracket => return self.parse_array_type(),
            Token::LParen   => return self.parse_union_type(),
            Token::LBrace   => return self.parse_struct_type(),
            Token::Name(name) => return Ok(Type::Named { name }),
            other => return Err(self.unexpected(other, "type")),
        };
        Ok(Type::Primitive { primitive })
    }

    /// 'optional' '<' type '>'
    fn parse_optional_type(&mut self) -> Result<Type, BareError> {
        self.expect(Token::LAngle, "'<'")?;
        let subtype = self.parse_type()?;
        self.expect(Token::RAngle, "'>'")?;
        Ok(Type::Optional { subtype: Box::new(subtype) })
    }

    /// 'data' ['<' integer '>']
    fn parse_data_type(&mut self) -> Result<Type, BareError> {
        // A bare `data` may be the last thing in the document.
        let token = match self.scanner.next_token()? {
            Some(token) => token,
            None => return Ok(Type::Data { length: None }),
        };
        if token != Token::LAngle {
            self.scanner.push_back(token);
            return Ok(Type::Data { length: None });
        }
        let length = self.expect_integer()?;
        self.expect(Token::RAngle, "'>'")?;
        Ok(Type::Data { length: Some(length) })
    }

    /// 'map' '[' type ']' type
    fn parse_map_type(&mut self) -> Result<Type, BareError> {
        self.expect(Token::LBracket, "'['")?;
        let key = self.parse_type()?;
        self.expect(Token::RBracket, "']'")?;
        let value = self.parse_type()?;
        Ok(Type::Map { key: Box::new(key), value: Box::new(value) })
    }

    /// '[' [integer] ']' type
    fn parse_array_type(&mut self) -> Result<Type, BareError> {
        let length = match self.next("integer or ']'")? {
            Token::RBracket => None,
            token @ Token::Integer(_) => {
                self.scanner.push_back(token);
                let length = self.expect_integer()?;
                self.expect(Token::RBracket, "']'")?;
                Some(length)
            }
            other => return Err(self.unexpected(other, "integer or ']'")),
        };
        let member = self.parse_type()?;
        Ok(Type::Array { member: Box::new(member), length })
    }

    /// '(' type ['=' integer] ('|' type ['=' integer])* ')'
    fn parse_union_type(&mut self) -> Result<Type, BareError> {
        let mut types: Vec<UnionSubtype> = Vec::new();
        loop {
            let type_ = self.parse_type()?;
            let tag = self.assign_value(types.last().map(|st| st.tag))?;
            types.push(UnionSubtype { type_, tag });

            match self.next("'|' or ')'")? {
                Token::Pipe   => continue,
                Token::RParen => break,
                other => return Err(self.unexpected(other, "'|' or ')'")),
            }
        }
        Ok(Type::Union { types })
    }

    /// '{' (Name ':' type)* '}'
    fn parse_struct_type(&mut self) -> Result<Type, BareError> {
        let mut fields = Vec::new();
        loop {
            let name = match self.next("field name or '}'")? {
                Token::RBrace => break,
                Token::Name(name) => self.check_name(name, &FIELD_NAME, NameKind::Field)?,
                other => return Err(self.unexpected(other, "field name or '}'")),
            };
            self.expect(Token::Colon, "':'")?;
            let type_ = self.parse_type()?;
            fields.push(StructField { name, type_ });
        }
        Ok(Type::Struct { fields })
    }
}
