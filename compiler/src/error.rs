use std::fmt;

use thiserror::Error;

use crate::tokenizer::Token;

/// A 1-based position in a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line:   usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Which naming rule an identifier was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    UserType,
    UserEnum,
    Field,
    EnumValue,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NameKind::UserType  => "user type",
            NameKind::UserEnum  => "user enum",
            NameKind::Field     => "field",
            NameKind::EnumValue => "enum value",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum BareError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown token '{token}' at {location}")]
    UnknownToken {
        token:    char,
        location: Location,
    },

    #[error("Unexpected token '{got}' at {location}; expected {expected}")]
    UnexpectedToken {
        got:      Token,
        expected: String,
        location: Location,
    },

    #[error("Unexpected end of input at {location}; expected {expected}")]
    UnexpectedEndOfInput {
        expected: String,
        location: Location,
    },

    #[error("Invalid name for {kind} \"{name}\" at {location}")]
    InvalidName {
        kind:     NameKind,
        name:     String,
        location: Location,
    },

    #[error("Invalid integer \"{text}\" at {location}: {reason}")]
    InvalidInteger {
        text:     String,
        reason:   String,
        location: Location,
    },

    #[error("Unsupported native kind {0}")]
    UnsupportedKind(String),

    #[error("Output formatting error: {0}")]
    Format(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_token_names_the_character() {
        let err = BareError::UnknownToken { token: '@', location: Location::new(1, 5) };
        assert_eq!(err.to_string(), "Unknown token '@' at line 1, column 5");
    }

    #[test]
    fn unexpected_token_uses_schema_spelling() {
        let err = BareError::UnexpectedToken {
            got:      Token::RBrace,
            expected: "value name".into(),
            location: Location::new(2, 1),
        };
        assert_eq!(err.to_string(), "Unexpected token '}' at line 2, column 1; expected value name");
    }

    #[test]
    fn invalid_name_reports_the_rule() {
        let err = BareError::InvalidName {
            kind:     NameKind::UserType,
            name:     "foo".into(),
            location: Location::new(1, 6),
        };
        assert!(err.to_string().contains("user type \"foo\""));
    }
}
