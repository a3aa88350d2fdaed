use common::{source::SourceRange, string_map::StringIndex};
use errors::ErrorType;
use lexer::TokenKind;

#[derive(Clone, Debug)]
pub enum Error {
    ExpectedDefinition {
        source: SourceRange,
        token: TokenKind,
    },

    ExpectedToken {
        source: SourceRange,
        found: TokenKind,
        expected: TokenKind,
    },

    ExpectedIdentifier {
        source: SourceRange,
        token: TokenKind,
    },

    ExpectedExpression {
        source: SourceRange,
        token: TokenKind,
    },

    ExpectedOperator {
        source: SourceRange,
        token: TokenKind,
    },

    ExpectedNumericTypeSuffix {
        source: SourceRange,
    },

    ExpectedNumericType {
        source: SourceRange,
        found: StringIndex,
    },

    NumberTooLarge {
        source: SourceRange,
    },
}


impl ErrorType for Error {
    fn display(&self, fmt: &mut errors::fmt::ErrorFormatter) {
        match self {
            Error::ExpectedDefinition { source, token } => {
                fmt.error("Expected a definition")
                    .highlight_with_note(
                        *source,
                        &format!("expected 'struct', 'enum' or 'fn', found '{token:?}'"),
                    )
            },


            Error::ExpectedToken { source, found, expected } => {
                fmt.error("Expected a different token")
                    .highlight_with_note(
                        *source,
                        &format!("expected {expected:?}, found '{found:?}'"),
                    )
            },


            Error::ExpectedIdentifier { source, token } => {
                fmt.error("Expected an identifier")
                    .highlight_with_note(
                        *source,
                        &format!("expected an identifier, found '{token:?}'"),
                    )
            },


            Error::ExpectedExpression { source, token } => {
                fmt.error("Expected an expression")
                    .highlight_with_note(
                        *source,
                        &format!("expected an expression, found '{token:?}'"),
                    )
            },


            Error::ExpectedOperator { source, token } => {
                fmt.error("Expected an operator")
                    .highlight_with_note(
                        *source,
                        &format!("expected an operator, ';' or '}}', found '{token:?}'"),
                    )
            },


            Error::ExpectedNumericTypeSuffix { source } => {
                fmt.error("Expected a numeric type suffix")
                    .highlight_with_note(
                        *source,
                        "a numeric literal requires an '_i32' or '_f64' suffix",
                    )
            },


            Error::ExpectedNumericType { source, found } => {
                let found = fmt.string(*found).to_string();
                fmt.error("Expected a numeric type")
                    .highlight_with_note(
                        *source,
                        &format!("'{found}' is not a valid numeric type here; expected 'i32' or 'f64'"),
                    )
            },


            Error::NumberTooLarge { source } => {
                fmt.error("Number is too large")
                    .highlight_with_note(
                        *source,
                        "this number does not fit its annotated type",
                    )
            },
        }
    }
}
