use common::source::SourceRange;
use errors::ErrorType;

#[derive(Clone, Debug)]
pub enum Error {
    UnexpectedCharacter {
        character: char,
        position: SourceRange,
    },
}


impl ErrorType for Error {
    fn display(&self, fmt: &mut errors::fmt::ErrorFormatter) {
        match self {
            Error::UnexpectedCharacter { character, position } => {
                fmt.error(&format!("Unexpected character {character:?}"))
                    .highlight_with_note(
                        *position,
                        "this character is not part of the language",
                    )
            },
        }
    }
}
