pub mod fmt;

use common::{string_map::StringMap, source::FileData};
use fmt::ErrorFormatter;
use sti::define_key;

define_key!(u32, pub LexerError);
define_key!(u32, pub ParserError);
define_key!(u32, pub SemaError);


///
/// A handle to an error stored in one of the
/// per-phase error lists.
///
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorId {
    Lexer(LexerError),
    Parser(ParserError),
    Sema(SemaError),
}


pub trait ErrorType {
    fn display(&self, fmt: &mut ErrorFormatter);
}


pub fn display(error: &impl ErrorType, string_map: &StringMap, file: &FileData) -> String {
    let mut string = String::new();
    let mut fmt = ErrorFormatter::new(&mut string, string_map, file);
    error.display(&mut fmt);
    string
}
