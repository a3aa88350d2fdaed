use std::ops::{Deref, DerefMut};

use ::errors::LexerError;
use common::{string_map::{StringMap, StringIndex},
    source::{SourceRange, FileData}};
use crate::errors::Error;
use sti::{reader::Reader, keyed::KVec};

mod tests;
pub mod errors;


/// A wrapper around `Vec<Token>` with
/// the guarantee that it wont be empty.
#[derive(Debug)]
pub struct TokenList {
    vec: Vec<Token>,
}


impl TokenList {
    /// # Panics
    /// if the `vec` is empty
    pub fn new(vec: Vec<Token>) -> Self {
        assert!(!vec.is_empty());
        Self {
            vec,
        }
    }
}


impl Deref for TokenList {
    type Target = [Token];

    fn deref(&self) -> &Self::Target {
        &self.vec
    }
}


impl DerefMut for TokenList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vec
    }
}



#[derive(Debug, PartialEq)]
pub struct Token {
    token_kind: TokenKind,
    source_range: SourceRange,
}


impl Token {
    #[inline(always)]
    pub fn kind(&self) -> TokenKind {
        self.token_kind
    }


    #[inline(always)]
    pub fn range(&self) -> SourceRange {
        self.source_range
    }
}


#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TokenKind {
    /// '('
    LeftParenthesis,
    /// ')'
    RightParenthesis,

    /// '{'
    LeftBracket,
    /// '}'
    RightBracket,

    /// ':'
    Colon,
    /// '::'
    DoubleColon,
    /// ','
    Comma,
    /// ';'
    Semicolon,
    /// '.'
    Dot,
    /// '='
    Equals,
    /// '=='
    EqualsTo,
    /// '+'
    Plus,
    /// '-'
    Minus,
    /// '*'
    Star,
    /// '/'
    Slash,
    /// '_'
    Underscore,

    Literal(Literal),
    Keyword(Keyword),
    Identifier(StringIndex),

    /// a maximal digit run, kept raw; the parser
    /// attaches the `_i32`/`_f64` annotation
    Number(StringIndex),

    EndOfFile,

    Error(LexerError),
}


#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Literal {
    Bool(bool),
}


#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    Fn,
    Let,
    Pub,
    If,
    Else,
    While,
    Return,
    Enum,
    Struct,
}


pub fn lex<'a>(
    file: &'a FileData,
    string_map: &'a mut StringMap<'_>,
) -> (TokenList, KVec<LexerError, Error>) {
    let mut lexer = Lexer {
        reader: Reader::new(file.read().as_bytes()),
        string_map,
        errors: KVec::new(),
    };


    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();

        let is_eof = token.token_kind == TokenKind::EndOfFile;
        tokens.push(token);

        if is_eof {
            break;
        }
    }

    (TokenList::new(tokens), lexer.errors)
}


struct Lexer<'a, 's> {
    reader: Reader<'a, u8>,
    string_map: &'a mut StringMap<'s>,
    errors: KVec<LexerError, Error>,
}


impl Lexer<'_, '_> {
    fn skip_whitespace(&mut self) {
        self.reader.consume_while(|x| x.is_ascii_whitespace());
    }
}


impl Lexer<'_, '_> {
    fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        while self.reader.starts_with(b"//") {
            self.reader.consume_while(|x| *x != b'\n');
            self.skip_whitespace();
        }


        let start = self.reader.offset() as u32;
        let Some(val) = self.reader.next() else { return self.eof() };

        let kind = match val {
            b'(' => TokenKind::LeftParenthesis,
            b')' => TokenKind::RightParenthesis,

            b'{' => TokenKind::LeftBracket,
            b'}' => TokenKind::RightBracket,

            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'_' => TokenKind::Underscore,

            b'=' => {
                if self.reader.consume_if_eq(&b'=') { TokenKind::EqualsTo }
                else { TokenKind::Equals }
            }

            b':' => {
                if self.reader.consume_if_eq(&b':') { TokenKind::DoubleColon }
                else { TokenKind::Colon }
            }

            _ if val.is_ascii_alphabetic() => self.identifier(start as usize),

            _ if val.is_ascii_digit() => self.number(start as usize),

            _ => TokenKind::Error(
                self.errors.push(Error::UnexpectedCharacter {
                    character: val as char,
                    position: SourceRange::new(start, start)
                }))
        };

        let end = self.reader.offset() as u32 - 1;
        let source_range = SourceRange::new(start, end);

        Token {
            token_kind: kind,
            source_range,
        }
    }


    fn eof(&self) -> Token {
        let offset = (self.reader.offset() as u32).saturating_sub(1);
        Token {
            token_kind: TokenKind::EndOfFile,
            source_range: SourceRange::new(offset, offset),
        }
    }


    fn identifier(&mut self, begin: usize) -> TokenKind {
        let (value, _) = self.reader.consume_while_slice_from(begin, |x| {
            x.is_ascii_alphanumeric()
        });

        let value = unsafe { core::str::from_utf8_unchecked(value) };

        match value {
            "fn"     => TokenKind::Keyword(Keyword::Fn),
            "let"    => TokenKind::Keyword(Keyword::Let),
            "pub"    => TokenKind::Keyword(Keyword::Pub),
            "if"     => TokenKind::Keyword(Keyword::If),
            "else"   => TokenKind::Keyword(Keyword::Else),
            "while"  => TokenKind::Keyword(Keyword::While),
            "return" => TokenKind::Keyword(Keyword::Return),
            "enum"   => TokenKind::Keyword(Keyword::Enum),
            "struct" => TokenKind::Keyword(Keyword::Struct),

            "true"   => TokenKind::Literal(Literal::Bool(true)),
            "false"  => TokenKind::Literal(Literal::Bool(false)),

            _ => {
                let index = self.string_map.insert(value);
                TokenKind::Identifier(index)
            }
        }
    }


    fn number(&mut self, begin: usize) -> TokenKind {
        let (value, _) = self.reader.consume_while_slice_from(begin, |x| {
            x.is_ascii_digit()
        });

        let value = unsafe { core::str::from_utf8_unchecked(value) };

        TokenKind::Number(self.string_map.insert(value))
    }
}
