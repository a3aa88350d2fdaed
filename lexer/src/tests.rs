#![cfg(test)]
#![allow(unused)]
use std::fmt::Debug;

use common::{source::{FileData, SourceRange}, string_map::{StringIndex, StringMap}};
use sti::arena::Arena;

use crate::{lex, Keyword, Literal, Token, TokenKind};


fn tokenise<'a>(arena: &'a Arena, data: &str) -> (crate::TokenList, StringMap<'a>) {
    let mut string_map = StringMap::new(arena);
    let file_name = string_map.insert("test");
    let file_data = FileData::new(data.to_string(), file_name);

    let (tokens, errors) = lex(&file_data, &mut string_map);
    assert!(errors.len() == 0, "{} lexer error(s)", errors.len());

    (tokens, string_map)
}


#[test]
fn empty() {
    let arena = Arena::new();
    let (tokens, _) = tokenise(&arena, "");

    compare_individually(&tokens, &[
        token(TokenKind::EndOfFile, 0, 0),
    ])
}


#[test]
fn tokens() {
    let arena = Arena::new();
    let data = "() {} : :: , ; . = == + - * / _";
    let (tokens, _) = tokenise(&arena, data);

    compare_individually(&tokens, &[
        token(TokenKind::LeftParenthesis, 0, 0),
        token(TokenKind::RightParenthesis, 1, 1),

        token(TokenKind::LeftBracket, 3, 3),
        token(TokenKind::RightBracket, 4, 4),

        token(TokenKind::Colon, 6, 6),
        token(TokenKind::DoubleColon, 8, 9),
        token(TokenKind::Comma, 11, 11),
        token(TokenKind::Semicolon, 13, 13),
        token(TokenKind::Dot, 15, 15),
        token(TokenKind::Equals, 17, 17),
        token(TokenKind::EqualsTo, 19, 20),
        token(TokenKind::Plus, 22, 22),
        token(TokenKind::Minus, 24, 24),
        token(TokenKind::Star, 26, 26),
        token(TokenKind::Slash, 28, 28),
        token(TokenKind::Underscore, 30, 30),

        token(TokenKind::EndOfFile, 30, 30),
    ])
}


#[test]
fn keywords() {
    let arena = Arena::new();
    let data = "fn let pub if else while return enum struct";
    let (tokens, _) = tokenise(&arena, data);

    compare_individually(&tokens, &[
        token(TokenKind::Keyword(Keyword::Fn), 0, 1),
        token(TokenKind::Keyword(Keyword::Let), 3, 5),
        token(TokenKind::Keyword(Keyword::Pub), 7, 9),
        token(TokenKind::Keyword(Keyword::If), 11, 12),
        token(TokenKind::Keyword(Keyword::Else), 14, 17),
        token(TokenKind::Keyword(Keyword::While), 19, 23),
        token(TokenKind::Keyword(Keyword::Return), 25, 30),
        token(TokenKind::Keyword(Keyword::Enum), 32, 35),
        token(TokenKind::Keyword(Keyword::Struct), 37, 42),
        token(TokenKind::EndOfFile, 42, 42),
    ])
}


#[test]
fn keyword_prefixes_are_identifiers() {
    let arena = Arena::new();
    let mut string_map = StringMap::new(&arena);
    let file_name = string_map.insert("test");
    let file_data = FileData::new("fnord lettuce structure".to_string(), file_name);

    let (tokens, errors) = lex(&file_data, &mut string_map);
    assert!(errors.len() == 0);

    let fnord = string_map.insert("fnord");
    let lettuce = string_map.insert("lettuce");
    let structure = string_map.insert("structure");

    compare_individually(&tokens, &[
        token(TokenKind::Identifier(fnord), 0, 4),
        token(TokenKind::Identifier(lettuce), 6, 12),
        token(TokenKind::Identifier(structure), 14, 22),
        token(TokenKind::EndOfFile, 22, 22),
    ])
}


#[test]
fn booleans() {
    let arena = Arena::new();
    let (tokens, _) = tokenise(&arena, "true false");

    compare_individually(&tokens, &[
        token(TokenKind::Literal(Literal::Bool(true)), 0, 3),
        token(TokenKind::Literal(Literal::Bool(false)), 5, 9),
        token(TokenKind::EndOfFile, 9, 9),
    ])
}


#[test]
fn numbers() {
    let arena = Arena::new();
    let mut string_map = StringMap::new(&arena);
    let file_name = string_map.insert("test");
    let file_data = FileData::new("123 4.5".to_string(), file_name);

    let (tokens, errors) = lex(&file_data, &mut string_map);
    assert!(errors.len() == 0);

    // `4.5` is three tokens; the parser reassembles the fraction
    let n123 = string_map.insert("123");
    let n4 = string_map.insert("4");
    let n5 = string_map.insert("5");

    compare_individually(&tokens, &[
        token(TokenKind::Number(n123), 0, 2),
        token(TokenKind::Number(n4), 4, 4),
        token(TokenKind::Dot, 5, 5),
        token(TokenKind::Number(n5), 6, 6),
        token(TokenKind::EndOfFile, 6, 6),
    ])
}


#[test]
fn comments() {
    let arena = Arena::new();
    let (tokens, _) = tokenise(&arena, "// hello there!\n");

    compare_individually(&tokens, &[
        token(TokenKind::EndOfFile, 15, 15),
    ])
}


#[test]
fn unexpected_character() {
    let arena = Arena::new();
    let mut string_map = StringMap::new(&arena);
    let file_name = string_map.insert("test");
    let file_data = FileData::new("#".to_string(), file_name);

    let (tokens, errors) = lex(&file_data, &mut string_map);
    assert_eq!(errors.len(), 1);
    assert!(matches!(tokens[0].kind(), TokenKind::Error(_)));
}


#[test]
fn positions_are_monotonic() {
    let arena = Arena::new();
    let data = "pub fn test(): i32 { 1_i32 + 2_i32 }";
    let (tokens, _) = tokenise(&arena, data);

    let mut previous = 0;
    for token in tokens.iter() {
        assert!(token.range().end() >= token.range().start());
        assert!(token.range().start() >= previous);
        previous = token.range().start();
    }
}


fn compare_individually(list1: &[Token], list2: &[Token]) {
    assert_eq!(list1.len(), list2.len(), "list1: {list1:#?},\nlist2: {list2:#?}");
    for (index, (v1, v2)) in list1.iter().zip(list2.iter()).enumerate() {
        assert_eq!(v1, v2, "{index}");
    }
}


fn token(kind: TokenKind, start: u32, end: u32) -> Token {
    Token {
        token_kind: kind,
        source_range: SourceRange::new(start, end),
    }
}
