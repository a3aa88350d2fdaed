pub mod nodes;
pub mod errors;
pub mod dt;

pub use dt::DataType;

use common::{source::SourceRange, string_map::{StringIndex, StringMap}};
use errors::Error;
use ::errors::{ParserError, ErrorId};
use lexer::{Keyword, Token, TokenKind, TokenList};
use nodes::{AST, DeclId, ExprId};
use nodes::decl::{Decl, EnumVariant, FunctionArgument, FunctionSignature};
use nodes::expr::{self, BinaryOperator, Block, Expr};
use sti::{arena::Arena, keyed::KVec, vec::Vec};

///
/// Parses `tokens` into declarations appended to `ast`.
/// The first error aborts the parse; its id indexes the
/// returned error list.
///
pub fn parse<'a>(
    tokens: TokenList,
    arena: &'a Arena,
    string_map: &mut StringMap,
    ast: &mut AST<'a>,
) -> (Result<&'a [DeclId], ErrorId>, KVec<ParserError, Error>) {
    let mut parser = Parser {
        tokens: &tokens[..],
        index: 0,
        string_map,
        arena,
        errors: KVec::new(),
        ast,
    };

    let result = parser.parse_program();

    (result, parser.errors)
}


struct Parser<'me, 'ast, 'str> {
    tokens: &'me [Token],
    index: usize,

    arena: &'ast Arena,
    ast: &'me mut AST<'ast>,
    string_map: &'me mut StringMap<'str>,

    errors: KVec<ParserError, Error>,
}

type DeclResult = Result<DeclId, ErrorId>;
type ExprResult = Result<ExprId, ErrorId>;


impl<'out> Parser<'_, 'out, '_> {
    #[inline(always)]
    fn advance(&mut self) {
        self.index += 1;
    }


    #[inline(always)]
    fn current(&self) -> &Token {
        &self.tokens[self.index]
    }


    #[inline(always)]
    fn current_kind(&self) -> TokenKind {
        self.current().kind()
    }


    #[inline(always)]
    fn current_range(&self) -> SourceRange {
        self.current().range()
    }


    #[inline(always)]
    fn peek(&self) -> Option<&Token> {
        self.peek_n(1)
    }


    #[inline(always)]
    fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.index + n)
    }


    #[inline(always)]
    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|x| x.kind())
    }


    fn current_is(&self, token_kind: TokenKind) -> bool {
        self.current_kind() == token_kind
    }


    fn peek_is(&self, token_kind: TokenKind) -> bool {
        self.peek_kind().map(|x| x == token_kind).unwrap_or(false)
    }


    #[inline(always)]
    fn error(&mut self, error: Error) -> ErrorId {
        ErrorId::Parser(self.errors.push(error))
    }


    #[inline(always)]
    fn is_error_token(&mut self) -> Result<(), ErrorId> {
        if let TokenKind::Error(e) = self.current_kind() {
            return Err(ErrorId::Lexer(e))
        }

        Ok(())
    }


    #[inline(always)]
    fn expect_identifier(&mut self) -> Result<StringIndex, ErrorId> {
        self.is_error_token()?;
        match self.current_kind() {
            TokenKind::Identifier(v) => Ok(v),
            _ => Err(self.error(Error::ExpectedIdentifier {
                source: self.current_range(),
                token: self.current_kind(),
            }))
        }
    }


    #[inline(always)]
    fn expect(&mut self, token_kind: TokenKind) -> Result<&Token, ErrorId> {
        self.is_error_token()?;
        if self.current_kind() != token_kind {
            return Err(self.error(Error::ExpectedToken {
                source: self.current_range(),
                found: self.current_kind(),
                expected: token_kind,
            }))
        }

        Ok(self.current())
    }


    fn expect_type(&mut self) -> Result<DataType, ErrorId> {
        let identifier = self.expect_identifier()?;
        Ok(DataType::new(self.current_range(), identifier))
    }


    fn list<T>(
        &mut self,
        terminator: TokenKind,
        punctuation: TokenKind,
        mut func: impl FnMut(&mut Self, usize) -> Result<T, ErrorId>,
    ) -> Result<&'out [T], ErrorId> {
        let mut arguments = Vec::new_in(self.arena);

        loop {
            if self.current_kind() == TokenKind::EndOfFile { break }
            if self.current_kind() == terminator { break }
            if !arguments.is_empty() {
                self.expect(punctuation)?;
                self.advance();
            }

            // allow for trailing punctuation
            if self.current_kind() == terminator { break }


            let result = func(self, arguments.len())?;
            self.advance();
            arguments.push(result);
        }

        self.expect(terminator)?;
        Ok(arguments.leak())
    }
}


impl<'ta> Parser<'_, 'ta, '_> {
    fn parse_program(&mut self) -> Result<&'ta [DeclId], ErrorId> {
        let mut decls = Vec::new_in(self.arena);

        loop {
            if self.current_kind() == TokenKind::EndOfFile {
                break
            }

            let decl = self.definition()?;
            decls.push(decl);
            self.advance();
        }

        Ok(decls.leak())
    }


    fn definition(&mut self) -> DeclResult {
        self.is_error_token()?;
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Struct) => self.struct_declaration(),
            TokenKind::Keyword(Keyword::Enum) => self.enum_declaration(),

            | TokenKind::Keyword(Keyword::Pub)
            | TokenKind::Keyword(Keyword::Fn)
            => self.function_declaration(),

            _ => Err(self.error(Error::ExpectedDefinition {
                source: self.current_range(),
                token: self.current_kind(),
            })),
        }
    }


    fn struct_declaration(&mut self) -> DeclResult {
        let start = self.current_range().start();
        self.expect(TokenKind::Keyword(Keyword::Struct))?;
        self.advance();

        let name = self.expect_identifier()?;
        let header = SourceRange::new(start, self.current_range().end());
        self.advance();

        self.expect(TokenKind::LeftBracket)?;
        self.advance();

        let fields = self.list(TokenKind::RightBracket, TokenKind::Comma,
        |parser, _| {
            let field_start = parser.current_range().start();
            let name = parser.expect_identifier()?;
            parser.advance();

            parser.expect(TokenKind::Colon)?;
            parser.advance();

            let data_type = parser.expect_type()?;
            let end = parser.current_range().end();

            Ok((name, data_type, SourceRange::new(field_start, end)))
        })?;

        self.expect(TokenKind::RightBracket)?;
        let end = self.current_range().end();

        let node = Decl::Struct { name, header, fields };

        Ok(self.ast.add_decl(node, SourceRange::new(start, end)))
    }


    fn enum_declaration(&mut self) -> DeclResult {
        let start = self.current_range().start();
        self.expect(TokenKind::Keyword(Keyword::Enum))?;
        self.advance();

        let name = self.expect_identifier()?;
        let header = SourceRange::new(start, self.current_range().end());
        self.advance();

        self.expect(TokenKind::LeftBracket)?;
        self.advance();

        let variants = self.list(TokenKind::RightBracket, TokenKind::Comma,
        |parser, index| {
            let variant_start = parser.current_range().start();
            let name = parser.expect_identifier()?;

            let data_type =
                if parser.peek_is(TokenKind::LeftParenthesis) {
                    parser.advance();
                    parser.advance();

                    let data_type = parser.expect_type()?;
                    parser.advance();

                    parser.expect(TokenKind::RightParenthesis)?;
                    Some(data_type)
                } else { None };

            let end = parser.current_range().end();

            Ok(EnumVariant::new(
                name,
                index.try_into().unwrap(),
                data_type,
                SourceRange::new(variant_start, end),
            ))
        })?;

        self.expect(TokenKind::RightBracket)?;
        let end = self.current_range().end();

        Ok(self.ast.add_decl(
            Decl::Enum { name, header, variants },
            SourceRange::new(start, end),
        ))
    }


    fn function_declaration(&mut self) -> DeclResult {
        let start = self.current_range().start();

        let is_pub =
            if self.current_is(TokenKind::Keyword(Keyword::Pub)) {
                self.advance();
                true
            } else { false };

        self.expect(TokenKind::Keyword(Keyword::Fn))?;
        self.advance();

        let name = self.expect_identifier()?;
        self.advance();

        self.expect(TokenKind::LeftParenthesis)?;
        self.advance();

        let arguments = self.list(TokenKind::RightParenthesis, TokenKind::Comma,
        |parser, _| {
            let arg_start = parser.current_range().start();
            let name = parser.expect_identifier()?;
            parser.advance();

            parser.expect(TokenKind::Colon)?;
            parser.advance();

            let data_type = parser.expect_type()?;
            let end = parser.current_range().end();

            Ok(FunctionArgument::new(
                name,
                data_type,
                SourceRange::new(arg_start, end),
            ))
        })?;

        self.expect(TokenKind::RightParenthesis)?;
        self.advance();

        self.expect(TokenKind::Colon)?;
        self.advance();

        let return_type = self.expect_type()?;
        self.advance();

        let header = SourceRange::new(start, return_type.range().end());

        let body = self.block()?;
        let end = self.current_range().end();

        Ok(self.ast.add_decl(
            Decl::Function {
                sig: FunctionSignature::new(
                    name,
                    header,
                    arguments,
                    return_type,
                ),
                body,
                is_pub,
            },

            SourceRange::new(start, end),
        ))
    }


    ///
    /// `"{" (Expr (";" Expr)* ";"?)? "}"`; enters at `{`,
    /// leaves at `}`.
    ///
    fn block(&mut self) -> Result<Block<'ta>, ErrorId> {
        let start = self.current_range().start();
        self.expect(TokenKind::LeftBracket)?;
        self.advance();

        let mut storage = Vec::new_in(self.arena);

        loop {
            if self.current_is(TokenKind::RightBracket) { break }
            if self.current_is(TokenKind::EndOfFile) { break }

            let expr = self.expression(0)?;
            self.advance();
            storage.push(expr);

            if self.current_is(TokenKind::Semicolon) {
                self.advance();
                continue
            }

            if self.current_is(TokenKind::RightBracket) { break }

            return Err(self.error(Error::ExpectedOperator {
                source: self.current_range(),
                token: self.current_kind(),
            }))
        }

        self.expect(TokenKind::RightBracket)?;
        let end = self.current_range().end();

        Ok(Block::new(storage.leak(), SourceRange::new(start, end)))
    }
}


impl<'ta> Parser<'_, 'ta, '_> {
    ///
    /// Precedence climbing: keeps consuming infix operators
    /// while the upcoming operator binds at least as tightly
    /// as `min_bp`.
    ///
    fn expression(&mut self, min_bp: u8) -> ExprResult {
        let mut lhs = self.primary()?;

        loop {
            let operator = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOperator::Add,
                Some(TokenKind::Star) => BinaryOperator::Mul,
                Some(TokenKind::EqualsTo) => BinaryOperator::Eq,
                _ => break,
            };

            if operator.binding_power() < min_bp { break }

            self.advance();
            self.advance();

            let rhs = self.expression(operator.binding_power() + 1)?;

            let range = self.ast.expr_range(lhs).join(self.ast.expr_range(rhs));
            lhs = self.ast.add_expr(
                Expr::Binary { operator, lhs, rhs },
                range,
            );
        }

        Ok(lhs)
    }


    fn primary(&mut self) -> ExprResult {
        self.is_error_token()?;

        match self.current_kind() {
            TokenKind::Number(_) => self.literal(),

            TokenKind::Literal(lexer::Literal::Bool(v)) => Ok(self.ast.add_expr(
                Expr::Literal(expr::Literal::Bool(v)),
                self.current_range(),
            )),

            TokenKind::Keyword(Keyword::Let) => self.let_expression(),

            TokenKind::LeftParenthesis => {
                self.advance();

                let expr = self.expression(0)?;
                self.advance();

                self.expect(TokenKind::RightParenthesis)?;

                Ok(expr)
            },

            TokenKind::LeftBracket => {
                let block = self.block()?;
                let range = block.range();
                Ok(self.ast.add_expr(Expr::Block { block }, range))
            },

            TokenKind::Identifier(v) => {
                match self.peek_kind() {
                    Some(TokenKind::LeftParenthesis) => self.function_call_expression(),
                    Some(TokenKind::LeftBracket) => self.struct_creation_expression(),
                    Some(TokenKind::DoubleColon) => self.path_expression(),
                    Some(TokenKind::Dot) => {
                        let head = self.ast.add_expr(
                            Expr::Identifier(v),
                            self.current_range(),
                        );
                        self.accessors(head)
                    },

                    _ => Ok(self.ast.add_expr(
                        Expr::Identifier(v),
                        self.current_range(),
                    )),
                }
            },

            _ => Err(self.error(Error::ExpectedExpression {
                source: self.current_range(),
                token: self.current_kind(),
            })),
        }
    }


    ///
    /// `Number ("." Number)? "_" ("i32"|"f64")`; a fraction
    /// is only legal with the `_f64` suffix.
    ///
    fn literal(&mut self) -> ExprResult {
        let start = self.current_range().start();
        let TokenKind::Number(digits) = self.current_kind() else { unreachable!() };

        let fraction =
            if self.peek_is(TokenKind::Dot) {
                match self.peek_n(2).map(|x| x.kind()) {
                    Some(TokenKind::Number(fraction)) => {
                        self.advance();
                        self.advance();
                        Some(fraction)
                    },
                    _ => None,
                }
            } else { None };

        if !self.peek_is(TokenKind::Underscore) {
            let source = self.peek()
                .map(|x| x.range())
                .unwrap_or(self.current_range().last_char());
            return Err(self.error(Error::ExpectedNumericTypeSuffix { source }))
        }
        self.advance();
        self.advance();

        let suffix = self.expect_identifier()?;
        let source = SourceRange::new(start, self.current_range().end());

        let literal =
            if suffix == StringMap::I32 {
                if fraction.is_some() {
                    return Err(self.error(Error::ExpectedNumericType {
                        source: self.current_range(),
                        found: suffix,
                    }))
                }

                match self.string_map.get(digits).parse::<i32>() {
                    Ok(v) => expr::Literal::I32(v),
                    Err(_) => return Err(self.error(Error::NumberTooLarge { source })),
                }
            } else if suffix == StringMap::F64 {
                let value = match fraction {
                    Some(fraction) => format!("{}.{}",
                        self.string_map.get(digits),
                        self.string_map.get(fraction)).parse::<f64>(),
                    None => self.string_map.get(digits).parse::<f64>(),
                };

                match value {
                    Ok(v) => expr::Literal::F64(v),
                    Err(_) => return Err(self.error(Error::NumberTooLarge { source })),
                }
            } else {
                return Err(self.error(Error::ExpectedNumericType {
                    source: self.current_range(),
                    found: suffix,
                }))
            };

        Ok(self.ast.add_expr(Expr::Literal(literal), source))
    }


    fn let_expression(&mut self) -> ExprResult {
        let start = self.current_range().start();
        self.expect(TokenKind::Keyword(Keyword::Let))?;
        self.advance();

        let name = self.expect_identifier()?;
        self.advance();

        self.expect(TokenKind::Colon)?;
        self.advance();

        let annotation = self.expect_type()?;
        self.advance();

        self.expect(TokenKind::Equals)?;
        self.advance();

        let rhs = self.expression(0)?;
        let end = self.ast.expr_range(rhs).end();

        Ok(self.ast.add_expr(
            Expr::Let { name, annotation, rhs },
            SourceRange::new(start, end),
        ))
    }


    fn function_call_expression(&mut self) -> ExprResult {
        let start = self.current_range().start();
        let name = self.expect_identifier()?;
        let name_range = self.current_range();
        self.advance();

        self.expect(TokenKind::LeftParenthesis)?;
        self.advance();

        let args = self.list(TokenKind::RightParenthesis, TokenKind::Comma,
            |parser, _| parser.expression(0))?;

        self.expect(TokenKind::RightParenthesis)?;
        let end = self.current_range().end();

        Ok(self.ast.add_expr(
            Expr::Call { name, name_range, args },
            SourceRange::new(start, end),
        ))
    }


    fn path_expression(&mut self) -> ExprResult {
        let start = self.current_range().start();
        let enum_name = self.expect_identifier()?;
        let enum_range = self.current_range();
        self.advance();

        self.expect(TokenKind::DoubleColon)?;
        self.advance();

        let variant = self.expect_identifier()?;
        let variant_range = self.current_range();

        let args =
            if self.peek_is(TokenKind::LeftParenthesis) {
                self.advance();
                self.advance();

                let args = self.list(TokenKind::RightParenthesis, TokenKind::Comma,
                    |parser, _| parser.expression(0))?;

                self.expect(TokenKind::RightParenthesis)?;
                Some(args)
            } else { None };

        let end = self.current_range().end();

        Ok(self.ast.add_expr(
            Expr::Path { enum_name, enum_range, variant, variant_range, args },
            SourceRange::new(start, end),
        ))
    }


    fn struct_creation_expression(&mut self) -> ExprResult {
        let start = self.current_range().start();
        let name = self.expect_identifier()?;
        let name_range = self.current_range();
        self.advance();

        self.expect(TokenKind::LeftBracket)?;
        self.advance();

        let fields = self.list(TokenKind::RightBracket, TokenKind::Comma,
        |parser, _| {
            let field_start = parser.current_range().start();
            let name = parser.expect_identifier()?;
            parser.advance();

            parser.expect(TokenKind::Colon)?;
            parser.advance();

            let expr = parser.expression(0)?;
            let end = parser.current_range().end();

            Ok((name, SourceRange::new(field_start, end), expr))
        })?;

        self.expect(TokenKind::RightBracket)?;
        let end = self.current_range().end();

        Ok(self.ast.add_expr(
            Expr::CreateStruct { name, name_range, fields },
            SourceRange::new(start, end),
        ))
    }


    fn accessors(&mut self, head: ExprId) -> ExprResult {
        let mut result = head;

        while self.peek_is(TokenKind::Dot) {
            self.advance();
            self.advance();

            let field = self.expect_identifier()?;
            let field_range = self.current_range();

            let range = self.ast.expr_range(result).join(field_range);
            result = self.ast.add_expr(
                Expr::AccessField { val: result, field, field_range },
                range,
            );
        }

        Ok(result)
    }
}
