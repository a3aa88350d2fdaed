use common::{source::FileData, string_map::StringMap};
use errors::ErrorId;
use parser::nodes::{AST, DeclId};
use parser::nodes::decl::Decl;
use parser::nodes::expr::{BinaryOperator, Expr, Literal};
use sti::arena::Arena;


fn with_program(source: &str, check: impl FnOnce(&AST, &[DeclId])) {
    let arena = Arena::new();
    let mut string_map = StringMap::new(&arena);
    let name = string_map.insert("test");
    let file = FileData::new(source.to_string(), name);

    let (tokens, lexer_errors) = lexer::lex(&file, &mut string_map);
    assert!(lexer_errors.len() == 0);

    let mut ast = AST::new();
    let (program, errors) = parser::parse(tokens, &arena, &mut string_map, &mut ast);
    let program = program.unwrap_or_else(|e| panic!("parse failed: {e:?}\n{} parser error(s)", errors.len()));

    check(&ast, program)
}


fn parse_error(source: &str) -> (ErrorId, parser::errors::Error) {
    let arena = Arena::new();
    let mut string_map = StringMap::new(&arena);
    let name = string_map.insert("test");
    let file = FileData::new(source.to_string(), name);

    let (tokens, _) = lexer::lex(&file, &mut string_map);

    let mut ast = AST::new();
    let (program, errors) = parser::parse(tokens, &arena, &mut string_map, &mut ast);

    let id = program.expect_err("expected a parse error");
    let ErrorId::Parser(key) = id else { panic!("expected a parser error, got {id:?}") };

    (id, errors[key].clone())
}


fn body_of(ast: &AST, decl: DeclId) -> Vec<parser::nodes::ExprId> {
    let Decl::Function { body, .. } = ast.decl(decl) else { panic!("not a function") };
    body.iter().copied().collect()
}


#[test]
fn products_bind_tighter_than_sums() {
    with_program("fn main(): i32 { 2_i32 + 3_i32 * 4_i32 }", |ast, program| {
        let body = body_of(ast, program[0]);
        assert_eq!(body.len(), 1);

        let Expr::Binary { operator: BinaryOperator::Add, lhs, rhs } = ast.expr(body[0])
        else { panic!("expected the sum on top") };

        assert_eq!(ast.expr(lhs), Expr::Literal(Literal::I32(2)));
        assert!(matches!(
            ast.expr(rhs),
            Expr::Binary { operator: BinaryOperator::Mul, .. }
        ));
    })
}


#[test]
fn equality_binds_tighter_than_products() {
    with_program("fn main(): i32 { 1_i32 + 2_i32 == 3_i32 }", |ast, program| {
        let body = body_of(ast, program[0]);

        let Expr::Binary { operator: BinaryOperator::Add, rhs, .. } = ast.expr(body[0])
        else { panic!("expected the sum on top") };

        assert!(matches!(
            ast.expr(rhs),
            Expr::Binary { operator: BinaryOperator::Eq, .. }
        ));
    })
}


#[test]
fn sums_are_left_associative() {
    with_program("fn main(): i32 { 1_i32 + 2_i32 + 3_i32 }", |ast, program| {
        let body = body_of(ast, program[0]);

        let Expr::Binary { operator: BinaryOperator::Add, lhs, rhs } = ast.expr(body[0])
        else { panic!("expected a sum on top") };

        assert!(matches!(
            ast.expr(lhs),
            Expr::Binary { operator: BinaryOperator::Add, .. }
        ));
        assert_eq!(ast.expr(rhs), Expr::Literal(Literal::I32(3)));
    })
}


#[test]
fn parentheses_override_precedence() {
    with_program("fn main(): i32 { (2_i32 + 3_i32) * 4_i32 }", |ast, program| {
        let body = body_of(ast, program[0]);

        let Expr::Binary { operator: BinaryOperator::Mul, lhs, .. } = ast.expr(body[0])
        else { panic!("expected the product on top") };

        assert!(matches!(
            ast.expr(lhs),
            Expr::Binary { operator: BinaryOperator::Add, .. }
        ));
    })
}


#[test]
fn blocks_separate_with_semicolons() {
    with_program("fn main(): i32 { 1_i32; 2_i32; 3_i32; }", |ast, program| {
        let body = body_of(ast, program[0]);
        assert_eq!(body.len(), 3);
    })
}


#[test]
fn let_carries_its_annotation() {
    with_program("fn main(): i32 { let x: i32 = 1_i32; x }", |ast, program| {
        let body = body_of(ast, program[0]);
        assert_eq!(body.len(), 2);

        let Expr::Let { annotation, rhs, .. } = ast.expr(body[0])
        else { panic!("expected a let") };

        assert_eq!(annotation.name(), StringMap::I32);
        assert_eq!(ast.expr(rhs), Expr::Literal(Literal::I32(1)));
    })
}


#[test]
fn float_literals_take_fractions() {
    with_program("fn main(): f64 { 1.5_f64 }", |ast, program| {
        let body = body_of(ast, program[0]);
        assert_eq!(ast.expr(body[0]), Expr::Literal(Literal::F64(1.5)));
    })
}


#[test]
fn declarations_take_trailing_commas() {
    with_program(
        "struct Pair { a: i32, b: i32, } \
         enum Direction { North, South, } \
         fn main(): i32 { pick(1_i32, 2_i32,) }",
        |ast, program| {
            assert_eq!(program.len(), 3);

            let Decl::Struct { fields, .. } = ast.decl(program[0]) else { panic!() };
            assert_eq!(fields.len(), 2);

            let Decl::Enum { variants, .. } = ast.decl(program[1]) else { panic!() };
            assert_eq!(variants.len(), 2);
        })
}


#[test]
fn struct_construction_and_member_access() {
    with_program("fn main(): i32 { let b: Box = Box { w: 1_i32, h: 2_i32 }; b.w }", |ast, program| {
        let body = body_of(ast, program[0]);

        let Expr::Let { rhs, .. } = ast.expr(body[0]) else { panic!() };
        let Expr::CreateStruct { fields, .. } = ast.expr(rhs) else { panic!() };
        assert_eq!(fields.len(), 2);

        assert!(matches!(ast.expr(body[1]), Expr::AccessField { .. }));
    })
}


#[test]
fn variant_paths_parse_both_forms() {
    with_program("fn main(): i32 { Maybe::Some(1_i32); Maybe::None }", |ast, program| {
        let body = body_of(ast, program[0]);

        let Expr::Path { args, .. } = ast.expr(body[0]) else { panic!() };
        assert_eq!(args.map(|x| x.len()), Some(1));

        let Expr::Path { args, .. } = ast.expr(body[1]) else { panic!() };
        assert!(args.is_none());
    })
}


#[test]
fn expression_node_ids_are_dense() {
    with_program("fn main(): i32 { 1_i32 + 2_i32 }", |ast, _| {
        // two literals and the sum
        assert_eq!(ast.num_exprs(), 3);
    })
}


#[test]
fn numeric_literals_require_a_suffix() {
    let (_, error) = parse_error("fn main(): i32 { 1 }");
    assert!(matches!(error, parser::errors::Error::ExpectedNumericTypeSuffix { .. }));
}


#[test]
fn fractions_reject_integer_suffixes() {
    let (_, error) = parse_error("fn main(): i32 { 1.5_i32 }");
    assert!(matches!(error, parser::errors::Error::ExpectedNumericType { .. }));
}


#[test]
fn stray_tokens_after_expressions_diagnose() {
    let (_, error) = parse_error("fn main(): i32 { 1_i32 2_i32 }");
    assert!(matches!(error, parser::errors::Error::ExpectedOperator { .. }));
}


#[test]
fn programs_allow_only_definitions() {
    let (_, error) = parse_error("let x: i32 = 1_i32");
    assert!(matches!(error, parser::errors::Error::ExpectedDefinition { .. }));
}
