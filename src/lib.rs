use ::errors::{ErrorId, LexerError, ParserError, SemaError, display};
use codegen::Codegen;
use parser::nodes::AST;
use semantic_analysis::{TyChecker, layout::StackSizes};
use sti::keyed::KVec;
use tracing::trace;

pub use common::source::FileData;
pub use common::string_map::StringMap;
pub use sti::arena::Arena;


///
/// Owns the state shared across one compilation: the
/// string map and its backing arena. Each `compile` call
/// is otherwise independent.
///
pub struct Compiler<'me> {
    pub arena: &'me Arena,
    pub string_map: StringMap<'me>,
}


impl<'me> Compiler<'me> {
    pub fn new(arena: &'me Arena) -> Self {
        Self {
            arena,
            string_map: StringMap::new(arena),
        }
    }


    ///
    /// Runs the pipeline over one file. The first error of
    /// the first failing phase aborts the compile and comes
    /// back rendered as a code frame.
    ///
    pub fn compile(&mut self, out: &Arena, file: &FileData) -> Result<Vec<u8>, String> {
        trace!("tokenising");
        let (tokens, lexer_errors) = lexer::lex(file, &mut self.string_map);

        trace!("parsing");
        let mut ast = AST::new();
        let (program, parser_errors) = parser::parse(tokens, out, &mut self.string_map, &mut ast);

        let program = match program {
            Ok(v) => v,
            Err(id) => return Err(render_error(
                id, &lexer_errors, &parser_errors, None, &self.string_map, file)),
        };

        trace!("type checking");
        let (checker, result) = TyChecker::run(out, &mut self.string_map, &ast, program);

        if let Err(id) = result {
            return Err(render_error(
                id, &lexer_errors, &parser_errors, Some(&checker.errors),
                checker.string_map, file));
        }

        trace!("computing stack layout");
        let stack_sizes = StackSizes::compute(&ast, program, &checker.ty_info, &checker.types);

        trace!("emitting wasm");
        let bytes = Codegen::run(
            checker.string_map,
            &ast,
            &checker.globals,
            &checker.types,
            &checker.funcs,
            &checker.ty_info,
            &stack_sizes,
            program,
        );

        trace!(len = bytes.len(), "compiled");
        Ok(bytes)
    }
}


///
/// One-shot convenience entry point over a source string.
///
pub fn compile(source: &str) -> Result<Vec<u8>, String> {
    let string_arena = Arena::new();
    let output = Arena::new();

    let mut compiler = Compiler::new(&string_arena);
    let name = compiler.string_map.insert("main.mood");
    let file = FileData::new(source.to_string(), name);

    compiler.compile(&output, &file)
}


fn render_error(
    id: ErrorId,
    lexer_errors: &KVec<LexerError, lexer::errors::Error>,
    parser_errors: &KVec<ParserError, parser::errors::Error>,
    sema_errors: Option<&KVec<SemaError, semantic_analysis::errors::Error>>,
    string_map: &StringMap,
    file: &FileData,
) -> String {
    match id {
        ErrorId::Lexer(e) => display(&lexer_errors[e], string_map, file),
        ErrorId::Parser(e) => display(&parser_errors[e], string_map, file),
        ErrorId::Sema(e) => display(&sema_errors.unwrap()[e], string_map, file),
    }
}
