pub mod scope;
pub mod errors;
pub mod namespace;
pub mod types;
pub mod funcs;
pub mod ty_info;
pub mod layout;

use common::{source::SourceRange, string_map::{StringIndex, StringMap}};
use ::errors::{ErrorId, SemaError};
use errors::Error;
use funcs::{FuncId, FuncSym, FunctionArgumentSym, FunctionMap};
use namespace::Namespace;
use parser::{DataType, nodes::{AST, DeclId, ExprId}};
use parser::nodes::decl::Decl;
use parser::nodes::expr::{BinaryOperator, Block, Expr, Literal};
use scope::{Scope, ScopeId, ScopeKind, ScopeMap, VariableScope};
use sti::{keyed::KVec, packed_option::PackedOption, prelude::Arena, vec::Vec};
use ty_info::TyInfo;
use types::{EnumVariantSym, StructField, Type, TypeEnum, TypeStruct, TypeSym, TypeSymKind, TypeMap};

///
/// The type checker: a syntax-directed pass that threads
/// the scope chain and fills the expression type table.
/// Declarations are collected before any body is checked,
/// so calls resolve forwards (and recursively).
///
pub struct TyChecker<'me, 'out, 'ast, 'str> {
    scopes: ScopeMap,
    root: ScopeId,
    pub globals: Namespace,
    pub types: TypeMap<'out>,
    pub funcs: FunctionMap<'out>,
    pub ty_info: TyInfo,
    pub errors: KVec<SemaError, Error>,
    pub string_map: &'me mut StringMap<'str>,
    ast: &'me AST<'ast>,
    output: &'out Arena,
}


impl<'me, 'out, 'ast, 'str> TyChecker<'me, 'out, 'ast, 'str> {
    pub fn run(
        output: &'out Arena,
        string_map: &'me mut StringMap<'str>,
        ast: &'me AST<'ast>,
        program: &[DeclId],
    ) -> (Self, Result<(), ErrorId>) {
        let mut scopes = ScopeMap::new();
        let root = scopes.push(Scope::new(PackedOption::NONE, ScopeKind::Root));

        let mut slf = Self {
            scopes,
            root,
            globals: Namespace::new(),
            types: TypeMap::new(),
            funcs: FunctionMap::new(),
            ty_info: TyInfo::new(ast.num_exprs()),
            errors: KVec::new(),
            string_map,
            ast,
            output,
        };

        let result = slf.check_program(program);

        (slf, result)
    }


    fn check_program(&mut self, program: &[DeclId]) -> Result<(), ErrorId> {
        // types resolve in source order; a field annotation
        // can only name an earlier declaration
        for decl in program {
            match self.ast.decl(*decl) {
                Decl::Struct { .. } => self.collect_struct(*decl)?,
                Decl::Enum { .. } => self.collect_enum(*decl)?,
                Decl::Function { .. } => (),
            }
        }

        // every signature lands before any body is checked
        for decl in program {
            if let Decl::Function { .. } = self.ast.decl(*decl) {
                self.collect_function(*decl)?;
            }
        }

        for decl in program {
            if let Decl::Function { .. } = self.ast.decl(*decl) {
                self.check_function(*decl)?;
            }
        }

        Ok(())
    }


    fn collect_struct(&mut self, decl: DeclId) -> Result<(), ErrorId> {
        let Decl::Struct { name, header, fields } = self.ast.decl(decl) else { unreachable!() };

        if self.globals.contains(name) {
            return Err(self.error(Error::NameAlreadyDefined { source: header, name }));
        }

        let mut syms: Vec<StructField, _> = Vec::with_cap_in(fields.len(), self.output);
        let mut offset = 0;

        for (field_name, data_type, range) in fields {
            if let Some(previous) = syms.iter().find(|x| x.name() == *field_name) {
                return Err(self.error(Error::DuplicateField {
                    declared_at: previous.range(),
                    error_point: *range,
                }));
            }

            let ty = self.resolve_ty(*data_type)?;
            let size = ty.size(&self.types);

            syms.push(StructField::new(*field_name, ty, offset, *range));
            offset += size;
        }

        let sym = TypeSym::new(
            name,
            offset,
            TypeSymKind::Struct(TypeStruct { fields: syms.leak() }),
            header,
        );

        let id = self.types.push(sym);
        self.globals.add_ty(name, id);

        Ok(())
    }


    fn collect_enum(&mut self, decl: DeclId) -> Result<(), ErrorId> {
        let Decl::Enum { name, header, variants } = self.ast.decl(decl) else { unreachable!() };

        if self.globals.contains(name) {
            return Err(self.error(Error::NameAlreadyDefined { source: header, name }));
        }

        let mut syms: Vec<EnumVariantSym, _> = Vec::with_cap_in(variants.len(), self.output);
        let mut payload = 0;

        for variant in variants {
            let ty = match variant.data_type() {
                Some(data_type) => {
                    let ty = self.resolve_ty(data_type)?;
                    payload = payload.max(ty.size(&self.types));
                    Some(ty)
                },
                None => None,
            };

            syms.push(EnumVariantSym::new(variant.name(), ty, variant.range()));
        }

        // 4 bytes of tag, whatever the payloads
        let sym = TypeSym::new(
            name,
            payload + 4,
            TypeSymKind::Enum(TypeEnum { variants: syms.leak() }),
            header,
        );

        let id = self.types.push(sym);
        self.globals.add_ty(name, id);

        Ok(())
    }


    fn collect_function(&mut self, decl: DeclId) -> Result<(), ErrorId> {
        let Decl::Function { sig, is_pub, .. } = self.ast.decl(decl) else { unreachable!() };

        if self.globals.contains(sig.name) {
            return Err(self.error(Error::NameAlreadyDefined { source: sig.source, name: sig.name }));
        }

        let mut args: Vec<FunctionArgumentSym, _> = Vec::with_cap_in(sig.arguments.len(), self.output);

        for argument in sig.arguments {
            if let Some(previous) = args.iter().find(|x| x.name() == argument.name()) {
                return Err(self.error(Error::DuplicateArg {
                    declared_at: previous.range(),
                    error_point: argument.range(),
                }));
            }

            let ty = self.resolve_ty(argument.data_type())?;
            args.push(FunctionArgumentSym::new(argument.name(), ty, argument.range()));
        }

        let ret = self.resolve_ty(sig.return_type)?;

        let func = FuncSym {
            name: sig.name,
            decl,
            args: args.leak(),
            ret,
            is_pub,
        };

        let id = self.funcs.push(func);
        self.globals.add_func(sig.name, id);

        Ok(())
    }


    fn check_function(&mut self, decl: DeclId) -> Result<(), ErrorId> {
        let Decl::Function { sig, body, .. } = self.ast.decl(decl) else { unreachable!() };

        let func = self.globals.get_func(sig.name).unwrap();
        let sym = self.funcs.sym(func);
        let (args, ret) = (sym.args, sym.ret);

        // parameters chain straight off the root scope
        let mut scope = self.root;

        for argument in args {
            scope = self.scopes.push(Scope::new(
                scope.some(),
                ScopeKind::Variable(VariableScope::new(argument.name(), argument.ty())),
            ));
        }

        let (ty, last) = self.check_block(scope, &body)?;

        if !ty.satisfies(ret) {
            let source = match last {
                Some(last) => self.ast.expr_range(last),
                None => body.range(),
            };

            let expected = ret.display(self.string_map, &self.types);
            let found = ty.display(self.string_map, &self.types);
            return Err(self.error(Error::TypeMismatch { source, expected, found }));
        }

        Ok(())
    }


    ///
    /// Checks the children of a block in order; the block's
    /// type is its last child's, or `empty` when it has none.
    ///
    fn check_block(&mut self, scope: ScopeId, block: &Block) -> Result<(Type, Option<ExprId>), ErrorId> {
        let mut current = scope;
        let mut last = None;

        for expr in block.iter() {
            let ty = self.check_expr(&mut current, *expr)?;
            last = Some((*expr, ty));
        }

        Ok(match last {
            Some((expr, ty)) => (ty, Some(expr)),
            None => (Type::Empty, None),
        })
    }


    fn check_expr(&mut self, scope: &mut ScopeId, id: ExprId) -> Result<Type, ErrorId> {
        let source = self.ast.expr_range(id);

        let ty = match self.ast.expr(id) {
            Expr::Literal(literal) => {
                match literal {
                    Literal::I32(_) => Type::I32,
                    Literal::F64(_) => Type::F64,
                    Literal::Bool(_) => Type::Bool,
                }
            },


            Expr::Identifier(name) => {
                let Some(variable) = self.scopes.get(*scope).find_var(name, &self.scopes)
                else { return Err(self.error(Error::UndefinedName { name, source })) };

                variable.ty()
            },


            Expr::Binary { operator, lhs, rhs } => {
                let lhs_ty = self.check_expr(scope, lhs)?;
                let rhs_ty = self.check_expr(scope, rhs)?;

                if operator.is_arith() {
                    if !lhs_ty.is_numeric() {
                        let found = lhs_ty.display(self.string_map, &self.types);
                        return Err(self.error(Error::NonNumeric {
                            source: self.ast.expr_range(lhs), found }));
                    }

                    if !rhs_ty.is_numeric() {
                        let found = rhs_ty.display(self.string_map, &self.types);
                        return Err(self.error(Error::NonNumeric {
                            source: self.ast.expr_range(rhs), found }));
                    }

                    if lhs_ty != rhs_ty {
                        let expected = lhs_ty.display(self.string_map, &self.types);
                        let found = rhs_ty.display(self.string_map, &self.types);
                        return Err(self.error(Error::TypeMismatch {
                            source: self.ast.expr_range(rhs), expected, found }));
                    }

                    lhs_ty
                } else {
                    debug_assert_eq!(operator, BinaryOperator::Eq);

                    if lhs_ty != rhs_ty {
                        let expected = lhs_ty.display(self.string_map, &self.types);
                        let found = rhs_ty.display(self.string_map, &self.types);
                        return Err(self.error(Error::TypeMismatch {
                            source: self.ast.expr_range(rhs), expected, found }));
                    }

                    if !lhs_ty.is_equality_comparable() {
                        let found = lhs_ty.display(self.string_map, &self.types);
                        return Err(self.error(Error::NotEqualityComparable { source, found }));
                    }

                    Type::Bool
                }
            },


            Expr::Let { name, annotation, rhs } => {
                let ty = self.resolve_ty(annotation)?;
                self.expect_type(scope, rhs, ty)?;

                *scope = self.scopes.push(Scope::new(
                    scope.some(),
                    ScopeKind::Variable(VariableScope::new(name, ty)),
                ));

                ty
            },


            Expr::Block { block } => {
                // bindings made inside don't outlive the block
                self.check_block(*scope, &block)?.0
            },


            Expr::Call { name, name_range, args } => {
                let Some(func) = self.globals.get_func(name) else {
                    if self.globals.get_ty(name).is_some()
                        || self.scopes.get(*scope).find_var(name, &self.scopes).is_some() {
                        return Err(self.error(Error::NotCallable { name, source: name_range }));
                    }

                    return Err(self.error(Error::UndefinedName { name, source: name_range }));
                };

                let sym = self.funcs.sym(func);
                let (params, ret) = (sym.args, sym.ret);

                if args.len() != params.len() {
                    return Err(self.error(Error::ArityMismatch {
                        expected: params.len(),
                        got: args.len(),
                        source,
                    }));
                }

                for (arg, param) in args.iter().zip(params) {
                    self.expect_type(scope, *arg, param.ty())?;
                }

                ret
            },


            Expr::Path { enum_name, enum_range, variant, variant_range, args } => {
                self.check_path(scope, source, enum_name, enum_range, variant, variant_range, args)?
            },


            Expr::AccessField { val, field, field_range } => {
                let head = self.check_expr(scope, val)?;

                let fields = match head {
                    Type::Custom(id) => match self.types.sym(id).kind() {
                        TypeSymKind::Struct(v) => Some(v.fields),
                        TypeSymKind::Enum(_) => None,
                    },
                    _ => None,
                };

                let Some(fields) = fields else {
                    let found = head.display(self.string_map, &self.types);
                    return Err(self.error(Error::NotAStruct {
                        source: self.ast.expr_range(val), found }));
                };

                let Some(found) = fields.iter().find(|x| x.name() == field) else {
                    let within = head.display(self.string_map, &self.types);
                    return Err(self.error(Error::UnknownField {
                        name: field, within, source: field_range }));
                };

                found.ty()
            },


            Expr::CreateStruct { name, name_range, fields } => {
                self.check_create_struct(scope, source, name, name_range, fields)?
            },
        };

        self.ty_info.define(id, ty);

        Ok(ty)
    }


    fn check_path(
        &mut self,
        scope: &mut ScopeId,
        source: SourceRange,
        enum_name: StringIndex,
        enum_range: SourceRange,
        variant: StringIndex,
        variant_range: SourceRange,
        args: Option<&[ExprId]>,
    ) -> Result<Type, ErrorId> {
        let head = self.resolve_ty(DataType::new(enum_range, enum_name))?;

        let variants = match head {
            Type::Custom(id) => match self.types.sym(id).kind() {
                TypeSymKind::Enum(v) => Some(v.variants),
                TypeSymKind::Struct(_) => None,
            },
            _ => None,
        };

        let Some(variants) = variants else {
            let found = head.display(self.string_map, &self.types);
            return Err(self.error(Error::ExpectedEnum { source: enum_range, found }));
        };

        let Some(sym) = variants.iter().find(|x| x.name() == variant) else {
            let within = head.display(self.string_map, &self.types);
            return Err(self.error(Error::UnknownVariant {
                name: variant, within, source: variant_range }));
        };

        match (sym.ty(), args) {
            (None, None) => (),

            (Some(_), None) => {
                return Err(self.error(Error::VariantRequiresValue { variant, source }));
            },

            (None, Some(args)) => {
                if args.is_empty() {
                    return Err(self.error(Error::VariantIsUnit {
                        variant, source: variant_range }));
                }

                let span = self.args_span(args);
                return Err(self.error(Error::UnitVariantReceivedArg { variant, source: span }));
            },

            (Some(value_ty), Some(args)) => {
                if args.len() != 1 {
                    // the caret lands on the surplus arguments
                    let span = if args.len() > 1 {
                        self.args_span(&args[1..])
                    } else {
                        variant_range
                    };

                    return Err(self.error(Error::EnumVariantExcessArgs {
                        variant, got: args.len(), source: span }));
                }

                self.expect_type(scope, args[0], value_ty)?;
            },
        }

        Ok(head)
    }


    fn check_create_struct(
        &mut self,
        scope: &mut ScopeId,
        source: SourceRange,
        name: StringIndex,
        name_range: SourceRange,
        fields: &[(StringIndex, SourceRange, ExprId)],
    ) -> Result<Type, ErrorId> {
        let ty = self.resolve_ty(DataType::new(name_range, name))?;

        let declared = match ty {
            Type::Custom(id) => match self.types.sym(id).kind() {
                TypeSymKind::Struct(v) => Some(v.fields),
                TypeSymKind::Enum(_) => None,
            },
            _ => None,
        };

        let Some(declared) = declared else {
            let found = ty.display(self.string_map, &self.types);
            return Err(self.error(Error::NotAStruct { source: name_range, found }));
        };

        for (index, (field_name, field_range, value)) in fields.iter().enumerate() {
            if let Some(previous) = fields[..index].iter().find(|x| x.0 == *field_name) {
                return Err(self.error(Error::DuplicateField {
                    declared_at: previous.1,
                    error_point: *field_range,
                }));
            }

            let Some(sym) = declared.iter().find(|x| x.name() == *field_name) else {
                let within = ty.display(self.string_map, &self.types);
                return Err(self.error(Error::UnknownField {
                    name: *field_name, within, source: *field_range }));
            };

            self.expect_type(scope, *value, sym.ty())?;
        }

        let missing = declared.iter()
            .filter(|x| !fields.iter().any(|f| f.0 == x.name()))
            .map(|x| self.string_map.get(x.name()).to_string())
            .collect::<std::vec::Vec<_>>();

        if !missing.is_empty() {
            return Err(self.error(Error::MissingFields { names: missing, source }));
        }

        Ok(ty)
    }


    ///
    /// Type-checks `id` against `expected`. A mismatching
    /// non-empty block is reported against its last
    /// expression.
    ///
    fn expect_type(&mut self, scope: &mut ScopeId, id: ExprId, expected: Type) -> Result<(), ErrorId> {
        let ty = self.check_expr(scope, id)?;

        if !ty.satisfies(expected) {
            let source = match self.ast.expr(id) {
                Expr::Block { block } if !block.is_empty() =>
                    self.ast.expr_range(*block.last().unwrap()),
                _ => self.ast.expr_range(id),
            };

            let expected = expected.display(self.string_map, &self.types);
            let found = ty.display(self.string_map, &self.types);
            return Err(self.error(Error::TypeMismatch { source, expected, found }));
        }

        Ok(())
    }


    fn resolve_ty(&mut self, data_type: DataType) -> Result<Type, ErrorId> {
        let name = data_type.name();

        if name == StringMap::I32 { return Ok(Type::I32) }
        if name == StringMap::F64 { return Ok(Type::F64) }
        if name == StringMap::BOOL { return Ok(Type::Bool) }

        match self.globals.get_ty(name) {
            Some(id) => Ok(Type::Custom(id)),
            None => Err(self.error(Error::UndefinedType { name, source: data_type.range() })),
        }
    }


    fn args_span(&self, args: &[ExprId]) -> SourceRange {
        let first = self.ast.expr_range(*args.first().unwrap());
        let last = self.ast.expr_range(*args.last().unwrap());
        first.join(last)
    }


    #[inline(always)]
    fn error(&mut self, error: Error) -> ErrorId {
        ErrorId::Sema(self.errors.push(error))
    }
}
