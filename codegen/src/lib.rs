use std::collections::HashMap;

use common::string_map::{StringIndex, StringMap};
use parser::nodes::{AST, DeclId, ExprId};
use parser::nodes::decl::Decl;
use parser::nodes::expr::{BinaryOperator, Block, Expr, Literal};
use semantic_analysis::funcs::{FuncId, FunctionMap};
use semantic_analysis::layout::StackSizes;
use semantic_analysis::namespace::Namespace;
use semantic_analysis::ty_info::TyInfo;
use semantic_analysis::types::{Type, TypeMap, TypeSymKind};
use wasm::{FunctionId, GlobalId, LocalId, WasmConstant, WasmFunctionBuilder, WasmModuleBuilder, WasmType};

/// The shadow stack grows downward from the top of the
/// single memory page.
const SHADOW_STACK_BASE: i32 = 65536;


///
/// Lowers a fully checked program onto the module builder.
/// Anything the checker let through but this walker can't
/// lower is a compiler bug, and panics.
///
pub struct Codegen<'me, 'out, 'ast, 'str> {
    string_map: &'me mut StringMap<'str>,
    types: &'me TypeMap<'out>,
    funcs: &'me FunctionMap<'out>,
    globals: &'me Namespace,
    ast: &'me AST<'ast>,
    ty_info: &'me TyInfo,
    stack_sizes: &'me StackSizes,

    module: WasmModuleBuilder,
    func_ids: HashMap<FuncId, FunctionId>,
    stack_pointer: GlobalId,
}


///
/// Per-function emission state: variable bindings and the
/// bump offset of the next free frame slot.
///
struct Env {
    vars: Vec<(StringIndex, LocalId)>,
    stack_offset: u32,
    frame: u32,
}


impl<'me, 'out, 'ast, 'str> Codegen<'me, 'out, 'ast, 'str> {
    pub fn run(
        string_map: &'me mut StringMap<'str>,
        ast: &'me AST<'ast>,
        globals: &'me Namespace,
        types: &'me TypeMap<'out>,
        funcs: &'me FunctionMap<'out>,
        ty_info: &'me TyInfo,
        stack_sizes: &'me StackSizes,
        program: &[DeclId],
    ) -> Vec<u8> {
        let mut module = WasmModuleBuilder::new();
        module.memory(1, Some(1));

        let memory_name = string_map.insert("memory");
        module.export_memory(memory_name);

        let stack_pointer = module.global(WasmConstant::I32(SHADOW_STACK_BASE), true);

        let mut slf = Self {
            string_map,
            types,
            funcs,
            globals,
            ast,
            ty_info,
            stack_sizes,
            module,
            func_ids: HashMap::new(),
            stack_pointer,
        };

        // wasm function indices follow declaration order
        for decl in program {
            let Decl::Function { sig, .. } = slf.ast.decl(*decl) else { continue };
            let func = slf.globals.get_func(sig.name).unwrap();
            let id = slf.module.function_id();
            slf.func_ids.insert(func, id);
        }

        for decl in program {
            if let Decl::Function { .. } = slf.ast.decl(*decl) {
                slf.function(*decl);
            }
        }

        let Codegen { module, string_map, .. } = slf;
        module.build(string_map)
    }


    fn function(&mut self, decl: DeclId) {
        let Decl::Function { sig, body, .. } = self.ast.decl(decl) else { unreachable!() };

        let func = self.globals.get_func(sig.name).unwrap();
        let sym = self.funcs.sym(func);
        let (args, ret, is_pub) = (sym.args, sym.ret, sym.is_pub);

        let mut builder = WasmFunctionBuilder::new(self.func_ids[&func]);
        let frame = self.stack_sizes.get(decl);

        // a by-value struct return travels through a caller
        // provided destination address; unit enums are bare
        // tags and come back in a value slot
        let dest = if self.is_struct(ret) {
            Some(builder.param(WasmType::I32))
        } else { None };

        let mut env = Env {
            vars: Vec::new(),
            stack_offset: 0,
            frame,
        };

        for argument in args {
            let local = builder.param(wasm_ty(argument.ty()));
            env.vars.push((argument.name(), local));
        }

        builder.return_type(wasm_ty(ret));

        if is_pub {
            builder.export(sig.name);
        }

        // prologue
        if frame != 0 {
            builder.global_get(self.stack_pointer);
            builder.i32_const(frame as i32);
            builder.i32_sub();
            builder.global_set(self.stack_pointer);
        }

        self.block(&mut builder, &mut env, &body);

        assert!(env.stack_offset <= frame, "frame overflow: the layout pass lied");

        // epilogue: the return value survives the frame pop
        if let Some(dest) = dest {
            let size = ret.size(self.types);
            let tmp = builder.local(WasmType::I32);
            builder.local_set(tmp);

            builder.local_get(dest);
            builder.local_get(tmp);
            builder.i32_const(size as i32);
            builder.memory_copy();

            if frame != 0 {
                self.restore_frame(&mut builder, frame);
            }

            builder.local_get(dest);
        } else if frame != 0 {
            let tmp = builder.local(wasm_ty(ret));
            builder.local_set(tmp);

            self.restore_frame(&mut builder, frame);

            builder.local_get(tmp);
        }

        self.module.register(builder);
    }


    fn restore_frame(&mut self, builder: &mut WasmFunctionBuilder, frame: u32) {
        builder.global_get(self.stack_pointer);
        builder.i32_const(frame as i32);
        builder.i32_add();
        builder.global_set(self.stack_pointer);
    }


    ///
    /// Emits a block's children; every value but the last
    /// one is dropped.
    ///
    fn block(&mut self, builder: &mut WasmFunctionBuilder, env: &mut Env, block: &Block) {
        let vars = env.vars.len();

        for (index, expr) in block.iter().enumerate() {
            self.expr(builder, env, *expr);

            if index != block.len() - 1 && self.ty_info.expr(*expr).is_value() {
                builder.pop();
            }
        }

        env.vars.truncate(vars);
    }


    fn expr(&mut self, builder: &mut WasmFunctionBuilder, env: &mut Env, id: ExprId) {
        match self.ast.expr(id) {
            Expr::Literal(literal) => match literal {
                Literal::I32(v) => builder.i32_const(v),
                Literal::F64(v) => builder.f64_const(v),
                Literal::Bool(v) => builder.bool_const(v),
            },


            Expr::Identifier(name) => {
                let local = env.vars.iter().rev()
                    .find(|x| x.0 == name)
                    .unwrap().1;

                builder.local_get(local);
            },


            Expr::Binary { operator, lhs, rhs } => {
                self.expr(builder, env, lhs);
                self.expr(builder, env, rhs);

                // the operand type selects the instruction
                let ty = self.ty_info.expr(lhs);
                match (operator, ty) {
                    (BinaryOperator::Add, Type::I32) => builder.i32_add(),
                    (BinaryOperator::Add, Type::F64) => builder.f64_add(),
                    (BinaryOperator::Mul, Type::I32) => builder.i32_mul(),
                    (BinaryOperator::Mul, Type::F64) => builder.f64_mul(),

                    (BinaryOperator::Eq, Type::F64) => builder.f64_eq(),
                    (BinaryOperator::Eq, Type::I32 | Type::Bool) => builder.i32_eq(),

                    (BinaryOperator::Eq, Type::Custom(ty)) => {
                        match self.types.sym(ty).kind() {
                            // a unit enum value is its tag
                            TypeSymKind::Enum(_) => builder.i32_eq(),
                            TypeSymKind::Struct(_) =>
                                unimplemented!("struct equality is not lowered yet"),
                        }
                    },

                    _ => unreachable!("operands got past the checker"),
                }
            },


            Expr::Let { name, rhs, .. } => {
                let ty = self.ty_info.expr(id);
                let local = builder.local(wasm_ty(ty));

                self.expr(builder, env, rhs);
                builder.local_tee(local);

                env.vars.push((name, local));
            },


            Expr::Block { block } => self.block(builder, env, &block),


            Expr::Call { name, args, .. } => {
                let func = self.globals.get_func(name).unwrap();
                let ret = self.funcs.sym(func).ret;
                let target = self.func_ids[&func];

                // reserve a fresh slot per call site, and pass
                // its address as the leading argument
                let dest = if self.is_struct(ret) {
                    let size = ret.size(self.types);
                    env.stack_offset += size;
                    let slot = env.stack_offset - size;

                    self.frame_addr(builder, slot);
                    Some((slot, size))
                } else { None };

                for arg in args {
                    self.expr(builder, env, *arg);
                }

                builder.call(target);

                if let Some((slot, size)) = dest {
                    // copy the returned bytes into this frame
                    let tmp = builder.local(WasmType::I32);
                    builder.local_set(tmp);

                    self.frame_addr(builder, slot);
                    builder.local_get(tmp);
                    builder.i32_const(size as i32);
                    builder.memory_copy();

                    self.frame_addr(builder, slot);
                }
            },


            Expr::CreateStruct { fields, .. } => {
                let ty = self.ty_info.expr(id);
                let Type::Custom(ty_id) = ty else { unreachable!() };
                let TypeSymKind::Struct(sym) = self.types.sym(ty_id).kind() else { unreachable!() };
                let declared = sym.fields;

                let size = ty.size(self.types);
                env.stack_offset += size;
                let base = env.stack_offset - size;

                // stores happen in declaration order
                for field in declared {
                    let value = fields.iter()
                        .find(|x| x.0 == field.name())
                        .unwrap().2;

                    self.frame_addr(builder, base);
                    self.expr(builder, env, value);

                    match field.ty() {
                        Type::F64 => builder.f64_write(field.offset()),
                        _ => builder.i32_write(field.offset()),
                    }
                }

                self.frame_addr(builder, base);
            },


            Expr::AccessField { val, field, .. } => {
                let head = self.ty_info.expr(val);
                let Type::Custom(ty_id) = head else { unreachable!() };
                let TypeSymKind::Struct(sym) = self.types.sym(ty_id).kind() else { unreachable!() };

                let field = sym.fields.iter()
                    .find(|x| x.name() == field)
                    .unwrap();

                self.expr(builder, env, val);

                match field.ty() {
                    Type::F64 => builder.f64_read(field.offset()),
                    _ => builder.i32_read(field.offset()),
                }
            },


            Expr::Path { variant, args, .. } => {
                if args.is_some() {
                    unimplemented!("value carrying enum variants are not lowered yet");
                }

                let Type::Custom(ty_id) = self.ty_info.expr(id) else { unreachable!() };
                let TypeSymKind::Enum(sym) = self.types.sym(ty_id).kind() else { unreachable!() };

                let index = sym.variants.iter()
                    .position(|x| x.name() == variant)
                    .unwrap();

                builder.i32_const(index as i32);
            },
        }
    }


    fn is_struct(&self, ty: Type) -> bool {
        match ty {
            Type::Custom(id) => matches!(self.types.sym(id).kind(), TypeSymKind::Struct(_)),
            _ => false,
        }
    }


    ///
    /// Pushes `stack_pointer + offset`, an address inside
    /// the current frame
    ///
    fn frame_addr(&mut self, builder: &mut WasmFunctionBuilder, offset: u32) {
        builder.global_get(self.stack_pointer);
        builder.i32_const(offset as i32);
        builder.i32_add();
    }
}


fn wasm_ty(ty: Type) -> WasmType {
    match ty {
        Type::I32 | Type::Bool => WasmType::I32,
        Type::F64 => WasmType::F64,
        // aggregates travel as addresses
        Type::Custom(_) => WasmType::I32,
        Type::Nil | Type::Empty => unreachable!("unrepresentable type reached the emitter"),
    }
}
