pub mod leb;
mod low_level;

use common::string_map::{StringIndex, StringMap};

// section ids, in the only order they may appear
const SECTION_TYPE     : u8 = 1;
const SECTION_FUNCTION : u8 = 3;
const SECTION_MEMORY   : u8 = 5;
const SECTION_GLOBAL   : u8 = 6;
const SECTION_EXPORT   : u8 = 7;
const SECTION_CODE     : u8 = 10;

const TYPE_FUNC   : u8 = 0x60;
const DESC_FUNC   : u8 = 0x00;
const DESC_MEMORY : u8 = 0x02;
const OP_END      : u8 = 0x0B;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WasmType {
    I32,
    I64,
    F32,
    F64,
}


impl WasmType {
    pub const fn byte(self) -> u8 {
        match self {
            WasmType::I32 => 0x7F,
            WasmType::I64 => 0x7E,
            WasmType::F32 => 0x7D,
            WasmType::F64 => 0x7C,
        }
    }
}


#[derive(Debug, Clone, Copy)]
pub enum WasmConstant {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}


impl WasmConstant {
    pub const fn ty(self) -> WasmType {
        match self {
            WasmConstant::I32(_) => WasmType::I32,
            WasmConstant::I64(_) => WasmType::I64,
            WasmConstant::F32(_) => WasmType::F32,
            WasmConstant::F64(_) => WasmType::F64,
        }
    }
}


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FunctionId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalId(u32);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GlobalId(u32);


///
/// The type immediate of a structured instruction: empty,
/// or a single value type. Function-type indices are not
/// supported here.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Empty,
    Value(WasmType),
}


impl BlockType {
    pub const fn byte(self) -> u8 {
        match self {
            BlockType::Empty => 0x40,
            BlockType::Value(ty) => ty.byte(),
        }
    }
}


#[derive(Debug, Clone, Copy)]
struct Limits {
    min: u32,
    max: Option<u32>,
}


#[derive(Debug, Clone, Copy)]
struct Global {
    init: WasmConstant,
    mutable: bool,
}


///
/// Collects function, global and memory declarations and
/// `build`s them into a binary module. Constructed empty,
/// mutated by declarations, finalised exactly once.
///
#[derive(Debug)]
pub struct WasmModuleBuilder {
    functions: Vec<WasmFunctionBuilder>,
    globals: Vec<Global>,
    memory: Option<Limits>,
    memory_export: Option<StringIndex>,

    function_id_counter: u32,
}


impl WasmModuleBuilder {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            globals: Vec::new(),
            memory: None,
            memory_export: None,
            function_id_counter: 0,
        }
    }


    pub fn function_id(&mut self) -> FunctionId {
        self.function_id_counter += 1;
        FunctionId(self.function_id_counter - 1)
    }


    pub fn register(&mut self, function: WasmFunctionBuilder) {
        self.functions.push(function)
    }


    pub fn global(&mut self, init: WasmConstant, mutable: bool) -> GlobalId {
        self.globals.push(Global { init, mutable });
        GlobalId(self.globals.len() as u32 - 1)
    }


    ///
    /// Current Wasm core allows one memory; a second
    /// definition is a programmer error.
    ///
    pub fn memory(&mut self, min_pages: u32, max_pages: Option<u32>) {
        assert!(self.memory.is_none(), "a module can only define one memory");
        self.memory = Some(Limits { min: min_pages, max: max_pages });
    }


    pub fn export_memory(&mut self, name: StringIndex) {
        assert!(self.memory.is_some(), "no memory to export");
        self.memory_export = Some(name);
    }


    pub fn build(self, string_map: &StringMap) -> Vec<u8> {
        let mut functions = self.functions;
        functions.sort_unstable_by_key(|x| x.function_id.0);

        for (index, function) in functions.iter().enumerate() {
            assert_eq!(function.function_id.0 as usize, index, "unregistered function id");
        }

        // function types are interned by structural equality
        let mut types: Vec<(Vec<WasmType>, Option<WasmType>)> = Vec::new();
        let mut type_indices = Vec::with_capacity(functions.len());
        for function in functions.iter() {
            let key = (function.params.clone(), function.ret);
            let index = match types.iter().position(|x| *x == key) {
                Some(v) => v,
                None => {
                    types.push(key);
                    types.len() - 1
                },
            };

            type_indices.push(index as u32);
        }

        let mut buf = Vec::new();
        buf.extend_from_slice(b"\0asm");
        buf.extend_from_slice(&1u32.to_le_bytes());

        // type section (1)
        if !types.is_empty() {
            let mut contents = Vec::new();
            leb::write_u32(&mut contents, types.len() as u32);
            for (params, ret) in &types {
                contents.push(TYPE_FUNC);
                leb::write_u32(&mut contents, params.len() as u32);
                for param in params {
                    contents.push(param.byte());
                }
                match ret {
                    Some(ty) => {
                        leb::write_u32(&mut contents, 1);
                        contents.push(ty.byte());
                    },
                    None => leb::write_u32(&mut contents, 0),
                }
            }
            emit_section(&mut buf, SECTION_TYPE, &contents);
        }

        // function section (3)
        if !functions.is_empty() {
            let mut contents = Vec::new();
            leb::write_u32(&mut contents, functions.len() as u32);
            for index in &type_indices {
                leb::write_u32(&mut contents, *index);
            }
            emit_section(&mut buf, SECTION_FUNCTION, &contents);
        }

        // memory section (5)
        if let Some(limits) = self.memory {
            let mut contents = Vec::new();
            leb::write_u32(&mut contents, 1);
            match limits.max {
                Some(max) => {
                    contents.push(0x01);
                    leb::write_u32(&mut contents, limits.min);
                    leb::write_u32(&mut contents, max);
                },
                None => {
                    contents.push(0x00);
                    leb::write_u32(&mut contents, limits.min);
                },
            }
            emit_section(&mut buf, SECTION_MEMORY, &contents);
        }

        // global section (6); each init is a single constant
        // instruction by construction
        if !self.globals.is_empty() {
            let mut contents = Vec::new();
            leb::write_u32(&mut contents, self.globals.len() as u32);
            for global in &self.globals {
                contents.push(global.init.ty().byte());
                contents.push(global.mutable as u8);
                emit_constant(&mut contents, global.init);
                contents.push(OP_END);
            }
            emit_section(&mut buf, SECTION_GLOBAL, &contents);
        }

        // export section (7)
        {
            let mut exports = Vec::new();
            for function in functions.iter() {
                if let Some(name) = function.export {
                    exports.push((name, DESC_FUNC, function.function_id.0));
                }
            }
            if let Some(name) = self.memory_export {
                exports.push((name, DESC_MEMORY, 0));
            }

            if !exports.is_empty() {
                let mut contents = Vec::new();
                leb::write_u32(&mut contents, exports.len() as u32);
                for (name, kind, index) in exports {
                    emit_name(&mut contents, string_map.get(name));
                    contents.push(kind);
                    leb::write_u32(&mut contents, index);
                }
                emit_section(&mut buf, SECTION_EXPORT, &contents);
            }
        }

        // code section (10)
        if !functions.is_empty() {
            let mut contents = Vec::new();
            leb::write_u32(&mut contents, functions.len() as u32);

            for function in functions.iter() {
                let mut func_buf = Vec::new();

                // locals of one type coalesce into a run
                let mut runs: Vec<(u32, WasmType)> = Vec::new();
                for local in &function.locals {
                    match runs.last_mut() {
                        Some((count, ty)) if *ty == *local => *count += 1,
                        _ => runs.push((1, *local)),
                    }
                }

                leb::write_u32(&mut func_buf, runs.len() as u32);
                for (count, ty) in runs {
                    leb::write_u32(&mut func_buf, count);
                    func_buf.push(ty.byte());
                }

                func_buf.extend_from_slice(&function.body);
                func_buf.push(OP_END);

                leb::write_u32(&mut contents, func_buf.len() as u32);
                contents.extend_from_slice(&func_buf);
            }

            emit_section(&mut buf, SECTION_CODE, &contents);
        }

        buf
    }
}


impl Default for WasmModuleBuilder {
    fn default() -> Self { Self::new() }
}


/// Wraps section contents with the id and length prefix.
fn emit_section(buf: &mut Vec<u8>, id: u8, contents: &[u8]) {
    buf.push(id);
    leb::write_u32(buf, contents.len() as u32);
    buf.extend_from_slice(contents);
}


/// A UTF-8 name as a length-prefixed byte vector.
fn emit_name(buf: &mut Vec<u8>, name: &str) {
    leb::write_u32(buf, name.len() as u32);
    buf.extend_from_slice(name.as_bytes());
}


fn emit_constant(buf: &mut Vec<u8>, constant: WasmConstant) {
    match constant {
        WasmConstant::I32(v) => {
            buf.push(0x41);
            leb::write_s32(buf, v);
        },
        WasmConstant::I64(v) => {
            buf.push(0x42);
            leb::write_s64(buf, v);
        },
        WasmConstant::F32(v) => {
            buf.push(0x43);
            buf.extend_from_slice(&v.to_le_bytes());
        },
        WasmConstant::F64(v) => {
            buf.push(0x44);
            buf.extend_from_slice(&v.to_le_bytes());
        },
    }
}


///
/// One function's context: its signature, locals and the
/// append-only instruction buffer. Frozen when the module
/// `build`s.
///
#[derive(Debug)]
pub struct WasmFunctionBuilder {
    function_id: FunctionId,
    export: Option<StringIndex>,
    ret: Option<WasmType>,
    params: Vec<WasmType>,
    locals: Vec<WasmType>,
    pub(crate) body: Vec<u8>,
}


impl WasmFunctionBuilder {
    pub fn new(id: FunctionId) -> Self {
        Self {
            function_id: id,
            export: None,
            ret: None,
            params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
        }
    }


    #[inline(always)]
    pub fn param(&mut self, ty: WasmType) -> LocalId {
        assert!(self.locals.is_empty());
        self.params.push(ty);
        LocalId(self.params.len() as u32 - 1)
    }


    #[inline(always)]
    pub fn local(&mut self, ty: WasmType) -> LocalId {
        self.locals.push(ty);
        LocalId(self.params.len() as u32 + self.locals.len() as u32 - 1)
    }


    #[inline(always)]
    pub fn return_type(&mut self, ty: WasmType) {
        assert!(self.ret.is_none());
        self.ret.replace(ty);
    }


    #[inline(always)]
    pub fn export(&mut self, name: StringIndex) {
        self.export.replace(name);
    }


    #[inline(always)]
    pub fn id(&self) -> FunctionId {
        self.function_id
    }
}


#[cfg(test)]
mod tests {
    use sti::arena::Arena;

    use common::string_map::StringMap;

    use crate::{BlockType, WasmConstant, WasmFunctionBuilder, WasmModuleBuilder, WasmType};

    #[test]
    fn empty_module_is_the_preamble() {
        let arena = Arena::new();
        let string_map = StringMap::new(&arena);

        let module = WasmModuleBuilder::new();
        let bytes = module.build(&string_map);

        assert_eq!(bytes, [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00]);
    }


    #[test]
    fn single_function() {
        let arena = Arena::new();
        let mut string_map = StringMap::new(&arena);
        let name = string_map.insert("answer");

        let mut module = WasmModuleBuilder::new();
        let mut func = WasmFunctionBuilder::new(module.function_id());
        func.return_type(WasmType::I32);
        func.export(name);
        func.i32_const(42);
        module.register(func);

        let bytes = module.build(&string_map);

        assert_eq!(&bytes[0..8], &[0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00]);
        assert_eq!(bytes[8..], [
            // type section: () -> i32
            1, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F,
            // function section
            3, 0x02, 0x01, 0x00,
            // export section: "answer" func 0
            7, 0x0A, 0x01, 0x06, b'a', b'n', b's', b'w', b'e', b'r', 0x00, 0x00,
            // code section: no locals, i32.const 42, end
            10, 0x06, 0x01, 0x04, 0x00, 0x41, 42, 0x0B,
        ]);
    }


    #[test]
    fn function_types_are_deduplicated() {
        let arena = Arena::new();
        let string_map = StringMap::new(&arena);

        let mut module = WasmModuleBuilder::new();
        for _ in 0..3 {
            let mut func = WasmFunctionBuilder::new(module.function_id());
            func.param(WasmType::I32);
            func.param(WasmType::I32);
            func.return_type(WasmType::I32);
            func.local_get(crate::LocalId(0));
            module.register(func);
        }

        {
            let mut func = WasmFunctionBuilder::new(module.function_id());
            func.param(WasmType::F64);
            func.return_type(WasmType::F64);
            func.local_get(crate::LocalId(0));
            module.register(func);
        }

        let bytes = module.build(&string_map);

        // the type section holds exactly two entries
        assert_eq!(bytes[8], 1);
        let section_len = bytes[9] as usize;
        assert_eq!(bytes[10], 2);
        assert_eq!(&bytes[11..11 + 5], &[0x60, 0x02, 0x7F, 0x7F, 0x01]);

        // the function section maps 4 functions onto them
        let function_section = 10 + section_len;
        assert_eq!(bytes[function_section], 3);
        assert_eq!(&bytes[function_section + 2..function_section + 7],
                   &[0x04, 0x00, 0x00, 0x00, 0x01]);
    }


    #[test]
    fn globals_and_memory() {
        let arena = Arena::new();
        let mut string_map = StringMap::new(&arena);
        let name = string_map.insert("memory");

        let mut module = WasmModuleBuilder::new();
        module.memory(1, None);
        module.export_memory(name);
        module.global(WasmConstant::I32(65536), true);

        let bytes = module.build(&string_map);

        assert_eq!(bytes[8..], [
            // memory section: 1 memory, min 1, no max
            5, 0x03, 0x01, 0x00, 0x01,
            // global section: (mut i32) (i32.const 65536)
            6, 0x08, 0x01, 0x7F, 0x01, 0x41, 0x80, 0x80, 0x04, 0x0B,
            // export section: "memory" mem 0
            7, 0x0A, 0x01, 0x06, b'm', b'e', b'm', b'o', b'r', b'y', 0x02, 0x00,
        ]);
    }


    #[test]
    #[should_panic]
    fn second_memory_panics() {
        let mut module = WasmModuleBuilder::new();
        module.memory(1, None);
        module.memory(1, None);
    }


    #[test]
    fn locals_coalesce() {
        let arena = Arena::new();
        let string_map = StringMap::new(&arena);

        let mut module = WasmModuleBuilder::new();
        let mut func = WasmFunctionBuilder::new(module.function_id());
        let a = func.local(WasmType::I32);
        let b = func.local(WasmType::I32);
        let c = func.local(WasmType::F64);
        assert_eq!([a, b, c], [crate::LocalId(0), crate::LocalId(1), crate::LocalId(2)]);
        module.register(func);

        let bytes = module.build(&string_map);

        // code section: two local runs, (2 i32) (1 f64)
        let code = bytes.iter().position(|x| *x == 10).unwrap();
        assert_eq!(&bytes[code..], &[
            10, 0x08, 0x01, 0x06, 0x02, 0x02, 0x7F, 0x01, 0x7C, 0x0B,
        ]);
    }


    #[test]
    fn structured_control_flow() {
        let arena = Arena::new();
        let string_map = StringMap::new(&arena);

        let mut module = WasmModuleBuilder::new();
        let mut func = WasmFunctionBuilder::new(module.function_id());
        func.i32_const(1);
        func.ite(BlockType::Value(WasmType::I32),
            |func| func.i32_const(2),
            |func| func.i32_const(3));
        func.pop();
        module.register(func);

        let bytes = module.build(&string_map);

        let code = bytes.iter().position(|x| *x == 10).unwrap();
        assert_eq!(&bytes[code..], &[
            10, 0x0F, 0x01, 0x0D, 0x00,
            0x41, 0x01,              // i32.const 1
            0x04, 0x7F,              // if (result i32)
            0x41, 0x02,              // i32.const 2
            0x05,                    // else
            0x41, 0x03,              // i32.const 3
            0x0B,                    // end
            0x1A,                    // drop
            0x0B,
        ]);
    }


    /// The instruction buffer produced by `emit`, without
    /// the section framing.
    fn encoded(emit: impl FnOnce(&mut WasmFunctionBuilder)) -> Vec<u8> {
        let mut module = WasmModuleBuilder::new();
        let mut func = WasmFunctionBuilder::new(module.function_id());
        emit(&mut func);
        func.body.clone()
    }


    #[test]
    fn plain_opcodes() {
        assert_eq!(encoded(|f| f.unreachable()), [0x00]);
        assert_eq!(encoded(|f| f.nop()), [0x01]);
        assert_eq!(encoded(|f| f.ret()), [0x0F]);
        assert_eq!(encoded(|f| f.pop()), [0x1A]);
        assert_eq!(encoded(|f| f.select()), [0x1B]);
    }


    #[test]
    fn structured_opcodes_wrap_their_bodies() {
        assert_eq!(
            encoded(|f| f.block(BlockType::Empty, |f| f.nop())),
            [0x02, 0x40, 0x01, 0x0B],
        );

        assert_eq!(
            encoded(|f| f.do_loop(BlockType::Value(WasmType::I32), |f| f.i32_const(7))),
            [0x03, 0x7F, 0x41, 0x07, 0x0B],
        );

        assert_eq!(
            encoded(|f| f.if_then(BlockType::Empty, |f| f.nop())),
            [0x04, 0x40, 0x01, 0x0B],
        );
    }


    #[test]
    fn branch_opcodes() {
        assert_eq!(encoded(|f| f.br(1)), [0x0C, 0x01]);
        assert_eq!(encoded(|f| f.br_if(0)), [0x0D, 0x00]);

        // a vector of label depths, then the default label
        assert_eq!(
            encoded(|f| f.br_table(&[0, 1, 200], 3)),
            [0x0E, 0x03, 0x00, 0x01, 0xC8, 0x01, 0x03],
        );
    }


    #[test]
    fn call_opcodes_encode_their_indices() {
        let mut module = WasmModuleBuilder::new();
        let _ = module.function_id();
        let callee = module.function_id();

        let mut func = WasmFunctionBuilder::new(module.function_id());
        func.call(callee);
        func.call_indirect(2);

        assert_eq!(func.body, [0x10, 0x01, 0x11, 0x02, 0x00]);
    }


    #[test]
    fn variable_opcodes() {
        let mut module = WasmModuleBuilder::new();
        let global = module.global(WasmConstant::I32(0), true);

        let mut func = WasmFunctionBuilder::new(module.function_id());
        let param = func.param(WasmType::I32);
        let local = func.local(WasmType::F64);

        func.local_get(param);
        func.local_set(local);
        func.local_tee(local);
        func.global_get(global);
        func.global_set(global);

        assert_eq!(func.body, [
            0x20, 0x00,
            0x21, 0x01,
            0x22, 0x01,
            0x23, 0x00,
            0x24, 0x00,
        ]);
    }


    #[test]
    fn memory_opcodes() {
        // loads and stores carry an alignment hint, then
        // the static offset
        assert_eq!(encoded(|f| f.i32_read(8)), [0x28, 0x02, 0x08]);
        assert_eq!(encoded(|f| f.f64_read(0)), [0x2B, 0x03, 0x00]);
        assert_eq!(encoded(|f| f.i32_write(4)), [0x36, 0x02, 0x04]);
        assert_eq!(encoded(|f| f.f64_write(16)), [0x39, 0x03, 0x10]);

        assert_eq!(encoded(|f| f.memory_size()), [0x3F, 0x00]);
        assert_eq!(encoded(|f| f.memory_grow()), [0x40, 0x00]);

        // bulk-memory prefix, sub-op, two memory indices
        assert_eq!(encoded(|f| f.memory_copy()), [0xFC, 0x0A, 0x00, 0x00]);
    }


    #[test]
    fn numeric_opcodes() {
        assert_eq!(encoded(|f| f.i32_const(-1)), [0x41, 0x7F]);
        assert_eq!(encoded(|f| f.bool_const(true)), [0x41, 0x01]);

        let mut f64_const = vec![0x44];
        f64_const.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(encoded(|f| f.f64_const(1.5)), f64_const);

        assert_eq!(encoded(|f| f.i32_eq()), [0x46]);
        assert_eq!(encoded(|f| f.f64_eq()), [0x61]);
        assert_eq!(encoded(|f| f.i32_add()), [0x6A]);
        assert_eq!(encoded(|f| f.i32_sub()), [0x6B]);
        assert_eq!(encoded(|f| f.i32_mul()), [0x6C]);
        assert_eq!(encoded(|f| f.f64_add()), [0xA0]);
        assert_eq!(encoded(|f| f.f64_sub()), [0xA1]);
        assert_eq!(encoded(|f| f.f64_mul()), [0xA2]);
        assert_eq!(encoded(|f| f.f64_as_i32()), [0xAA]);
    }
}
