use crate::{leb, BlockType, FunctionId, GlobalId, LocalId, WasmFunctionBuilder};

impl WasmFunctionBuilder {
    ///
    /// Marks this branch as unreachable
    /// () -> ()
    ///
    #[inline(always)]
    pub fn unreachable(&mut self) { self.body.push(0x00); }

    #[inline(always)]
    pub fn nop(&mut self) { self.body.push(0x01); }

    ///
    /// A labelled block; `body` runs with this same
    /// builder, the `end` byte is appended afterwards
    ///
    pub fn block(&mut self, ty: BlockType, body: impl FnOnce(&mut Self)) {
        self.body.push(0x02);
        self.body.push(ty.byte());
        body(self);
        self.body.push(0x0B);
    }


    pub fn do_loop(&mut self, ty: BlockType, body: impl FnOnce(&mut Self)) {
        self.body.push(0x03);
        self.body.push(ty.byte());
        body(self);
        self.body.push(0x0B);
    }


    ///
    /// `bool` -> branch
    ///
    pub fn ite(
        &mut self,
        ty: BlockType,
        then_body: impl FnOnce(&mut Self),
        else_body: impl FnOnce(&mut Self),
    ) {
        self.body.push(0x04);
        self.body.push(ty.byte());
        then_body(self);
        self.body.push(0x05);
        else_body(self);
        self.body.push(0x0B);
    }


    ///
    /// `if` without an else arm
    ///
    pub fn if_then(&mut self, ty: BlockType, then_body: impl FnOnce(&mut Self)) {
        self.body.push(0x04);
        self.body.push(ty.byte());
        then_body(self);
        self.body.push(0x0B);
    }


    ///
    /// Breaks out of the label `depth` levels up
    ///
    #[inline(always)]
    pub fn br(&mut self, depth: u32) {
        self.body.push(0x0C);
        leb::write_u32(&mut self.body, depth);
    }


    #[inline(always)]
    pub fn br_if(&mut self, depth: u32) {
        self.body.push(0x0D);
        leb::write_u32(&mut self.body, depth);
    }


    pub fn br_table(&mut self, depths: &[u32], default: u32) {
        self.body.push(0x0E);
        leb::write_u32(&mut self.body, depths.len() as u32);
        for depth in depths {
            leb::write_u32(&mut self.body, *depth);
        }
        leb::write_u32(&mut self.body, default);
    }


    ///
    /// Returns from the current function
    ///
    #[inline(always)]
    pub fn ret(&mut self) { self.body.push(0x0F); }


    ///
    /// Calls a function
    /// for `$arg` in `0..argc` -> `$ret`
    ///
    #[inline(always)]
    pub fn call(&mut self, func: FunctionId) {
        self.body.push(0x10);
        leb::write_u32(&mut self.body, func.0);
    }


    #[inline(always)]
    pub fn call_indirect(&mut self, type_index: u32) {
        self.body.push(0x11);
        leb::write_u32(&mut self.body, type_index);
        self.body.push(0x00);
    }


    ///
    /// Removes a value from the stack
    /// `$T` -> ()
    ///
    #[inline(always)]
    pub fn pop(&mut self) { self.body.push(0x1A); }


    ///
    /// `$T`, `$T`, `i32` -> `$T`
    ///
    #[inline(always)]
    pub fn select(&mut self) { self.body.push(0x1B); }
}


impl WasmFunctionBuilder {
    ///
    /// Pushes the value of the specified local
    /// to the stack
    /// () -> `$local`
    ///
    #[inline(always)]
    pub fn local_get(&mut self, index: LocalId) {
        self.body.push(0x20);
        leb::write_u32(&mut self.body, index.0);
    }


    ///
    /// Sets the value of the specified local
    /// `$local` -> ()
    ///
    #[inline(always)]
    pub fn local_set(&mut self, index: LocalId) {
        self.body.push(0x21);
        leb::write_u32(&mut self.body, index.0);
    }


    ///
    /// Sets & gets the value of the specified local
    /// `$local` -> `$local`
    ///
    #[inline(always)]
    pub fn local_tee(&mut self, index: LocalId) {
        self.body.push(0x22);
        leb::write_u32(&mut self.body, index.0);
    }


    #[inline(always)]
    pub fn global_get(&mut self, index: GlobalId) {
        self.body.push(0x23);
        leb::write_u32(&mut self.body, index.0);
    }


    #[inline(always)]
    pub fn global_set(&mut self, index: GlobalId) {
        self.body.push(0x24);
        leb::write_u32(&mut self.body, index.0);
    }
}


impl WasmFunctionBuilder {
    ///
    /// Reads an `i32` at a pointer
    /// `ptr(i32)` -> `i32`
    ///
    #[inline(always)]
    pub fn i32_read(&mut self, offset: u32) {
        self.body.push(0x28);
        leb::write_u32(&mut self.body, 2);
        leb::write_u32(&mut self.body, offset);
    }


    ///
    /// Writes an `i32` to the given pointer
    /// `ptr(i32)`, `i32` -> ()
    ///
    #[inline(always)]
    pub fn i32_write(&mut self, offset: u32) {
        self.body.push(0x36);
        leb::write_u32(&mut self.body, 2);
        leb::write_u32(&mut self.body, offset);
    }


    ///
    /// Reads a `f64` at a pointer
    /// `ptr(f64)` -> `f64`
    ///
    #[inline(always)]
    pub fn f64_read(&mut self, offset: u32) {
        self.body.push(0x2B);
        leb::write_u32(&mut self.body, 3);
        leb::write_u32(&mut self.body, offset);
    }


    ///
    /// Writes a `f64` to the given pointer
    /// `ptr(f64)`, `f64` -> ()
    ///
    #[inline(always)]
    pub fn f64_write(&mut self, offset: u32) {
        self.body.push(0x39);
        leb::write_u32(&mut self.body, 3);
        leb::write_u32(&mut self.body, offset);
    }


    ///
    /// Pushes the memory size to the stack
    /// () -> `i32`
    ///
    #[inline(always)]
    pub fn memory_size(&mut self) {
        self.body.push(0x3F);
        self.body.push(0x00);
    }


    ///
    /// `i32` -> `i32`
    ///
    #[inline(always)]
    pub fn memory_grow(&mut self) {
        self.body.push(0x40);
        self.body.push(0x00);
    }


    ///
    /// Bulk copy within the one linear memory
    /// `dst: i32`, `src: i32`, `len: i32` -> ()
    ///
    #[inline(always)]
    pub fn memory_copy(&mut self) {
        self.body.push(0xFC);
        leb::write_u32(&mut self.body, 0x0A);
        self.body.push(0x00);
        self.body.push(0x00);
    }
}


impl WasmFunctionBuilder {
    ///
    /// Pushes an `i32` constant to the stack
    /// () -> `i32`
    ///
    #[inline(always)]
    pub fn i32_const(&mut self, num: i32) {
        self.body.push(0x41);
        leb::write_s32(&mut self.body, num);
    }


    ///
    /// Pushes a boolean constant on the stack
    /// () -> `bool`
    ///
    #[inline(always)]
    pub fn bool_const(&mut self, v: bool) { self.i32_const(v as i32); }


    #[inline(always)]
    pub fn f64_const(&mut self, val: f64) {
        self.body.push(0x44);
        self.body.extend_from_slice(&val.to_le_bytes());
    }


    #[inline(always)]
    pub fn i32_eq(&mut self) { self.body.push(0x46); }

    #[inline(always)]
    pub fn f64_eq(&mut self) { self.body.push(0x61); }

    #[inline(always)]
    pub fn i32_add(&mut self) { self.body.push(0x6A); }

    #[inline(always)]
    pub fn i32_sub(&mut self) { self.body.push(0x6B); }

    #[inline(always)]
    pub fn i32_mul(&mut self) { self.body.push(0x6C); }

    #[inline(always)]
    pub fn f64_add(&mut self) { self.body.push(0xA0); }

    #[inline(always)]
    pub fn f64_sub(&mut self) { self.body.push(0xA1); }

    #[inline(always)]
    pub fn f64_mul(&mut self) { self.body.push(0xA2); }

    #[inline(always)]
    pub fn f64_as_i32(&mut self) { self.body.push(0xAA); }
}
