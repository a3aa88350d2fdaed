use common::{source::SourceRange, string_map::StringIndex};
use parser::nodes::DeclId;
use sti::{define_key, keyed::KVec};

use crate::types::Type;

define_key!(u32, pub FuncId);


pub struct FunctionMap<'out> {
    map: KVec<FuncId, FuncSym<'out>>,
}


impl<'out> FunctionMap<'out> {
    pub fn new() -> Self { Self { map: KVec::new() } }

    #[inline(always)]
    pub fn push(&mut self, sym: FuncSym<'out>) -> FuncId {
        self.map.push(sym)
    }

    #[inline(always)]
    pub fn sym(&self, id: FuncId) -> &FuncSym<'out> {
        &self.map[id]
    }

    #[inline(always)]
    pub fn len(&self) -> usize { self.map.len() }

    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.map.len() == 0 }
}


impl Default for FunctionMap<'_> {
    fn default() -> Self { Self::new() }
}


#[derive(Debug, Clone, Copy)]
pub struct FuncSym<'out> {
    pub name: StringIndex,
    pub decl: DeclId,
    pub args: &'out [FunctionArgumentSym],
    pub ret: Type,
    pub is_pub: bool,
}


#[derive(Debug, Clone, Copy)]
pub struct FunctionArgumentSym {
    name: StringIndex,
    ty: Type,
    range: SourceRange,
}


impl FunctionArgumentSym {
    pub fn new(name: StringIndex, ty: Type, range: SourceRange) -> Self {
        Self { name, ty, range }
    }


    #[inline(always)]
    pub fn name(&self) -> StringIndex { self.name }
    #[inline(always)]
    pub fn ty(&self) -> Type { self.ty }
    #[inline(always)]
    pub fn range(&self) -> SourceRange { self.range }
}
