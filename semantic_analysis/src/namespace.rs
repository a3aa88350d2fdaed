use std::collections::HashMap;

use common::string_map::StringIndex;

use crate::{funcs::FuncId, types::TypeId};

///
/// The single global namespace: type and function names
/// declared at the program's top level.
///
#[derive(Debug, Default)]
pub struct Namespace {
    types: HashMap<StringIndex, TypeId>,
    funcs: HashMap<StringIndex, FuncId>,
}


impl Namespace {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            funcs: HashMap::new(),
        }
    }


    #[inline(always)]
    pub fn add_ty(&mut self, name: StringIndex, id: TypeId) {
        let previous = self.types.insert(name, id);
        debug_assert!(previous.is_none());
    }


    #[inline(always)]
    pub fn get_ty(&self, name: StringIndex) -> Option<TypeId> {
        self.types.get(&name).copied()
    }


    #[inline(always)]
    pub fn add_func(&mut self, name: StringIndex, id: FuncId) {
        let previous = self.funcs.insert(name, id);
        debug_assert!(previous.is_none());
    }


    #[inline(always)]
    pub fn get_func(&self, name: StringIndex) -> Option<FuncId> {
        self.funcs.get(&name).copied()
    }


    #[inline(always)]
    pub fn contains(&self, name: StringIndex) -> bool {
        self.types.contains_key(&name) || self.funcs.contains_key(&name)
    }
}
