use common::string_map::StringIndex;
use sti::{define_key, keyed::KVec, packed_option::PackedOption};

use crate::types::Type;

define_key!(u32, pub ScopeId);


///
/// A node in the parent-chained scope stack. Lookups walk
/// the chain towards the root, so inner bindings shadow
/// outer ones.
///
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    parent: PackedOption<ScopeId>,
    kind  : ScopeKind,
}


#[derive(Debug, Clone, Copy)]
pub enum ScopeKind {
    Root,
    Variable(VariableScope),
}


pub struct ScopeMap {
    map: KVec<ScopeId, Scope>,
}


impl ScopeMap {
    pub fn new() -> Self { Self { map: KVec::new() } }

    #[inline(always)]
    pub fn push(&mut self, scope: Scope) -> ScopeId {
        self.map.push(scope)
    }

    #[inline(always)]
    pub fn get(&self, id: ScopeId) -> Scope {
        self.map[id]
    }
}


impl Default for ScopeMap {
    fn default() -> Self { Self::new() }
}


impl Scope {
    pub fn new(parent: impl Into<PackedOption<ScopeId>>, kind: ScopeKind) -> Self {
        Self { parent: parent.into(), kind }
    }


    pub fn find_var(self, name: StringIndex, scope_map: &ScopeMap) -> Option<VariableScope> {
        self.over(scope_map, |scope| {
            if let ScopeKind::Variable(v) = scope.kind {
                if v.name() == name { return Some(v) }
            }

            None
        })
    }


    fn over<T>(self, scope_map: &ScopeMap, mut func: impl FnMut(Scope) -> Option<T>) -> Option<T> {
        let mut this = Some(self);
        while let Some(scope) = this {
            if let Some(val) = func(scope) { return Some(val) }

            this = scope.parent.to_option()
                .map(|x| scope_map.get(x))
        }
        None
    }
}


#[derive(Debug, Clone, Copy)]
pub struct VariableScope {
    name: StringIndex,
    ty  : Type,
}

impl VariableScope {
    pub fn new(name: StringIndex, ty: Type) -> Self { Self { name, ty } }

    #[inline(always)]
    pub fn ty(&self) -> Type { self.ty }

    #[inline(always)]
    pub fn name(&self) -> StringIndex { self.name }
}
