use common::{source::SourceRange, string_map::{StringIndex, StringMap}};
use sti::{define_key, keyed::KVec};

define_key!(u32, pub TypeId);


///
/// The resolved type of an expression. Aggregates point
/// into the `TypeMap`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    I32,
    F64,
    Bool,
    Nil,
    Empty,
    Custom(TypeId),
}


impl Type {
    #[inline(always)]
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::I32 | Type::F64)
    }


    #[inline(always)]
    pub fn is_equality_comparable(self) -> bool {
        !matches!(self, Type::Nil | Type::Empty)
    }


    ///
    /// Aggregates live in linear memory rather than in a
    /// Wasm value slot.
    ///
    #[inline(always)]
    pub fn is_aggregate(self) -> bool {
        matches!(self, Type::Custom(_))
    }


    ///
    /// Whether a value of this type is accepted where
    /// `expected` is required. Booleans are i32s under the
    /// hood and pass as them.
    ///
    #[inline(always)]
    pub fn satisfies(self, expected: Type) -> bool {
        self == expected || (self == Type::Bool && expected == Type::I32)
    }


    ///
    /// Whether an expression of this type leaves a value
    /// on the Wasm operand stack.
    ///
    #[inline(always)]
    pub fn is_value(self) -> bool {
        !matches!(self, Type::Nil | Type::Empty)
    }


    /// # Panics
    /// for `nil` and `empty`, which have no representation
    pub fn size(self, types: &TypeMap) -> u32 {
        match self {
            Type::I32 | Type::Bool => 4,
            Type::F64 => 8,
            Type::Custom(id) => types.sym(id).size(),
            Type::Nil | Type::Empty => unreachable!("unrepresentable type has no size"),
        }
    }


    pub fn display(self, string_map: &StringMap, types: &TypeMap) -> String {
        match self {
            Type::I32 => "i32".to_string(),
            Type::F64 => "f64".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Nil => "nil".to_string(),
            Type::Empty => "empty".to_string(),
            Type::Custom(id) => string_map.get(types.sym(id).name()).to_string(),
        }
    }
}


pub struct TypeMap<'out> {
    map: KVec<TypeId, TypeSym<'out>>,
}


impl<'out> TypeMap<'out> {
    pub fn new() -> Self { Self { map: KVec::new() } }

    #[inline(always)]
    pub fn push(&mut self, sym: TypeSym<'out>) -> TypeId {
        self.map.push(sym)
    }

    #[inline(always)]
    pub fn sym(&self, id: TypeId) -> &TypeSym<'out> {
        &self.map[id]
    }

    #[inline(always)]
    pub fn len(&self) -> usize { self.map.len() }

    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.map.len() == 0 }
}


impl Default for TypeMap<'_> {
    fn default() -> Self { Self::new() }
}


#[derive(Debug, Clone, Copy)]
pub struct TypeSym<'out> {
    name: StringIndex,
    size: u32,
    kind: TypeSymKind<'out>,
    range: SourceRange,
}


impl<'out> TypeSym<'out> {
    pub fn new(name: StringIndex, size: u32, kind: TypeSymKind<'out>, range: SourceRange) -> Self {
        Self { name, size, kind, range }
    }


    #[inline(always)]
    pub fn name(&self) -> StringIndex { self.name }
    #[inline(always)]
    pub fn size(&self) -> u32 { self.size }
    #[inline(always)]
    pub fn kind(&self) -> TypeSymKind<'out> { self.kind }
    #[inline(always)]
    pub fn range(&self) -> SourceRange { self.range }
}


#[derive(Debug, Clone, Copy)]
pub enum TypeSymKind<'out> {
    Struct(TypeStruct<'out>),
    Enum(TypeEnum<'out>),
}


#[derive(Debug, Clone, Copy)]
pub struct TypeStruct<'out> {
    pub fields: &'out [StructField],
}


///
/// Field order is declaration order and determines the
/// physical offsets.
///
#[derive(Debug, Clone, Copy)]
pub struct StructField {
    name: StringIndex,
    ty: Type,
    offset: u32,
    range: SourceRange,
}


impl StructField {
    pub fn new(name: StringIndex, ty: Type, offset: u32, range: SourceRange) -> Self {
        Self { name, ty, offset, range }
    }


    #[inline(always)]
    pub fn name(&self) -> StringIndex { self.name }
    #[inline(always)]
    pub fn ty(&self) -> Type { self.ty }
    #[inline(always)]
    pub fn offset(&self) -> u32 { self.offset }
    #[inline(always)]
    pub fn range(&self) -> SourceRange { self.range }
}


#[derive(Debug, Clone, Copy)]
pub struct TypeEnum<'out> {
    pub variants: &'out [EnumVariantSym],
}


#[derive(Debug, Clone, Copy)]
pub struct EnumVariantSym {
    name: StringIndex,
    ty: Option<Type>,
    range: SourceRange,
}


impl EnumVariantSym {
    pub fn new(name: StringIndex, ty: Option<Type>, range: SourceRange) -> Self {
        Self { name, ty, range }
    }


    #[inline(always)]
    pub fn name(&self) -> StringIndex { self.name }
    #[inline(always)]
    pub fn ty(&self) -> Option<Type> { self.ty }
    #[inline(always)]
    pub fn range(&self) -> SourceRange { self.range }
}
