use common::{string_map::StringIndex, source::SourceRange};

use crate::{DataType, nodes::expr::Block};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Decl<'a> {
    Struct {
        name: StringIndex,
        header: SourceRange,
        fields: &'a [(StringIndex, DataType, SourceRange)],
    },

    Enum {
        name: StringIndex,
        header: SourceRange,
        variants: &'a [EnumVariant],
    },

    Function {
        sig: FunctionSignature<'a>,
        body: Block<'a>,
        is_pub: bool,
    },
}


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionSignature<'a> {
    pub name: StringIndex,
    pub source: SourceRange,
    pub arguments: &'a [FunctionArgument],
    pub return_type: DataType,
}

impl<'a> FunctionSignature<'a> {
    pub fn new(
        name: StringIndex, source: SourceRange,
        arguments: &'a [FunctionArgument], return_type: DataType) -> Self {
        Self { name, source, arguments, return_type }
    }
}


#[derive(Debug, PartialEq, Clone, Copy)]
pub struct FunctionArgument {
    name: StringIndex,
    data_type: DataType,
    source_range: SourceRange,
}


impl FunctionArgument {
    pub fn new(name: StringIndex, data_type: DataType, source_range: SourceRange) -> Self {
        Self { name, data_type, source_range }
    }


    #[inline(always)]
    pub fn data_type(&self) -> DataType { self.data_type }
    #[inline(always)]
    pub fn name(&self) -> StringIndex { self.name }
    #[inline(always)]
    pub fn range(&self) -> SourceRange { self.source_range }
}


#[derive(Debug, PartialEq, Clone, Copy)]
pub struct EnumVariant {
    name: StringIndex,
    number: u16,
    data_type: Option<DataType>,
    source_range: SourceRange,
}

impl EnumVariant {
    pub fn new(name: StringIndex, number: u16, data_type: Option<DataType>, source_range: SourceRange) -> Self {
        Self { name, data_type, source_range, number }
    }


    #[inline(always)]
    pub fn name(&self) -> StringIndex { self.name }
    #[inline(always)]
    pub fn data_type(&self) -> Option<DataType> { self.data_type }
    #[inline(always)]
    pub fn range(&self) -> SourceRange { self.source_range }
    #[inline(always)]
    pub fn number(&self) -> u16 { self.number }
}
