use std::fmt::Display;
use std::ops::Deref;

use common::{source::SourceRange, string_map::StringIndex};

use crate::{nodes::ExprId, DataType};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Expr<'a> {
    Literal(Literal),

    Identifier(StringIndex),

    Binary {
        operator: BinaryOperator,
        lhs: ExprId,
        rhs: ExprId,
    },

    Call {
        name: StringIndex,
        name_range: SourceRange,
        args: &'a [ExprId],
    },

    /// `Enum::Variant` or `Enum::Variant(value)`;
    /// `args` is `None` for the bare form
    Path {
        enum_name: StringIndex,
        enum_range: SourceRange,
        variant: StringIndex,
        variant_range: SourceRange,
        args: Option<&'a [ExprId]>,
    },

    Block {
        block: Block<'a>,
    },

    Let {
        name: StringIndex,
        annotation: DataType,
        rhs: ExprId,
    },

    CreateStruct {
        name: StringIndex,
        name_range: SourceRange,
        fields: &'a [(StringIndex, SourceRange, ExprId)],
    },

    AccessField {
        val: ExprId,
        field: StringIndex,
        field_range: SourceRange,
    },
}


///
/// A numeric literal's type is chosen at its
/// `_i32`/`_f64` suffix; booleans are bare.
///
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Literal {
    I32(i32),
    F64(f64),
    Bool(bool),
}


#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Block<'a> {
    body: &'a [ExprId],
    range: SourceRange,
}


impl<'a> Block<'a> {
    pub fn new(body: &'a [ExprId], range: SourceRange) -> Self {
        Self { body, range }
    }


    #[inline(always)]
    pub fn range(&self) -> SourceRange { self.range }
}


impl<'a> Deref for Block<'a> {
    type Target = [ExprId];

    fn deref(&self) -> &Self::Target {
        self.body
    }
}


#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    /// '+'
    Add,
    /// '*'
    Mul,
    /// '=='
    Eq,
}


impl BinaryOperator {
    ///
    /// Higher binds tighter; all operators are
    /// left-associative.
    ///
    pub fn binding_power(self) -> u8 {
        match self {
            BinaryOperator::Eq => 2,
            BinaryOperator::Mul => 1,
            BinaryOperator::Add => 0,
        }
    }


    pub fn is_arith(self) -> bool {
        match self {
            | BinaryOperator::Add
            | BinaryOperator::Mul
             => true,

            | BinaryOperator::Eq
             => false,
        }
    }
}


impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Mul => "*",
            BinaryOperator::Eq => "==",
        })
    }
}
