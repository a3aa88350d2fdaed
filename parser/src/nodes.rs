pub mod expr;
pub mod decl;

use common::source::SourceRange;
use sti::{define_key, keyed::KVec};

use crate::nodes::{decl::Decl, expr::Expr};

define_key!(u32, pub ExprId);
define_key!(u32, pub DeclId);


///
/// The node arena of one compilation. Expressions and
/// declarations get dense ids in creation order; every
/// node carries its source range.
///
pub struct AST<'a> {
    exprs: KVec<ExprId, (Expr<'a>, SourceRange)>,
    decls: KVec<DeclId, (Decl<'a>, SourceRange)>,
}


impl<'a> AST<'a> {
    pub fn new() -> Self {
        Self {
            exprs: KVec::new(),
            decls: KVec::new(),
        }
    }


    #[inline(always)]
    pub fn add_expr(&mut self, expr: Expr<'a>, range: SourceRange) -> ExprId {
        self.exprs.push((expr, range))
    }


    #[inline(always)]
    pub fn add_decl(&mut self, decl: Decl<'a>, range: SourceRange) -> DeclId {
        self.decls.push((decl, range))
    }


    #[inline(always)]
    pub fn expr(&self, id: ExprId) -> Expr<'a> {
        self.exprs[id].0
    }


    #[inline(always)]
    pub fn decl(&self, id: DeclId) -> Decl<'a> {
        self.decls[id].0
    }


    #[inline(always)]
    pub fn expr_range(&self, id: ExprId) -> SourceRange {
        self.exprs[id].1
    }


    #[inline(always)]
    pub fn decl_range(&self, id: DeclId) -> SourceRange {
        self.decls[id].1
    }


    #[inline(always)]
    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }
}


impl Default for AST<'_> {
    fn default() -> Self { Self::new() }
}
