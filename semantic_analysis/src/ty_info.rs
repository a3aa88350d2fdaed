use parser::nodes::ExprId;
use sti::keyed::KVec;

use crate::types::Type;

///
/// The dense expression-id → type table. The checker fills
/// it; the layout pass and the emitter read it and never
/// re-derive types.
///
pub struct TyInfo {
    exprs: KVec<ExprId, Option<Type>>,
}


impl TyInfo {
    pub fn new(num_exprs: usize) -> Self {
        let mut exprs = KVec::new();
        for _ in 0..num_exprs {
            exprs.push(None);
        }

        Self { exprs }
    }


    #[inline(always)]
    pub fn define(&mut self, id: ExprId, ty: Type) {
        self.exprs[id] = Some(ty);
    }


    /// # Panics
    /// if the checker never visited `id`; consumers run
    /// only on fully checked programs
    #[inline(always)]
    pub fn expr(&self, id: ExprId) -> Type {
        self.exprs[id].expect("expression is missing from the type table")
    }
}
