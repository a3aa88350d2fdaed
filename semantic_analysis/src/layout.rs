use std::collections::HashMap;

use parser::nodes::{AST, DeclId, ExprId};
use parser::nodes::decl::Decl;
use parser::nodes::expr::Expr;

use crate::{ty_info::TyInfo, types::TypeMap};

///
/// Bytes of shadow-stack space each function needs for the
/// locals that don't fit in a Wasm value slot. The emitter
/// sizes frames with exactly these numbers.
///
#[derive(Debug)]
pub struct StackSizes {
    map: HashMap<DeclId, u32>,
}


impl StackSizes {
    pub fn compute(ast: &AST, program: &[DeclId], ty_info: &TyInfo, types: &TypeMap) -> Self {
        let mut map = HashMap::new();

        for decl in program {
            let Decl::Function { body, .. } = ast.decl(*decl) else { continue };

            let mut size = 0;
            for expr in body.iter() {
                size += expr_size(ast, ty_info, types, *expr);
            }

            map.insert(*decl, size);
        }

        Self { map }
    }


    /// # Panics
    /// if `decl` is not a function of the computed program
    #[inline(always)]
    pub fn get(&self, decl: DeclId) -> u32 {
        self.map[&decl]
    }
}


fn expr_size(ast: &AST, ty_info: &TyInfo, types: &TypeMap, id: ExprId) -> u32 {
    let own = match ast.expr(id) {
        // pure structure, no slot of its own
        | Expr::Binary { .. }
        | Expr::Block { .. }
        => 0,

        _ => {
            let ty = ty_info.expr(id);
            if ty.is_aggregate() { ty.size(types) } else { 0 }
        }
    };

    let children = match ast.expr(id) {
        | Expr::Literal(_)
        | Expr::Identifier(_)
        => 0,

        Expr::Binary { lhs, rhs, .. } => {
            expr_size(ast, ty_info, types, lhs)
                + expr_size(ast, ty_info, types, rhs)
        },

        Expr::Call { args, .. } => args.iter()
            .map(|x| expr_size(ast, ty_info, types, *x))
            .sum(),

        Expr::Path { args, .. } => args.unwrap_or(&[]).iter()
            .map(|x| expr_size(ast, ty_info, types, *x))
            .sum(),

        Expr::Block { block } => block.iter()
            .map(|x| expr_size(ast, ty_info, types, *x))
            .sum(),

        Expr::Let { rhs, .. } => expr_size(ast, ty_info, types, rhs),

        Expr::CreateStruct { fields, .. } => fields.iter()
            .map(|x| expr_size(ast, ty_info, types, x.2))
            .sum(),

        Expr::AccessField { val, .. } => expr_size(ast, ty_info, types, val),
    };

    own + children
}
