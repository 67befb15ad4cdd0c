//! Conditional expression smart constructor.

use crate::expr::{Expr, ExprKind};
use crate::predicate::Predicate;
use crate::simplify::ensure_one;

pub(crate) fn make(pred: Predicate, then: Expr, otherwise: Expr) -> Expr {
    let then = ensure_one(then);
    let otherwise = ensure_one(otherwise);

    if let Some(truth) = pred.eval_const() {
        return if truth { then } else { otherwise };
    }
    if then == otherwise {
        return then;
    }
    Expr::raw(
        ExprKind::Cond {
            pred,
            then,
            otherwise,
        },
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::CmpOp;

    #[test]
    fn constant_predicates_short_circuit() {
        let p = Predicate::new(Expr::cst(1), Expr::cst(2), CmpOp::Lt);
        let e = Expr::ite(p, Expr::var("t"), Expr::var("e"));
        assert!(e.as_var().is_some());
        assert_eq!(e.as_var().unwrap().name(), "t");
    }

    #[test]
    fn equal_branches_collapse() {
        let x = Expr::var("x");
        let p = Expr::var("a").lt(&Expr::var("b"));
        let e = Expr::ite(p, x.clone(), x.clone());
        assert_eq!(e, x);
    }

    #[test]
    fn open_conditionals_stay() {
        let p = Expr::var("a").lt(&Expr::var("b"));
        let e = Expr::ite(p, Expr::cst(1), Expr::cst(2));
        assert!(matches!(e.kind(), ExprKind::Cond { .. }));
    }
}
