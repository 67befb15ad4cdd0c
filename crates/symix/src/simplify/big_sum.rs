//! Closed forms for symbolic summation.

use std::collections::HashMap;

use crate::analysis::is_smaller;
use crate::expr::{Expr, ExprKind};
use crate::math;
use crate::predicate::CmpOp;
use crate::simplify::{ensure_one, int_div, prod, sum};
use crate::var::Var;

pub(crate) fn make(from: Expr, up_to: Expr, index: Var, body: Expr) -> Expr {
    let from = ensure_one(from);
    let up_to = ensure_one(up_to);
    let body = ensure_one(body);
    let index_expr = Expr::raw(ExprKind::Var(index.clone()), true);

    // An empty range sums to nothing.
    if is_smaller(&up_to, &from) == Some(true) {
        return Expr::cst(0);
    }

    if up_to == from {
        let mut subs = HashMap::new();
        subs.insert(index_expr.clone(), from.clone());
        if let Ok(e) = body.substitute(&subs) {
            return e;
        }
        return raw(from, up_to, index, body);
    }

    let count = up_to.clone() - from.clone() + Expr::cst(1);

    // A body independent of the index repeats once per iteration.
    if !body.contains(&index_expr) {
        return prod::make(vec![body, count]);
    }

    if let ExprKind::Sum(terms) = body.kind() {
        let parts: Vec<Expr> = terms
            .iter()
            .map(|t| make(from.clone(), up_to.clone(), index.clone(), t.clone()))
            .collect();
        return sum::make(parts);
    }

    if body == index_expr {
        let numer = prod::make(vec![from.clone() + up_to.clone(), count]);
        if let Ok(series) = int_div::make(numer, Expr::cst(2)) {
            return series;
        }
        return raw(from, up_to, index, body);
    }

    let (coeff, rest) = sum::coeff_split(&body);
    if coeff != 1 {
        return prod::make(vec![
            Expr::cst(coeff),
            make(from, up_to, index, rest),
        ]);
    }

    // A conditional on the index against a pivot splits the range.
    if let ExprKind::Cond {
        pred,
        then,
        otherwise,
    } = body.kind()
    {
        if *pred.lhs() == index_expr && !pred.rhs().contains(&index_expr) {
            let pivot = pred.rhs().clone();
            if let Some(((t_lo, t_hi), (e_lo, e_hi))) =
                split_at(pred.op(), &pivot, &from, &up_to)
            {
                let first = make(t_lo, t_hi, index.clone(), then.clone());
                let second = make(e_lo, e_hi, index, otherwise.clone());
                return sum::make(vec![first, second]);
            }
        }
    }

    raw(from, up_to, index, body)
}

/// Ranges covered by each branch when summing
/// `if i <op> pivot { then } else { otherwise }` for `i` in
/// `[from, up_to]`.
#[allow(clippy::type_complexity)]
fn split_at(
    op: CmpOp,
    pivot: &Expr,
    from: &Expr,
    up_to: &Expr,
) -> Option<((Expr, Expr), (Expr, Expr))> {
    let below = |k: Expr| (from.clone(), math::min(&k, up_to));
    let above = |k: Expr| (math::max(&k, from), up_to.clone());
    match op {
        CmpOp::Lt => Some((
            below(pivot.clone() - Expr::cst(1)),
            above(pivot.clone()),
        )),
        CmpOp::Le => Some((
            below(pivot.clone()),
            above(pivot.clone() + Expr::cst(1)),
        )),
        CmpOp::Gt => Some((
            above(pivot.clone() + Expr::cst(1)),
            below(pivot.clone()),
        )),
        CmpOp::Ge => Some((
            above(pivot.clone()),
            below(pivot.clone() - Expr::cst(1)),
        )),
        CmpOp::Eq | CmpOp::Ne => None,
    }
}

fn raw(from: Expr, up_to: Expr, index: Var, body: Expr) -> Expr {
    Expr::raw(
        ExprKind::BigSum {
            from,
            up_to,
            index,
            body,
        },
        true,
    )
}
