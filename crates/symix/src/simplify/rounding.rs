//! Floor, ceiling and absolute value.

use crate::expr::{Expr, ExprKind};
use crate::sign::Sign;
use crate::simplify::ensure_one;

pub(crate) fn floor(e: Expr) -> Expr {
    round(e, f64::floor, ExprKind::Floor)
}

pub(crate) fn ceil(e: Expr) -> Expr {
    round(e, f64::ceil, ExprKind::Ceil)
}

fn round(e: Expr, dir: fn(f64) -> f64, wrap: fn(Expr) -> ExprKind) -> Expr {
    let e = ensure_one(e);
    if matches!(
        e.kind(),
        ExprKind::Cst(_) | ExprKind::PosInf | ExprKind::NegInf | ExprKind::Unknown
    ) {
        return e;
    }
    // Rounding only matters for the fractional forms; everything else in
    // the algebra is integer-valued already.
    if is_integer_valued(&e) {
        return e;
    }
    if let Ok(v) = e.eval_f64() {
        let r = dir(v);
        if r.is_finite() && r >= i64::MIN as f64 && r <= i64::MAX as f64 {
            return Expr::cst(r as i64);
        }
    }
    if let (Ok(lo), Ok(hi)) = (e.min().eval_f64(), e.max().eval_f64()) {
        let (lo, hi) = (dir(lo), dir(hi));
        if lo == hi && lo.is_finite() {
            return Expr::cst(lo as i64);
        }
    }
    Expr::raw(wrap(e), true)
}

pub(crate) fn abs(e: Expr) -> Expr {
    let e = ensure_one(e);
    match e.kind() {
        ExprKind::Cst(n) => return Expr::cst(n.wrapping_abs()),
        ExprKind::PosInf | ExprKind::NegInf => return Expr::pos_inf(),
        ExprKind::Unknown | ExprKind::Abs(_) => return e.clone(),
        _ => {}
    }
    match e.sign() {
        Sign::Positive => e,
        Sign::Negative => -e,
        Sign::Unknown => Expr::raw(ExprKind::Abs(e), true),
    }
}

/// True when the expression can only take integer values, which rules
/// out reciprocal powers and logarithms anywhere in the tree.
pub(crate) fn is_integer_valued(e: &Expr) -> bool {
    !e.visit_until(&mut |n| match n.kind() {
        ExprKind::Log { .. } => true,
        ExprKind::Pow { exp, .. } => match exp.as_cst() {
            Some(k) => k < 0,
            None => exp.sign() != Sign::Positive,
        },
        _ => false,
    })
}
