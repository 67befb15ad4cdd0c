//! Power smart constructor.

use crate::expr::{Expr, ExprKind};
use crate::sign::Sign;
use crate::simplify::{ensure_one, prod};

pub(crate) fn make(base: Expr, exp: Expr) -> Expr {
    let base = ensure_one(base);
    let exp = ensure_one(exp);

    if base.is_unknown() || exp.is_unknown() {
        return Expr::unknown();
    }
    if exp.is_cst(0) {
        return Expr::cst(1);
    }
    if exp.is_cst(1) {
        return base;
    }
    if base.is_cst(1) {
        return Expr::cst(1);
    }
    if base.is_cst(0) && provably_positive(&exp) {
        return Expr::cst(0);
    }

    if let (Some(b), Some(e)) = (base.as_cst(), exp.as_cst()) {
        if e > 0 {
            return Expr::cst(pow_i64(b, e));
        }
        // Negative exponents stay symbolic unless the result is exact.
        if b == -1 {
            return Expr::cst(if e % 2 == 0 { 1 } else { -1 });
        }
    }

    match base.kind() {
        ExprKind::PosInf if provably_positive(&exp) => return Expr::pos_inf(),
        // Every expression is integer-valued, so nested exponents always
        // multiply out.
        ExprKind::Pow {
            base: inner_base,
            exp: inner_exp,
        } => {
            return make(
                inner_base.clone(),
                prod::make(vec![inner_exp.clone(), exp]),
            );
        }
        ExprKind::Prod(factors) => {
            if exp.as_cst().is_some() {
                let spread: Vec<Expr> = factors
                    .iter()
                    .map(|f| make(f.clone(), exp.clone()))
                    .collect();
                return prod::make(spread);
            }
        }
        _ => {}
    }

    Expr::raw(ExprKind::Pow { base, exp }, true)
}

fn provably_positive(e: &Expr) -> bool {
    match e.as_cst() {
        Some(n) => n > 0,
        None => {
            e.sign() == Sign::Positive && e.min().eval_f64().map(|m| m > 0.0).unwrap_or(false)
        }
    }
}

fn pow_i64(base: i64, exp: i64) -> i64 {
    let mut acc: i64 = 1;
    for _ in 0..exp {
        acc = acc.wrapping_mul(base);
    }
    acc
}
