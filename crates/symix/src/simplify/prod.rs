//! Product smart constructor.
//!
//! Mirror of the sum rules with multiplicative identity and zero
//! absorption, plus base merging (`x^a * x^b`) and the single bounded
//! distribution case.

use std::ops::Mul;

use crate::expr::{canonical_cmp, Expr, ExprKind};
use crate::sign::Sign;
use crate::simplify::{ensure_simplified, pow, sum};

pub(crate) fn make(factors: Vec<Expr>) -> Expr {
    let factors = ensure_simplified(factors);

    let mut flat: Vec<Expr> = Vec::with_capacity(factors.len());
    for f in &factors {
        match f.kind() {
            ExprKind::Prod(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(f.clone()),
        }
    }

    if flat.iter().any(Expr::is_unknown) {
        return Expr::unknown();
    }
    if flat.iter().any(|f| f.is_cst(0)) {
        // A zero and an infinity together have no defined product.
        if flat.iter().any(Expr::is_infinite) {
            return Expr::unknown();
        }
        return Expr::cst(0);
    }
    if flat.iter().any(Expr::is_infinite) {
        return match flat.iter().map(Expr::sign).fold(Sign::Positive, Sign::mul) {
            Sign::Positive => Expr::pos_inf(),
            Sign::Negative => Expr::neg_inf(),
            Sign::Unknown => Expr::unknown(),
        };
    }

    // Merge constants and equal bases.
    let mut constant: i64 = 1;
    let mut bases: Vec<(Expr, Vec<Expr>)> = Vec::new();
    for f in flat {
        if let Some(c) = f.as_cst() {
            constant = constant.wrapping_mul(c);
            continue;
        }
        let (base, exp) = pow_split(&f);
        if let Some(slot) = bases.iter_mut().find(|(b, _)| *b == base) {
            slot.1.push(exp);
        } else {
            bases.push((base, vec![exp]));
        }
    }
    if constant == 0 {
        return Expr::cst(0);
    }

    let mut out: Vec<Expr> = Vec::with_capacity(bases.len());
    for (base, exps) in bases {
        let merged = if exps.len() == 1 {
            let exp = exps.into_iter().next().unwrap();
            if exp.is_cst(1) {
                base
            } else {
                pow::make(base, exp)
            }
        } else {
            pow::make(base, sum::make(exps))
        };
        // Base merging can fold down to a constant or back to a product.
        match merged.kind() {
            ExprKind::Cst(c) => constant = constant.wrapping_mul(*c),
            ExprKind::Prod(inner) => {
                for f in inner {
                    if let Some(c) = f.as_cst() {
                        constant = constant.wrapping_mul(c);
                    } else {
                        out.push(f.clone());
                    }
                }
            }
            _ => out.push(merged.clone()),
        }
    }
    if constant == 0 {
        return Expr::cst(0);
    }

    // Distribute over a single sum factor when every other factor is a
    // constant, so `3 * (x + y)` normalizes to `3*x + 3*y` without ever
    // growing unboundedly.
    if out.len() == 1 && constant != 1 {
        if let ExprKind::Sum(terms) = out[0].kind() {
            let distributed: Vec<Expr> = terms
                .iter()
                .map(|t| make(vec![Expr::cst(constant), t.clone()]))
                .collect();
            return sum::make(distributed);
        }
    }

    if out.is_empty() {
        return Expr::cst(constant);
    }
    if constant != 1 {
        out.push(Expr::cst(constant));
    }
    out.sort_by(canonical_cmp);

    if out.len() == 1 {
        return out.into_iter().next().unwrap();
    }
    Expr::raw(ExprKind::Prod(out), true)
}

/// View a factor as `base^exp`, with exponent 1 by default.
pub(crate) fn pow_split(factor: &Expr) -> (Expr, Expr) {
    match factor.kind() {
        ExprKind::Pow { base, exp } => (base.clone(), exp.clone()),
        _ => (factor.clone(), Expr::cst(1)),
    }
}

/// The factor list of an expression, the expression itself when it is
/// not a product.
pub(crate) fn factors_of(e: &Expr) -> Vec<Expr> {
    match e.kind() {
        ExprKind::Prod(factors) => factors.to_vec(),
        _ => vec![e.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_absorbs() {
        let x = Expr::var("x");
        assert_eq!(x * Expr::cst(0), Expr::cst(0));
    }

    #[test]
    fn identity_is_dropped() {
        let x = Expr::var("x");
        assert_eq!(x.clone() * Expr::cst(1), x);
    }

    #[test]
    fn equal_bases_merge() {
        let x = Expr::var("x");
        let e = x.clone() * x.clone();
        assert_eq!(e, x.clone().pow(Expr::cst(2)));
        // x * x^-1 cancels entirely.
        let inv = Expr::cst(1).frac(x.clone());
        assert_eq!(x * inv, Expr::cst(1));
    }

    #[test]
    fn constants_multiply_through() {
        let x = Expr::var("x");
        let e = Expr::cst(3) * x.clone() * Expr::cst(4);
        match e.kind() {
            ExprKind::Prod(fs) => {
                assert_eq!(fs.len(), 2);
                assert_eq!(fs[0], Expr::cst(12));
            }
            _ => panic!("expected a product"),
        }
    }

    #[test]
    fn single_sum_with_constant_distributes() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        let e = Expr::cst(3) * (x.clone() + y.clone());
        assert_eq!(e, Expr::cst(3) * x + Expr::cst(3) * y);
    }

    #[test]
    fn sum_with_symbolic_cofactor_stays_factored() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        let z = Expr::var("z");
        let e = z.clone() * (x + y);
        assert!(matches!(e.kind(), ExprKind::Prod(_)));
    }
}
