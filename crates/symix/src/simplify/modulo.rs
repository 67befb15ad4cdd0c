//! C-remainder smart constructor.
//!
//! The result takes the sign of the dividend, so `(a/b)*b + a%b == a`
//! with flooring division on the quotient side handled by the sum
//! recombination rule.

use crate::analysis::{is_smaller, might_be_negative, multiple_of};
use crate::expr::{Expr, ExprKind};
use crate::sign::Sign;
use crate::simplify::{ensure_one, sum};
use crate::{ExprError, Result};

pub(crate) fn make(num: Expr, den: Expr) -> Result<Expr> {
    let num = ensure_one(num);
    let den = ensure_one(den);

    if den.is_cst(0) {
        return Err(ExprError::DivisionByZero);
    }
    if num.is_unknown() || den.is_unknown() {
        return Ok(Expr::unknown());
    }
    if den.is_cst(1) || den.is_cst(-1) {
        return Ok(Expr::cst(0));
    }
    if num.is_cst(0) || num.is_cst(1) {
        return Ok(num);
    }
    if let (Some(n), Some(d)) = (num.as_cst(), den.as_cst()) {
        return Ok(Expr::cst(n % d));
    }
    if num.is_infinite() || den.is_infinite() {
        return Ok(Expr::unknown());
    }

    if num == den {
        return Ok(Expr::cst(0));
    }

    if num.sign() == Sign::Positive && is_smaller(&num, &den.clone().abs()) == Some(true) {
        return Ok(num);
    }

    // Taking the remainder twice by the same divisor changes nothing.
    if matches!(num.kind(), ExprKind::Mod { den: inner, .. } if *inner == den) {
        return Ok(num);
    }

    if multiple_of(&num, &den) {
        return Ok(Expr::cst(0));
    }

    // Drop the terms of a non-negative sum the divisor measures
    // exactly; the remainder must stay non-negative for the C sign
    // convention to survive the split.
    if let ExprKind::Sum(terms) = num.kind() {
        if num.sign() == Sign::Positive {
            let (multiples, rest): (Vec<Expr>, Vec<Expr>) = terms
                .iter()
                .cloned()
                .partition(|t| multiple_of(t, &den));
            if !multiples.is_empty() {
                let rest = sum::make(rest);
                if !might_be_negative(&rest) {
                    return make(rest, den);
                }
            }
        }
    }

    Ok(Expr::raw(ExprKind::Mod { num, den }, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_remainder_follows_c_semantics() {
        assert_eq!(Expr::cst(7) % Expr::cst(3), Expr::cst(1));
        assert_eq!(Expr::cst(-7) % Expr::cst(3), Expr::cst(-1));
        assert_eq!(Expr::cst(7) % Expr::cst(-3), Expr::cst(1));
    }

    #[test]
    fn zero_divisor_is_an_error() {
        assert_eq!(
            Expr::var("x").modulo(Expr::cst(0)),
            Err(ExprError::DivisionByZero)
        );
    }

    #[test]
    fn unit_divisor_and_tiny_dividends() {
        let x = Expr::var("x");
        assert_eq!(x.clone() % Expr::cst(1), Expr::cst(0));
        assert_eq!(Expr::cst(1) % x.clone(), Expr::cst(1));
        assert_eq!(x.clone() % x, Expr::cst(0));
    }

    #[test]
    fn bounded_dividend_survives() {
        let i = Expr::var_in(
            "i",
            crate::var::Range::add(Expr::cst(0), Expr::cst(8), Expr::cst(1)),
        );
        assert_eq!(i.clone() % Expr::cst(8), i);
    }

    #[test]
    fn remainder_is_idempotent() {
        let n = Expr::pos_var("n");
        let m = n % Expr::cst(5);
        assert_eq!(m.clone() % Expr::cst(5), m);
    }

    #[test]
    fn multiples_vanish() {
        let a = Expr::var("a");
        let v = Expr::var("v");
        assert_eq!((a.clone() * v.clone()) % v.clone(), Expr::cst(0));
        // k*(c+v) mod (c+v) is zero as well.
        let cv = Expr::cst(3) + v.clone();
        assert_eq!((a * cv.clone()) % cv, Expr::cst(0));
    }

    #[test]
    fn sum_drops_exact_multiples() {
        let n = Expr::pos_var("n");
        let e = (n.clone() * Expr::cst(6) + Expr::cst(3)) % Expr::cst(3);
        assert_eq!(e, Expr::cst(0));
        let f = (n.clone() * Expr::cst(6) + Expr::cst(4)) % Expr::cst(3);
        assert_eq!(f, Expr::cst(1));
    }
}
