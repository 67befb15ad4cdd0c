//! Floor-division smart constructor.
//!
//! Rules apply in order, first match wins; anything undecidable stays a
//! symbolic division node.

use num_integer::Integer;

use crate::analysis::{exact_div, is_smaller, might_be_negative, multiple_of, provably_nonzero};
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
    if den.is_cst(1) {
        return Ok(num);
    }
    if den.is_cst(-1) {
        return Ok(-num);
    }
    if num.is_cst(0) {
        return Ok(Expr::cst(0));
    }
    if let (Some(n), Some(d)) = (num.as_cst(), den.as_cst()) {
        return Ok(Expr::cst(Integer::div_floor(&n, &d)));
    }

    // A finite numerator vanishes under an infinite divisor; an
    // infinite numerator keeps its magnitude and picks up the divisor
    // sign.
    if den.is_infinite() {
        if num.is_infinite() {
            return Ok(Expr::unknown());
        }
        return Ok(Expr::cst(0));
    }
    if num.is_infinite() {
        let flip = matches!(num.kind(), ExprKind::NegInf);
        return Ok(match (den.sign(), flip) {
            (Sign::Positive, false) | (Sign::Negative, true) => Expr::pos_inf(),
            (Sign::Positive, true) | (Sign::Negative, false) => Expr::neg_inf(),
            (Sign::Unknown, _) => Expr::unknown(),
        });
    }

    if num == den && provably_nonzero(&den) {
        return Ok(Expr::cst(1));
    }

    if num.sign() == Sign::Positive
        && den.sign() == Sign::Positive
        && is_smaller(&num, &den.clone().abs()) == Some(true)
    {
        return Ok(Expr::cst(0));
    }

    // Exact division; the structural-equality case stays above so its
    // nonzero guard is not bypassed.
    if num != den && multiple_of(&num, &den) {
        if let Some(q) = exact_div(&num, &den) {
            return Ok(q);
        }
    }

    // Split a sum numerator into the part the divisor measures exactly
    // and a non-negative remainder.
    if let ExprKind::Sum(terms) = num.kind() {
        let (multiples, rest): (Vec<Expr>, Vec<Expr>) = terms
            .iter()
            .cloned()
            .partition(|t| multiple_of(t, &den));
        if !multiples.is_empty() && !rest.is_empty() {
            let rest = sum::make(rest);
            if !might_be_negative(&rest) {
                let mut parts: Vec<Expr> = multiples
                    .iter()
                    .filter_map(|t| exact_div(t, &den))
                    .collect();
                if parts.len() == multiples.len() {
                    parts.push(make(rest, den)?);
                    return Ok(sum::make(parts));
                }
            }
        }
    }

    Ok(Expr::raw(ExprKind::IntDiv { num, den }, true))
}
