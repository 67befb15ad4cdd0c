//! Min, max and clamp over symbolic expressions.
//!
//! Decided through the ordering procedure when possible; otherwise the
//! choice is kept as a conditional expression.

use crate::analysis::is_smaller;
use crate::expr::Expr;

/// Smaller of two expressions.
pub fn min(a: &Expr, b: &Expr) -> Expr {
    match is_smaller(a, b) {
        Some(true) => a.clone(),
        Some(false) => b.clone(),
        None => {
            if a == b {
                a.clone()
            } else {
                Expr::ite(a.lt(b), a.clone(), b.clone())
            }
        }
    }
}

/// Larger of two expressions.
pub fn max(a: &Expr, b: &Expr) -> Expr {
    match is_smaller(a, b) {
        Some(true) => b.clone(),
        Some(false) => a.clone(),
        None => {
            if a == b {
                a.clone()
            } else {
                Expr::ite(a.gt(b), a.clone(), b.clone())
            }
        }
    }
}

/// `x` clamped into `[lo, hi]`.
pub fn clamp(x: &Expr, lo: &Expr, hi: &Expr) -> Expr {
    min(&max(x, lo), hi)
}
