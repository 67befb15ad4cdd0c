//! Min/max propagation through the expression tree.
//!
//! Every rule is a sound over-approximation: `min` is a lower bound of
//! all reachable values and `max` an upper bound, with `?` whenever the
//! case table has nothing better to offer.

use std::collections::HashMap;

use crate::expr::{Expr, ExprKind};
use crate::math;
use crate::sign::Sign;
use crate::simplify::{int_div, prod, rounding, sum};
use crate::Result;

impl Expr {
    /// Lower bound of the values this expression can take.
    pub fn min(&self) -> Expr {
        self.corner(true)
    }

    /// Upper bound of the values this expression can take.
    pub fn max(&self) -> Expr {
        self.corner(false)
    }

    fn corner(&self, low: bool) -> Expr {
        match self.kind() {
            ExprKind::Cst(_) | ExprKind::PosInf | ExprKind::NegInf | ExprKind::Unknown => {
                self.clone()
            }
            // An opaque variable is its own extreme in both directions.
            ExprKind::Opaque(_) => self.clone(),
            ExprKind::Var(v) => {
                if low {
                    v.range().min()
                } else {
                    v.range().max()
                }
            }
            ExprKind::Fun(f) => {
                if low {
                    f.range().min()
                } else {
                    f.range().max()
                }
            }
            ExprKind::Sum(terms) => {
                sum::make(terms.iter().map(|t| t.corner(low)).collect())
            }
            ExprKind::Prod(_) => self.prod_corner(low),
            ExprKind::Pow { base, exp } => match (base.sign(), exp.as_cst()) {
                (Sign::Positive, Some(n)) if n > 0 => {
                    base.corner(low).pow(Expr::cst(n))
                }
                _ => Expr::unknown(),
            },
            ExprKind::IntDiv { num, den } => match den.as_cst() {
                Some(d) if d > 0 => {
                    int_div::make(num.corner(low), Expr::cst(d)).unwrap_or_else(|_| Expr::unknown())
                }
                Some(d) if d < 0 => {
                    int_div::make(num.corner(!low), Expr::cst(d)).unwrap_or_else(|_| Expr::unknown())
                }
                _ => Expr::unknown(),
            },
            ExprKind::Mod { num, den } => {
                // C remainder lives in (-|den|, |den|), clipped by the
                // dividend sign.
                let span = den.clone().abs() - Expr::cst(1);
                match (num.sign(), low) {
                    (Sign::Positive, true) => Expr::cst(0),
                    (Sign::Positive, false) => span,
                    (Sign::Negative, true) => -span,
                    (Sign::Negative, false) => Expr::cst(0),
                    (Sign::Unknown, true) => -span,
                    (Sign::Unknown, false) => span,
                }
            }
            ExprKind::Log { base, arg } => {
                if base.sign() == Sign::Positive && arg.sign() == Sign::Positive {
                    Expr::log(base.clone(), arg.corner(low))
                } else {
                    Expr::unknown()
                }
            }
            ExprKind::Floor(e) => {
                let inner = e.corner(low);
                if inner.is_unknown() {
                    inner
                } else {
                    rounding::floor(inner)
                }
            }
            ExprKind::Ceil(e) => {
                let inner = e.corner(low);
                if inner.is_unknown() {
                    inner
                } else {
                    rounding::ceil(inner)
                }
            }
            ExprKind::Abs(e) => self.abs_corner(e, low),
            ExprKind::Cond {
                then, otherwise, ..
            } => {
                let t = then.corner(low);
                let o = otherwise.corner(low);
                if t.is_unknown() || o.is_unknown() {
                    Expr::unknown()
                } else if low {
                    math::min(&t, &o)
                } else {
                    math::max(&t, &o)
                }
            }
            ExprKind::Lookup { .. } | ExprKind::BigSum { .. } => Expr::unknown(),
        }
    }

    /// Corners of a product: the constant coefficient picks which
    /// corner of the remaining (same-signed) factors participates.
    fn prod_corner(&self, low: bool) -> Expr {
        let factors = match self.kind() {
            ExprKind::Prod(fs) => fs,
            _ => unreachable!(),
        };
        let mut coeff: i64 = 1;
        let mut rest: Vec<Expr> = Vec::new();
        for f in factors {
            match f.as_cst() {
                Some(c) => coeff = coeff.wrapping_mul(c),
                None => rest.push(f.clone()),
            }
        }
        if rest.iter().any(|f| f.sign() != Sign::Positive) {
            return Expr::unknown();
        }
        let pick = if coeff >= 0 { low } else { !low };
        let corners: Vec<Expr> = rest.iter().map(|f| f.corner(pick)).collect();
        prod::make(corners) * Expr::cst(coeff)
    }

    fn abs_corner(&self, inner: &Expr, low: bool) -> Expr {
        match inner.sign() {
            Sign::Positive => inner.corner(low),
            Sign::Negative => -inner.corner(!low),
            Sign::Unknown => {
                if low {
                    Expr::cst(0)
                } else {
                    let lo = inner.min();
                    let hi = inner.max();
                    if lo.is_unknown() || hi.is_unknown() {
                        Expr::unknown()
                    } else {
                        math::max(&lo.abs(), &hi.abs())
                    }
                }
            }
        }
    }

    /// The expression with every variable pinned to its range minimum.
    pub fn at_min(&self) -> Result<Expr> {
        self.at_corner(true)
    }

    /// The expression with every variable pinned to its range maximum.
    pub fn at_max(&self) -> Result<Expr> {
        self.at_corner(false)
    }

    fn at_corner(&self, low: bool) -> Result<Expr> {
        let mut subs: HashMap<Expr, Expr> = HashMap::new();
        for v in self.var_list() {
            let bound = if low { v.range().min() } else { v.range().max() };
            if !bound.is_unknown() {
                subs.insert(Expr::raw(ExprKind::Var(v), true), bound);
            }
        }
        self.substitute(&subs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var::Range;

    #[test]
    fn sums_add_their_corners() {
        let i = Expr::var_in("i", Range::add(Expr::cst(0), Expr::cst(8), Expr::cst(1)));
        let e = i + Expr::cst(5);
        assert_eq!(e.min(), Expr::cst(5));
        assert_eq!(e.max(), Expr::cst(12));
    }

    #[test]
    fn negative_coefficients_swap_corners() {
        let i = Expr::var_in("i", Range::add(Expr::cst(1), Expr::cst(5), Expr::cst(1)));
        let e = i * Expr::cst(-2);
        assert_eq!(e.min(), Expr::cst(-8));
        assert_eq!(e.max(), Expr::cst(-2));
    }

    #[test]
    fn remainder_bounds_follow_dividend_sign() {
        let x = Expr::pos_var("x");
        let m = x % Expr::cst(8);
        assert_eq!(m.min(), Expr::cst(0));
        assert_eq!(m.max(), Expr::cst(7));
        let y = Expr::var("y");
        let m2 = y % Expr::cst(8);
        assert_eq!(m2.min(), Expr::cst(-7));
        assert_eq!(m2.max(), Expr::cst(7));
    }

    #[test]
    fn unbounded_variables_reach_infinity() {
        let n = Expr::size_var("n");
        assert_eq!(n.min(), Expr::cst(1));
        assert_eq!(n.max(), Expr::pos_inf());
    }

    #[test]
    fn conditional_takes_pointwise_bounds() {
        let p = Expr::var("a").lt(&Expr::var("b"));
        let e = Expr::ite(p, Expr::cst(2), Expr::cst(9));
        assert_eq!(e.min(), Expr::cst(2));
        assert_eq!(e.max(), Expr::cst(9));
    }

    #[test]
    fn at_extremes_substitutes_ranges() {
        let i = Expr::var_in("i", Range::add(Expr::cst(0), Expr::cst(8), Expr::cst(1)));
        let e = i * Expr::cst(3) + Expr::cst(1);
        assert_eq!(e.at_min().unwrap(), Expr::cst(1));
        assert_eq!(e.at_max().unwrap(), Expr::cst(22));
    }
}
