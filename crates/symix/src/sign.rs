//! Three-valued sign lattice and sign derivation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

use crate::expr::{Expr, ExprKind};

/// Abstract sign of an integer expression.
///
/// `Positive` means provably `>= 0`, `Negative` provably `<= 0`;
/// `Unknown` is the top of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Positive,
    Negative,
    Unknown,
}

impl Sign {
    /// Sign of the negated value.
    pub fn reverse(self) -> Sign {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
            Sign::Unknown => Sign::Unknown,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    /// Sign of a product of two values of the given signs.
    fn mul(self, rhs: Sign) -> Sign {
        match (self, rhs) {
            (Sign::Unknown, _) | (_, Sign::Unknown) => Sign::Unknown,
            (lhs, rhs) if lhs == rhs => Sign::Positive,
            _ => Sign::Negative,
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Positive => write!(f, "+"),
            Sign::Negative => write!(f, "-"),
            Sign::Unknown => write!(f, "?"),
        }
    }
}

impl Expr {
    /// Derive the sign of this expression.
    pub fn sign(&self) -> Sign {
        match self.kind() {
            ExprKind::Cst(n) => {
                if *n >= 0 {
                    Sign::Positive
                } else {
                    Sign::Negative
                }
            }
            ExprKind::PosInf => Sign::Positive,
            ExprKind::NegInf => Sign::Negative,
            ExprKind::Unknown => Sign::Unknown,
            ExprKind::Var(v) | ExprKind::Opaque(v) => range_sign(v.range()),
            ExprKind::Fun(f) => range_sign(f.range()),
            ExprKind::Sum(terms) => {
                let first = terms[0].sign();
                if first != Sign::Unknown && terms[1..].iter().all(|t| t.sign() == first) {
                    first
                } else {
                    Sign::Unknown
                }
            }
            ExprKind::Prod(factors) => factors
                .iter()
                .map(Expr::sign)
                .fold(Sign::Positive, Sign::mul),
            ExprKind::Pow { base, exp } => match exp.kind() {
                ExprKind::Cst(n) if *n > 0 && n % 2 == 0 => Sign::Positive,
                // Pow with an unknown exponent stays Unknown even for a
                // positive base; callers rely on the conservative answer.
                ExprKind::Cst(n) if *n > 0 => base.sign(),
                _ => Sign::Unknown,
            },
            ExprKind::IntDiv { num, den } => num.sign() * den.sign(),
            ExprKind::Mod { num, .. } => num.sign(),
            ExprKind::Abs(_) => Sign::Positive,
            ExprKind::Floor(e) | ExprKind::Ceil(e) => e.sign(),
            ExprKind::Cond {
                then, otherwise, ..
            } => {
                let t = then.sign();
                if t != Sign::Unknown && otherwise.sign() == t {
                    t
                } else {
                    Sign::Unknown
                }
            }
            ExprKind::BigSum { body, .. } => body.sign(),
            ExprKind::Log { .. } | ExprKind::Lookup { .. } => Sign::Unknown,
        }
    }
}

/// Sign of a variable from its range: non-negative lower bound means
/// `Positive`, non-positive upper bound means `Negative`.
fn range_sign(range: &crate::var::Range) -> Sign {
    if let Ok(lo) = range.min().eval_f64() {
        if lo >= 0.0 {
            return Sign::Positive;
        }
    }
    if let Ok(hi) = range.max().eval_f64() {
        if hi <= 0.0 {
            return Sign::Negative;
        }
    }
    Sign::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var::Range;

    #[test]
    fn constants_and_infinities() {
        assert_eq!(Expr::cst(3).sign(), Sign::Positive);
        assert_eq!(Expr::cst(0).sign(), Sign::Positive);
        assert_eq!(Expr::cst(-2).sign(), Sign::Negative);
        assert_eq!(Expr::pos_inf().sign(), Sign::Positive);
        assert_eq!(Expr::neg_inf().sign(), Sign::Negative);
    }

    #[test]
    fn variable_sign_follows_range() {
        assert_eq!(Expr::pos_var("n").sign(), Sign::Positive);
        assert_eq!(Expr::var("x").sign(), Sign::Unknown);
        let neg = Expr::var_in("m", Range::goes_to(Expr::cst(0)));
        assert_eq!(neg.sign(), Sign::Negative);
    }

    #[test]
    fn product_sign_is_xor_of_factor_signs() {
        let n = Expr::size_var("n");
        let m = Expr::size_var("m");
        assert_eq!((n.clone() * m.clone()).sign(), Sign::Positive);
        assert_eq!((n * m * Expr::cst(-1)).sign(), Sign::Negative);
    }

    #[test]
    fn even_power_is_positive() {
        let x = Expr::var("x");
        assert_eq!(x.clone().pow(Expr::cst(2)).sign(), Sign::Positive);
        assert_eq!(x.pow(Expr::cst(3)).sign(), Sign::Unknown);
    }

    #[test]
    fn mod_takes_dividend_sign() {
        let n = Expr::pos_var("n");
        let m = (n % Expr::cst(7)).sign();
        assert_eq!(m, Sign::Positive);
    }
}
