//! Evaluation of closed expressions.
//!
//! `eval` produces an exact integer or fails; `eval_f64` is the cheap
//! floating probe the simplifiers use to test feasibility before
//! committing to a rewrite.

use std::collections::HashMap;

use num_integer::Integer;

use crate::expr::{Expr, ExprKind};
use crate::simplify::exact_int_log;
use crate::{ExprError, Result};

impl Expr {
    /// Evaluate a closed expression to an integer.
    pub fn eval(&self) -> Result<i64> {
        match self.kind() {
            ExprKind::Cst(n) => Ok(*n),
            ExprKind::PosInf | ExprKind::NegInf => {
                Err(ExprError::NotEvaluable("an infinity"))
            }
            ExprKind::Unknown => Err(ExprError::NotEvaluable("an unknown")),
            ExprKind::Var(_) | ExprKind::Opaque(_) => {
                Err(ExprError::NotEvaluable("a variable"))
            }
            ExprKind::Fun(_) => Err(ExprError::NotEvaluable("a symbolic function")),
            ExprKind::Lookup { .. } => Err(ExprError::NotEvaluable("a table lookup")),
            ExprKind::Cond { .. } => Err(ExprError::NotEvaluable("a conditional")),
            ExprKind::Sum(terms) => {
                let mut acc: i64 = 0;
                for t in terms {
                    acc = acc.wrapping_add(t.eval()?);
                }
                Ok(acc)
            }
            ExprKind::Prod(factors) => {
                let mut acc: i64 = 1;
                for f in factors {
                    acc = acc.wrapping_mul(f.eval()?);
                }
                Ok(acc)
            }
            ExprKind::Pow { base, exp } => {
                let b = base.eval()?;
                let e = exp.eval()?;
                if e >= 0 {
                    let mut acc: i64 = 1;
                    for _ in 0..e {
                        acc = acc.wrapping_mul(b);
                    }
                    Ok(acc)
                } else if b == 1 {
                    Ok(1)
                } else if b == -1 {
                    Ok(if e % 2 == 0 { 1 } else { -1 })
                } else {
                    Err(ExprError::NotEvaluable("a fractional power"))
                }
            }
            ExprKind::IntDiv { num, den } => {
                let d = den.eval()?;
                if d == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                Ok(Integer::div_floor(&num.eval()?, &d))
            }
            ExprKind::Mod { num, den } => {
                let d = den.eval()?;
                if d == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                Ok(num.eval()? % d)
            }
            ExprKind::Log { base, arg } => {
                let b = base.eval()?;
                let x = arg.eval()?;
                exact_int_log(b, x).ok_or(ExprError::NotEvaluable("an inexact logarithm"))
            }
            ExprKind::Floor(e) => round_eval(e, f64::floor),
            ExprKind::Ceil(e) => round_eval(e, f64::ceil),
            ExprKind::Abs(e) => Ok(e.eval()?.wrapping_abs()),
            ExprKind::BigSum {
                from,
                up_to,
                index,
                body,
            } => {
                let lo = from.eval()?;
                let hi = up_to.eval()?;
                let index = Expr::raw(ExprKind::Var(index.clone()), true);
                let mut acc: i64 = 0;
                for k in lo..=hi {
                    let mut subs = HashMap::new();
                    subs.insert(index.clone(), Expr::cst(k));
                    acc = acc.wrapping_add(body.substitute(&subs)?.eval()?);
                }
                Ok(acc)
            }
        }
    }

    /// True when `eval` succeeds on this expression.
    pub fn is_evaluable(&self) -> bool {
        self.eval().is_ok()
    }

    /// Evaluate to a double; infinities map onto the IEEE infinities.
    pub fn eval_f64(&self) -> Result<f64> {
        match self.kind() {
            ExprKind::Cst(n) => Ok(*n as f64),
            ExprKind::PosInf => Ok(f64::INFINITY),
            ExprKind::NegInf => Ok(f64::NEG_INFINITY),
            ExprKind::Unknown => Err(ExprError::NotEvaluable("an unknown")),
            ExprKind::Var(_) | ExprKind::Opaque(_) => {
                Err(ExprError::NotEvaluable("a variable"))
            }
            ExprKind::Fun(_) => Err(ExprError::NotEvaluable("a symbolic function")),
            ExprKind::Lookup { .. } => Err(ExprError::NotEvaluable("a table lookup")),
            ExprKind::Cond { .. } => Err(ExprError::NotEvaluable("a conditional")),
            ExprKind::Sum(terms) => terms.iter().try_fold(0.0, |acc, t| {
                Ok(acc + t.eval_f64()?)
            }),
            ExprKind::Prod(factors) => factors.iter().try_fold(1.0, |acc, f| {
                Ok(acc * f.eval_f64()?)
            }),
            ExprKind::Pow { base, exp } => {
                let b = base.eval_f64()?;
                let e = exp.eval_f64()?;
                if e.is_finite() && e.fract() == 0.0 && e.abs() <= i32::MAX as f64 {
                    Ok(b.powi(e as i32))
                } else {
                    Ok(b.powf(e))
                }
            }
            ExprKind::IntDiv { num, den } => {
                let d = den.eval_f64()?;
                if d == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                Ok((num.eval_f64()? / d).floor())
            }
            ExprKind::Mod { num, den } => {
                let d = den.eval_f64()?;
                if d == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                Ok(num.eval_f64()? % d)
            }
            ExprKind::Log { base, arg } => {
                Ok(arg.eval_f64()?.ln() / base.eval_f64()?.ln())
            }
            ExprKind::Floor(e) => Ok(e.eval_f64()?.floor()),
            ExprKind::Ceil(e) => Ok(e.eval_f64()?.ceil()),
            ExprKind::Abs(e) => Ok(e.eval_f64()?.abs()),
            ExprKind::BigSum { .. } => self.eval().map(|n| n as f64),
        }
    }
}

fn round_eval(inner: &Expr, dir: fn(f64) -> f64) -> Result<i64> {
    if let Ok(n) = inner.eval() {
        return Ok(n);
    }
    let v = dir(inner.eval_f64()?);
    if v.is_finite() && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Ok(v as i64)
    } else {
        Err(ExprError::NotEvaluable("an infinite rounding"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_folds() {
        let e = (Expr::cst(3) + Expr::cst(4)) * Expr::cst(2);
        assert_eq!(e.eval(), Ok(14));
        assert!(e.is_evaluable());
    }

    #[test]
    fn open_trees_fail() {
        let e = Expr::var("x") + Expr::cst(1);
        assert!(matches!(e.eval(), Err(ExprError::NotEvaluable(_))));
        assert!(!e.is_evaluable());
    }

    #[test]
    fn floating_probe_handles_fractions() {
        let half = Expr::cst(7).frac(Expr::cst(2));
        assert_eq!(half.eval_f64(), Ok(3.5));
        assert!(half.eval().is_err());
    }

    #[test]
    fn infinities_probe_but_do_not_eval() {
        assert_eq!(Expr::pos_inf().eval_f64(), Ok(f64::INFINITY));
        assert!(Expr::pos_inf().eval().is_err());
    }
}
