//! Partial decision procedures.
//!
//! Everything here is pure and refuses rather than guesses: `is_smaller`
//! answers three-valued, `multiple_of` only claims divisibility it can
//! prove, and `gcd` falls back to one. Several rewrite rules rely on
//! these answers being sound.

use std::collections::HashMap;

use num_integer::Integer;

use crate::expr::{Expr, ExprKind};
use crate::sign::Sign;
use crate::simplify::{
    big_sum, cond, int_div, log_make, lookup_make, modulo, pow, prod, rounding, sum,
};
use crate::var::{NamedFun, Var};
use crate::Result;

/// Greatest common divisor of two expressions: the largest expression
/// both operands contain as a product factor, times the numeric gcd of
/// their coefficients. Falls back to one.
pub fn gcd(a: &Expr, b: &Expr) -> Expr {
    if a == b {
        return a.clone();
    }
    if let (Some(x), Some(y)) = (a.as_cst(), b.as_cst()) {
        return Expr::cst(Integer::gcd(&x, &y));
    }
    let (ca, fa) = const_and_factors(a);
    let (cb, mut fb) = const_and_factors(b);
    let mut common: Vec<Expr> = Vec::new();
    for f in fa {
        if let Some(i) = fb.iter().position(|g| *g == f) {
            fb.remove(i);
            common.push(f);
        }
    }
    let g = Integer::gcd(&ca, &cb);
    if g > 1 {
        common.push(Expr::cst(g));
    }
    if common.is_empty() {
        Expr::cst(1)
    } else {
        prod::make(common)
    }
}

/// True only when `b | a` is provable.
pub fn multiple_of(a: &Expr, b: &Expr) -> bool {
    if a == b {
        return true;
    }
    if b.is_cst(1) || b.is_cst(-1) {
        return true;
    }
    if a.is_cst(0) {
        return !b.is_cst(0);
    }
    if let (Some(x), Some(y)) = (a.as_cst(), b.as_cst()) {
        return y != 0 && x % y == 0;
    }
    // Fractions divide when the denominators agree and the numerators
    // divide pointwise.
    let (na, da) = split_fraction(a);
    let (nb, db) = split_fraction(b);
    if !da.is_empty() || !db.is_empty() {
        return multiset_eq(da, db) && multiple_of(&prod::make(na), &prod::make(nb));
    }
    match (a.kind(), b.kind()) {
        (ExprKind::Sum(terms), _) => terms.iter().all(|t| multiple_of(t, b)),
        (ExprKind::Prod(_), ExprKind::Prod(_)) => {
            let (ca, mut fa) = const_and_factors(a);
            let (cb, fb) = const_and_factors(b);
            for f in fb {
                match fa.iter().position(|g| *g == f) {
                    Some(i) => {
                        fa.remove(i);
                    }
                    None => return false,
                }
            }
            cb != 0 && ca % cb == 0
        }
        (ExprKind::Prod(factors), ExprKind::Cst(c)) => factors
            .iter()
            .any(|f| matches!(f.as_cst(), Some(k) if *c != 0 && k % c == 0)),
        (ExprKind::Prod(factors), _) => factors.iter().any(|f| f == b),
        _ => false,
    }
}

/// The exact quotient `n / d`, when `d` measures `n`.
pub(crate) fn exact_div(n: &Expr, d: &Expr) -> Option<Expr> {
    if n == d {
        return Some(Expr::cst(1));
    }
    if let ExprKind::Sum(terms) = n.kind() {
        let parts: Option<Vec<Expr>> = terms.iter().map(|t| exact_div(t, d)).collect();
        return parts.map(sum::make);
    }
    let (cn, mut fn_) = const_and_factors(n);
    let (cd, fd) = const_and_factors(d);
    for f in fd {
        match fn_.iter().position(|g| *g == f) {
            Some(i) => {
                fn_.remove(i);
            }
            None => return None,
        }
    }
    if cd == 0 || cn % cd != 0 {
        return None;
    }
    let q = cn / cd;
    if q != 1 || fn_.is_empty() {
        fn_.push(Expr::cst(q));
    }
    Some(prod::make(fn_))
}

/// Three-valued strict ordering: `Some(true)` proves `a < b` for every
/// valuation, `Some(false)` proves `a >= b`, `None` refuses.
pub fn is_smaller(a: &Expr, b: &Expr) -> Option<bool> {
    smaller_inner(a, b, true)
}

fn smaller_inner(a: &Expr, b: &Expr, allow_freeze: bool) -> Option<bool> {
    if a.is_unknown() || b.is_unknown() {
        return None;
    }
    match (a.kind(), b.kind()) {
        (ExprKind::NegInf, ExprKind::NegInf) | (ExprKind::PosInf, _) => return Some(false),
        (ExprKind::NegInf, _) => return Some(true),
        (_, ExprKind::PosInf) => return Some(true),
        (_, ExprKind::NegInf) => return Some(false),
        _ => {}
    }

    // A constant difference decides both ways.
    let diff = b.clone() - a.clone();
    if let Ok(c) = diff.eval() {
        return Some(c > 0);
    }

    // Disjoint value ranges decide.
    if let (Ok(a_hi), Ok(b_lo)) = (a.max().eval_f64(), b.min().eval_f64()) {
        if a_hi < b_lo {
            return Some(true);
        }
    }
    if let (Ok(a_lo), Ok(b_hi)) = (a.min().eval_f64(), b.max().eval_f64()) {
        if b_hi <= a_lo {
            return Some(false);
        }
    }

    if let Some(answer) = catalogue(a, b) {
        return Some(answer);
    }

    // Freeze the shared variables at themselves and compare the frozen
    // extremes; cancellation in the difference often decides from here.
    if allow_freeze {
        let shared: Vec<Var> = a
            .var_list()
            .into_iter()
            .filter(|v| b.var_list().iter().any(|w| w.id() == v.id()))
            .collect();
        if !shared.is_empty() {
            let mut subs: HashMap<Expr, Expr> = HashMap::new();
            for v in shared {
                subs.insert(
                    Expr::raw(ExprKind::Var(v.clone()), true),
                    Expr::opaque(v),
                );
            }
            let fa = a.substitute(&subs).ok()?;
            let fb = b.substitute(&subs).ok()?;
            let a_hi = fa.max();
            let b_lo = fb.min();
            // Only the positive answer transfers back: the frozen
            // extremes bound `a` from above and `b` from below.
            if !(a_hi == *a && b_lo == *b) && smaller_inner(&a_hi, &b_lo, false) == Some(true)
            {
                return Some(true);
            }
        }
    }
    None
}

/// The small pattern catalogue; only ever claims `Some(true)`.
fn catalogue(a: &Expr, b: &Expr) -> Option<bool> {
    // c*(v/k) < v, including v/k < v, for 0 < c < k and v >= 1.
    let (c, body) = sum::coeff_split(a);
    if c > 0 {
        if let ExprKind::IntDiv { num, den } = body.kind() {
            if num == b {
                if let Some(k) = den.as_cst() {
                    if c < k && provably_positive(b) {
                        return Some(true);
                    }
                }
            }
        }
    }
    // (x % v) < v for a provably positive v.
    if let ExprKind::Mod { den, .. } = a.kind() {
        if den == b && provably_positive(b) {
            return Some(true);
        }
    }
    // A variable sits below anything above its range top, and above
    // anything below its range bottom.
    if let ExprKind::Var(v) = a.kind() {
        if smaller_inner(&v.range().max(), b, false) == Some(true) {
            return Some(true);
        }
    }
    if let ExprKind::Var(v) = b.kind() {
        if smaller_inner(a, &v.range().min(), false) == Some(true) {
            return Some(true);
        }
    }
    None
}

/// True unless the expression is provably non-negative.
pub fn might_be_negative(e: &Expr) -> bool {
    if e.sign() == Sign::Positive {
        return false;
    }
    if let Ok(lo) = e.min().eval_f64() {
        if lo >= 0.0 {
            return false;
        }
    }
    true
}

pub(crate) fn provably_positive(e: &Expr) -> bool {
    match e.as_cst() {
        Some(c) => c > 0,
        None => e.min().eval_f64().map(|lo| lo > 0.0).unwrap_or(false),
    }
}

pub(crate) fn provably_nonzero(e: &Expr) -> bool {
    if let Some(c) = e.as_cst() {
        return c != 0;
    }
    if let Ok(lo) = e.min().eval_f64() {
        if lo > 0.0 {
            return true;
        }
    }
    if let Ok(hi) = e.max().eval_f64() {
        if hi < 0.0 {
            return true;
        }
    }
    false
}

/// Recursive substitution, rebuilding every node through the smart
/// constructors so the result is simplified. The map is consulted at
/// every node, variable ranges included.
pub(crate) fn substitute(e: &Expr, subs: &HashMap<Expr, Expr>) -> Result<Expr> {
    if let Some(replacement) = subs.get(e) {
        return Ok(replacement.clone());
    }
    let sub = |x: &Expr| substitute(x, subs);
    Ok(match e.kind() {
        ExprKind::Cst(_) | ExprKind::PosInf | ExprKind::NegInf | ExprKind::Unknown => e.clone(),
        ExprKind::Var(v) => {
            let range = v.range().substitute(subs)?;
            if range == *v.range() {
                e.clone()
            } else {
                Expr::from_var(v.updated_range(range))
            }
        }
        ExprKind::Opaque(v) => {
            let range = v.range().substitute(subs)?;
            if range == *v.range() {
                e.clone()
            } else {
                Expr::opaque(v.updated_range(range))
            }
        }
        ExprKind::Fun(f) => {
            let range = f.range().substitute(subs)?;
            if range == *f.range() {
                e.clone()
            } else {
                Expr::raw(ExprKind::Fun(NamedFun::new(f.name(), range)), true)
            }
        }
        ExprKind::Lookup { table, index, id } => {
            let table = table.iter().map(sub).collect::<Result<Vec<_>>>()?;
            lookup_make(table, sub(index)?, *id)
        }
        ExprKind::Sum(terms) => sum::make(terms.iter().map(sub).collect::<Result<Vec<_>>>()?),
        ExprKind::Prod(factors) => {
            prod::make(factors.iter().map(sub).collect::<Result<Vec<_>>>()?)
        }
        ExprKind::Pow { base, exp } => pow::make(sub(base)?, sub(exp)?),
        ExprKind::IntDiv { num, den } => int_div::make(sub(num)?, sub(den)?)?,
        ExprKind::Mod { num, den } => modulo::make(sub(num)?, sub(den)?)?,
        ExprKind::Log { base, arg } => log_make(sub(base)?, sub(arg)?),
        ExprKind::Floor(x) => rounding::floor(sub(x)?),
        ExprKind::Ceil(x) => rounding::ceil(sub(x)?),
        ExprKind::Abs(x) => rounding::abs(sub(x)?),
        ExprKind::Cond {
            pred,
            then,
            otherwise,
        } => cond::make(pred.substitute(subs)?, sub(then)?, sub(otherwise)?),
        ExprKind::BigSum {
            from,
            up_to,
            index,
            body,
        } => big_sum::make(sub(from)?, sub(up_to)?, index.clone(), sub(body)?),
    })
}

fn const_and_factors(e: &Expr) -> (i64, Vec<Expr>) {
    let mut c: i64 = 1;
    let mut rest = Vec::new();
    for f in prod::factors_of(e) {
        match f.as_cst() {
            Some(k) => c = c.wrapping_mul(k),
            None => rest.push(f),
        }
    }
    (c, rest)
}

/// Numerator factors and denominator bases of `e`, reading `x^-1`
/// factors as denominators.
fn split_fraction(e: &Expr) -> (Vec<Expr>, Vec<Expr>) {
    let mut numer = Vec::new();
    let mut denom = Vec::new();
    for f in prod::factors_of(e) {
        match f.kind() {
            ExprKind::Pow { base, exp } if exp.is_cst(-1) => denom.push(base.clone()),
            _ => numer.push(f.clone()),
        }
    }
    (numer, denom)
}

fn multiset_eq(mut a: Vec<Expr>, b: Vec<Expr>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    for x in b {
        match a.iter().position(|y| *y == x) {
            Some(i) => {
                a.remove(i);
            }
            None => return false,
        }
    }
    true
}
