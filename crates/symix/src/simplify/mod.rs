//! Smart constructors and the fixpoint driver.
//!
//! Each submodule owns the rewrite rules of one expression kind. Every
//! `make` returns an expression flagged simplified; the constructors
//! call each other recursively, so a rule may assume its operands are
//! already in normal form.

pub(crate) mod big_sum;
pub(crate) mod cond;
pub(crate) mod int_div;
pub(crate) mod modulo;
pub(crate) mod pow;
pub(crate) mod prod;
pub(crate) mod rounding;
pub(crate) mod sum;

use std::collections::HashSet;

use crate::expr::{Expr, ExprKind};
use crate::predicate::Predicate;
use crate::{ExprError, Result};

const DEFAULT_FUEL: u32 = 1000;

/// Re-normalize an expression tree.
///
/// Expressions produced by the public constructors are already in
/// normal form and are returned unchanged. For a raw tree the driver
/// dispatches each node to its smart constructor and iterates to a
/// fixpoint, bounded by a fuel budget. A rewrite cycle is reported and
/// resolved by returning the latest form.
pub fn simplify(expr: &Expr) -> Result<Expr> {
    let mut current = expr.clone();
    let mut seen: HashSet<Expr> = HashSet::new();
    for _ in 0..DEFAULT_FUEL {
        if current.is_simplified() {
            return Ok(current);
        }
        let next = one_step(&current)?;
        if next == current {
            return Ok(next);
        }
        if !seen.insert(next.clone()) {
            log::warn!("simplification cycle detected at {next}; keeping latest form");
            return Ok(next);
        }
        current = next;
    }
    Err(ExprError::FixpointExhausted(DEFAULT_FUEL))
}

/// One rewrite step: normalize the children, then rebuild the root
/// through the smart constructor of its kind.
fn one_step(expr: &Expr) -> Result<Expr> {
    match expr.kind() {
        ExprKind::Cst(_)
        | ExprKind::PosInf
        | ExprKind::NegInf
        | ExprKind::Unknown
        | ExprKind::Opaque(_)
        | ExprKind::Fun(_) => Ok(expr.clone()),
        ExprKind::Var(v) => Ok(Expr::from_var(v.clone())),
        ExprKind::Lookup { table, index, id } => {
            let table = table.iter().map(simplify).collect::<Result<Vec<_>>>()?;
            Ok(lookup_make(table, simplify(index)?, *id))
        }
        ExprKind::Sum(terms) => {
            let terms = terms.iter().map(simplify).collect::<Result<Vec<_>>>()?;
            Ok(sum::make(terms))
        }
        ExprKind::Prod(factors) => {
            let factors = factors.iter().map(simplify).collect::<Result<Vec<_>>>()?;
            Ok(prod::make(factors))
        }
        ExprKind::Pow { base, exp } => Ok(pow::make(simplify(base)?, simplify(exp)?)),
        ExprKind::IntDiv { num, den } => int_div::make(simplify(num)?, simplify(den)?),
        ExprKind::Mod { num, den } => modulo::make(simplify(num)?, simplify(den)?),
        ExprKind::Log { base, arg } => Ok(log_make(simplify(base)?, simplify(arg)?)),
        ExprKind::Floor(e) => Ok(rounding::floor(simplify(e)?)),
        ExprKind::Ceil(e) => Ok(rounding::ceil(simplify(e)?)),
        ExprKind::Abs(e) => Ok(rounding::abs(simplify(e)?)),
        ExprKind::Cond {
            pred,
            then,
            otherwise,
        } => {
            let pred = Predicate::new(
                simplify(pred.lhs())?,
                simplify(pred.rhs())?,
                pred.op(),
            );
            Ok(cond::make(pred, simplify(then)?, simplify(otherwise)?))
        }
        ExprKind::BigSum {
            from,
            up_to,
            index,
            body,
        } => Ok(big_sum::make(
            simplify(from)?,
            simplify(up_to)?,
            index.clone(),
            simplify(body)?,
        )),
    }
}

/// Normalize operands handed to a smart constructor. Operands coming
/// from the public API are already simplified; raw operands are pushed
/// through the driver first.
pub(crate) fn ensure_simplified(ops: Vec<Expr>) -> Vec<Expr> {
    ops.into_iter().map(ensure_one).collect()
}

pub(crate) fn ensure_one(op: Expr) -> Expr {
    if op.is_simplified() {
        op
    } else {
        simplify(&op).unwrap_or(op)
    }
}

/// Smart constructor for table lookups: a constant in-bounds index
/// selects the element, anything else stays symbolic.
pub(crate) fn lookup_make(table: Vec<Expr>, index: Expr, id: u64) -> Expr {
    let table = ensure_simplified(table);
    let index = ensure_one(index);
    if let Some(i) = index.as_cst() {
        if i >= 0 && (i as usize) < table.len() {
            return table[i as usize].clone();
        }
    }
    Expr::raw(ExprKind::Lookup { table, index, id }, true)
}

/// Smart constructor for logarithms: folds only exact integer results.
pub(crate) fn log_make(base: Expr, arg: Expr) -> Expr {
    let base = ensure_one(base);
    let arg = ensure_one(arg);
    if base.is_unknown() || arg.is_unknown() {
        return Expr::unknown();
    }
    if let (Some(b), Some(x)) = (base.as_cst(), arg.as_cst()) {
        if let Some(k) = exact_int_log(b, x) {
            return Expr::cst(k);
        }
    }
    Expr::raw(ExprKind::Log { base, arg }, true)
}

/// `k` such that `base^k == x`, when one exists.
pub(crate) fn exact_int_log(base: i64, x: i64) -> Option<i64> {
    if base < 2 || x < 1 {
        return None;
    }
    let mut acc: i64 = 1;
    let mut k = 0;
    while acc < x {
        acc = acc.checked_mul(base)?;
        k += 1;
    }
    (acc == x).then_some(k)
}
