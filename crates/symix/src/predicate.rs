//! Comparison atoms used by conditional expressions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::digest::predicate_digest;
use crate::expr::Expr;
use crate::Result;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        };
        write!(f, "{s}")
    }
}

/// An immutable comparison `(lhs op rhs)`.
///
/// A predicate has no truth value by itself; it becomes decidable only
/// when both sides are constants, inside the conditional simplifier.
#[derive(Debug, Clone)]
pub struct Predicate {
    lhs: Expr,
    rhs: Expr,
    op: CmpOp,
    digest: u64,
}

impl Predicate {
    pub fn new(lhs: Expr, rhs: Expr, op: CmpOp) -> Self {
        let digest = predicate_digest(lhs.digest(), rhs.digest(), op);
        Predicate {
            lhs,
            rhs,
            op,
            digest,
        }
    }

    pub fn lhs(&self) -> &Expr {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expr {
        &self.rhs
    }

    pub fn op(&self) -> CmpOp {
        self.op
    }

    pub fn digest(&self) -> u64 {
        self.digest
    }

    /// Decide the predicate when both sides are constants.
    pub fn eval_const(&self) -> Option<bool> {
        match (self.lhs.as_cst(), self.rhs.as_cst()) {
            (Some(l), Some(r)) => Some(self.op.holds(l, r)),
            _ => None,
        }
    }

    pub(crate) fn substitute(&self, subs: &HashMap<Expr, Expr>) -> Result<Predicate> {
        Ok(Predicate::new(
            self.lhs.substitute(subs)?,
            self.rhs.substitute(subs)?,
            self.op,
        ))
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
            && self.op == other.op
            && self.lhs == other.lhs
            && self.rhs == other.rhs
    }
}

impl Eq for Predicate {}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.lhs, self.op, self.rhs)
    }
}
