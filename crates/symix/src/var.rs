//! Variables, the id factory, and value ranges.
//!
//! Variable identity is the process-unique id; the name is decorative.
//! Ranges are immutable: narrowing a variable means building a new
//! variable that keeps the id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::expr::Expr;
use crate::sign::Sign;
use crate::Result;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique id. The counter is monotone; wrap-around
/// re-seeds at zero, which is benign for identity purposes.
pub(crate) fn fresh_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Opaque identity of a variable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VarId(u64);

impl VarId {
    fn fresh() -> VarId {
        VarId(fresh_id())
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

/// A symbolic variable with an optional value range.
#[derive(Debug, Clone)]
pub struct Var {
    id: VarId,
    name: Arc<str>,
    range: Arc<Range>,
}

impl Var {
    pub fn new(name: impl Into<String>) -> Var {
        Var::with_range(name, Range::Unknown)
    }

    pub fn with_range(name: impl Into<String>, range: Range) -> Var {
        Var {
            id: VarId::fresh(),
            name: name.into().into(),
            range: Arc::new(range),
        }
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    /// The same variable (same id) constrained to a new range.
    pub fn updated_range(&self, range: Range) -> Var {
        Var {
            id: self.id,
            name: Arc::clone(&self.name),
            range: Arc::new(range),
        }
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Var {}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v_{}_{}", self.name, self.id.0)
    }
}

/// An uninterpreted function value with a known range.
#[derive(Debug, Clone)]
pub struct NamedFun {
    name: Arc<str>,
    range: Arc<Range>,
}

impl NamedFun {
    pub fn new(name: impl Into<String>, range: Range) -> NamedFun {
        NamedFun {
            name: name.into().into(),
            range: Arc::new(range),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &Range {
        &self.range
    }
}

/// The set of values a variable may take.
#[derive(Debug, Clone, PartialEq)]
pub enum Range {
    /// `start ..` (inclusive, unbounded above).
    StartFrom(Expr),
    /// `.. end` (inclusive, unbounded below).
    GoesTo(Expr),
    /// `start, start + step, ...` strictly below `stop`.
    Add { start: Expr, stop: Expr, step: Expr },
    /// `start, start * mul, ...` strictly below `stop`.
    Mul { start: Expr, stop: Expr, mul: Expr },
    Unknown,
}

impl Range {
    pub fn start_from(start: Expr) -> Range {
        Range::StartFrom(start)
    }

    pub fn goes_to(end: Expr) -> Range {
        Range::GoesTo(end)
    }

    pub fn add(start: Expr, stop: Expr, step: Expr) -> Range {
        Range::Add { start, stop, step }
    }

    pub fn mul(start: Expr, stop: Expr, mul: Expr) -> Range {
        Range::Mul { start, stop, mul }
    }

    /// Smallest reachable value, `-inf`/`?` when unbounded or unknown.
    pub fn min(&self) -> Expr {
        match self {
            Range::StartFrom(start) => start.clone(),
            Range::GoesTo(_) => Expr::neg_inf(),
            Range::Add { start, stop, step } => match step.sign() {
                Sign::Positive => start.clone(),
                Sign::Negative => stop.clone() + Expr::cst(1),
                Sign::Unknown => Expr::unknown(),
            },
            Range::Mul { start, .. } => start.clone(),
            Range::Unknown => Expr::unknown(),
        }
    }

    /// Largest reachable value. For stepped ranges this is an upper
    /// bound, not necessarily attained.
    pub fn max(&self) -> Expr {
        match self {
            Range::StartFrom(_) => Expr::pos_inf(),
            Range::GoesTo(end) => end.clone(),
            Range::Add { start, stop, step } => match step.sign() {
                Sign::Positive => stop.clone() - Expr::cst(1),
                Sign::Negative => start.clone(),
                Sign::Unknown => Expr::unknown(),
            },
            Range::Mul { stop, .. } => stop.clone(),
            Range::Unknown => Expr::unknown(),
        }
    }

    /// Cardinality of the reachable value set.
    pub fn num_vals(&self) -> Expr {
        match self {
            Range::StartFrom(_) | Range::GoesTo(_) | Range::Unknown => Expr::pos_inf(),
            Range::Add { start, stop, step } => {
                let span = match step.sign() {
                    Sign::Positive => stop.clone() - start.clone(),
                    Sign::Negative => start.clone() - stop.clone(),
                    Sign::Unknown => return Expr::unknown(),
                };
                span.frac(step.clone().abs()).ceil()
            }
            Range::Mul { start, stop, mul } => {
                Expr::log(mul.clone(), stop.clone().frac(start.clone())).ceil()
            }
        }
    }

    pub fn substitute(&self, subs: &HashMap<Expr, Expr>) -> Result<Range> {
        Ok(match self {
            Range::StartFrom(start) => Range::StartFrom(start.substitute(subs)?),
            Range::GoesTo(end) => Range::GoesTo(end.substitute(subs)?),
            Range::Add { start, stop, step } => Range::Add {
                start: start.substitute(subs)?,
                stop: stop.substitute(subs)?,
                step: step.substitute(subs)?,
            },
            Range::Mul { start, stop, mul } => Range::Mul {
                start: start.substitute(subs)?,
                stop: stop.substitute(subs)?,
                mul: mul.substitute(subs)?,
            },
            Range::Unknown => Range::Unknown,
        })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range::StartFrom(start) => write!(f, "[{start}..]"),
            Range::GoesTo(end) => write!(f, "[..{end}]"),
            Range::Add { start, stop, step } => write!(f, "[{start}..{stop} by {step}]"),
            Range::Mul { start, stop, mul } => write!(f, "[{start}..{stop} by *{mul}]"),
            Range::Unknown => write!(f, "[?]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_monotone_per_creation() {
        let a = Var::new("x");
        let b = Var::new("x");
        assert_ne!(a.id(), b.id());
        assert_eq!(a, a.updated_range(Range::start_from(Expr::cst(3))));
    }

    #[test]
    fn stepped_range_bounds_follow_step_sign() {
        let up = Range::add(Expr::cst(0), Expr::cst(10), Expr::cst(2));
        assert_eq!(up.min(), Expr::cst(0));
        assert_eq!(up.max(), Expr::cst(9));

        let down = Range::add(Expr::cst(10), Expr::cst(0), Expr::cst(-2));
        assert_eq!(down.min(), Expr::cst(1));
        assert_eq!(down.max(), Expr::cst(10));
    }

    #[test]
    fn num_vals_uses_sign_aware_ceiling() {
        let r = Range::add(Expr::cst(0), Expr::cst(7), Expr::cst(2));
        assert_eq!(r.num_vals(), Expr::cst(4));

        let down = Range::add(Expr::cst(7), Expr::cst(0), Expr::cst(-2));
        assert_eq!(down.num_vals(), Expr::cst(4));
    }

    #[test]
    fn unbounded_ranges_have_infinite_cardinality() {
        assert_eq!(Range::start_from(Expr::cst(0)).num_vals(), Expr::pos_inf());
    }
}
