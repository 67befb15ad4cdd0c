//! Symix: normalizing symbolic integer arithmetic
//!
//! This crate provides the expression kernel used to reason about index
//! expressions, loop bounds, divisibility and ordering between symbolic
//! integer quantities.
//!
//! # Architecture
//!
//! The kernel uses an immutable, reference-shared expression tree with:
//! - Smart constructors that return already-normalized expressions
//! - A sign lattice and value ranges attached to variables
//! - Partial decision procedures (ordering, divisibility, gcd)
//! - Seed-salted digests for fast structural comparison
//!
//! # Design Principles
//!
//! 1. **Canonical forms**: two expressions are equal iff their normal
//!    forms are structurally identical
//! 2. **Soundness over completeness**: decision procedures refuse rather
//!    than guess
//! 3. **Shareability**: expressions are immutable and can cross threads
//!    freely

mod analysis;
mod bounds;
mod digest;
mod eval;
mod expr;
pub mod math;
mod predicate;
mod sign;
mod simplify;
mod var;

pub use analysis::{gcd, is_smaller, might_be_negative, multiple_of};
pub use expr::{Expr, ExprKind};
pub use predicate::{CmpOp, Predicate};
pub use sign::Sign;
pub use simplify::simplify;
pub use var::{NamedFun, Range, Var, VarId};

/// Error type for expression construction and evaluation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// Division or modulo by a zero divisor, or a malformed construction.
    #[error("division or modulo by zero")]
    DivisionByZero,

    /// Evaluation reached a variable, unknown, infinity or conditional.
    #[error("expression is not evaluable: contains {0}")]
    NotEvaluable(&'static str),

    /// The simplification driver ran out of fuel; a rewrite-engine bug.
    #[error("simplification did not reach a fixed point within {0} steps")]
    FixpointExhausted(u32),
}

pub type Result<T> = std::result::Result<T, ExprError>;
