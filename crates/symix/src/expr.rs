//! Expression representation.
//!
//! Expressions are immutable and reference-counted; cloning is cheap and
//! sharing is never observable. Every `Expr` obtained through the public
//! constructors or operators is already in normal form.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::digest::{kind_digest, kind_seed};
use crate::predicate::{CmpOp, Predicate};
use crate::simplify;
use crate::var::{fresh_id, NamedFun, Range, Var};
use crate::Result;

/// A symbolic integer expression.
#[derive(Clone)]
pub struct Expr {
    node: Arc<Node>,
}

#[derive(Debug)]
struct Node {
    kind: ExprKind,
    digest: u64,
    simplified: bool,
}

/// The kind of expression node.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Integer constant.
    Cst(i64),
    /// Positive infinity.
    PosInf,
    /// Negative infinity.
    NegInf,
    /// An unknown quantity; absorbs most operations.
    Unknown,
    /// Symbolic variable, identified by its id alone.
    Var(Var),
    /// A variable frozen at itself: its min and max are the variable.
    Opaque(Var),
    /// Uninterpreted function value with a known range.
    Fun(NamedFun),
    /// Indexed read into a literal table of expressions.
    Lookup {
        table: Vec<Expr>,
        index: Expr,
        id: u64,
    },
    /// Commutative, associative sum; at least two terms.
    Sum(Vec<Expr>),
    /// Commutative, associative product; at least two factors.
    Prod(Vec<Expr>),
    Pow {
        base: Expr,
        exp: Expr,
    },
    /// Floor division.
    IntDiv {
        num: Expr,
        den: Expr,
    },
    /// C remainder: the result takes the sign of the dividend.
    Mod {
        num: Expr,
        den: Expr,
    },
    Log {
        base: Expr,
        arg: Expr,
    },
    Floor(Expr),
    Ceil(Expr),
    Abs(Expr),
    Cond {
        pred: Predicate,
        then: Expr,
        otherwise: Expr,
    },
    /// Closed form of `sum(body(i) for i in from..=up_to)`.
    BigSum {
        from: Expr,
        up_to: Expr,
        index: Var,
        body: Expr,
    },
}

impl Expr {
    pub(crate) fn raw(kind: ExprKind, simplified: bool) -> Expr {
        let digest = kind_digest(&kind);
        Expr {
            node: Arc::new(Node {
                kind,
                digest,
                simplified,
            }),
        }
    }

    // ========== Atoms ==========

    pub fn cst(n: i64) -> Expr {
        Expr::raw(ExprKind::Cst(n), true)
    }

    pub fn pos_inf() -> Expr {
        Expr::raw(ExprKind::PosInf, true)
    }

    pub fn neg_inf() -> Expr {
        Expr::raw(ExprKind::NegInf, true)
    }

    pub fn unknown() -> Expr {
        Expr::raw(ExprKind::Unknown, true)
    }

    /// A fresh variable with an unknown range.
    pub fn var(name: impl Into<String>) -> Expr {
        Expr::from_var(Var::new(name))
    }

    /// A fresh variable constrained to the given range.
    pub fn var_in(name: impl Into<String>, range: Range) -> Expr {
        Expr::from_var(Var::with_range(name, range))
    }

    /// A fresh variable known to be `>= 0`.
    pub fn pos_var(name: impl Into<String>) -> Expr {
        Expr::var_in(name, Range::start_from(Expr::cst(0)))
    }

    /// A fresh variable known to be `>= 1`.
    pub fn size_var(name: impl Into<String>) -> Expr {
        Expr::var_in(name, Range::start_from(Expr::cst(1)))
    }

    /// Wrap a variable, collapsing it to its single value when the range
    /// pins it down.
    pub fn from_var(var: Var) -> Expr {
        let min = var.range().min();
        if !min.is_unknown() && min == var.range().max() {
            return min;
        }
        Expr::raw(ExprKind::Var(var), true)
    }

    pub(crate) fn opaque(var: Var) -> Expr {
        Expr::raw(ExprKind::Opaque(var), true)
    }

    /// An uninterpreted symbolic function value.
    pub fn fun(name: impl Into<String>, range: Range) -> Expr {
        Expr::raw(ExprKind::Fun(NamedFun::new(name, range)), true)
    }

    /// An indexed read into a literal table.
    pub fn lookup(table: Vec<Expr>, index: Expr) -> Expr {
        simplify::lookup_make(table, index, fresh_id())
    }

    /// Closed-form symbolic summation `sum(body(i) for i in from..=up_to)`.
    pub fn big_sum(from: Expr, up_to: Expr, body: impl FnOnce(Expr) -> Expr) -> Expr {
        let range = Range::add(from.clone(), up_to.clone() + Expr::cst(1), Expr::cst(1));
        let index = Var::with_range("i", range);
        let body = body(Expr::raw(ExprKind::Var(index.clone()), true));
        simplify::big_sum::make(from, up_to, index, body)
    }

    // ========== Composite constructors ==========

    /// Sum of arbitrarily many terms.
    pub fn sum(terms: Vec<Expr>) -> Expr {
        simplify::sum::make(terms)
    }

    /// Product of arbitrarily many factors.
    pub fn product(factors: Vec<Expr>) -> Expr {
        simplify::prod::make(factors)
    }

    pub fn pow(self, exp: Expr) -> Expr {
        simplify::pow::make(self, exp)
    }

    /// Floor division; fails on a zero divisor.
    pub fn int_div(self, den: Expr) -> Result<Expr> {
        simplify::int_div::make(self, den)
    }

    /// C remainder; fails on a zero divisor.
    pub fn modulo(self, den: Expr) -> Result<Expr> {
        simplify::modulo::make(self, den)
    }

    /// Ordinal division `self * rhs^(-1)`, kept exact and symbolic.
    pub fn frac(self, rhs: Expr) -> Expr {
        self * rhs.pow(Expr::cst(-1))
    }

    pub fn floor(self) -> Expr {
        simplify::rounding::floor(self)
    }

    pub fn ceil(self) -> Expr {
        simplify::rounding::ceil(self)
    }

    pub fn abs(self) -> Expr {
        simplify::rounding::abs(self)
    }

    pub fn log(base: Expr, arg: Expr) -> Expr {
        simplify::log_make(base, arg)
    }

    /// Conditional expression on a comparison atom.
    pub fn ite(pred: Predicate, then: Expr, otherwise: Expr) -> Expr {
        simplify::cond::make(pred, then, otherwise)
    }

    // ========== Predicates over self ==========

    pub fn lt(&self, rhs: &Expr) -> Predicate {
        Predicate::new(self.clone(), rhs.clone(), CmpOp::Lt)
    }

    pub fn le(&self, rhs: &Expr) -> Predicate {
        Predicate::new(self.clone(), rhs.clone(), CmpOp::Le)
    }

    pub fn gt(&self, rhs: &Expr) -> Predicate {
        Predicate::new(self.clone(), rhs.clone(), CmpOp::Gt)
    }

    pub fn ge(&self, rhs: &Expr) -> Predicate {
        Predicate::new(self.clone(), rhs.clone(), CmpOp::Ge)
    }

    pub fn eq_to(&self, rhs: &Expr) -> Predicate {
        Predicate::new(self.clone(), rhs.clone(), CmpOp::Eq)
    }

    pub fn ne_to(&self, rhs: &Expr) -> Predicate {
        Predicate::new(self.clone(), rhs.clone(), CmpOp::Ne)
    }

    // ========== Accessors ==========

    pub fn kind(&self) -> &ExprKind {
        &self.node.kind
    }

    pub fn digest(&self) -> u64 {
        self.node.digest
    }

    pub fn is_simplified(&self) -> bool {
        self.node.simplified
    }

    pub fn as_cst(&self) -> Option<i64> {
        match self.kind() {
            ExprKind::Cst(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self.kind() {
            ExprKind::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sum(&self) -> Option<&[Expr]> {
        match self.kind() {
            ExprKind::Sum(terms) => Some(terms),
            _ => None,
        }
    }

    pub fn as_prod(&self) -> Option<&[Expr]> {
        match self.kind() {
            ExprKind::Prod(factors) => Some(factors),
            _ => None,
        }
    }

    pub fn is_cst(&self, n: i64) -> bool {
        self.as_cst() == Some(n)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind(), ExprKind::Unknown)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.kind(), ExprKind::PosInf | ExprKind::NegInf)
    }

    // ========== Traversals ==========

    /// Count the nodes of the tree; the well-founded measure of the
    /// rewrite system.
    pub fn node_count(&self) -> usize {
        let mut n = 0;
        self.visit(&mut |_| n += 1);
        n
    }

    /// Pre-order traversal over every node. Does not descend into
    /// variable ranges.
    pub fn visit(&self, f: &mut impl FnMut(&Expr)) {
        self.visit_until_dyn(&mut |e| {
            f(e);
            false
        });
    }

    /// Pre-order traversal that stops as soon as the callback answers
    /// `true`; returns whether it did.
    pub fn visit_until(&self, f: &mut impl FnMut(&Expr) -> bool) -> bool {
        self.visit_until_dyn(f)
    }

    fn visit_until_dyn(&self, f: &mut dyn FnMut(&Expr) -> bool) -> bool {
        if f(self) {
            return true;
        }
        match self.kind() {
            ExprKind::Cst(_)
            | ExprKind::PosInf
            | ExprKind::NegInf
            | ExprKind::Unknown
            | ExprKind::Var(_)
            | ExprKind::Opaque(_)
            | ExprKind::Fun(_) => false,
            ExprKind::Lookup { table, index, .. } => {
                table.iter().any(|e| e.visit_until_dyn(f)) || index.visit_until_dyn(f)
            }
            ExprKind::Sum(children) | ExprKind::Prod(children) => {
                children.iter().any(|e| e.visit_until_dyn(f))
            }
            ExprKind::Pow { base: a, exp: b }
            | ExprKind::IntDiv { num: a, den: b }
            | ExprKind::Mod { num: a, den: b }
            | ExprKind::Log { base: a, arg: b } => {
                a.visit_until_dyn(f) || b.visit_until_dyn(f)
            }
            ExprKind::Floor(e) | ExprKind::Ceil(e) | ExprKind::Abs(e) => e.visit_until_dyn(f),
            ExprKind::Cond {
                pred,
                then,
                otherwise,
            } => {
                pred.lhs().visit_until_dyn(f)
                    || pred.rhs().visit_until_dyn(f)
                    || then.visit_until_dyn(f)
                    || otherwise.visit_until_dyn(f)
            }
            ExprKind::BigSum {
                from, up_to, body, ..
            } => {
                from.visit_until_dyn(f) || up_to.visit_until_dyn(f) || body.visit_until_dyn(f)
            }
        }
    }

    /// Structural containment of a sub-expression.
    pub fn contains(&self, needle: &Expr) -> bool {
        self.visit_until(&mut |e| e == needle)
    }

    /// All variables occurring in the tree, deduplicated by id.
    pub fn var_list(&self) -> Vec<Var> {
        let mut out: Vec<Var> = Vec::new();
        self.visit(&mut |e| {
            let var = match e.kind() {
                ExprKind::Var(v) | ExprKind::Opaque(v) => Some(v),
                _ => None,
            };
            if let Some(v) = var {
                if !out.iter().any(|seen| seen.id() == v.id()) {
                    out.push(v.clone());
                }
            }
        });
        out
    }

    /// Replace sub-expressions per the map, rebuilding through the smart
    /// constructors. The map is consulted at every node, including
    /// inside variable ranges.
    pub fn substitute(&self, subs: &HashMap<Expr, Expr>) -> Result<Expr> {
        crate::analysis::substitute(self, subs)
    }
}

// ========== Identity ==========

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        // Digest mismatch proves inequality; a match is confirmed
        // structurally.
        if self.node.digest != other.node.digest {
            return false;
        }
        kinds_eq(self.kind(), other.kind())
    }
}

impl Eq for Expr {}

fn kinds_eq(a: &ExprKind, b: &ExprKind) -> bool {
    match (a, b) {
        (ExprKind::Cst(x), ExprKind::Cst(y)) => x == y,
        (ExprKind::PosInf, ExprKind::PosInf)
        | (ExprKind::NegInf, ExprKind::NegInf)
        | (ExprKind::Unknown, ExprKind::Unknown) => true,
        (ExprKind::Var(x), ExprKind::Var(y)) | (ExprKind::Opaque(x), ExprKind::Opaque(y)) => {
            x.id() == y.id()
        }
        (ExprKind::Fun(x), ExprKind::Fun(y)) => x.name() == y.name(),
        (
            ExprKind::Lookup {
                table: ta,
                index: ia,
                id: na,
            },
            ExprKind::Lookup {
                table: tb,
                index: ib,
                id: nb,
            },
        ) => na == nb && ia == ib && ta == tb,
        (ExprKind::Sum(xs), ExprKind::Sum(ys)) | (ExprKind::Prod(xs), ExprKind::Prod(ys)) => {
            xs == ys
        }
        (
            ExprKind::Pow { base: a1, exp: b1 },
            ExprKind::Pow { base: a2, exp: b2 },
        ) => a1 == a2 && b1 == b2,
        (
            ExprKind::IntDiv { num: a1, den: b1 },
            ExprKind::IntDiv { num: a2, den: b2 },
        )
        | (
            ExprKind::Mod { num: a1, den: b1 },
            ExprKind::Mod { num: a2, den: b2 },
        ) => a1 == a2 && b1 == b2,
        (
            ExprKind::Log { base: a1, arg: b1 },
            ExprKind::Log { base: a2, arg: b2 },
        ) => a1 == a2 && b1 == b2,
        (ExprKind::Floor(x), ExprKind::Floor(y))
        | (ExprKind::Ceil(x), ExprKind::Ceil(y))
        | (ExprKind::Abs(x), ExprKind::Abs(y)) => x == y,
        (
            ExprKind::Cond {
                pred: p1,
                then: t1,
                otherwise: e1,
            },
            ExprKind::Cond {
                pred: p2,
                then: t2,
                otherwise: e2,
            },
        ) => p1 == p2 && t1 == t2 && e1 == e2,
        (
            ExprKind::BigSum {
                from: f1,
                up_to: u1,
                index: i1,
                body: b1,
            },
            ExprKind::BigSum {
                from: f2,
                up_to: u2,
                index: i2,
                body: b2,
            },
        ) => i1.id() == i2.id() && f1 == f2 && u1 == u2 && b1 == b2,
        _ => false,
    }
}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.node.digest);
    }
}

/// Total order used to sort sum terms and product factors: constants
/// first, then variables by name and id, then everything else by
/// variant seed and digest.
pub(crate) fn canonical_cmp(a: &Expr, b: &Expr) -> Ordering {
    match (a.kind(), b.kind()) {
        (ExprKind::Cst(x), ExprKind::Cst(y)) => x.cmp(y),
        (ExprKind::Cst(_), _) => Ordering::Less,
        (_, ExprKind::Cst(_)) => Ordering::Greater,
        (ExprKind::Var(x), ExprKind::Var(y)) => {
            x.name().cmp(y.name()).then(x.id().cmp(&y.id()))
        }
        (ExprKind::Var(_), _) => Ordering::Less,
        (_, ExprKind::Var(_)) => Ordering::Greater,
        _ => kind_seed(a.kind())
            .cmp(&kind_seed(b.kind()))
            .then(a.digest().cmp(&b.digest())),
    }
}

// ========== Operators ==========

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        simplify::sum::make(vec![self, rhs])
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        simplify::sum::make(vec![self, -rhs])
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        simplify::prod::make(vec![self, rhs])
    }
}

/// Floor division. Like integer `/` in `std`, this panics on a zero
/// divisor; use [`Expr::int_div`] for the recoverable form.
impl std::ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        match simplify::int_div::make(self, rhs) {
            Ok(e) => e,
            Err(err) => panic!("{err}"),
        }
    }
}

/// C remainder. Like integer `%` in `std`, this panics on a zero
/// divisor; use [`Expr::modulo`] for the recoverable form.
impl std::ops::Rem for Expr {
    type Output = Expr;

    fn rem(self, rhs: Expr) -> Expr {
        match simplify::modulo::make(self, rhs) {
            Ok(e) => e,
            Err(err) => panic!("{err}"),
        }
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        simplify::prod::make(vec![Expr::cst(-1), self])
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Expr {
        Expr::cst(n)
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Expr {
        Expr::from_var(var)
    }
}

// ========== Display ==========

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Cst(n) => write!(f, "{n}"),
            ExprKind::PosInf => write!(f, "+inf"),
            ExprKind::NegInf => write!(f, "-inf"),
            ExprKind::Unknown => write!(f, "?"),
            ExprKind::Var(v) => write!(f, "{v}"),
            ExprKind::Opaque(v) => write!(f, "opaque({v})"),
            ExprKind::Fun(fun) => write!(f, "{}", fun.name()),
            ExprKind::Lookup { table, index, .. } => {
                write!(f, "lookup[")?;
                for (i, e) in table.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]({index})")
            }
            ExprKind::Sum(terms) => {
                write!(f, "(")?;
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
            ExprKind::Prod(factors) => {
                write!(f, "(")?;
                for (i, t) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
            ExprKind::Pow { base, exp } => {
                if exp.is_cst(-1) {
                    write!(f, "1/^({base})")
                } else {
                    write!(f, "pow({base},{exp})")
                }
            }
            ExprKind::IntDiv { num, den } => write!(f, "({num} / {den})"),
            ExprKind::Mod { num, den } => write!(f, "({num} % ({den}))"),
            ExprKind::Log { base, arg } => write!(f, "log({base},{arg})"),
            ExprKind::Floor(e) => write!(f, "floor({e})"),
            ExprKind::Ceil(e) => write!(f, "ceil({e})"),
            ExprKind::Abs(e) => write!(f, "abs({e})"),
            ExprKind::Cond {
                pred,
                then,
                otherwise,
            } => write!(f, "({pred} ? {then} : {otherwise})"),
            ExprKind::BigSum {
                from,
                up_to,
                index,
                body,
            } => write!(f, "sum_{{{index}={from}..{up_to}}}({body})"),
        }
    }
}
