//! Sum smart constructor.
//!
//! Flattens, merges constants, combines like terms by coefficient, and
//! recombines matching floor-division/remainder pairs, then sorts into
//! the canonical order.

use crate::expr::{canonical_cmp, Expr, ExprKind};
use crate::simplify::{ensure_simplified, prod};

pub(crate) fn make(terms: Vec<Expr>) -> Expr {
    let terms = ensure_simplified(terms);

    let mut flat: Vec<Expr> = Vec::with_capacity(terms.len());
    for t in &terms {
        match t.kind() {
            ExprKind::Sum(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(t.clone()),
        }
    }

    if flat.iter().any(Expr::is_unknown) {
        return Expr::unknown();
    }
    let has_pos = flat.iter().any(|t| matches!(t.kind(), ExprKind::PosInf));
    let has_neg = flat.iter().any(|t| matches!(t.kind(), ExprKind::NegInf));
    match (has_pos, has_neg) {
        (true, true) => return Expr::unknown(),
        (true, false) => return Expr::pos_inf(),
        (false, true) => return Expr::neg_inf(),
        (false, false) => {}
    }

    // Merge constants and coalesce terms with an equal body.
    let mut constant: i64 = 0;
    let mut groups: Vec<(Expr, i64)> = Vec::new();
    for t in flat {
        if let Some(c) = t.as_cst() {
            constant = constant.wrapping_add(c);
            continue;
        }
        let (coeff, body) = coeff_split(&t);
        if let Some(slot) = groups.iter_mut().find(|(b, _)| *b == body) {
            slot.1 = slot.1.wrapping_add(coeff);
        } else {
            groups.push((body, coeff));
        }
    }

    let mut out: Vec<Expr> = Vec::with_capacity(groups.len());
    for (body, coeff) in groups {
        match coeff {
            0 => {}
            1 => out.push(body),
            c => out.push(prod::make(vec![Expr::cst(c), body])),
        }
    }

    // `q*d*(x / d) + q*(x % d)` collapses to `q*x`; the merged term may
    // coalesce further, so rebuild from scratch.
    if let Some((i, j, combined)) = find_div_mod_pair(&out) {
        let (hi, lo) = if i > j { (i, j) } else { (j, i) };
        out.remove(hi);
        out.remove(lo);
        out.push(combined);
        if constant != 0 {
            out.push(Expr::cst(constant));
        }
        return make(out);
    }

    if constant != 0 || out.is_empty() {
        out.push(Expr::cst(constant));
    }
    out.sort_by(canonical_cmp);

    if out.len() == 1 {
        return out.into_iter().next().unwrap();
    }
    Expr::raw(ExprKind::Sum(out), true)
}

/// Split a term into its constant coefficient and the remaining body.
pub(crate) fn coeff_split(term: &Expr) -> (i64, Expr) {
    if let ExprKind::Prod(factors) = term.kind() {
        if let Some(c) = factors[0].as_cst() {
            let rest: Vec<Expr> = factors[1..].to_vec();
            return (c, prod::make(rest));
        }
    }
    (1, term.clone())
}

/// Find a pair of terms of the shape `P1 * (x / d)` and `P2 * (x % d)`
/// with `P1 == P2 * d`; together they are `P2 * x`.
fn find_div_mod_pair(terms: &[Expr]) -> Option<(usize, usize, Expr)> {
    for (i, a) in terms.iter().enumerate() {
        for (j, b) in terms.iter().enumerate() {
            if i == j {
                continue;
            }
            if let Some(combined) = combine_div_mod(a, b) {
                return Some((i, j, combined));
            }
        }
    }
    None
}

fn combine_div_mod(div_term: &Expr, mod_term: &Expr) -> Option<Expr> {
    let fs = prod::factors_of(div_term);
    let div_at = fs
        .iter()
        .position(|f| matches!(f.kind(), ExprKind::IntDiv { .. }))?;
    let (x, d) = match fs[div_at].kind() {
        ExprKind::IntDiv { num, den } => (num.clone(), den.clone()),
        _ => unreachable!(),
    };
    // Flooring quotient and C remainder only recombine exactly when
    // both operands are non-negative.
    if crate::analysis::might_be_negative(&x) || crate::analysis::might_be_negative(&d) {
        return None;
    }

    let gs = prod::factors_of(mod_term);
    let mod_at = gs.iter().position(|g| {
        matches!(g.kind(), ExprKind::Mod { num, den } if *num == x && *den == d)
    })?;

    let mut p1 = fs;
    p1.remove(div_at);
    let mut p2 = gs;
    p2.remove(mod_at);

    let p1 = prod::make(p1);
    let p2 = prod::make(p2);
    if p1 == prod::make(vec![p2.clone(), d]) {
        Some(prod::make(vec![p2, x]))
    } else {
        None
    }
}
