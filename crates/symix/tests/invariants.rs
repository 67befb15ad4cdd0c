//! Property tests for the normal-form invariants.
//!
//! Random expression shapes over a small variable set are built twice:
//! once through the smart constructors and once as a plain integer
//! computation, then cross-checked through substitution and evaluation.

use std::collections::HashMap;

use proptest::prelude::*;
use symix::{gcd, is_smaller, multiple_of, simplify, Expr, ExprKind};

#[derive(Clone, Debug)]
enum Shape {
    Cst(i64),
    Var(usize),
    Add(Box<Shape>, Box<Shape>),
    Sub(Box<Shape>, Box<Shape>),
    Mul(Box<Shape>, Box<Shape>),
    Div(Box<Shape>, i64),
    Rem(Box<Shape>, i64),
}

impl Shape {
    fn materialize(&self, vars: &[Expr]) -> Expr {
        match self {
            Shape::Cst(n) => Expr::cst(*n),
            Shape::Var(i) => vars[*i].clone(),
            Shape::Add(a, b) => a.materialize(vars) + b.materialize(vars),
            Shape::Sub(a, b) => a.materialize(vars) - b.materialize(vars),
            Shape::Mul(a, b) => a.materialize(vars) * b.materialize(vars),
            Shape::Div(a, d) => a.materialize(vars) / Expr::cst(*d),
            Shape::Rem(a, d) => a.materialize(vars) % Expr::cst(*d),
        }
    }

    fn reference(&self, vals: &[i64]) -> i64 {
        match self {
            Shape::Cst(n) => *n,
            Shape::Var(i) => vals[*i],
            Shape::Add(a, b) => a.reference(vals) + b.reference(vals),
            Shape::Sub(a, b) => a.reference(vals) - b.reference(vals),
            Shape::Mul(a, b) => a.reference(vals) * b.reference(vals),
            Shape::Div(a, d) => div_floor(a.reference(vals), *d),
            Shape::Rem(a, d) => a.reference(vals) % d,
        }
    }
}

/// Flooring division over machine integers; the remainder correction
/// mirrors how the unstable std implementation does it.
fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn nonzero_divisor() -> impl Strategy<Value = i64> {
    prop_oneof![1i64..=9, -9i64..=-1]
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (-9i64..=9).prop_map(Shape::Cst),
        (0usize..3).prop_map(Shape::Var),
    ];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Add(a.into(), b.into())),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Sub(a.into(), b.into())),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Mul(a.into(), b.into())),
            (inner.clone(), nonzero_divisor())
                .prop_map(|(a, d)| Shape::Div(a.into(), d)),
            (inner, nonzero_divisor()).prop_map(|(a, d)| Shape::Rem(a.into(), d)),
        ]
    })
}

fn fresh_vars() -> Vec<Expr> {
    vec![Expr::var("a"), Expr::var("b"), Expr::var("c")]
}

fn assignment(vars: &[Expr], vals: &[i64; 3]) -> HashMap<Expr, Expr> {
    vars.iter()
        .cloned()
        .zip(vals.iter().map(|v| Expr::cst(*v)))
        .collect()
}

proptest! {
    #[test]
    fn substitution_matches_integer_semantics(
        shape in shape_strategy(),
        vals in proptest::array::uniform3(-9i64..=9),
    ) {
        let vars = fresh_vars();
        let e = shape.materialize(&vars);
        let closed = e.substitute(&assignment(&vars, &vals)).unwrap();
        prop_assert_eq!(closed, Expr::cst(shape.reference(&vals)));
    }

    #[test]
    fn simplification_is_idempotent(shape in shape_strategy()) {
        let e = shape.materialize(&fresh_vars());
        prop_assert!(e.is_simplified());
        prop_assert_eq!(simplify(&e).unwrap(), e);
    }

    #[test]
    fn addition_and_multiplication_commute(
        a in shape_strategy(),
        b in shape_strategy(),
    ) {
        let vars = fresh_vars();
        let ea = a.materialize(&vars);
        let eb = b.materialize(&vars);
        prop_assert_eq!(ea.clone() + eb.clone(), eb.clone() + ea.clone());
        prop_assert_eq!(ea.clone() * eb.clone(), eb * ea);
    }

    #[test]
    fn self_subtraction_vanishes(shape in shape_strategy()) {
        let e = shape.materialize(&fresh_vars());
        prop_assert_eq!(e.clone() - e, Expr::cst(0));
    }

    #[test]
    fn simplified_sums_respect_their_invariants(
        a in shape_strategy(),
        b in shape_strategy(),
        c in shape_strategy(),
    ) {
        let vars = fresh_vars();
        let e = a.materialize(&vars) + b.materialize(&vars) + c.materialize(&vars);
        if let ExprKind::Sum(terms) = e.kind() {
            prop_assert!(terms.len() >= 2);
            let consts = terms.iter().filter(|t| t.as_cst().is_some()).count();
            prop_assert!(consts <= 1);
            prop_assert!(!terms.iter().any(|t| t.is_cst(0)));
            prop_assert!(!terms.iter().any(|t| matches!(t.kind(), ExprKind::Sum(_))));
            // Rebuilding the sorted terms is a fixed point.
            prop_assert_eq!(&Expr::sum(terms.to_vec()), &e);
        }
    }

    #[test]
    fn simplified_products_respect_their_invariants(
        a in shape_strategy(),
        b in shape_strategy(),
    ) {
        let vars = fresh_vars();
        let e = a.materialize(&vars) * b.materialize(&vars);
        if let ExprKind::Prod(factors) = e.kind() {
            prop_assert!(factors.len() >= 2);
            let consts = factors.iter().filter(|f| f.as_cst().is_some()).count();
            prop_assert!(consts <= 1);
            prop_assert!(!factors.iter().any(|f| f.is_cst(0) || f.is_cst(1)));
            prop_assert!(!factors.iter().any(|f| matches!(f.kind(), ExprKind::Prod(_))));
            prop_assert_eq!(&Expr::product(factors.to_vec()), &e);
        }
    }

    #[test]
    fn products_are_multiples_of_their_factors(
        a in shape_strategy(),
        b in shape_strategy(),
    ) {
        let vars = fresh_vars();
        let ea = a.materialize(&vars);
        let eb = b.materialize(&vars);
        prop_assume!(!eb.is_cst(0));
        prop_assert!(multiple_of(&(ea * eb.clone()), &eb));
    }

    #[test]
    fn gcd_divides_both_arguments(
        ca in 1i64..=12,
        cb in 1i64..=12,
        pick_a in 0u8..8,
        pick_b in 0u8..8,
    ) {
        let vars = fresh_vars();
        let build = |coeff: i64, picks: u8| {
            let mut factors = vec![Expr::cst(coeff)];
            for (i, v) in vars.iter().enumerate() {
                if picks & (1u8 << i) != 0 {
                    factors.push(v.clone());
                }
            }
            Expr::product(factors)
        };
        let ea = build(ca, pick_a);
        let eb = build(cb, pick_b);
        let g = gcd(&ea, &eb);
        prop_assert!(multiple_of(&ea, &g));
        prop_assert!(multiple_of(&eb, &g));
    }

    #[test]
    fn is_smaller_is_sound_under_valuations(
        a in shape_strategy(),
        b in shape_strategy(),
        vals in proptest::array::uniform3(-9i64..=9),
    ) {
        let vars = fresh_vars();
        let ea = a.materialize(&vars);
        let eb = b.materialize(&vars);
        if let Some(answer) = is_smaller(&ea, &eb) {
            let va = a.reference(&vals);
            let vb = b.reference(&vals);
            if answer {
                prop_assert!(va < vb, "{ea} < {eb} claimed, but {va} >= {vb}");
            } else {
                prop_assert!(va >= vb, "{ea} >= {eb} claimed, but {va} < {vb}");
            }
        }
    }

    #[test]
    fn remainders_keep_the_dividend_sign_and_stay_small(
        n in -99i64..=99,
        d in nonzero_divisor(),
    ) {
        let m = (Expr::cst(n) % Expr::cst(d)).eval().unwrap();
        prop_assert!(m.abs() < d.abs());
        if m != 0 {
            prop_assert_eq!(m.signum(), n.signum());
        }
        let q = (Expr::cst(n) / Expr::cst(d)).eval().unwrap();
        prop_assert_eq!(q, div_floor(n, d));
        // C remainder complements truncating division exactly.
        prop_assert_eq!((n / d) * d + m, n);
    }
}
