//! Seed-salted digests for expression trees.
//!
//! Every node carries a 64-bit digest mixing a per-variant seed with the
//! digests of its children. Unequal digests prove structural inequality;
//! equal digests are only a hint and must be confirmed by deep
//! comparison before any rewrite fires.

use crate::expr::ExprKind;
use crate::predicate::CmpOp;

pub(crate) const SEED_CST: u64 = 0x9e37_79b9_7f4a_7c15;
pub(crate) const SEED_POS_INF: u64 = 0xbf58_476d_1ce4_e5b9;
pub(crate) const SEED_NEG_INF: u64 = 0x94d0_49bb_1331_11eb;
pub(crate) const SEED_UNKNOWN: u64 = 0x2545_f491_4f6c_dd1d;
pub(crate) const SEED_VAR: u64 = 0xff51_afd7_ed55_8ccd;
pub(crate) const SEED_OPAQUE: u64 = 0xc4ce_b9fe_1a85_ec53;
pub(crate) const SEED_FUN: u64 = 0x8764_21bf_13b4_8d41;
pub(crate) const SEED_LOOKUP: u64 = 0xd6e8_feb8_6659_fd93;
pub(crate) const SEED_SUM: u64 = 0xa076_1d64_78bd_642f;
pub(crate) const SEED_PROD: u64 = 0xe703_7ed1_a0b4_28db;
pub(crate) const SEED_POW: u64 = 0x8ebc_6af0_9c88_c6e3;
pub(crate) const SEED_INT_DIV: u64 = 0x5899_65cc_7537_4cc3;
pub(crate) const SEED_MOD: u64 = 0x1d8e_4e27_c47d_124f;
pub(crate) const SEED_LOG: u64 = 0xeb44_aceb_d231_7ec9;
pub(crate) const SEED_FLOOR: u64 = 0x3c79_ac49_2ba7_b653;
pub(crate) const SEED_CEIL: u64 = 0x1c69_b3f7_4ac4_ae35;
pub(crate) const SEED_ABS: u64 = 0x9fb2_1c65_1e98_df25;
pub(crate) const SEED_COND: u64 = 0x2ab8_0842_4a8a_367d;
pub(crate) const SEED_BIG_SUM: u64 = 0x6c62_272e_07bb_0142;
pub(crate) const SEED_PRED: u64 = 0x27d4_eb2f_1656_67c5;

/// Seed of the variant, also the coarse key of the canonical order for
/// kinds that are neither constants nor variables.
pub(crate) fn kind_seed(kind: &ExprKind) -> u64 {
    match kind {
        ExprKind::Cst(_) => SEED_CST,
        ExprKind::PosInf => SEED_POS_INF,
        ExprKind::NegInf => SEED_NEG_INF,
        ExprKind::Unknown => SEED_UNKNOWN,
        ExprKind::Var(_) => SEED_VAR,
        ExprKind::Opaque(_) => SEED_OPAQUE,
        ExprKind::Fun(_) => SEED_FUN,
        ExprKind::Lookup { .. } => SEED_LOOKUP,
        ExprKind::Sum(_) => SEED_SUM,
        ExprKind::Prod(_) => SEED_PROD,
        ExprKind::Pow { .. } => SEED_POW,
        ExprKind::IntDiv { .. } => SEED_INT_DIV,
        ExprKind::Mod { .. } => SEED_MOD,
        ExprKind::Log { .. } => SEED_LOG,
        ExprKind::Floor(_) => SEED_FLOOR,
        ExprKind::Ceil(_) => SEED_CEIL,
        ExprKind::Abs(_) => SEED_ABS,
        ExprKind::Cond { .. } => SEED_COND,
        ExprKind::BigSum { .. } => SEED_BIG_SUM,
    }
}

/// Compute the digest of a node from its variant and children.
///
/// Commutative children (Sum, Prod) are mixed with plain XOR so the
/// digest does not depend on their order; positional children use the
/// complement of the second operand so `a/b` and `b/a` differ.
pub(crate) fn kind_digest(kind: &ExprKind) -> u64 {
    let seed = kind_seed(kind);
    match kind {
        ExprKind::Cst(n) => mix(seed, *n as u64),
        ExprKind::PosInf | ExprKind::NegInf | ExprKind::Unknown => seed,
        ExprKind::Var(v) => mix(seed, v.id().raw()),
        ExprKind::Opaque(v) => mix(seed, v.id().raw()),
        ExprKind::Fun(f) => mix(seed, fnv1a(f.name())),
        ExprKind::Lookup { id, .. } => mix(seed, *id),
        ExprKind::Sum(terms) | ExprKind::Prod(terms) => {
            terms.iter().fold(seed, |acc, t| acc ^ t.digest())
        }
        ExprKind::Pow { base, exp } => seed ^ base.digest() ^ !exp.digest(),
        ExprKind::IntDiv { num, den } => seed ^ num.digest() ^ !den.digest(),
        ExprKind::Mod { num, den } => seed ^ num.digest() ^ !den.digest(),
        ExprKind::Log { base, arg } => seed ^ base.digest() ^ !arg.digest(),
        ExprKind::Floor(e) | ExprKind::Ceil(e) | ExprKind::Abs(e) => mix(seed, e.digest()),
        ExprKind::Cond {
            pred,
            then,
            otherwise,
        } => seed ^ pred.digest() ^ then.digest() ^ !otherwise.digest(),
        ExprKind::BigSum {
            from,
            up_to,
            index,
            body,
        } => {
            seed ^ from.digest() ^ !up_to.digest() ^ mix(SEED_VAR, index.id().raw())
                ^ body.digest().rotate_left(17)
        }
    }
}

pub(crate) fn predicate_digest(lhs: u64, rhs: u64, op: CmpOp) -> u64 {
    SEED_PRED ^ lhs ^ !rhs ^ mix(SEED_PRED, op as u64)
}

/// 64-bit FNV-1a over a name; used to salt uninterpreted functions.
pub(crate) fn fnv1a(s: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in s.as_bytes() {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/// One round of splitmix-style diffusion.
fn mix(seed: u64, value: u64) -> u64 {
    let mut z = seed ^ value.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
