//! Built-in `Lambda` evaluators and the replacement-time meta-function
//! registry. See spec §4.3 and §4.5.

use crate::term::{Attribute, Binding, Object};

/// Width used to interpret and produce `Delta` byte literals for arithmetic
/// and predicate built-ins: big-endian two's complement, 8 bytes wide.
pub const WORD_WIDTH: usize = 8;

/// Decodes a big-endian two's-complement byte literal of any length into an
/// `i64`. Shorter literals are sign-extended; longer ones are truncated to
/// their low 8 bytes (the supported width).
pub fn decode_i64(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; WORD_WIDTH];
    let sign = bytes.first().map(|b| b & 0x80 != 0).unwrap_or(false);
    if sign {
        buf = [0xff; WORD_WIDTH];
    }
    let start = buf.len().saturating_sub(bytes.len());
    let src_start = bytes.len().saturating_sub(buf.len() - start);
    buf[start..].copy_from_slice(&bytes[src_start..]);
    i64::from_be_bytes(buf)
}

/// Encodes an `i64` as an 8-byte big-endian two's-complement `Delta`.
pub fn encode_i64(value: i64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn one_byte_bool(b: bool) -> Vec<u8> {
    vec![if b { 0x01 } else { 0x00 }]
}

/// The outcome of dataizing a built-in's operand: either it reduced to
/// bytes, or it reduced to [`Object::Termination`], which built-ins must
/// propagate rather than operate on (spec §8 scenario 6).
pub enum Operand {
    Bytes(Vec<u8>),
    Termination,
}

/// Evaluates a named built-in given its already-dataized operands (`ρ` and,
/// for binary operators, `α0`). Returns `None` for a name not in the
/// registry -- the caller treats that as "not reducible", never fatal.
pub fn eval_builtin(name: &str, rho: &Operand, arg0: Option<&Operand>) -> Option<Object> {
    match name {
        "Lorg_eolang_int_plus" => binary_arith(rho, arg0?, |a, b| a.wrapping_add(b)),
        "Lorg_eolang_int_minus" => binary_arith(rho, arg0?, |a, b| a.wrapping_sub(b)),
        "Lorg_eolang_int_times" => binary_arith(rho, arg0?, |a, b| a.wrapping_mul(b)),
        "Lorg_eolang_int_div" => binary_arith_checked(rho, arg0?, |a, b| (b != 0).then(|| a.wrapping_div(b))),
        "Lorg_eolang_int_gt" => binary_predicate(rho, arg0?, |a, b| a > b),
        "Lorg_eolang_int_lt" => binary_predicate(rho, arg0?, |a, b| a < b),
        "Lorg_eolang_int_eq" => binary_predicate(rho, arg0?, |a, b| a == b),
        _ => None,
    }
}

fn delta_formation(bytes: Vec<u8>) -> Object {
    Object::formation(vec![Binding::Delta(bytes)])
}

fn binary_arith(rho: &Operand, arg0: &Operand, f: impl Fn(i64, i64) -> i64) -> Option<Object> {
    binary_arith_checked(rho, arg0, move |a, b| Some(f(a, b)))
}

fn binary_arith_checked(rho: &Operand, arg0: &Operand, f: impl Fn(i64, i64) -> Option<i64>) -> Option<Object> {
    match (rho, arg0) {
        (Operand::Termination, _) | (_, Operand::Termination) => Some(Object::Termination),
        (Operand::Bytes(a), Operand::Bytes(b)) => {
            let result = f(decode_i64(a), decode_i64(b))?;
            Some(delta_formation(encode_i64(result)))
        }
    }
}

fn binary_predicate(rho: &Operand, arg0: &Operand, f: impl Fn(i64, i64) -> bool) -> Option<Object> {
    match (rho, arg0) {
        (Operand::Termination, _) | (_, Operand::Termination) => Some(Object::Termination),
        (Operand::Bytes(a), Operand::Bytes(b)) => Some(delta_formation(one_byte_bool(f(decode_i64(a), decode_i64(b))))),
    }
}

/// Evaluates a meta-function used in a rule's replacement, applied at
/// substitution time. The registry is small and fixed (spec §4.3):
///
/// - `@attr(obj)`: fetches `obj`'s `σ` (self) binding unchanged -- used when
///   a replacement needs to re-expose the formation it is rewriting.
/// - `@vertex(obj)`: produces a fresh identity tag. The engine is purely
///   functional with no global counter, so the tag is the deterministic
///   placeholder `⟦ Δ ⤍ 00- ⟧` used throughout the yegor ruleset rather than
///   a gensym.
pub fn eval_meta_function(name: &str, arg: &Object) -> Option<Object> {
    match name {
        "vertex" => Some(delta_formation(vec![0u8])),
        "attr" => match arg {
            Object::Formation(bindings) => {
                Object::find_binding(bindings, &Attribute::Sigma).and_then(|b| match b {
                    Binding::Alpha(_, obj) => Some(obj.clone()),
                    _ => None,
                })
            }
            _ => None,
        },
        _ => None,
    }
}
