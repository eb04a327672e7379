//! Tests for the generic engine: index logic, butterfly ordering, and the
//! scalar merge, exercised through a minimal plain-modular ring.

use super::*;

/// Fully-reduced arithmetic over a small prime field. Every value stays
/// canonical, so `guard` is the identity; this isolates the engine's index
/// and ordering logic from any lazy-reduction concerns.
#[derive(Clone, Copy)]
struct PlainArith {
    q: u64,
}

impl Arithmetic for PlainArith {
    type Value = u64;
    type Root = u64;
    type Scalar = u64;

    fn add(&self, a: u64, b: u64) -> u64 {
        (a + b) % self.q
    }
    fn sub(&self, a: u64, b: u64) -> u64 {
        (a + self.q - b) % self.q
    }
    fn mul_root(&self, a: u64, r: u64) -> u64 {
        a * r % self.q
    }
    fn mul_scalar(&self, a: u64, s: u64) -> u64 {
        a * s % self.q
    }
    fn mul_root_scalar(&self, r: u64, s: u64) -> u64 {
        r * s % self.q
    }
    fn guard(&self, a: u64) -> u64 {
        a
    }
}

fn pow_mod(mut base: u64, mut exp: u64, q: u64) -> u64 {
    let mut acc = 1u64;
    base %= q;
    while exp != 0 {
        if exp & 1 == 1 {
            acc = acc * base % q;
        }
        base = base * base % q;
        exp >>= 1;
    }
    acc
}

/// Forward table: `roots[reverse_bits(i)] = psi^i`.
fn forward_table<const N: usize>(psi: u64, q: u64, log_n: u32) -> [u64; N] {
    let mut roots = [1u64; N];
    for i in 1..N {
        roots[reverse_bits(i, log_n)] = pow_mod(psi, i as u64, q);
    }
    roots
}

/// Inverse table: `roots[reverse_bits(i - 1) + 1] = psi^{-i}`.
fn inverse_table<const N: usize>(psi: u64, q: u64, log_n: u32) -> [u64; N] {
    let psi_inv = pow_mod(psi, q - 2, q);
    let mut roots = [1u64; N];
    for i in 1..N {
        roots[reverse_bits(i - 1, log_n) + 1] = pow_mod(psi_inv, i as u64, q);
    }
    roots
}

// 3 has order 16 mod 17, so psi(2n) = 3^(16/2n) is a primitive 2n-th root.
const Q: u64 = 17;

fn psi_for(log_n: u32) -> u64 {
    pow_mod(3, 16 >> (log_n + 1), Q)
}

#[test]
fn test_reverse_bits() {
    assert_eq!(reverse_bits(0, 3), 0);
    assert_eq!(reverse_bits(1, 3), 4);
    assert_eq!(reverse_bits(3, 3), 6);
    assert_eq!(reverse_bits(5, 3), 5);
    assert_eq!(reverse_bits(6, 3), 3);
    assert_eq!(reverse_bits(1, 1), 1);
    // Involution
    for i in 0..32 {
        assert_eq!(reverse_bits(reverse_bits(i, 5), 5), i);
    }
}

/// The forward transform consumes table entries 1..n in strictly increasing
/// order, one per (stage, group) pair.
#[test]
fn test_forward_stage_root_ranges() {
    let roots: [usize; 16] = core::array::from_fn(|i| i);
    let log_n = 4;
    let mut next = 1;
    for log_m in 0..log_n {
        let stage = forward_stage_roots(&roots, log_m);
        assert_eq!(stage.len(), 1 << log_m);
        assert_eq!(stage[0], next, "stage {} must resume at index {}", log_m, next);
        next += stage.len();
    }
    assert_eq!(next, 16);
}

/// The inverse transform also consumes entries 1..n-1 sequentially across
/// its descending stages, then reuses entry n-1 for the final stage.
#[test]
fn test_inverse_stage_root_ranges() {
    let roots: [usize; 16] = core::array::from_fn(|i| i);
    let log_n = 4;
    let mut next = 1;
    for log_m in (1..log_n).rev() {
        let stage = inverse_stage_roots(&roots, log_n, log_m);
        assert_eq!(stage.len(), 1 << log_m);
        assert_eq!(stage[0], next, "stage {} must resume at index {}", log_m, next);
        next += stage.len();
    }
    // All of 1..n-1 consumed; the final stage reads (and re-reads) n-1
    assert_eq!(next, 15);
}

/// log_n = 1 is the single butterfly: [a + b*psi, a - b*psi], and exactly
/// [a + b, a - b] when driven with an identity root.
#[test]
fn test_two_point_butterfly() {
    let handler = DwtHandler::new(PlainArith { q: Q });

    let mut values = [5u64, 3];
    handler.transform_to_rev(&mut values, 1, &[1u64, 1], None);
    assert_eq!(values, [8, 2]);

    let psi = psi_for(1);
    let roots = forward_table::<2>(psi, Q, 1);
    let mut values = [5u64, 3];
    handler.transform_to_rev(&mut values, 1, &roots, None);
    assert_eq!(values, [(5 + 3 * psi) % Q, (5 + Q * Q - 3 * psi) % Q]);
}

/// Forward output element i is the input polynomial evaluated at
/// psi^(2 * reverse_bits(i) + 1): checked against the O(n^2) definition.
#[test]
fn test_forward_matches_naive_evaluation() {
    let log_n = 3;
    let psi = psi_for(log_n);
    let roots = forward_table::<8>(psi, Q, log_n);
    let handler = DwtHandler::new(PlainArith { q: Q });

    let input = [3u64, 1, 4, 1, 5, 9, 2, 6];
    let mut values = input;
    handler.transform_to_rev(&mut values, log_n, &roots, None);

    for i in 0..8 {
        let point = pow_mod(psi, 2 * reverse_bits(i, log_n) as u64 + 1, Q);
        let mut expected = 0u64;
        for (j, &c) in input.iter().enumerate() {
            expected = (expected + c * pow_mod(point, j as u64, Q)) % Q;
        }
        assert_eq!(values[i], expected, "evaluation mismatch at output {}", i);
    }
}

/// An impulse at position p transforms to psi^((2 * reverse_bits(i) + 1) * p)
/// in slot i; for p = 0 that is the all-ones vector.
#[test]
fn test_impulse_bit_reversal() {
    let log_n = 3;
    let psi = psi_for(log_n);
    let roots = forward_table::<8>(psi, Q, log_n);
    let handler = DwtHandler::new(PlainArith { q: Q });

    let mut values = [1u64, 0, 0, 0, 0, 0, 0, 0];
    handler.transform_to_rev(&mut values, log_n, &roots, None);
    assert_eq!(values, [1; 8]);

    for p in [1usize, 3] {
        let mut values = [0u64; 8];
        values[p] = 1;
        handler.transform_to_rev(&mut values, log_n, &roots, None);
        for i in 0..8 {
            let exp = (2 * reverse_bits(i, log_n) as u64 + 1) * p as u64;
            assert_eq!(values[i], pow_mod(psi, exp, Q));
        }
    }
}

#[test]
fn test_roundtrip_all_small_sizes() {
    let handler = DwtHandler::new(PlainArith { q: Q });

    // log_n = 1
    let psi = psi_for(1);
    let fwd = forward_table::<2>(psi, Q, 1);
    let inv = inverse_table::<2>(psi, Q, 1);
    let inv_n = pow_mod(2, Q - 2, Q);
    let input = [7u64, 11];
    let mut values = input;
    handler.transform_to_rev(&mut values, 1, &fwd, None);
    handler.transform_from_rev(&mut values, 1, &inv, Some(inv_n));
    assert_eq!(values, input);

    // log_n = 2
    let psi = psi_for(2);
    let fwd = forward_table::<4>(psi, Q, 2);
    let inv = inverse_table::<4>(psi, Q, 2);
    let inv_n = pow_mod(4, Q - 2, Q);
    let input = [1u64, 2, 3, 4];
    let mut values = input;
    handler.transform_to_rev(&mut values, 2, &fwd, None);
    handler.transform_from_rev(&mut values, 2, &inv, Some(inv_n));
    assert_eq!(values, input);

    // log_n = 3
    let psi = psi_for(3);
    let fwd = forward_table::<8>(psi, Q, 3);
    let inv = inverse_table::<8>(psi, Q, 3);
    let inv_n = pow_mod(8, Q - 2, Q);
    let input = [3u64, 1, 4, 1, 5, 9, 2, 6];
    let mut values = input;
    handler.transform_to_rev(&mut values, 3, &fwd, None);
    handler.transform_from_rev(&mut values, 3, &inv, Some(inv_n));
    assert_eq!(values, input);
}

/// Supplying a scalar must equal transforming without one and scaling every
/// output element separately, in both directions.
#[test]
fn test_scalar_merge_equivalence() {
    let log_n = 3;
    let psi = psi_for(log_n);
    let fwd = forward_table::<8>(psi, Q, log_n);
    let inv = inverse_table::<8>(psi, Q, log_n);
    let handler = DwtHandler::new(PlainArith { q: Q });
    let s = 5u64;
    let input = [3u64, 1, 4, 1, 5, 9, 2, 6];

    let mut merged = input;
    handler.transform_to_rev(&mut merged, log_n, &fwd, Some(s));
    let mut separate = input;
    handler.transform_to_rev(&mut separate, log_n, &fwd, None);
    for v in separate.iter_mut() {
        *v = *v * s % Q;
    }
    assert_eq!(merged, separate);

    let mut merged = input;
    handler.transform_from_rev(&mut merged, log_n, &inv, Some(s));
    let mut separate = input;
    handler.transform_from_rev(&mut separate, log_n, &inv, None);
    for v in separate.iter_mut() {
        *v = *v * s % Q;
    }
    assert_eq!(merged, separate);
}

#[test]
fn test_determinism() {
    let log_n = 3;
    let psi = psi_for(log_n);
    let fwd = forward_table::<8>(psi, Q, log_n);
    let handler = DwtHandler::new(PlainArith { q: Q });
    let input = [16u64, 0, 13, 2, 8, 8, 1, 12];

    let mut first = input;
    let mut second = input;
    handler.transform_to_rev(&mut first, log_n, &fwd, None);
    handler.transform_to_rev(&mut second, log_n, &fwd, None);
    assert_eq!(first, second);
}
