//! Generic discrete weighted transform (DWT) engine
//!
//! The DWT is a variation on the discrete Fourier transform over arbitrary
//! rings: the input is weighed element-wise before the transform and the
//! output after it, which turns the cyclic convolution computed by the DFT
//! into the negacyclic convolution needed for arithmetic modulo `x^n + 1`.
//! Where a DFT of size `n` needs a primitive `n`-th root of unity, the
//! negacyclic DWT needs a primitive `2n`-th root of unity ψ, and evaluates
//! the input polynomial at successive odd powers of ψ.
//!
//! The algorithms here follow algorithms 1 and 2 of Longa and Naehrig
//! (<https://eprint.iacr.org/2016/504.pdf>), generalized over arbitrary rings
//! and with two changes that matter to callers. The powers of ψ^{-1} used by
//! the inverse transform are stored in a scrambled order rather than
//! bit-reversed order, so that both transforms read their root table
//! sequentially. And the multiplication by 1/n in the inverse transform is
//! merged into its last stage, saving a separate pass of n multiplications;
//! the forward transform accepts an optional uniform scalar the same way.
//!
//! All ring arithmetic is delegated to an [`Arithmetic`] implementation; the
//! engine contains only the stage/butterfly ordering logic and is therefore
//! shared verbatim between the modular-integer and complex instantiations.

/// Largest supported transform size exponent (`n = 2^MAX_LOG_N`).
pub const MAX_LOG_N: u32 = 17;

/// Ring operations required to specialize the transform engine.
///
/// The three associated types are deliberately distinct: `Root` may use a
/// multiplication-friendly representation (e.g. a precomputed-quotient pair)
/// that is not interchangeable with `Value`, and `Scalar` is the type of the
/// uniform factor (typically 1/n) merged into a transform's final stage.
///
/// All operations are pure. Implementations fix their own lazy-reduction
/// slack internally; the engine honors it by calling [`guard`] exactly where
/// the algorithms require, never more.
///
/// [`guard`]: Arithmetic::guard
pub trait Arithmetic {
    /// One coefficient of a ring element.
    type Value: Copy;
    /// A power of the primitive 2n-th root of unity ψ.
    type Root: Copy;
    /// A uniform scaling factor.
    type Scalar: Copy;

    /// Ring addition. Inputs may carry lazy-reduction slack.
    fn add(&self, a: Self::Value, b: Self::Value) -> Self::Value;

    /// Ring subtraction. Inputs may carry lazy-reduction slack.
    fn sub(&self, a: Self::Value, b: Self::Value) -> Self::Value;

    /// Multiplies a value by a root power, reducing internally.
    fn mul_root(&self, a: Self::Value, r: Self::Root) -> Self::Value;

    /// Multiplies a value by a scalar.
    fn mul_scalar(&self, a: Self::Value, s: Self::Scalar) -> Self::Value;

    /// Pre-combines a root and a scalar into a single root, so that a later
    /// [`mul_root`](Arithmetic::mul_root) folds the scaling in for free.
    fn mul_root_scalar(&self, r: Self::Root, s: Self::Scalar) -> Self::Root;

    /// Brings a value that accumulated slack back into the bounded range.
    /// Identity for exact rings, a partial modular reduction for lazy ones.
    fn guard(&self, a: Self::Value) -> Self::Value;
}

/// Reverses the low `bits` bits of `value`.
///
/// This is the index permutation relating the two buffer orderings of the
/// transforms: the forward transform maps normal order to bit-reversed
/// order, the inverse maps it back.
#[inline(always)]
pub fn reverse_bits(value: usize, bits: u32) -> usize {
    debug_assert!(bits >= 1 && bits <= usize::BITS);
    value.reverse_bits() >> (usize::BITS - bits)
}

/// Forward root-table entries consumed by stage `log_m`.
///
/// The forward transform consumes its table sequentially starting at index 1,
/// one entry per butterfly group; with `m = 2^log_m` groups per stage the
/// entry for group `i` of stage `log_m` is always `roots[m + i]`.
#[inline(always)]
pub(crate) fn forward_stage_roots<R>(roots: &[R], log_m: u32) -> &[R] {
    let m = 1usize << log_m;
    &roots[m..2 * m]
}

/// Inverse root-table entries consumed by stage `log_m` (`log_m >= 1`).
///
/// The inverse transform also consumes its table sequentially from index 1,
/// but runs its stages from `log_n - 1` down to 1, so stage `log_m` starts
/// after the `n - 2m` entries of the earlier stages. The final stage
/// (`log_m = 0`) is not covered here: it reuses the single entry `n - 1`
/// for its whole pass instead of advancing.
#[inline(always)]
pub(crate) fn inverse_stage_roots<R>(roots: &[R], log_n: u32, log_m: u32) -> &[R] {
    debug_assert!(log_m >= 1);
    let n = 1usize << log_n;
    let m = 1usize << log_m;
    &roots[n - 2 * m + 1..n - m + 1]
}

/// In-place fast multiplication with the DWT matrix, generic over the ring.
///
/// A handler borrows every transform input from the caller: the value buffer
/// (mutated in place), the precomputed root table, and the optional scalar.
/// It holds no per-call state of its own, so one handler may be shared
/// freely across calls and threads.
///
/// Preconditions (checked with debug assertions only, never in release
/// builds): `1 <= log_n <= MAX_LOG_N`, `values.len() == 1 << log_n`, and a
/// root table with at least `n` entries in the ordering each transform
/// documents. The table entry at index 0 is never read.
#[derive(Clone, Debug, Default)]
pub struct DwtHandler<A: Arithmetic> {
    arithmetic: A,
}

impl<A: Arithmetic> DwtHandler<A> {
    /// Creates a handler around the given ring arithmetic.
    pub const fn new(arithmetic: A) -> Self {
        Self { arithmetic }
    }

    /// Returns the underlying ring arithmetic.
    pub fn arithmetic(&self) -> &A {
        &self.arithmetic
    }

    /// Forward transform: decimation-in-frequency Cooley-Tukey butterflies.
    ///
    /// `values` holds inputs in normal order and outputs in bit-reversed
    /// order; element `i` of the output is the input polynomial evaluated at
    /// `ψ^(2*reverse_bits(i, log_n) + 1)`. `roots` holds powers of ψ in
    /// bit-reversed order (`roots[reverse_bits(i, log_n)] = ψ^i`). An
    /// optional `scalar` multiplies every output element at no extra cost:
    /// it is folded into the final stage's roots and `u` terms rather than
    /// applied in a separate pass.
    pub fn transform_to_rev(
        &self,
        values: &mut [A::Value],
        log_n: u32,
        roots: &[A::Root],
        scalar: Option<A::Scalar>,
    ) {
        debug_assert!(log_n >= 1 && log_n <= MAX_LOG_N);
        let n = 1usize << log_n;
        debug_assert_eq!(values.len(), n);
        debug_assert!(roots.len() >= n);

        let arith = &self.arithmetic;
        for log_m in 0..log_n - 1 {
            let gap = n >> (log_m + 1);
            let stage_roots = forward_stage_roots(roots, log_m);
            for (block, r) in values.chunks_exact_mut(2 * gap).zip(stage_roots) {
                let (left, right) = block.split_at_mut(gap);
                for (x, y) in left.iter_mut().zip(right.iter_mut()) {
                    // Guarding the left operand here bounds the growth of
                    // both butterfly outputs without an extra pass.
                    let u = arith.guard(*x);
                    let v = arith.mul_root(*y, *r);
                    *x = arith.add(u, v);
                    *y = arith.sub(u, v);
                }
            }
        }

        // Final stage: gap = 1, one root per adjacent pair, with the
        // optional scalar merged into both butterfly operands.
        let last_roots = forward_stage_roots(roots, log_n - 1);
        match scalar {
            Some(s) => {
                for (pair, r) in values.chunks_exact_mut(2).zip(last_roots) {
                    let scaled_r = arith.mul_root_scalar(*r, s);
                    let u = arith.mul_scalar(arith.guard(pair[0]), s);
                    let v = arith.mul_root(pair[1], scaled_r);
                    pair[0] = arith.add(u, v);
                    pair[1] = arith.sub(u, v);
                }
            }
            None => {
                for (pair, r) in values.chunks_exact_mut(2).zip(last_roots) {
                    let u = arith.guard(pair[0]);
                    let v = arith.mul_root(pair[1], *r);
                    pair[0] = arith.add(u, v);
                    pair[1] = arith.sub(u, v);
                }
            }
        }
    }

    /// Inverse transform: decimation-in-time Gentleman-Sande butterflies.
    ///
    /// `values` holds inputs in bit-reversed order and outputs in normal
    /// order. `roots` holds powers of ψ^{-1} in scrambled order - entry
    /// `reverse_bits(i - 1, log_n) + 1` is `ψ^{-i}` - which differs from the
    /// forward table's ordering and makes both transforms read sequentially.
    /// With `scalar` set to 1/n this is the exact inverse of
    /// [`transform_to_rev`](DwtHandler::transform_to_rev); the scaling is
    /// merged into the final stage, halving that stage's cost relative to a
    /// separate normalization pass.
    pub fn transform_from_rev(
        &self,
        values: &mut [A::Value],
        log_n: u32,
        roots: &[A::Root],
        scalar: Option<A::Scalar>,
    ) {
        debug_assert!(log_n >= 1 && log_n <= MAX_LOG_N);
        let n = 1usize << log_n;
        debug_assert_eq!(values.len(), n);
        debug_assert!(roots.len() >= n);

        let arith = &self.arithmetic;
        for log_m in (1..log_n).rev() {
            let gap = n >> (log_m + 1);
            let stage_roots = inverse_stage_roots(roots, log_n, log_m);
            for (block, r) in values.chunks_exact_mut(2 * gap).zip(stage_roots) {
                let (left, right) = block.split_at_mut(gap);
                for (x, y) in left.iter_mut().zip(right.iter_mut()) {
                    let u = *x;
                    let v = *y;
                    // The sum is guarded before storing; reduction of the
                    // difference is deferred to mul_root's internal one.
                    *x = arith.guard(arith.add(u, v));
                    *y = arith.mul_root(arith.sub(u, v), *r);
                }
            }
        }

        // Final stage: a single group spanning the whole buffer. The root
        // entry n - 1 is reused for every butterfly rather than advanced,
        // and the optional 1/n scalar is merged here.
        let r = roots[n - 1];
        let (left, right) = values.split_at_mut(n >> 1);
        match scalar {
            Some(s) => {
                let scaled_r = arith.mul_root_scalar(r, s);
                for (x, y) in left.iter_mut().zip(right.iter_mut()) {
                    let u = arith.guard(*x);
                    let v = *y;
                    *x = arith.mul_scalar(arith.guard(arith.add(u, v)), s);
                    *y = arith.mul_root(arith.sub(u, v), scaled_r);
                }
            }
            None => {
                for (x, y) in left.iter_mut().zip(right.iter_mut()) {
                    let u = *x;
                    let v = *y;
                    *x = arith.guard(arith.add(u, v));
                    *y = arith.mul_root(arith.sub(u, v), r);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
