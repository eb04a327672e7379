//! Modular-integer instantiation of the transform engine
//!
//! This module specializes the DWT over the quotient ring `Z_q[x]/(x^n + 1)`
//! for an NTT-friendly prime `q` (odd, below 2^62, with `q ≡ 1 mod 2n`). It
//! provides the [`ModArith`] ring arithmetic with Harvey-style lazy
//! reduction, and [`NttTables`], which precomputes the root tables the
//! engine consumes and exposes the in-place transform surface used for
//! polynomial multiplication.
//!
//! ## Lazy-reduction contract
//!
//! Values flowing through a transform are kept in the extended range
//! `[0, 4q)` instead of being reduced after every operation:
//!
//! - `add`/`sub` take operands in `[0, 2q)` and return values in `[0, 4q)`;
//! - `guard` reduces `[0, 4q)` back to `[0, 2q)` branch-free;
//! - `mul_root`/`mul_scalar` are Shoup multiplications returning `[0, 2q)`
//!   for any 64-bit input.
//!
//! Requiring `q < 2^62` makes `4q` fit in a `u64`, so no intermediate can
//! wrap. A forward transform therefore leaves coefficients in `[0, 4q)` and
//! an inverse transform in `[0, 2q)`; the `*_inplace` wrappers canonicalize
//! to `[0, q)` afterwards, outside the butterfly loops.

use alloc::vec;
use alloc::vec::Vec;

use subtle::{ConditionallySelectable, ConstantTimeGreater};

use crate::dwt::{reverse_bits, Arithmetic, DwtHandler, MAX_LOG_N};
use crate::error::{validate, Error, Result};

/// Largest supported modulus bit-size; `4q` must fit in a `u64`.
pub const MAX_MODULUS_BITS: u32 = 62;

/// Multiplies two values modulo `q`. Not for the transform hot path.
#[inline(always)]
pub(crate) fn mul_mod(a: u64, b: u64, q: u64) -> u64 {
    ((a as u128 * b as u128) % q as u128) as u64
}

/// Modular exponentiation by squaring.
pub(crate) fn pow_mod(mut base: u64, mut exp: u64, q: u64) -> u64 {
    let mut acc: u64 = 1;
    base %= q;
    while exp != 0 {
        if (exp & 1) == 1 {
            acc = mul_mod(acc, base, q);
        }
        base = mul_mod(base, base, q);
        exp >>= 1;
    }
    acc
}

/// Modular inverse via Fermat's little theorem; `q` must be prime.
#[inline(always)]
pub(crate) fn inv_mod(a: u64, q: u64) -> u64 {
    pow_mod(a, q - 2, q)
}

/// Deterministic Miller-Rabin primality test for 64-bit integers.
///
/// The witness set {2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37} is known to
/// be exact for all inputs below 2^64.
pub(crate) fn is_prime(q: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if q < 2 {
        return false;
    }
    for &w in &WITNESSES {
        if q == w {
            return true;
        }
        if q % w == 0 {
            return false;
        }
    }
    let mut d = q - 1;
    let r = d.trailing_zeros();
    d >>= r;
    'witness: for &w in &WITNESSES {
        let mut x = pow_mod(w, d, q);
        if x == 1 || x == q - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, q);
            if x == q - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Deterministic search for a primitive `2n`-th root of unity modulo `q`.
///
/// The caller guarantees `q` prime with `q ≡ 1 mod 2n`. A candidate
/// generator `g` is projected into the order-`2n` subgroup; the projection
/// is primitive exactly when its `n`-th power is `-1`.
fn primitive_root(two_n: u64, q: u64) -> Result<u64> {
    let cofactor = (q - 1) / two_n;
    for g in 2..q {
        let w = pow_mod(g, cofactor, q);
        if pow_mod(w, two_n >> 1, q) == q - 1 {
            return Ok(w);
        }
    }
    Err(Error::param(
        "modulus",
        "no primitive 2n-th root of unity exists",
    ))
}

/// A root-of-unity power paired with its Shoup quotient.
///
/// Storing `quotient = floor(operand * 2^64 / q)` alongside the canonical
/// operand lets [`ModArith::mul_root`](crate::dwt::Arithmetic::mul_root)
/// replace the division in a modular multiplication with one high-half
/// product. This representation is what makes `Root` a distinct type from
/// `Value` in the engine's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShoupRoot {
    pub(crate) operand: u64,
    pub(crate) quotient: u64,
}

impl ShoupRoot {
    /// Precomputes the quotient for a canonical `operand < q`.
    pub fn new(operand: u64, q: u64) -> Self {
        debug_assert!(operand < q);
        let quotient = (((operand as u128) << 64) / q as u128) as u64;
        Self { operand, quotient }
    }

    /// The canonical root power this pair encodes.
    pub fn operand(&self) -> u64 {
        self.operand
    }
}

/// Lazy-reduction arithmetic over `Z_q`, the modular [`Arithmetic`] instance.
///
/// Immutable and `Copy`; one instance may back any number of concurrent
/// transform calls. See the module docs for the slack contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModArith {
    q: u64,
    two_q: u64,
}

impl ModArith {
    /// Creates the arithmetic for an odd modulus below 2^62.
    pub fn new(q: u64) -> Result<Self> {
        validate::parameter(q > 1, "modulus", "must be greater than 1")?;
        validate::parameter(q & 1 == 1, "modulus", "must be odd")?;
        validate::parameter(
            q >> MAX_MODULUS_BITS == 0,
            "modulus",
            "must be below 2^62",
        )?;
        Ok(Self { q, two_q: q << 1 })
    }

    /// The modulus `q`.
    pub fn modulus(&self) -> u64 {
        self.q
    }

    /// Shoup multiplication: `a * r mod q`, lazily in `[0, 2q)`, for any `a`.
    #[inline(always)]
    fn mul_root_lazy(&self, a: u64, r: ShoupRoot) -> u64 {
        let hi = ((a as u128 * r.quotient as u128) >> 64) as u64;
        a.wrapping_mul(r.operand)
            .wrapping_sub(hi.wrapping_mul(self.q))
    }

    /// Canonical reduction of a lazy value in `[0, 4q)` to `[0, q)`.
    #[inline(always)]
    pub fn reduce(&self, a: u64) -> u64 {
        let a = self.guard(a);
        // Both select arms are evaluated; the subtraction must wrap rather
        // than underflow when a < q, since that arm is then discarded.
        u64::conditional_select(&a, &a.wrapping_sub(self.q), a.ct_gt(&(self.q - 1)))
    }
}

impl Arithmetic for ModArith {
    type Value = u64;
    type Root = ShoupRoot;
    type Scalar = ShoupRoot;

    #[inline(always)]
    fn add(&self, a: u64, b: u64) -> u64 {
        // Operands < 2q, sum < 4q; cannot wrap since q < 2^62
        a + b
    }

    #[inline(always)]
    fn sub(&self, a: u64, b: u64) -> u64 {
        a + self.two_q - b
    }

    #[inline(always)]
    fn mul_root(&self, a: u64, r: ShoupRoot) -> u64 {
        self.mul_root_lazy(a, r)
    }

    #[inline(always)]
    fn mul_scalar(&self, a: u64, s: ShoupRoot) -> u64 {
        self.mul_root_lazy(a, s)
    }

    #[inline(always)]
    fn mul_root_scalar(&self, r: ShoupRoot, s: ShoupRoot) -> ShoupRoot {
        // The combined operand must be canonical for the new quotient
        ShoupRoot::new(self.reduce(self.mul_root_lazy(r.operand, s)), self.q)
    }

    #[inline(always)]
    fn guard(&self, a: u64) -> u64 {
        let mask = ((a >= self.two_q) as u64).wrapping_neg();
        a - (self.two_q & mask)
    }
}

/// Precomputed root tables binding a modulus and a transform size.
///
/// Construction finds a primitive `2n`-th root of unity ψ and lays out both
/// tables in the exact order the engine consumes them:
///
/// - forward: `root_powers[reverse_bits(i, log_n)] = ψ^i`,
/// - inverse: `inv_root_powers[reverse_bits(i - 1, log_n) + 1] = ψ^{-i}`,
///
/// with slot 0 of each table holding the unused identity. The 1/n
/// normalization factor is kept as a Shoup scalar so the inverse transform
/// can merge it into its final stage.
#[derive(Debug, Clone)]
pub struct NttTables {
    handler: DwtHandler<ModArith>,
    log_n: u32,
    n: usize,
    root: u64,
    root_powers: Vec<ShoupRoot>,
    inv_root_powers: Vec<ShoupRoot>,
    inv_degree: ShoupRoot,
}

impl NttTables {
    /// Builds the tables for `n = 2^log_n` and an NTT-friendly prime.
    pub fn new(log_n: u32, modulus: u64) -> Result<Self> {
        validate::parameter(
            log_n >= 1 && log_n <= MAX_LOG_N,
            "log_n",
            "must be between 1 and 17",
        )?;
        let arith = ModArith::new(modulus)?;
        let n = 1usize << log_n;
        validate::parameter(
            (modulus - 1) % (2 * n as u64) == 0,
            "modulus",
            "must be congruent to 1 modulo 2n",
        )?;
        validate::parameter(is_prime(modulus), "modulus", "must be prime")?;

        let root = primitive_root(2 * n as u64, modulus)?;
        let inv_root = inv_mod(root, modulus);

        let mut root_powers = vec![ShoupRoot::new(1, modulus); n];
        let mut power = root;
        for i in 1..n {
            root_powers[reverse_bits(i, log_n)] = ShoupRoot::new(power, modulus);
            power = mul_mod(power, root, modulus);
        }

        let mut inv_root_powers = vec![ShoupRoot::new(1, modulus); n];
        let mut power = inv_root;
        for i in 1..n {
            inv_root_powers[reverse_bits(i - 1, log_n) + 1] = ShoupRoot::new(power, modulus);
            power = mul_mod(power, inv_root, modulus);
        }

        let inv_degree = ShoupRoot::new(inv_mod(n as u64, modulus), modulus);

        Ok(Self {
            handler: DwtHandler::new(arith),
            log_n,
            n,
            root,
            root_powers,
            inv_root_powers,
            inv_degree,
        })
    }

    /// The transform size exponent.
    pub fn log_n(&self) -> u32 {
        self.log_n
    }

    /// The transform size `n`.
    pub fn size(&self) -> usize {
        self.n
    }

    /// The modulus `q`.
    pub fn modulus(&self) -> u64 {
        self.handler.arithmetic().modulus()
    }

    /// The primitive `2n`-th root of unity ψ the tables were built from.
    pub fn root(&self) -> u64 {
        self.root
    }

    /// Powers of ψ in bit-reversed order, as consumed by the forward
    /// transform.
    pub fn root_powers(&self) -> &[ShoupRoot] {
        &self.root_powers
    }

    /// Powers of ψ^{-1} in scrambled order, as consumed by the inverse
    /// transform.
    pub fn inv_root_powers(&self) -> &[ShoupRoot] {
        &self.inv_root_powers
    }

    /// `n^{-1} mod q`, the scalar merged into the inverse transform.
    pub fn inv_degree(&self) -> ShoupRoot {
        self.inv_degree
    }

    /// The underlying engine, for callers that manage scaling themselves.
    pub fn handler(&self) -> &DwtHandler<ModArith> {
        &self.handler
    }

    /// Forward NTT in place: normal order in, bit-reversed order out,
    /// coefficients canonicalized to `[0, q)`.
    pub fn forward_inplace(&self, values: &mut [u64]) -> Result<()> {
        validate::length("values", values.len(), self.n)?;
        self.handler
            .transform_to_rev(values, self.log_n, &self.root_powers, None);
        let arith = self.handler.arithmetic();
        for v in values.iter_mut() {
            *v = arith.reduce(*v);
        }
        Ok(())
    }

    /// Inverse NTT in place: bit-reversed order in, normal order out, the
    /// 1/n factor merged into the last stage, coefficients canonical.
    pub fn inverse_inplace(&self, values: &mut [u64]) -> Result<()> {
        validate::length("values", values.len(), self.n)?;
        self.handler.transform_from_rev(
            values,
            self.log_n,
            &self.inv_root_powers,
            Some(self.inv_degree),
        );
        let arith = self.handler.arithmetic();
        for v in values.iter_mut() {
            *v = arith.reduce(*v);
        }
        Ok(())
    }

    /// Negacyclic polynomial multiplication `out = a * b mod (x^n + 1)`
    /// via forward transforms, pointwise multiplication, and an inverse
    /// transform.
    pub fn negacyclic_multiply(&self, a: &[u64], b: &[u64], out: &mut [u64]) -> Result<()> {
        validate::length("a", a.len(), self.n)?;
        validate::length("b", b.len(), self.n)?;
        validate::length("out", out.len(), self.n)?;

        let q = self.modulus();
        let mut a_hat = a.to_vec();
        let mut b_hat = b.to_vec();
        self.forward_inplace(&mut a_hat)?;
        self.forward_inplace(&mut b_hat)?;
        for (o, (x, y)) in out.iter_mut().zip(a_hat.iter().zip(b_hat.iter())) {
            *o = mul_mod(*x, *y, q);
        }
        self.inverse_inplace(out)
    }
}

/// Schoolbook negacyclic multiplication (for correctness testing).
pub fn schoolbook_negacyclic(a: &[u64], b: &[u64], q: u64) -> Vec<u64> {
    let n = a.len();
    debug_assert_eq!(b.len(), n);
    let mut out = vec![0u64; n];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            let prod = mul_mod(ai, bj, q);
            let idx = i + j;
            if idx < n {
                out[idx] = (out[idx] + prod) % q;
            } else {
                // Reduction by x^n + 1 flips the sign of the wrapped term
                out[idx - n] = (out[idx - n] + q - prod) % q;
            }
        }
    }
    out
}
