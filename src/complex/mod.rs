//! Complex-arithmetic instantiation of the transform engine
//!
//! This module specializes the DWT over the complex field, the variant used
//! to encode vectors of real or complex messages into polynomial
//! coefficients (CKKS-style encoding). The ring is exact up to floating
//! point rounding, so `guard` is the identity and `Scalar` is a plain `f64`
//! reciprocal rather than a modular inverse.

use alloc::vec;
use alloc::vec::Vec;

use core::f64::consts::PI;
use num_complex::Complex;

use crate::dwt::{reverse_bits, Arithmetic, DwtHandler, MAX_LOG_N};
use crate::error::{validate, Result};

/// Double-precision complex arithmetic, the floating [`Arithmetic`] instance.
///
/// Stateless; roots are ordinary unit-circle points and no reduction is ever
/// needed, so every operation maps directly onto `Complex<f64>` ops.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexArith;

impl Arithmetic for ComplexArith {
    type Value = Complex<f64>;
    type Root = Complex<f64>;
    type Scalar = f64;

    #[inline(always)]
    fn add(&self, a: Complex<f64>, b: Complex<f64>) -> Complex<f64> {
        a + b
    }

    #[inline(always)]
    fn sub(&self, a: Complex<f64>, b: Complex<f64>) -> Complex<f64> {
        a - b
    }

    #[inline(always)]
    fn mul_root(&self, a: Complex<f64>, r: Complex<f64>) -> Complex<f64> {
        a * r
    }

    #[inline(always)]
    fn mul_scalar(&self, a: Complex<f64>, s: f64) -> Complex<f64> {
        a * s
    }

    #[inline(always)]
    fn mul_root_scalar(&self, r: Complex<f64>, s: f64) -> Complex<f64> {
        r * s
    }

    #[inline(always)]
    fn guard(&self, a: Complex<f64>) -> Complex<f64> {
        a
    }
}

/// Precomputed complex root tables for a transform size.
///
/// ψ is the primitive `2n`-th root of unity `e^(iπ/n)`; the tables use the
/// same orderings as the modular side (forward bit-reversed, inverse
/// scrambled) and the 1/n normalization is a plain reciprocal merged into
/// the inverse transform's final stage.
#[derive(Debug, Clone)]
pub struct FftTables {
    handler: DwtHandler<ComplexArith>,
    log_n: u32,
    n: usize,
    root_powers: Vec<Complex<f64>>,
    inv_root_powers: Vec<Complex<f64>>,
    inv_degree: f64,
}

impl FftTables {
    /// Builds the tables for `n = 2^log_n`.
    pub fn new(log_n: u32) -> Result<Self> {
        validate::parameter(
            log_n >= 1 && log_n <= MAX_LOG_N,
            "log_n",
            "must be between 1 and 17",
        )?;
        let n = 1usize << log_n;
        let angle = PI / n as f64;

        let one = Complex::new(1.0, 0.0);
        let mut root_powers = vec![one; n];
        for i in 1..n {
            root_powers[reverse_bits(i, log_n)] = Complex::from_polar(1.0, angle * i as f64);
        }

        let mut inv_root_powers = vec![one; n];
        for i in 1..n {
            inv_root_powers[reverse_bits(i - 1, log_n) + 1] =
                Complex::from_polar(1.0, -angle * i as f64);
        }

        Ok(Self {
            handler: DwtHandler::new(ComplexArith),
            log_n,
            n,
            root_powers,
            inv_root_powers,
            inv_degree: 1.0 / n as f64,
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

    /// Powers of ψ in bit-reversed order, as consumed by the forward
    /// transform.
    pub fn root_powers(&self) -> &[Complex<f64>] {
        &self.root_powers
    }

    /// Powers of ψ^{-1} in scrambled order, as consumed by the inverse
    /// transform.
    pub fn inv_root_powers(&self) -> &[Complex<f64>] {
        &self.inv_root_powers
    }

    /// The 1/n factor merged into the inverse transform.
    pub fn inv_degree(&self) -> f64 {
        self.inv_degree
    }

    /// The underlying engine, for callers that manage scaling themselves.
    pub fn handler(&self) -> &DwtHandler<ComplexArith> {
        &self.handler
    }

    /// Forward DWT in place: normal order in, bit-reversed order out.
    pub fn forward_inplace(&self, values: &mut [Complex<f64>]) -> Result<()> {
        validate::length("values", values.len(), self.n)?;
        self.handler
            .transform_to_rev(values, self.log_n, &self.root_powers, None);
        Ok(())
    }

    /// Inverse DWT in place: bit-reversed order in, normal order out, with
    /// the 1/n factor merged into the last stage.
    pub fn inverse_inplace(&self, values: &mut [Complex<f64>]) -> Result<()> {
        validate::length("values", values.len(), self.n)?;
        self.handler.transform_from_rev(
            values,
            self.log_n,
            &self.inv_root_powers,
            Some(self.inv_degree),
        );
        Ok(())
    }
}
