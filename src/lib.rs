//! Discrete weighted transform engine for negacyclic polynomial rings
//!
//! This crate provides the transform kernel that accelerates polynomial
//! multiplication modulo `x^n + 1`, the dominant cost of every operation in
//! lattice-based homomorphic encryption. The discrete weighted transform
//! (DWT) evaluates a degree-`(n-1)` polynomial at the odd powers of a
//! primitive `2n`-th root of unity, turning negacyclic convolution into
//! pointwise multiplication and reducing its cost from O(n^2) to O(n log n).
//!
//! The engine is generic over the ring: the same butterfly code drives both
//! modular-integer arithmetic over a prime modulus (plaintext batching and
//! ciphertext multiplication) and double-precision complex arithmetic
//! (real/complex message encoding). Ring-specific operations live behind the
//! [`Arithmetic`] trait; the engine itself contains only index and ordering
//! logic and is monomorphized per ring.
//!
//! # Layering
//!
//! - [`dwt`] is the core: the [`Arithmetic`] contract and [`DwtHandler`]
//!   with the in-place forward and inverse transforms.
//! - [`modular`] instantiates the engine over `Z_q` with lazy reduction and
//!   Shoup multiplication, and builds the required root tables.
//! - [`complex`] instantiates it over `Complex<f64>` for encoder-style use.
//!
//! Callers own all buffers; every transform is in place and allocation-free.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Error module and re-exports
pub mod error;
pub use error::{Error, Result};

// The generic transform engine
pub mod dwt;
pub use dwt::{reverse_bits, Arithmetic, DwtHandler, MAX_LOG_N};

// Modular-integer instantiation (root tables need an allocator)
#[cfg(feature = "alloc")]
pub mod modular;
#[cfg(feature = "alloc")]
pub use modular::{ModArith, NttTables, ShoupRoot};

// Complex instantiation (needs float trig from std)
#[cfg(feature = "std")]
pub mod complex;
#[cfg(feature = "std")]
pub use complex::{ComplexArith, FftTables};

/// Prelude for easy importing of common transform types and traits.
pub mod prelude {
    pub use super::dwt::{reverse_bits, Arithmetic, DwtHandler};
    pub use super::error::{Error, Result};

    #[cfg(feature = "alloc")]
    pub use super::modular::{ModArith, NttTables, ShoupRoot};

    #[cfg(feature = "std")]
    pub use super::complex::{ComplexArith, FftTables};
}
