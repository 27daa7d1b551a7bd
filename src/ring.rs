//! Finite rings in which all shares and secrets live.
//!
//! Two kinds of rings are supported:
//!
//! - signed `bits`-wide two's-complement integers with wraparound, i.e. the elements
//!   `-2^(bits-1)..=2^(bits-1)-1` (the default is 64 bits wide),
//! - residues `0..q` modulo an explicit modulus `q`.
//!
//! Elements and public integers are represented as `i128`, which holds every element of every
//! supported ring. All operations reduce their result, so an operation on two elements always
//! yields an element again.

use std::fmt;

use rand::{CryptoRng, Rng};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::ValidationError;

/// The arithmetic structure of a shared value, passed explicitly to every sharing operation.
///
/// Deserializing a ring validates it like [`Ring::wrapping`] and [`Ring::prime`] do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ring(Modulus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Modulus {
    /// Signed integers of the given width, wrapping around on overflow.
    Wrapping(u32),
    /// Residues modulo the given number.
    Prime(u64),
}

impl Default for Ring {
    fn default() -> Self {
        Ring(Modulus::Wrapping(Self::DEFAULT_BITS))
    }
}

impl Ring {
    /// The width of the default wraparound ring.
    pub const DEFAULT_BITS: u32 = 64;

    /// The largest prime below 2^64.
    pub const DEFAULT_PRIME: u64 = 18_446_744_073_709_551_557;

    /// A ring of signed integers `bits` wide that wrap around like native fixed-width integers.
    pub fn wrapping(bits: u32) -> Result<Self, ValidationError> {
        if (1..=64).contains(&bits) {
            Ok(Ring(Modulus::Wrapping(bits)))
        } else {
            Err(ValidationError::InvalidWidth(bits))
        }
    }

    /// The ring of residues modulo `q`.
    ///
    /// The protocols only rely on ring axioms, so `q` is not checked for primality.
    pub fn prime(q: u64) -> Result<Self, ValidationError> {
        if q >= 2 {
            Ok(Ring(Modulus::Prime(q)))
        } else {
            Err(ValidationError::InvalidModulus(q))
        }
    }

    /// The smallest element of the ring.
    pub fn min(&self) -> i128 {
        match self.0 {
            Modulus::Wrapping(bits) => -(1 << (bits - 1)),
            Modulus::Prime(_) => 0,
        }
    }

    /// The largest element of the ring.
    pub fn max(&self) -> i128 {
        match self.0 {
            Modulus::Wrapping(bits) => (1 << (bits - 1)) - 1,
            Modulus::Prime(q) => q as i128 - 1,
        }
    }

    /// Maps an arbitrary integer to the element of the ring it is congruent to.
    ///
    /// For wraparound rings this is exactly `((n + 2^(bits-1)) mod 2^bits) - 2^(bits-1)`, the
    /// value a `bits`-wide two's-complement integer would wrap around to. For prime rings it is
    /// the non-negative residue `n mod q`.
    pub fn reduce(&self, n: i128) -> i128 {
        match self.0 {
            Modulus::Wrapping(bits) => {
                // keep the low `bits` and sign-extend from there
                let shift = 128 - bits;
                n.wrapping_shl(shift) >> shift
            }
            Modulus::Prime(q) => n.rem_euclid(q as i128),
        }
    }

    /// Returns `true` if `v` is an element of the ring.
    pub fn contains(&self, v: i128) -> bool {
        self.min() <= v && v <= self.max()
    }

    /// Draws an element uniformly at random.
    pub fn random_element<R: Rng + CryptoRng>(&self, rng: &mut R) -> i128 {
        match self.0 {
            Modulus::Wrapping(_) => self.reduce(rng.random::<u64>() as i128),
            Modulus::Prime(q) => rng.random_range(0..q) as i128,
        }
    }

    /// Adds two elements.
    pub fn add(&self, a: i128, b: i128) -> i128 {
        debug_assert!(self.contains(a) && self.contains(b));
        self.reduce(a.wrapping_add(b))
    }

    /// Subtracts `b` from `a`.
    pub fn sub(&self, a: i128, b: i128) -> i128 {
        debug_assert!(self.contains(a) && self.contains(b));
        self.reduce(a.wrapping_sub(b))
    }

    /// Multiplies two elements.
    pub fn mul(&self, a: i128, b: i128) -> i128 {
        debug_assert!(self.contains(a) && self.contains(b));
        match self.0 {
            // the low 128 bits of the product determine its low `bits`
            Modulus::Wrapping(_) => self.reduce(a.wrapping_mul(b)),
            Modulus::Prime(q) => {
                // both residues are below 2^64, so the product fits into an u128
                let product = (a as u128) * (b as u128);
                (product % q as u128) as i128
            }
        }
    }

    /// The additive inverse of an element.
    pub fn neg(&self, a: i128) -> i128 {
        debug_assert!(self.contains(a));
        self.reduce(-a)
    }
}

impl Serialize for Ring {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ring {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ring = match Modulus::deserialize(deserializer)? {
            Modulus::Wrapping(bits) => Ring::wrapping(bits),
            Modulus::Prime(q) => Ring::prime(q),
        };
        ring.map_err(de::Error::custom)
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Modulus::Wrapping(bits) => write!(f, "i{bits} (wraparound)"),
            Modulus::Prime(q) => write!(f, "Z/{q}"),
        }
    }
}
