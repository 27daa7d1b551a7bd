//! A Rust implementation of additive secret sharing with SPDZ-style secure multiplication.
//!
//! This crate lets several parties jointly compute sums and products of private numbers without
//! any party learning another party's value. Values are split into random shares that add up to
//! the secret in a finite ring, so that any strict subset of the shares is independent of the
//! secret. Additions are computed locally on the shares, multiplications use a fresh random
//! multiplication triple for every product.
//!
//! ## Main Components
//!
//! * [`ring`]: The finite rings all values live in, either fixed-width integers with wraparound or
//!   residues modulo an explicit modulus.
//! * [`scalar`]: [`PrivateScalar`] and [`SharedScalar`], simulating all parties in one address
//!   space, with the splitting primitives in [`sharing`] and the multiplication protocol in
//!   [`beaver`].
//! * [`protocol`]: The same arithmetic executed by each party separately, exchanging messages with
//!   the other parties over a [`channel::Channel`].
//!
//! ## Example
//!
//! ```
//! use ringshare::{Party, PrivateScalar, Ring};
//!
//! # fn main() -> Result<(), ringshare::Error> {
//! let mut rng = rand::rng();
//! let ring = Ring::prime(97)?;
//! let (a, b, c) = (Party::new("A"), Party::new("B"), Party::new("C"));
//!
//! let x = PrivateScalar::new(5, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
//! assert_eq!(x.shares().len(), 3);
//! assert_eq!(x.reconstruct(&c).value(), 5);
//! assert_eq!((&x + 10).reconstruct(&c).value(), 15);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Properties
//!
//! The protocols are secure against honest-but-curious parties: as long as every party follows the
//! protocol, no party learns anything beyond what it can infer from its own inputs and the values
//! explicitly reconstructed for it. Parties deviating from the protocol are not detected.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod beaver;
pub mod channel;
pub mod error;
pub mod party;
pub mod protocol;
pub mod ring;
pub mod scalar;
pub mod share;
pub mod sharing;

mod coin;

pub use error::{Error, MismatchError, ProtocolError, ValidationError};
pub use party::{LedgerEntry, Party, PartyId};
pub use ring::Ring;
pub use scalar::{Operand, PrivateScalar, SharedScalar};
pub use share::Share;
