//! Private and secret-shared scalars.
//!
//! A [`PrivateScalar`] is a value known in the clear to a single party. Sharing it among other
//! parties yields a [`SharedScalar`], which represents the same value as the sum of one [`Share`]
//! per party. Shared scalars can be added to and multiplied with public integers and with each
//! other, and finally be reconstructed into a private scalar of a single party.
//!
//! ```
//! use ringshare::{Party, PrivateScalar, Ring};
//!
//! # fn main() -> Result<(), ringshare::Error> {
//! let mut rng = rand::rng();
//! let ring = Ring::prime(97)?;
//! let (a, b, c) = (Party::new("a"), Party::new("b"), Party::new("c"));
//!
//! let x = PrivateScalar::new(90, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
//! let y = PrivateScalar::new(50, b.clone()).share(&[a.clone(), c.clone()], ring, &mut rng)?;
//! let z = &x.mul_shared(&y, &mut rng)? + 10;
//!
//! assert_eq!(z.reconstruct(&c).value(), (90 * 50 + 10) % 97);
//! # Ok(())
//! # }
//! ```

use std::ops::{Add, Mul, Neg, Sub};

use rand::{CryptoRng, Rng};

use crate::{
    beaver,
    error::{Error, MismatchError, ValidationError},
    party::{LedgerEntry, Party},
    ring::Ring,
    share::Share,
    sharing::{self, split},
};

/// A value known in the clear to exactly one party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateScalar {
    value: i128,
    owner: Party,
}

impl PrivateScalar {
    /// Creates a private value of `owner` and records it in the owner's ledger.
    pub fn new(value: i128, owner: Party) -> Self {
        owner.register(LedgerEntry::Private { value });
        PrivateScalar { value, owner }
    }

    /// The private value.
    pub fn value(&self) -> i128 {
        self.value
    }

    /// The party knowing the value.
    pub fn owner(&self) -> &Party {
        &self.owner
    }

    /// Secret-shares the value among the `targets` and the owner.
    ///
    /// The value must be an element of `ring`, the targets must be distinct and must not include
    /// the owner. Every target receives a uniformly random share, the owner keeps the remainder.
    pub fn share<R: Rng + CryptoRng>(
        &self,
        targets: &[Party],
        ring: Ring,
        rng: &mut R,
    ) -> Result<SharedScalar, ValidationError> {
        if targets.contains(&self.owner) {
            return Err(ValidationError::OwnerIsTarget {
                owner: self.owner.clone(),
            });
        }
        let mut parties = Vec::with_capacity(targets.len() + 1);
        parties.extend_from_slice(targets);
        parties.push(self.owner.clone());
        let shares = split(self.value, ring, &parties, rng)?;
        Ok(SharedScalar { shares, ring })
    }
}

/// The right-hand side of an operation on a [`SharedScalar`].
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// An integer known to all parties.
    Public(i128),
    /// Another secret-shared value.
    Shared(&'a SharedScalar),
}

impl From<i128> for Operand<'_> {
    fn from(k: i128) -> Self {
        Operand::Public(k)
    }
}

impl<'a> From<&'a SharedScalar> for Operand<'a> {
    fn from(x: &'a SharedScalar) -> Self {
        Operand::Shared(x)
    }
}

/// A secret value held as one share per party.
///
/// Each party holds exactly one share and all shares belong to the same ring. The represented
/// value is the sum of all shares. Shared scalars are immutable, all operations return new ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedScalar {
    shares: Vec<Share>,
    ring: Ring,
}

impl SharedScalar {
    /// Assembles a shared scalar from shares held by distinct parties.
    pub fn from_shares(shares: Vec<Share>, ring: Ring) -> Result<Self, Error> {
        if shares.is_empty() {
            return Err(ValidationError::NoParties.into());
        }
        // the sum is discarded, combining only checks that the shares belong together
        sharing::combine(&shares, ring)?;
        Ok(SharedScalar { shares, ring })
    }

    /// The shares, one per party.
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// The number of parties holding a share.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Always `false`, a shared scalar is held by at least one party.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// The ring of the shared value.
    pub fn ring(&self) -> Ring {
        self.ring
    }

    /// The parties holding a share, in the order of [`SharedScalar::shares`].
    pub fn owners(&self) -> impl Iterator<Item = &Party> {
        self.shares.iter().map(Share::owner)
    }

    /// The share held by `party`, if any.
    pub fn share_of(&self, party: &Party) -> Option<&Share> {
        self.shares.iter().find(|share| share.owner() == party)
    }

    /// Adds a public integer or another shared value.
    pub fn add(&self, rhs: Operand<'_>) -> Result<SharedScalar, MismatchError> {
        match rhs {
            Operand::Public(k) => Ok(self.add_public(k)),
            Operand::Shared(other) => self.add_shared(other),
        }
    }

    /// Subtracts a public integer or another shared value.
    pub fn sub(&self, rhs: Operand<'_>) -> Result<SharedScalar, MismatchError> {
        match rhs {
            Operand::Public(k) => Ok(self.sub_public(k)),
            Operand::Shared(other) => self.sub_shared(other),
        }
    }

    /// Multiplies with a public integer or another shared value.
    ///
    /// Multiplying two shared values runs the protocol described in [`beaver::mul`].
    pub fn mul<R: Rng + CryptoRng>(
        &self,
        rhs: Operand<'_>,
        rng: &mut R,
    ) -> Result<SharedScalar, Error> {
        match rhs {
            Operand::Public(k) => Ok(self.mul_public(k)),
            Operand::Shared(other) => self.mul_shared(other, rng),
        }
    }

    /// Adds a public integer.
    ///
    /// Only the first share is changed, so that the shares add up to the new value.
    pub fn add_public(&self, k: i128) -> SharedScalar {
        let shares = self
            .shares
            .iter()
            .enumerate()
            .map(|(i, share)| {
                if i == 0 {
                    share.add_public(k)
                } else {
                    share.clone()
                }
            })
            .collect();
        SharedScalar {
            shares,
            ring: self.ring,
        }
    }

    /// Subtracts a public integer.
    pub fn sub_public(&self, k: i128) -> SharedScalar {
        self.add_public(self.ring.neg(self.ring.reduce(k)))
    }

    /// Multiplies with a public integer, scaling every share.
    pub fn mul_public(&self, k: i128) -> SharedScalar {
        SharedScalar {
            shares: self.shares.iter().map(|share| share.mul_public(k)).collect(),
            ring: self.ring,
        }
    }

    /// Adds another shared value held by the same parties.
    ///
    /// Every party adds up its two shares locally, shares are matched by owner and not by
    /// position. The result lists the shares in the order of `self`.
    pub fn add_shared(&self, other: &SharedScalar) -> Result<SharedScalar, MismatchError> {
        self.check_compatible(other)?;
        let shares = self
            .shares
            .iter()
            .map(|share| {
                let other_share = other
                    .share_of(share.owner())
                    .ok_or(MismatchError::OwnerSets)?;
                share.add(other_share)
            })
            .collect::<Result<_, _>>()?;
        Ok(SharedScalar {
            shares,
            ring: self.ring,
        })
    }

    /// Subtracts another shared value held by the same parties.
    pub fn sub_shared(&self, other: &SharedScalar) -> Result<SharedScalar, MismatchError> {
        self.add_shared(&other.neg())
    }

    /// Multiplies with another shared value held by the same parties, see [`beaver::mul`].
    pub fn mul_shared<R: Rng + CryptoRng>(
        &self,
        other: &SharedScalar,
        rng: &mut R,
    ) -> Result<SharedScalar, Error> {
        beaver::mul(self, other, rng)
    }

    /// The additive inverse.
    pub fn neg(&self) -> SharedScalar {
        self.mul_public(-1)
    }

    /// Sends all shares to `requester`, who adds them up into the secret value.
    ///
    /// The requester does not need to be one of the parties holding a share.
    pub fn reconstruct(&self, requester: &Party) -> PrivateScalar {
        PrivateScalar::new(sharing::sum(&self.shares, self.ring), requester.clone())
    }

    /// Checks that both values live in the same ring and are held by the same parties.
    pub(crate) fn check_compatible(&self, other: &SharedScalar) -> Result<(), MismatchError> {
        if self.ring != other.ring {
            return Err(MismatchError::Rings {
                left: self.ring,
                right: other.ring,
            });
        }
        // owners are unique within each shared scalar, so equal lengths and inclusion suffice
        let same_owners = self.len() == other.len()
            && self.owners().all(|owner| other.share_of(owner).is_some());
        if !same_owners {
            return Err(MismatchError::OwnerSets);
        }
        Ok(())
    }
}

impl Add<i128> for &SharedScalar {
    type Output = SharedScalar;

    fn add(self, rhs: i128) -> SharedScalar {
        self.add_public(rhs)
    }
}

impl Add<&SharedScalar> for i128 {
    type Output = SharedScalar;

    fn add(self, rhs: &SharedScalar) -> SharedScalar {
        rhs.add_public(self)
    }
}

impl Sub<i128> for &SharedScalar {
    type Output = SharedScalar;

    fn sub(self, rhs: i128) -> SharedScalar {
        self.sub_public(rhs)
    }
}

impl Sub<&SharedScalar> for i128 {
    type Output = SharedScalar;

    fn sub(self, rhs: &SharedScalar) -> SharedScalar {
        rhs.neg().add_public(self)
    }
}

impl Mul<i128> for &SharedScalar {
    type Output = SharedScalar;

    fn mul(self, rhs: i128) -> SharedScalar {
        self.mul_public(rhs)
    }
}

impl Mul<&SharedScalar> for i128 {
    type Output = SharedScalar;

    fn mul(self, rhs: &SharedScalar) -> SharedScalar {
        rhs.mul_public(self)
    }
}

impl Neg for &SharedScalar {
    type Output = SharedScalar;

    fn neg(self) -> SharedScalar {
        SharedScalar::neg(self)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::{Operand, PrivateScalar, SharedScalar};
    use crate::{
        error::{Error, MismatchError, ValidationError},
        party::{LedgerEntry, Party},
        ring::Ring,
    };

    fn parties() -> (Party, Party, Party) {
        (Party::new("a"), Party::new("b"), Party::new("c"))
    }

    #[test]
    fn share_includes_owner_last() -> Result<(), Error> {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let ring = Ring::prime(97)?;
        let (a, b, c) = parties();
        let x = PrivateScalar::new(5, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
        let owners: Vec<_> = x.owners().cloned().collect();
        assert_eq!(owners, vec![b.clone(), c.clone(), a.clone()]);
        assert_eq!(x.ring(), ring);
        assert_eq!(x.reconstruct(&c).value(), 5);
        assert_eq!(x.reconstruct(&c).owner(), &c);
        Ok(())
    }

    #[test]
    fn share_validates_targets() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let ring = Ring::prime(97).unwrap();
        let (a, b, _) = parties();
        let secret = PrivateScalar::new(5, a.clone());
        assert_eq!(
            secret.share(&[b.clone(), a.clone()], ring, &mut rng),
            Err(ValidationError::OwnerIsTarget { owner: a.clone() })
        );
        assert_eq!(
            secret.share(&[b.clone(), b.clone()], ring, &mut rng),
            Err(ValidationError::DuplicateParty { party: b.clone() })
        );
        assert_eq!(
            PrivateScalar::new(-1, a.clone()).share(&[b.clone()], ring, &mut rng),
            Err(ValidationError::NotAnElement { value: -1, ring })
        );
        // only the private values were recorded, no share was handed out
        assert_eq!(
            a.ledger(),
            vec![
                LedgerEntry::Private { value: 5 },
                LedgerEntry::Private { value: -1 }
            ]
        );
        assert!(b.ledger().is_empty());
    }

    #[test]
    fn sharing_with_nobody_keeps_the_value() -> Result<(), Error> {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let (a, _, _) = parties();
        let x = PrivateScalar::new(-7, a.clone()).share(&[], Ring::default(), &mut rng)?;
        assert_eq!(x.len(), 1);
        assert_eq!(x.shares()[0].value(), -7);
        Ok(())
    }

    #[test]
    fn public_constants_change_one_share() -> Result<(), Error> {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let ring = Ring::prime(97)?;
        let (a, b, c) = parties();
        let x = PrivateScalar::new(5, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
        let y = &x + 10;
        assert_eq!(y.reconstruct(&a).value(), 15);
        assert_ne!(y.shares()[0], x.shares()[0]);
        assert_eq!(y.shares()[1..], x.shares()[1..]);

        assert_eq!((&x - 6).reconstruct(&a).value(), 96);
        assert_eq!((6 - &x).reconstruct(&a).value(), 1);
        assert_eq!((3 * &x).reconstruct(&a).value(), 15);
        assert_eq!((-&x).reconstruct(&a).value(), 92);
        assert_eq!(
            (&x - i128::MIN).reconstruct(&a).value(),
            ring.sub(5, ring.reduce(i128::MIN))
        );
        Ok(())
    }

    #[test]
    fn operands_dispatch() -> Result<(), Error> {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let ring = Ring::wrapping(16)?;
        let (a, b, c) = parties();
        let x = PrivateScalar::new(300, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
        let y =
            PrivateScalar::new(-200, b.clone()).share(&[a.clone(), c.clone()], ring, &mut rng)?;
        assert_eq!(x.add(Operand::Public(1))?.reconstruct(&a).value(), 301);
        assert_eq!(x.add((&y).into())?.reconstruct(&a).value(), 100);
        assert_eq!(x.sub(Operand::Shared(&y))?.reconstruct(&a).value(), 500);
        assert_eq!(x.sub(2.into())?.reconstruct(&a).value(), 298);
        assert_eq!(
            x.mul(Operand::Shared(&y), &mut rng)?.reconstruct(&a).value(),
            ring.reduce(300 * -200)
        );
        assert_eq!(x.mul(Operand::Public(-2), &mut rng)?.reconstruct(&a).value(), -600);
        Ok(())
    }

    #[test]
    fn owners_are_matched_by_identity_not_position() -> Result<(), Error> {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let ring = Ring::prime(97)?;
        let (a, b, c) = parties();
        let x = PrivateScalar::new(40, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
        let y = PrivateScalar::new(70, c.clone()).share(&[a.clone(), b.clone()], ring, &mut rng)?;
        let sum = x.add_shared(&y)?;
        for share in sum.shares() {
            let expected = ring.add(
                x.share_of(share.owner()).map(|s| s.value()).unwrap_or_default(),
                y.share_of(share.owner()).map(|s| s.value()).unwrap_or_default(),
            );
            assert_eq!(share.value(), expected);
        }
        assert_eq!(sum.reconstruct(&b).value(), 13);
        Ok(())
    }

    #[test]
    fn mismatched_scalars_are_rejected() -> Result<(), Error> {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let ring = Ring::prime(97)?;
        let (a, b, c) = parties();
        let x = PrivateScalar::new(1, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
        let y = PrivateScalar::new(1, a.clone()).share(&[b.clone()], ring, &mut rng)?;
        let other_ring = Ring::prime(101)?;
        let z = PrivateScalar::new(1, a.clone()).share(&[b.clone(), c.clone()], other_ring, &mut rng)?;
        assert_eq!(x.add_shared(&y), Err(MismatchError::OwnerSets));
        assert_eq!(y.add_shared(&x), Err(MismatchError::OwnerSets));
        assert!(matches!(x.sub_shared(&z), Err(MismatchError::Rings { .. })));
        assert_eq!(
            x.mul_shared(&y, &mut rng),
            Err(Error::Mismatch(MismatchError::OwnerSets))
        );
        Ok(())
    }

    #[test]
    fn from_shares_checks_invariants() -> Result<(), Error> {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let ring = Ring::prime(97)?;
        let (a, b, _) = parties();
        let x = PrivateScalar::new(9, a.clone()).share(&[b.clone()], ring, &mut rng)?;
        let rebuilt = SharedScalar::from_shares(x.shares().to_vec(), ring)?;
        assert_eq!(rebuilt, x);

        let mut doubled = x.shares().to_vec();
        doubled.push(x.shares()[0].clone());
        assert_eq!(
            SharedScalar::from_shares(doubled, ring),
            Err(Error::Mismatch(MismatchError::DuplicateOwner { party: b.clone() }))
        );
        assert!(matches!(
            SharedScalar::from_shares(x.shares().to_vec(), Ring::prime(101)?),
            Err(Error::Mismatch(MismatchError::Rings { .. }))
        ));
        assert_eq!(
            SharedScalar::from_shares(vec![], ring),
            Err(Error::Validation(ValidationError::NoParties))
        );
        Ok(())
    }
}
