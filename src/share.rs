//! A single fragment of a secret-shared value.

use crate::{
    error::MismatchError,
    party::{LedgerEntry, Party},
    ring::Ring,
};

/// One party's fragment of a secret-shared value.
///
/// Shares are immutable, every operation returns a new share held by the same party. Operations
/// between two shares are local to their common owner, multiplying two secret values is only
/// possible through the protocol in [`crate::beaver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    value: i128,
    owner: Party,
    ring: Ring,
}

impl Share {
    /// Creates a share and records it in the owner's ledger.
    pub(crate) fn new(value: i128, owner: Party, ring: Ring) -> Self {
        debug_assert!(ring.contains(value), "{value} is not an element of {ring}");
        owner.register(LedgerEntry::Share { value, ring });
        Share { value, owner, ring }
    }

    /// The value of the share, an element of [`Share::ring`].
    pub fn value(&self) -> i128 {
        self.value
    }

    /// The party holding the share.
    pub fn owner(&self) -> &Party {
        &self.owner
    }

    /// The ring the share belongs to.
    pub fn ring(&self) -> Ring {
        self.ring
    }

    /// Adds a public integer to the share.
    pub fn add_public(&self, k: i128) -> Share {
        let k = self.ring.reduce(k);
        self.with_value(self.ring.add(self.value, k))
    }

    /// Multiplies the share with a public integer.
    pub fn mul_public(&self, k: i128) -> Share {
        let k = self.ring.reduce(k);
        self.with_value(self.ring.mul(self.value, k))
    }

    /// Adds another share held by the same party.
    pub fn add(&self, other: &Share) -> Result<Share, MismatchError> {
        self.check_compatible(other)?;
        Ok(self.with_value(self.ring.add(self.value, other.value)))
    }

    /// Subtracts another share held by the same party.
    pub fn sub(&self, other: &Share) -> Result<Share, MismatchError> {
        self.add(&other.neg())
    }

    /// Multiplies with another share held by the same party.
    pub fn mul(&self, other: &Share) -> Result<Share, MismatchError> {
        self.check_compatible(other)?;
        Ok(self.with_value(self.ring.mul(self.value, other.value)))
    }

    /// The additive inverse of the share.
    pub fn neg(&self) -> Share {
        self.mul_public(-1)
    }

    fn with_value(&self, value: i128) -> Share {
        Share::new(value, self.owner.clone(), self.ring)
    }

    fn check_compatible(&self, other: &Share) -> Result<(), MismatchError> {
        if self.owner != other.owner {
            return Err(MismatchError::Owners {
                left: self.owner.clone(),
                right: other.owner.clone(),
            });
        }
        if self.ring != other.ring {
            return Err(MismatchError::Rings {
                left: self.ring,
                right: other.ring,
            });
        }
        Ok(())
    }
}
