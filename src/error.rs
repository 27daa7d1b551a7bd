//! Errors raised by the secret-sharing engine.
//!
//! All of them are usage or implementation errors detected by local precondition checks, so a
//! failing call never leaves a partial result behind and retrying it makes no sense.

use crate::{party::Party, ring::Ring};

/// Errors of the secret-sharing engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The inputs of a sharing operation are invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The operands of an operation do not belong together.
    #[error(transparent)]
    Mismatch(#[from] MismatchError),
    /// An invariant of the multiplication protocol was violated.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// A value or party list that cannot be secret-shared.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The value to share lies outside of the ring.
    #[error("{value} is not an element of {ring}")]
    NotAnElement {
        /// The rejected value.
        value: i128,
        /// The ring the value was supposed to be shared in.
        ring: Ring,
    },
    /// The owner of a private value cannot also be one of the parties receiving a share.
    #[error("the owner {owner} is also listed as a target")]
    OwnerIsTarget {
        /// The owner of the private value.
        owner: Party,
    },
    /// A party is listed more than once.
    #[error("party {party} is listed more than once")]
    DuplicateParty {
        /// The duplicated party.
        party: Party,
    },
    /// A secret cannot be split among zero parties.
    #[error("a secret must be split among at least one party")]
    NoParties,
    /// Wraparound rings are between 1 and 64 bits wide.
    #[error("wraparound rings must be 1 to 64 bits wide, got {0}")]
    InvalidWidth(u32),
    /// The modulus of a prime ring must be at least 2.
    #[error("the modulus of a ring must be at least 2, got {0}")]
    InvalidModulus(u64),
}

/// Operands that cannot be combined.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MismatchError {
    /// Two shares held by different parties cannot be combined locally.
    #[error("shares held by {left} and {right} cannot be combined")]
    Owners {
        /// The owner of the left operand.
        left: Party,
        /// The owner of the right operand.
        right: Party,
    },
    /// The operands belong to different rings.
    #[error("operands belong to different rings: {left} vs {right}")]
    Rings {
        /// The ring of the left operand.
        left: Ring,
        /// The ring of the right operand.
        right: Ring,
    },
    /// The shared values are held by different sets of parties.
    #[error("the shared values are held by different sets of parties")]
    OwnerSets,
    /// A party holds more than one share of the same value.
    #[error("party {party} holds more than one share")]
    DuplicateOwner {
        /// The party holding several shares.
        party: Party,
    },
}

/// A violated invariant inside the multiplication protocol, which indicates a bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The dealer could not share the multiplication triple.
    #[error("the multiplication triple could not be shared: {0}")]
    TripleSharing(#[source] ValidationError),
    /// The operands could not be masked with the triple.
    #[error("the operands could not be masked: {0}")]
    Masking(#[source] MismatchError),
}
