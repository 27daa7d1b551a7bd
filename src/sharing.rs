//! Additive secret sharing: splitting a secret into shares and combining them again.

use std::collections::HashSet;

use rand::{CryptoRng, Rng};

use crate::{
    error::{MismatchError, ValidationError},
    party::Party,
    ring::Ring,
    share::Share,
};

/// Splits `secret` into one share for each of the `parties`.
///
/// All parties except the last one receive a uniformly random element, the last party receives the
/// difference between the secret and the sum of the random elements. A single share, or any strict
/// subset of the shares, is thus uniformly distributed and independent of the secret.
pub fn split<R: Rng + CryptoRng>(
    secret: i128,
    ring: Ring,
    parties: &[Party],
    rng: &mut R,
) -> Result<Vec<Share>, ValidationError> {
    if parties.is_empty() {
        return Err(ValidationError::NoParties);
    }
    let mut seen = HashSet::with_capacity(parties.len());
    for party in parties {
        if !seen.insert(party.id()) {
            return Err(ValidationError::DuplicateParty {
                party: party.clone(),
            });
        }
    }
    let values = split_values(secret, ring, parties.len(), rng)?;
    Ok(values
        .into_iter()
        .zip(parties)
        .map(|(value, party)| Share::new(value, party.clone(), ring))
        .collect())
}

/// Combines the shares of a secret into the secret itself.
///
/// The shares must all belong to `ring` and be held by distinct parties.
pub fn combine(shares: &[Share], ring: Ring) -> Result<i128, MismatchError> {
    let mut owners = HashSet::with_capacity(shares.len());
    for share in shares {
        if share.ring() != ring {
            return Err(MismatchError::Rings {
                left: ring,
                right: share.ring(),
            });
        }
        if !owners.insert(share.owner().id()) {
            return Err(MismatchError::DuplicateOwner {
                party: share.owner().clone(),
            });
        }
    }
    Ok(sum(shares, ring))
}

/// Splits `secret` into `n` values that add up to it, the remainder is always the last value.
pub(crate) fn split_values<R: Rng + CryptoRng>(
    secret: i128,
    ring: Ring,
    n: usize,
    rng: &mut R,
) -> Result<Vec<i128>, ValidationError> {
    if n == 0 {
        return Err(ValidationError::NoParties);
    }
    if !ring.contains(secret) {
        return Err(ValidationError::NotAnElement {
            value: secret,
            ring,
        });
    }
    let mut values = Vec::with_capacity(n);
    let mut remainder = secret;
    for _ in 1..n {
        let r = ring.random_element(rng);
        remainder = ring.sub(remainder, r);
        values.push(r);
    }
    values.push(remainder);
    Ok(values)
}

/// Adds up share values, without checking that the shares belong together.
pub(crate) fn sum(shares: &[Share], ring: Ring) -> i128 {
    shares
        .iter()
        .fold(0, |acc, share| ring.add(acc, share.value()))
}
