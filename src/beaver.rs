//! Secure multiplication of two shared values using masked multiplication triples, following the
//! [SPDZ](https://bristolcrypto.blogspot.com/2016/10/what-is-spdz-part-2-circuit-evaluation.html)
//! approach to circuit evaluation.
//!
//! For every multiplication a dealer is picked at random among the parties holding the operands.
//! The dealer generates a fresh triple `(a, b, c = a·b)` and shares it among all parties. The
//! operands are then masked as `d = x - a` and `e = y - b`, and only these masked values are
//! opened to the dealer, who learns nothing about `x` or `y` since `a` and `b` are uniformly random
//! and used only once. Since `x·y = c + d·b + e·a + d·e`, every party can then compute its share of
//! the product locally.

use rand::{CryptoRng, Rng};
use tracing::{Level, debug, instrument};

use crate::{
    error::{Error, ProtocolError},
    party::Party,
    ring::Ring,
    scalar::{PrivateScalar, SharedScalar},
};

/// A multiplication triple `(a, b, c)` with `c = a·b`, shared among all parties.
#[derive(Debug)]
struct Triple {
    a: SharedScalar,
    b: SharedScalar,
    c: SharedScalar,
}

impl Triple {
    /// Generates a random triple known to the `dealer` and shares it with the `others`.
    fn deal<R: Rng + CryptoRng>(
        dealer: &Party,
        others: &[Party],
        ring: Ring,
        rng: &mut R,
    ) -> Result<Self, ProtocolError> {
        let a = ring.random_element(rng);
        let b = ring.random_element(rng);
        let c = ring.mul(a, b);
        let mut share = |value| {
            PrivateScalar::new(value, dealer.clone())
                .share(others, ring, rng)
                .map_err(ProtocolError::TripleSharing)
        };
        Ok(Triple {
            a: share(a)?,
            b: share(b)?,
            c: share(c)?,
        })
    }
}

/// Multiplies two shared values held by the same parties in the same ring.
///
/// The result is a fresh sharing of `x·y` among the same parties. Neither operand is revealed to
/// any party, only the dealer sees the masked differences between the operands and the triple.
#[instrument(level = Level::DEBUG, skip_all, err)]
pub fn mul<R: Rng + CryptoRng>(
    x: &SharedScalar,
    y: &SharedScalar,
    rng: &mut R,
) -> Result<SharedScalar, Error> {
    x.check_compatible(y)?;
    let ring = x.ring();

    // Step 1) Pick a fresh dealer for this multiplication.
    let dealer = x.shares()[rng.random_range(0..x.len())].owner().clone();
    debug!(%dealer, parties = x.len(), "Selected multiplication dealer");

    // Steps 2 and 3) The dealer generates and shares the triple.
    let others: Vec<Party> = x.owners().filter(|p| **p != dealer).cloned().collect();
    let Triple { a, b, c } = Triple::deal(&dealer, &others, ring, rng)?;

    // Step 4) Every party masks its operand shares locally.
    let masked_x = x.sub_shared(&a).map_err(ProtocolError::Masking)?;
    let masked_y = y.sub_shared(&b).map_err(ProtocolError::Masking)?;

    // Step 5) All parties send their masked shares to the dealer, who opens them. Reconstructing
    // collects the share of every party, which is the barrier before the dealer may proceed.
    let d = masked_x.reconstruct(&dealer).value();
    let e = masked_y.reconstruct(&dealer).value();
    debug!(%dealer, "Opened masked operands");

    // Step 6) Every party computes its share of c + d·b + e·a + d·e locally.
    let product = c
        .add_shared(&b.mul_public(d))
        .and_then(|z| z.add_shared(&a.mul_public(e)))
        .map_err(ProtocolError::Masking)?
        .add_public(ring.mul(d, e));
    Ok(product)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::mul;
    use crate::{
        error::{Error, MismatchError},
        party::{LedgerEntry, Party},
        ring::Ring,
        scalar::PrivateScalar,
    };

    #[test]
    fn product_of_shared_values() -> Result<(), Error> {
        let ring = Ring::prime(97)?;
        let (a, b, c) = (Party::new("a"), Party::new("b"), Party::new("c"));
        for seed in 0..20 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let x = PrivateScalar::new(90, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
            let y = PrivateScalar::new(50, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
            let z = mul(&x, &y, &mut rng)?;
            assert_eq!(z.reconstruct(&c).value(), 38);
            assert_eq!(z.len(), 3);
            for share in z.shares() {
                assert!(ring.contains(share.value()));
            }
        }
        Ok(())
    }

    #[test]
    fn product_wraps_around() -> Result<(), Error> {
        let ring = Ring::default();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let (a, b) = (Party::new("a"), Party::new("b"));
        let x = PrivateScalar::new(i64::MAX as i128, a.clone()).share(&[b.clone()], ring, &mut rng)?;
        let y = PrivateScalar::new(-3, b.clone()).share(&[a.clone()], ring, &mut rng)?;
        let z = mul(&x, &y, &mut rng)?;
        assert_eq!(z.reconstruct(&a).value(), i64::MAX.wrapping_mul(-3) as i128);
        Ok(())
    }

    #[test]
    fn single_party_multiplication() -> Result<(), Error> {
        let ring = Ring::prime(97)?;
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let a = Party::new("a");
        let x = PrivateScalar::new(12, a.clone()).share(&[], ring, &mut rng)?;
        let y = PrivateScalar::new(11, a.clone()).share(&[], ring, &mut rng)?;
        assert_eq!(mul(&x, &y, &mut rng)?.reconstruct(&a).value(), 35);
        Ok(())
    }

    #[test]
    fn mismatch_aborts_before_dealing() -> Result<(), Error> {
        let ring = Ring::prime(97)?;
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let (a, b, c) = (Party::new("a"), Party::new("b"), Party::new("c"));
        let x = PrivateScalar::new(90, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
        let y = PrivateScalar::new(50, a.clone()).share(&[b.clone()], ring, &mut rng)?;
        let ledger_sizes = [a.ledger().len(), b.ledger().len(), c.ledger().len()];
        assert_eq!(
            mul(&x, &y, &mut rng),
            Err(Error::Mismatch(MismatchError::OwnerSets))
        );
        assert_eq!(
            ledger_sizes,
            [a.ledger().len(), b.ledger().len(), c.ledger().len()]
        );
        Ok(())
    }

    #[test]
    fn dealer_is_chosen_per_multiplication() -> Result<(), Error> {
        let ring = Ring::prime(97)?;
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let (a, b, c) = (Party::new("a"), Party::new("b"), Party::new("c"));
        let x = PrivateScalar::new(3, a.clone()).share(&[b.clone(), c.clone()], ring, &mut rng)?;
        let y = PrivateScalar::new(4, b.clone()).share(&[a.clone(), c.clone()], ring, &mut rng)?;
        let mut dealers = [0; 3];
        for _ in 0..60 {
            let private_before = [&a, &b, &c].map(count_private);
            mul(&x, &y, &mut rng)?;
            let private_after = [&a, &b, &c].map(count_private);
            // the dealer creates a, b, c and receives the two opened values
            for (i, (before, after)) in private_before.iter().zip(private_after).enumerate() {
                if after - before == 5 {
                    dealers[i] += 1;
                }
            }
        }
        assert_eq!(dealers.iter().sum::<usize>(), 60);
        assert!(dealers.iter().all(|&n| n > 0), "dealers: {dealers:?}");
        Ok(())
    }

    fn count_private(party: &Party) -> usize {
        party
            .ledger()
            .iter()
            .filter(|entry| matches!(entry, LedgerEntry::Private { .. }))
            .count()
    }
}
