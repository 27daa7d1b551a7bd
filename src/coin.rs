//! Multi-party coin tossing to generate shared randomness.

use blake3::Hasher;
use rand::{CryptoRng, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::{
    channel::{Channel, recv_from, send_to},
    protocol::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Commitment(pub(crate) [u8; 32]);

/// Commit to the seed contribution of `party` using the BLAKE3 hash function.
///
/// The commitment of one party never opens as the commitment of another party.
fn commit(seed: &[u8; 32], party: usize) -> Commitment {
    let mut hasher = Hasher::new();
    hasher.update(seed);
    hasher.update(&(party as u16).to_be_bytes());
    Commitment(*hasher.finalize().as_bytes())
}

/// Open the commitment of `party` and check that it matches the revealed seed.
fn open_commitment(commitment: &Commitment, seed: &[u8; 32], party: usize) -> bool {
    commit(seed, party) == *commitment
}

/// Generates an RNG seeded identically at all `n` parties, `i` being the own index.
///
/// Every party commits to a random seed contribution before any contribution is revealed, so the
/// combined seed is uniformly random as long as one party picks its contribution at random.
pub(crate) async fn shared_rng<R: Rng + CryptoRng>(
    channel: &mut impl Channel,
    i: usize,
    n: usize,
    rng: &mut R,
) -> Result<ChaCha20Rng, Error> {
    let mut buf = [0u8; 32];
    rng.fill(&mut buf);
    let c = commit(&buf, i);
    for k in (0..n).filter(|k| *k != i) {
        send_to(channel, k, "RNG comm", &c).await?;
    }
    let mut commitments = vec![Commitment([0; 32]); n];
    for k in (0..n).filter(|k| *k != i) {
        commitments[k] = recv_from(channel, k, "RNG comm").await?;
    }
    for k in (0..n).filter(|k| *k != i) {
        send_to(channel, k, "RNG ver", &buf).await?;
    }
    let mut seed = buf;
    for k in (0..n).filter(|k| *k != i) {
        let contribution: [u8; 32] = recv_from(channel, k, "RNG ver").await?;
        if !open_commitment(&commitments[k], &contribution, k) {
            return Err(Error::CommitmentCouldNotBeOpened(k));
        }
        seed.iter_mut()
            .zip(contribution.iter())
            .for_each(|(seed_byte, byte)| *seed_byte ^= *byte);
    }
    Ok(ChaCha20Rng::from_seed(seed))
}
