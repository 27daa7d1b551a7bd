//! Secret-shared arithmetic executed by each party separately, with communication via channels.
//!
//! Whereas [`crate::SharedScalar`] simulates all parties in one address space, a [`Session`] holds
//! the view of a single party: it only knows its own [`LocalShare`] of each value, and exchanges
//! exactly the messages needed with the other parties over a [`Channel`]:
//!
//! - **Input**: the owner of a private value sends one share to every other party.
//! - **Multiplication**: the dealer sends every party its share of a fresh triple, every party
//!   sends its masked operand shares to the dealer, and once all of them arrived the dealer sends
//!   the opened masked values back to every party.
//! - **Reconstruction**: every party sends its share to the requesting party.
//!
//! All shared values of a session are shared among all of its parties. Every message is tagged
//! with a [`Handle`] that all parties advance in lockstep, so that messages belonging to different
//! operations are never confused.
//!
//! Timeouts for unresponsive parties are left to the [`Channel`] implementation.

use rand::{CryptoRng, Rng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{Level, debug, instrument};

use crate::{
    channel::{self, Channel, recv_from, send_to},
    coin::shared_rng,
    error::{MismatchError, ValidationError},
    ring::Ring,
    sharing::split_values,
};

/// Errors occurring during the distributed execution of a computation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A message could not be sent or received.
    #[error("channel error: {0}")]
    ChannelError(#[from] channel::Error),
    /// A value could not be shared.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Shares of different rings were combined.
    #[error(transparent)]
    Mismatch(#[from] MismatchError),
    /// The specified party does not exist in the session.
    #[error("party {party} does not exist among {parties} parties")]
    PartyDoesNotExist {
        /// The index of the party.
        party: usize,
        /// The number of parties in the session.
        parties: usize,
    },
    /// The owner of an input did not provide a value.
    #[error("party {0} owns the input but did not provide a value")]
    MissingInput(usize),
    /// A message belonging to a different operation was received.
    #[error("expected a message for {expected:?}, but received one for {actual:?}")]
    UnexpectedHandle {
        /// The handle of the current operation.
        expected: Handle,
        /// The handle attached to the received message.
        actual: Handle,
    },
    /// A party revealed a seed that does not match its commitment.
    #[error("the commitment of party {0} could not be opened")]
    CommitmentCouldNotBeOpened(usize),
}

/// Identifies an operation within a session, attached to every message of that operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle(u64);

#[derive(Debug, Serialize, Deserialize)]
struct Msg<T> {
    handle: Handle,
    payload: T,
}

/// A party's share of a value shared among all parties of a [`Session`].
///
/// Shares can only be combined within the session that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalShare {
    value: i128,
    ring: Ring,
    session: u64,
}

impl LocalShare {
    /// The value of the share.
    pub fn value(&self) -> i128 {
        self.value
    }

    /// The ring of the shared value.
    pub fn ring(&self) -> Ring {
        self.ring
    }
}

/// The state of one party taking part in a distributed computation.
#[derive(Debug)]
pub struct Session {
    p_own: usize,
    parties: usize,
    ring: Ring,
    id: u64,
    coins: ChaCha20Rng,
    next_handle: u64,
}

impl Session {
    /// The party that folds public constants into its share.
    const P_CONST: usize = 0;

    /// Joins a session of `parties` parties as party `p_own`.
    ///
    /// All parties must call this concurrently, as they agree on a common source of randomness for
    /// selecting the dealers of multiplications.
    #[instrument(level = Level::DEBUG, skip(channel, rng), err)]
    pub async fn new<R: Rng + CryptoRng>(
        channel: &mut impl Channel,
        p_own: usize,
        parties: usize,
        ring: Ring,
        rng: &mut R,
    ) -> Result<Self, Error> {
        if p_own >= parties {
            return Err(Error::PartyDoesNotExist {
                party: p_own,
                parties,
            });
        }
        let mut coins = shared_rng(channel, p_own, parties, rng).await?;
        // identical at all parties, and different for every session
        let id = coins.random();
        debug!(id, "Joined session");
        Ok(Session {
            p_own,
            parties,
            ring,
            id,
            coins,
            next_handle: 0,
        })
    }

    /// The index of this party.
    pub fn party(&self) -> usize {
        self.p_own
    }

    /// The number of parties in the session.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// The ring all values of the session are shared in.
    pub fn ring(&self) -> Ring {
        self.ring
    }

    /// The party that deals the triple of the next multiplication.
    pub fn next_dealer(&self) -> usize {
        self.coins.clone().random_range(0..self.parties)
    }

    /// Secret-shares a private value of party `owner` among all parties.
    ///
    /// The owner must provide the `value`, all other parties pass `None` and receive their share.
    /// If the owner rejects its value, the other parties wait until their channel gives up.
    pub async fn input<R: Rng + CryptoRng>(
        &mut self,
        channel: &mut impl Channel,
        owner: usize,
        value: Option<i128>,
        rng: &mut R,
    ) -> Result<LocalShare, Error> {
        self.check_party(owner)?;
        let handle = self.next_handle();
        let value = if self.p_own == owner {
            let value = value.ok_or(Error::MissingInput(owner))?;
            let shares = self.deal(owner, value, rng)?;
            for (p, share) in self.others().zip(self.others_of(&shares)) {
                send_to(channel, p, "input", &Msg { handle, payload: share }).await?;
            }
            debug!(?handle, "Sent input shares");
            shares[owner]
        } else {
            self.recv(channel, owner, "input", handle).await?
        };
        Ok(self.local(value))
    }

    /// Adds two shared values.
    pub fn add(&self, x: &LocalShare, y: &LocalShare) -> Result<LocalShare, MismatchError> {
        self.check_share(x)?;
        self.check_share(y)?;
        Ok(self.local(self.ring.add(x.value, y.value)))
    }

    /// Subtracts `y` from `x`.
    pub fn sub(&self, x: &LocalShare, y: &LocalShare) -> Result<LocalShare, MismatchError> {
        self.add(x, &self.neg(y)?)
    }

    /// Adds a public integer, which only changes the share of party 0.
    pub fn add_public(&self, x: &LocalShare, k: i128) -> Result<LocalShare, MismatchError> {
        self.check_share(x)?;
        if self.p_own == Self::P_CONST {
            Ok(self.local(self.ring.add(x.value, self.ring.reduce(k))))
        } else {
            Ok(*x)
        }
    }

    /// Subtracts a public integer.
    pub fn sub_public(&self, x: &LocalShare, k: i128) -> Result<LocalShare, MismatchError> {
        self.add_public(x, self.ring.neg(self.ring.reduce(k)))
    }

    /// Multiplies with a public integer.
    pub fn mul_public(&self, x: &LocalShare, k: i128) -> Result<LocalShare, MismatchError> {
        self.check_share(x)?;
        Ok(self.local(self.ring.mul(x.value, self.ring.reduce(k))))
    }

    /// The additive inverse.
    pub fn neg(&self, x: &LocalShare) -> Result<LocalShare, MismatchError> {
        self.mul_public(x, -1)
    }

    /// Multiplies two shared values using a fresh multiplication triple.
    ///
    /// The dealer of the triple is drawn from the randomness shared by all parties, so that every
    /// party knows the dealer without further communication. The dealer only proceeds once it has
    /// received the masked shares of all other parties.
    #[instrument(level = Level::DEBUG, skip_all, fields(p_own = self.p_own), err)]
    pub async fn mul<R: Rng + CryptoRng>(
        &mut self,
        channel: &mut impl Channel,
        x: &LocalShare,
        y: &LocalShare,
        rng: &mut R,
    ) -> Result<LocalShare, Error> {
        self.check_share(x)?;
        self.check_share(y)?;
        let ring = self.ring;
        let handle = self.next_handle();
        let dealer = self.coins.random_range(0..self.parties);
        debug!(?handle, dealer, "Selected multiplication dealer");

        let (a, b, c) = if self.p_own == dealer {
            let a = ring.random_element(rng);
            let b = ring.random_element(rng);
            let c = ring.mul(a, b);
            let a = self.deal(dealer, a, rng)?;
            let b = self.deal(dealer, b, rng)?;
            let c = self.deal(dealer, c, rng)?;
            for p in self.others() {
                let payload = (a[p], b[p], c[p]);
                send_to(channel, p, "triple", &Msg { handle, payload }).await?;
            }
            (a[dealer], b[dealer], c[dealer])
        } else {
            self.recv(channel, dealer, "triple", handle).await?
        };

        let d = ring.sub(x.value, a);
        let e = ring.sub(y.value, b);
        let (d, e) = if self.p_own == dealer {
            // barrier: the masked values are opened only once every party has contributed
            let mut opened = (d, e);
            for p in self.others() {
                let (d_p, e_p): (i128, i128) = self.recv(channel, p, "masked", handle).await?;
                opened = (ring.add(opened.0, d_p), ring.add(opened.1, e_p));
            }
            for p in self.others() {
                send_to(channel, p, "opened", &Msg { handle, payload: opened }).await?;
            }
            debug!(?handle, "Opened masked operands");
            opened
        } else {
            send_to(channel, dealer, "masked", &Msg { handle, payload: (d, e) }).await?;
            self.recv(channel, dealer, "opened", handle).await?
        };

        let mut z = ring.add(c, ring.add(ring.mul(d, b), ring.mul(e, a)));
        if self.p_own == Self::P_CONST {
            z = ring.add(z, ring.mul(d, e));
        }
        Ok(self.local(z))
    }

    /// Reveals a shared value to party `requester`, which receives `Some(value)`.
    ///
    /// All other parties send their share to the requester and receive `None`.
    pub async fn reconstruct(
        &mut self,
        channel: &mut impl Channel,
        x: &LocalShare,
        requester: usize,
    ) -> Result<Option<i128>, Error> {
        self.check_party(requester)?;
        self.check_share(x)?;
        let handle = self.next_handle();
        if self.p_own == requester {
            let mut value = x.value;
            for p in self.others() {
                let share: i128 = self.recv(channel, p, "reconstruct", handle).await?;
                value = self.ring.add(value, share);
            }
            debug!(?handle, "Reconstructed shared value");
            Ok(Some(value))
        } else {
            let payload = x.value;
            send_to(channel, requester, "reconstruct", &Msg { handle, payload }).await?;
            Ok(None)
        }
    }

    /// Splits `value` into one share per party, the remainder going to `owner`.
    fn deal<R: Rng + CryptoRng>(
        &self,
        owner: usize,
        value: i128,
        rng: &mut R,
    ) -> Result<Vec<i128>, ValidationError> {
        let mut shares = split_values(value, self.ring, self.parties, rng)?;
        if let Some(remainder) = shares.pop() {
            shares.insert(owner, remainder);
        }
        Ok(shares)
    }

    /// The indices of all other parties, in ascending order.
    fn others(&self) -> impl Iterator<Item = usize> + use<> {
        let p_own = self.p_own;
        (0..self.parties).filter(move |p| *p != p_own)
    }

    /// The entries of `v` belonging to all other parties, in ascending order.
    fn others_of<'a, T: Copy>(&self, v: &'a [T]) -> impl Iterator<Item = T> + use<'a, T> {
        let p_own = self.p_own;
        v.iter()
            .enumerate()
            .filter(move |(p, _)| *p != p_own)
            .map(|(_, t)| *t)
    }

    async fn recv<T: DeserializeOwned>(
        &self,
        channel: &mut impl Channel,
        party: usize,
        phase: &str,
        handle: Handle,
    ) -> Result<T, Error> {
        let Msg { handle: actual, payload } = recv_from::<Msg<T>>(channel, party, phase).await?;
        if actual != handle {
            return Err(Error::UnexpectedHandle {
                expected: handle,
                actual,
            });
        }
        Ok(payload)
    }

    fn next_handle(&mut self) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn local(&self, value: i128) -> LocalShare {
        LocalShare {
            value,
            ring: self.ring,
            session: self.id,
        }
    }

    fn check_party(&self, party: usize) -> Result<(), Error> {
        if party < self.parties {
            Ok(())
        } else {
            Err(Error::PartyDoesNotExist {
                party,
                parties: self.parties,
            })
        }
    }

    fn check_share(&self, x: &LocalShare) -> Result<(), MismatchError> {
        if x.ring != self.ring {
            return Err(MismatchError::Rings {
                left: self.ring,
                right: x.ring,
            });
        }
        if x.session != self.id {
            // a share of another session may be held by different parties
            return Err(MismatchError::OwnerSets);
        }
        Ok(())
    }
}
