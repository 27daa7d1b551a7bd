//! The machines that take part in a computation.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{self, AtomicU64},
    },
};

use crate::ring::Ring;

static NEXT_PARTY_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies a party uniquely within the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartyId(u64);

/// An object a party holds, as recorded in its ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEntry {
    /// A value known in the clear to the party.
    Private {
        /// The private value.
        value: i128,
    },
    /// A share of a value that is secret-shared among several parties.
    Share {
        /// The value of the share.
        value: i128,
        /// The ring the share belongs to.
        ring: Ring,
    },
}

/// A participant in a computation (a "machine").
///
/// Parties are compared and hashed by identity: two parties created separately are always
/// different, even if they carry the same name. Clones refer to the same party.
#[derive(Clone)]
pub struct Party(Arc<Inner>);

struct Inner {
    id: PartyId,
    name: String,
    ledger: Mutex<Vec<LedgerEntry>>,
}

impl Party {
    /// Creates a new party with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        let id = PartyId(NEXT_PARTY_ID.fetch_add(1, atomic::Ordering::Relaxed));
        Party(Arc::new(Inner {
            id,
            name: name.into(),
            ledger: Mutex::new(vec![]),
        }))
    }

    /// The identity of the party.
    pub fn id(&self) -> PartyId {
        self.0.id
    }

    /// The display name of the party, which is not required to be unique.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Records an object held by this party.
    ///
    /// The ledger is only used for inspection, none of the protocols depend on it.
    pub fn register(&self, entry: LedgerEntry) {
        self.0
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// A snapshot of all objects recorded for this party so far, oldest first.
    pub fn ledger(&self) -> Vec<LedgerEntry> {
        self.0
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PartialEq for Party {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Party {}

impl PartialOrd for Party {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Party {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl Hash for Party {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Party")
            .field("id", &self.0.id.0)
            .field("name", &self.0.name)
            .finish()
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (#{})", self.0.name, self.0.id.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{LedgerEntry, Party};
    use crate::ring::Ring;

    #[test]
    fn identity_is_not_the_name() {
        let a = Party::new("alice");
        let impostor = Party::new("alice");
        assert_ne!(a, impostor);
        assert_eq!(a, a.clone());

        let owners: HashSet<Party> = [a.clone(), impostor.clone(), a.clone()].into();
        assert_eq!(owners.len(), 2);
    }

    #[test]
    fn ledger_is_shared_between_clones() {
        let a = Party::new("alice");
        let handle = a.clone();
        a.register(LedgerEntry::Private { value: 5 });
        handle.register(LedgerEntry::Share {
            value: 7,
            ring: Ring::default(),
        });
        assert_eq!(
            a.ledger(),
            vec![
                LedgerEntry::Private { value: 5 },
                LedgerEntry::Share {
                    value: 7,
                    ring: Ring::default()
                }
            ]
        );
    }
}
