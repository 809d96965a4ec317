//! Hash container aliases shared by the registries.
//!
//! All maps in this crate hash with [`foldhash`]'s fixed-seed state, so the
//! iteration characteristics of a registry do not change from run to run
//! within one build.

use foldhash::fast::FixedState;

/// Seed for every fixed-state hasher in the crate.
const HASH_SEED: u64 = 0x5265666c65637421;

/// A [`hashbrown::HashMap`] with a fixed [`foldhash`] state.
pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, FixedState>;

/// A [`hashbrown::HashSet`] with a fixed [`foldhash`] state.
pub(crate) type HashSet<K> = hashbrown::HashSet<K, FixedState>;

/// Creates an empty [`HashMap`].
#[inline]
pub(crate) const fn new_map<K, V>() -> HashMap<K, V> {
    HashMap::with_hasher(FixedState::with_seed(HASH_SEED))
}

/// Creates an empty [`HashSet`].
#[inline]
pub(crate) const fn new_set<K>() -> HashSet<K> {
    HashSet::with_hasher(FixedState::with_seed(HASH_SEED))
}
