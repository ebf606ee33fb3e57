#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

// Hash maps with `std`, ordered maps on `no_std` + `alloc`.
#[cfg(feature = "std")]
pub(crate) type Map<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type Map<K, V> = BTreeMap<K, V>;

#[cfg(feature = "std")]
pub(crate) type Set<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
pub(crate) type Set<K> = BTreeSet<K>;
