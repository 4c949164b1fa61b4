//! Provide hash containers, re-exports *hashbrown* and *foldhash*.
//!
//! Every container here hashes through [`FixedHashState`], so hash values
//! are stable across runs and processes.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x2F6B_D1A4_0C93_E857);

/// A hasher whose output only depends on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Hash state with a fixed seed, based on `foldhash`.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use hb_utils::hash::FixedHashState;
///
/// let hash = |v: &str| {
///     let mut hasher = FixedHashState.build_hasher();
///     v.hash(&mut hasher);
///     hasher.finish()
/// };
///
/// assert_eq!(hash("Health"), hash("Health"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// Containers

/// A [`hashbrown::HashMap`] using [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`].
pub type HashSet<T> = hashbrown::HashSet<T, FixedHashState>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

#[cfg(test)]
mod tests {
    use super::{HashMap, HashSet};
    use alloc::string::{String, ToString};

    #[test]
    fn borrowed_lookup() {
        let mut map: HashMap<String, u32> = HashMap::default();
        map.insert("Speed".to_string(), 3);

        assert_eq!(map.get("Speed"), Some(&3));
        assert!(map.get("speed").is_none());
    }

    #[test]
    fn set_dedup() {
        let set: HashSet<&str> = ["UObject", "AActor", "UObject"].into_iter().collect();

        assert_eq!(set.len(), 2);
        assert!(set.contains("AActor"));
    }
}
