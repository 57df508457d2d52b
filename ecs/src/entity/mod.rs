//! Entity handles for the ECS (Entity Component System).
//!
//! This module provides the 64-bit generational entity handle and the chunked
//! store that allocates, recycles, and validates it. Entities are lightweight
//! handles that tie together components; everything else in the crate is
//! keyed by them.
//!
//! # Bit layout
//!
//! An [`Entity`] is a single `u64` partitioned into two halves:
//!
//! - **low 32 bits**: the *index*, a dense position in the identifier space,
//! - **high 32 bits**: the *version*, a generation counter for that index.
//!
//! The layout is part of the public contract: hashing an entity hashes the
//! raw bits, and [`Entity::to_bits`]/[`Entity::from_bits`] round-trip them.
//! Only the pure functions in this module interpret the halves.
//!
//! # Generation tracking
//!
//! When a slot in the [`EntityStore`] is released, the version that will be
//! issued on the next allocation of that slot is advanced. Any handle to the
//! released entity keeps the old version, so [`EntityStore::is_valid`]
//! rejects it forever after:
//!
//! ```rust,ignore
//! let entity = store.acquire();   // index 0, version 0
//! store.release(entity);
//! let reused = store.acquire();   // index 0, version 1
//! assert!(!store.is_valid(entity));
//! ```
//!
//! The all-ones version is reserved: it belongs to the [`Entity::NULL`]
//! sentinel and [`Entity::next_version`] skips over it, so a live entity can
//! never compare equal to null.

mod store;

pub use store::{
    BLOCKS_PER_CHUNK, ENTITIES_PER_BLOCK, ENTITIES_PER_CHUNK, EntityStore, Iter as EntityIter,
};

use std::fmt;

/// Mask covering the index half of an entity handle.
pub const ENTITY_MASK: u64 = 0xFFFF_FFFF;

/// Mask covering the version half of an entity handle (before shifting).
pub const VERSION_MASK: u64 = 0xFFFF_FFFF;

/// Bit offset of the version half within the packed handle.
const VERSION_SHIFT: u32 = 32;

/// A generational entity handle.
///
/// The handle is `Copy` and trivially comparable; holding one confers no
/// ownership. Whether it still refers to a live entity is answered by the
/// store that issued it via [`EntityStore::is_valid`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity(u64);

impl Entity {
    /// The null entity: all-ones in both halves. Never issued as a live
    /// handle.
    pub const NULL: Entity = Entity(ENTITY_MASK | (VERSION_MASK << VERSION_SHIFT));

    /// The tombstone entity. Shares the null entity's value; kept as a
    /// distinct constant so call sites can state which sentinel they mean.
    pub const TOMBSTONE: Entity = Entity::NULL;

    /// Pack an index and a version into a handle. Each half is masked to 32
    /// bits.
    #[inline]
    pub const fn new(index: u32, version: u32) -> Self {
        Entity((index as u64 & ENTITY_MASK) | ((version as u64 & VERSION_MASK) << VERSION_SHIFT))
    }

    /// Reconstruct a handle from its raw bits.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Entity(bits)
    }

    /// Get the raw bits of this handle.
    #[inline]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Get the index half of this handle.
    #[inline]
    pub const fn index(self) -> u32 {
        (self.0 & ENTITY_MASK) as u32
    }

    /// Get the version half of this handle.
    #[inline]
    pub const fn version(self) -> u32 {
        ((self.0 >> VERSION_SHIFT) & VERSION_MASK) as u32
    }

    /// Build a handle from the index half of `lhs` and the version half of
    /// `rhs`. Used to rewrite sparse back-pointers during swap-and-pop.
    #[inline]
    pub const fn combine(lhs: Entity, rhs: Entity) -> Entity {
        Entity((lhs.0 & ENTITY_MASK) | (rhs.0 & (VERSION_MASK << VERSION_SHIFT)))
    }

    /// Get a handle with the same index and the next version.
    ///
    /// If the incremented version would equal the all-ones sentinel version
    /// it is incremented once more (wrapping), so the null value is never
    /// produced for a live slot.
    #[inline]
    pub const fn next_version(self) -> Entity {
        let bumped = self.version().wrapping_add(1);
        let bumped = if bumped == u32::MAX {
            bumped.wrapping_add(1)
        } else {
            bumped
        };
        Entity::new(self.index(), bumped)
    }

    /// Check whether this handle is the null sentinel.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }
}

impl Default for Entity {
    /// The default entity is the null sentinel.
    #[inline]
    fn default() -> Self {
        Entity::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index(), self.version())
        }
    }
}

/// Entities order by index first, then version.
impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Entities order by index first, then version.
impl Ord for Entity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.index().cmp(&other.index()) {
            std::cmp::Ordering::Equal => self.version().cmp(&other.version()),
            ord => ord,
        }
    }
}

#[test]
fn pack_unpack_round_trip() {
    // Given
    let entity = Entity::new(1234, 77);

    // Then
    assert_eq!(entity.index(), 1234);
    assert_eq!(entity.version(), 77);
    assert_eq!(Entity::from_bits(entity.to_bits()), entity);
}

#[test]
fn pack_masks_each_half() {
    // Given - values already at the 32-bit boundary
    let entity = Entity::new(u32::MAX, u32::MAX);

    // Then - nothing bleeds between halves
    assert_eq!(entity.index(), u32::MAX);
    assert_eq!(entity.version(), u32::MAX);
    assert!(entity.is_null());
}

#[test]
fn null_and_tombstone_coincide() {
    // Then - both sentinels are all-ones in both halves
    assert_eq!(Entity::NULL.to_bits(), u64::MAX);
    assert_eq!(Entity::NULL, Entity::TOMBSTONE);
    assert!(Entity::NULL.is_null());
}

#[test]
fn combine_splices_halves() {
    // Given
    let lhs = Entity::new(42, 1);
    let rhs = Entity::new(7, 9);

    // When
    let combined = Entity::combine(lhs, rhs);

    // Then - index from lhs, version from rhs
    assert_eq!(combined.index(), 42);
    assert_eq!(combined.version(), 9);
}

#[test]
fn next_version_increments() {
    // Given
    let entity = Entity::new(3, 0);

    // Then
    assert_eq!(entity.next_version(), Entity::new(3, 1));
    assert_eq!(entity.next_version().next_version(), Entity::new(3, 2));
}

#[test]
fn next_version_skips_sentinel() {
    // Given - one short of the all-ones version
    let entity = Entity::new(0, u32::MAX - 1);

    // When
    let next = entity.next_version();

    // Then - the sentinel version is skipped, wrapping to zero
    assert_eq!(next.version(), 0);
    assert_ne!(next, Entity::NULL);

    // And - an ordinary bump is untouched
    assert_eq!(Entity::new(0, 5).next_version().version(), 6);
}

#[test]
fn ordering_is_index_major() {
    // Given
    let a = Entity::new(1, 5);
    let b = Entity::new(2, 0);
    let a_next = Entity::new(1, 6);

    // Then
    assert!(a < b);
    assert!(a < a_next);
    assert!(a_next < b);
}
