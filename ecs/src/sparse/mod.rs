//! Sparse-dense containers keyed by entity.
//!
//! This module provides the [`SparseSet`] and its value-carrying sibling
//! [`SparseMap`], the per-component storage behind the registry.
//!
//! # Architecture
//!
//! Both containers pair two structures:
//!
//! - a *sparse* page table indexed by entity index, where each occupied entry
//!   records the key's dense position (index half) and the key's version
//!   (version half),
//! - a *packed* array of keys in insertion order, plus, for the map, a
//!   parallel array of values.
//!
//! Lookup, insert, and erase are O(1); erase compacts the packed storage by
//! moving the last element into the vacated position (swap-and-pop), so
//! dense positions are not stable across erase. Pages are allocated lazily
//! the first time an insert touches them and kept for the container's
//! lifetime.
//!
//! Iteration runs in *reverse* dense order (most recently inserted first).
//! That direction makes removing the element currently being visited safe:
//! swap-and-pop moves an already-visited element into the vacated slot, so a
//! downward scan never skips or revisits a member. [`SparseSet::retain`] and
//! [`SparseMap::retain`] package that pattern.

mod map;

pub use map::SparseMap;

use crate::entity::Entity;

/// Number of entries per sparse page.
pub const PAGE_SIZE: usize = 1024;

/// A lazily allocated page of sparse entries.
type Page = Box<[Entity; PAGE_SIZE]>;

/// Split an entity index into page and offset coordinates.
#[inline]
fn page_of(index: u32) -> (usize, usize) {
    (index as usize / PAGE_SIZE, index as usize % PAGE_SIZE)
}

/// A set of entities with O(1) insert, erase, and membership.
///
/// Membership checks compare versions, so a stale handle whose index was
/// reinserted under a newer version is reported as absent.
#[derive(Default)]
pub struct SparseSet {
    /// Page table mapping entity index to dense position and version.
    pages: Vec<Option<Page>>,

    /// The member keys, packed contiguously in insertion order.
    packed: Vec<Entity>,
}

impl SparseSet {
    /// Construct an empty set.
    #[inline]
    pub const fn new() -> Self {
        Self {
            pages: Vec::new(),
            packed: Vec::new(),
        }
    }

    /// Construct an empty set with packed capacity for `capacity` members.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pages: Vec::new(),
            packed: Vec::with_capacity(capacity),
        }
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.packed.len()
    }

    /// Whether the set has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    /// Packed capacity before reallocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.packed.capacity()
    }

    /// Ensure packed capacity for at least `capacity` members.
    pub fn reserve(&mut self, capacity: usize) {
        self.packed
            .reserve(capacity.saturating_sub(self.packed.len()));
    }

    /// The sparse entry for `entity`'s index, if its page exists.
    #[inline]
    fn sparse_entry(&self, entity: Entity) -> Option<Entity> {
        let (page, offset) = page_of(entity.index());
        self.pages.get(page)?.as_ref().map(|page| page[offset])
    }

    /// Mutable access to the sparse entry of an index whose page is known to
    /// exist.
    ///
    /// # Panics
    /// If the page was never allocated; internal callers only use this for
    /// indices already tracked by the set.
    #[inline]
    fn sparse_entry_mut(&mut self, index: u32) -> &mut Entity {
        let (page, offset) = page_of(index);
        let page = self.pages[page]
            .as_mut()
            .expect("sparse page missing for resident key");
        &mut page[offset]
    }

    /// Sparse entry for `index`, allocating its page (and any intermediate
    /// page slots) on first touch.
    fn assure(&mut self, index: u32) -> &mut Entity {
        let (page, offset) = page_of(index);
        if page >= self.pages.len() {
            self.pages.resize_with(page + 1, || None);
        }
        let page = self.pages[page].get_or_insert_with(|| Box::new([Entity::NULL; PAGE_SIZE]));
        &mut page[offset]
    }

    /// Whether `entity` is a member, version included.
    pub fn contains(&self, entity: Entity) -> bool {
        match self.sparse_entry(entity) {
            Some(entry) => entry != Entity::NULL && entry.version() == entity.version(),
            None => false,
        }
    }

    /// Dense position of `entity`, or `None` if absent. Positions are not
    /// stable across [`SparseSet::remove`].
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.sparse_entry(entity)
            .filter(|entry| *entry != Entity::NULL && entry.version() == entity.version())
            .map(|entry| entry.index() as usize)
    }

    /// Member at dense position `index`, or `None` if out of range.
    #[inline]
    pub fn at(&self, index: usize) -> Option<Entity> {
        self.packed.get(index).copied()
    }

    /// The packed members, in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[Entity] {
        &self.packed
    }

    /// Insert `entity` into the set.
    ///
    /// The caller must not insert a key that is already a member; debug
    /// builds assert.
    pub fn insert(&mut self, entity: Entity) {
        debug_assert!(!self.contains(entity), "{entity:?} already in sparse set");

        let position = self.packed.len() as u32;
        *self.assure(entity.index()) = Entity::new(position, entity.version());
        self.packed.push(entity);
    }

    /// Remove `entity` from the set via swap-and-pop.
    ///
    /// Returns whether the entity was a member; removing an absent key is a
    /// no-op.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(position) = self.index_of(entity) else {
            return false;
        };

        let last = self.packed.len() - 1;
        self.packed.swap_remove(position);
        if position != last {
            // The former tail moved into the hole; repoint its sparse entry
            // while keeping its version.
            let moved = self.packed[position];
            *self.sparse_entry_mut(moved.index()) = Entity::new(position as u32, moved.version());
        }
        *self.sparse_entry_mut(entity.index()) = Entity::NULL;
        true
    }

    /// Remove every member. Pages stay allocated.
    pub fn clear(&mut self) {
        for page in self.pages.iter_mut().flatten() {
            page.fill(Entity::NULL);
        }
        self.packed.clear();
    }

    /// Iterate the members in reverse dense order (last inserted first).
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Entity> + '_ {
        self.packed.iter().rev().copied()
    }

    /// Keep only the members for which `keep` returns true.
    ///
    /// Scans in reverse dense order so swap-and-pop never skips a member.
    pub fn retain(&mut self, mut keep: impl FnMut(Entity) -> bool) {
        let mut position = self.packed.len();
        while position > 0 {
            position -= 1;
            let entity = self.packed[position];
            if !keep(entity) {
                self.remove(entity);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity::new(index, 0)
    }

    #[test]
    fn insert_and_contains() {
        // Given
        let mut set = SparseSet::new();
        let e0 = entity(0);
        let e1 = entity(1);

        // When
        set.insert(e0);
        set.insert(e1);

        // Then
        assert!(set.contains(e0));
        assert!(set.contains(e1));
        assert!(!set.contains(entity(2)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn contains_checks_version() {
        // Given
        let mut set = SparseSet::new();
        set.insert(Entity::new(4, 1));

        // Then - same index, different generation is absent
        assert!(set.contains(Entity::new(4, 1)));
        assert!(!set.contains(Entity::new(4, 0)));
        assert!(!set.contains(Entity::new(4, 2)));
    }

    #[test]
    fn sparse_dense_round_trip() {
        // Given
        let mut set = SparseSet::new();
        let entities: Vec<_> = (0..20).map(|i| Entity::new(i * 3, i)).collect();
        for e in &entities {
            set.insert(*e);
        }

        // Then - packed[index_of(k)] == k for every member
        for e in &entities {
            let position = set.index_of(*e).unwrap();
            assert_eq!(set.at(position), Some(*e));
        }
    }

    #[test]
    fn remove_swaps_and_pops() {
        // Given
        let mut set = SparseSet::new();
        let e0 = entity(0);
        let e1 = entity(1);
        let e2 = entity(2);
        set.insert(e0);
        set.insert(e1);
        set.insert(e2);

        // When
        assert!(set.remove(e1));

        // Then - survivors keep their identity; the tail filled the hole
        assert!(set.contains(e0));
        assert!(!set.contains(e1));
        assert!(set.contains(e2));
        assert_eq!(set.len(), 2);
        assert_eq!(set.index_of(e2), Some(1));
        assert_eq!(set.at(1), Some(e2));
    }

    #[test]
    fn remove_absent_is_noop() {
        // Given
        let mut set = SparseSet::new();
        set.insert(entity(0));

        // When
        let removed = set.remove(entity(9));

        // Then
        assert!(!removed);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_last_member() {
        // Given
        let mut set = SparseSet::new();
        let e0 = entity(0);
        set.insert(e0);

        // When - removing the only member exercises the position == last path
        assert!(set.remove(e0));

        // Then
        assert!(!set.contains(e0));
        assert!(set.is_empty());
    }

    #[test]
    fn insert_remove_round_trip() {
        // Given
        let mut set = SparseSet::new();
        let keep: Vec<_> = (0..5).map(entity).collect();
        for e in &keep {
            set.insert(*e);
        }

        // When
        let extra = entity(100);
        set.insert(extra);
        set.remove(extra);

        // Then - prior size and key set restored
        assert_eq!(set.len(), keep.len());
        for e in &keep {
            assert!(set.contains(*e));
        }
    }

    #[test]
    #[should_panic(expected = "already in sparse set")]
    fn duplicate_insert_asserts() {
        let mut set = SparseSet::new();
        set.insert(entity(1));
        set.insert(entity(1));
    }

    #[test]
    fn page_boundaries() {
        // Given
        let mut set = SparseSet::new();
        let boundary = PAGE_SIZE as u32;

        // When - keys straddling and skipping pages
        set.insert(entity(boundary - 1));
        set.insert(entity(boundary));
        set.insert(entity(2 * boundary));

        // Then
        assert!(set.contains(entity(boundary - 1)));
        assert!(set.contains(entity(boundary)));
        assert!(set.contains(entity(2 * boundary)));
        assert_eq!(set.pages.len(), 3);

        // And - only touched pages are allocated
        assert!(set.pages[0].is_some());
        assert!(set.pages[1].is_some());
        assert!(set.pages[2].is_some());
        set.insert(entity(4 * boundary));
        assert!(set.pages[3].is_none());
    }

    #[test]
    fn clear_keeps_pages() {
        // Given
        let mut set = SparseSet::new();
        set.insert(entity(0));
        set.insert(entity(PAGE_SIZE as u32));
        let pages = set.pages.len();

        // When
        set.clear();

        // Then
        assert!(set.is_empty());
        assert!(!set.contains(entity(0)));
        assert_eq!(set.pages.len(), pages);
        assert!(set.pages[0].is_some());

        // And - clear is idempotent
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn iteration_is_reverse_dense() {
        // Given
        let mut set = SparseSet::new();
        for i in 0..4 {
            set.insert(entity(i));
        }

        // When
        let seen: Vec<_> = set.iter().collect();

        // Then - last inserted first
        assert_eq!(seen, vec![entity(3), entity(2), entity(1), entity(0)]);
    }

    #[test]
    fn retain_drops_while_iterating() {
        // Given
        let mut set = SparseSet::new();
        for i in 0..10 {
            set.insert(entity(i));
        }

        // When
        set.retain(|e| e.index() % 2 == 0);

        // Then - every survivor matches, every drop is gone
        assert_eq!(set.len(), 5);
        for i in 0..10 {
            assert_eq!(set.contains(entity(i)), i % 2 == 0);
        }
    }

    #[test]
    fn with_capacity_reserves_packed() {
        // Given
        let set = SparseSet::with_capacity(64);

        // Then
        assert!(set.capacity() >= 64);
        assert!(set.is_empty());
    }
}
