//! Process-unique identifiers for component types.
//!
//! Every component type is mapped to a dense [`ComponentId`] the first time
//! any registry operation is instantiated with it. The mapping is global to
//! the process, so every [`Registry`](crate::registry::Registry) indexes its
//! stores with the same ids, and an id is never reused for a different type.
//!
//! Lookups are lock-free via a sharded concurrent map; registration takes a
//! per-key lock exactly once per type.

use std::any::TypeId;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;

use crate::registry::Component;

/// A dense, process-unique identifier for a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Construct a ComponentId from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this id for use in indexable storage (e.g. Vec).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The global type-to-id table.
struct TypeIdRegistry {
    /// Map from Rust TypeId to our dense id.
    ids: DashMap<TypeId, ComponentId>,

    /// Next id to hand out.
    next: AtomicU32,
}

fn registry() -> &'static TypeIdRegistry {
    static REGISTRY: OnceLock<TypeIdRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| TypeIdRegistry {
        ids: DashMap::new(),
        next: AtomicU32::new(0),
    })
}

/// Get the id for component type `T`, assigning the next free id on first
/// use.
pub fn component_id<T: Component>() -> ComponentId {
    let registry = registry();
    if let Some(id) = registry.ids.get(&TypeId::of::<T>()) {
        return *id;
    }
    // The entry lock guarantees a single id per type even under racing
    // first-use registration from multiple threads.
    *registry
        .ids
        .entry(TypeId::of::<T>())
        .or_insert_with(|| ComponentId::new(registry.next.fetch_add(1, Ordering::Relaxed)))
}
