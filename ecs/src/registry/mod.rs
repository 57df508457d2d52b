//! The registry: entity lifecycles plus one component store per type.
//!
//! A [`Registry`] owns the [`EntityStore`] that issues identifiers and an
//! indexable collection of type-erased component stores, one
//! [`SparseMap`] per component type, indexed by the type's process-unique
//! [`ComponentId`]. It is the primary API surface of the crate.
//!
//! # Architecture
//!
//! - **[`Component`]**: the trait all component types implement, usually via
//!   `#[derive(Component)]`.
//! - **[`ComponentId`]**: dense process-unique type ids, assigned on first
//!   use.
//! - **[`ErasedStore`]**: the object-safe face of a component store, giving
//!   the registry erase/duplicate/reserve without knowing the value type.
//! - **[`Registry`]**: assign / has / get / remove per entity, plus
//!   multi-component [`views`](crate::registry::View).
//!
//! # Concurrency
//!
//! The registry is single-writer: all mutation and iteration must be
//! serialised by the caller. There is no internal locking; only the type-id
//! table (shared by every registry in the process) is thread-safe.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_ecs::Registry;
//! use ember_macros::Component;
//!
//! #[derive(Component, Clone)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut registry = Registry::new();
//! let entity = registry.acquire_entity();
//! registry.assign(entity, Position { x: 0.0, y: 0.0 });
//! assert!(registry.has::<Position>(entity));
//! registry.release_entity(entity);
//! ```

mod types;
mod view;

pub use types::{ComponentId, component_id};
pub use view::{ComponentQuery, ComponentQueryMut, View, ViewMut};

use std::any::Any;
use std::collections::HashMap;

use log::{trace, warn};

use crate::entity::{Entity, EntityStore};
use crate::sparse::SparseMap;
use crate::string::SmallString;

/// A trait representing a component in the ECS (Entity Component System).
///
/// Implemented for concrete types with `#[derive(Component)]`, which also
/// makes the type duplicatable by cloning unless the derive is annotated
/// with `#[component(no_duplicate)]`.
pub trait Component: Send + Sync + 'static {
    /// Produce the copy stored on the target entity when the registry
    /// duplicates an entity holding this component.
    ///
    /// Returning `None` excludes the component from duplication; that is the
    /// default for hand-written implementations, while the derive generates
    /// a clone unless opted out.
    fn duplicate(&self) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

/// The operations a component store exposes without its value type.
///
/// Implemented by [`SparseMap<T>`] for every component type `T`; the
/// registry holds these behind `Box<dyn ErasedStore>` and downcasts through
/// [`ErasedStore::as_any`] on the value-typed paths.
pub trait ErasedStore {
    /// Number of entities with this component.
    fn len(&self) -> usize;

    /// Packed capacity of the store.
    fn capacity(&self) -> usize;

    /// Whether `entity` has this component.
    fn contains(&self, entity: Entity) -> bool;

    /// Drop the component for `entity`; no-op when absent.
    fn erase(&mut self, entity: Entity);

    /// Ensure capacity for at least `capacity` components.
    fn reserve(&mut self, capacity: usize);

    /// Copy the component from `src` to `dst` if `src` has it and the type
    /// duplicates itself; no-op otherwise.
    fn duplicate(&mut self, src: Entity, dst: Entity);

    /// Checked downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Checked downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for SparseMap<T> {
    fn len(&self) -> usize {
        SparseMap::len(self)
    }

    fn capacity(&self) -> usize {
        SparseMap::capacity(self)
    }

    fn contains(&self, entity: Entity) -> bool {
        SparseMap::contains(self, entity)
    }

    fn erase(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn reserve(&mut self, capacity: usize) {
        SparseMap::reserve(self, capacity);
    }

    fn duplicate(&mut self, src: Entity, dst: Entity) {
        if let Some(copy) = self.get(src).and_then(|value| value.duplicate()) {
            self.insert_or_replace(dst, copy);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The central container tying entities to their components.
#[derive(Default)]
pub struct Registry {
    /// Source of entity identifiers.
    entities: EntityStore,

    /// One erased component store per [`ComponentId`]; `None` until a type
    /// is first assigned in this registry.
    stores: Vec<Option<Box<dyn ErasedStore>>>,

    /// Optional debug names.
    names: HashMap<Entity, SmallString>,
}

impl Registry {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self {
            entities: EntityStore::new(),
            stores: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Allocate a new entity.
    #[inline]
    pub fn acquire_entity(&mut self) -> Entity {
        self.entities.acquire()
    }

    /// Release an entity, erasing it from every component store first and
    /// dropping its debug name.
    ///
    /// Releasing a handle that is not live is a caller error: debug builds
    /// assert, release builds warn and ignore the call.
    pub fn release_entity(&mut self, entity: Entity) {
        debug_assert!(
            self.entities.is_valid(entity),
            "released {entity:?} which is not live"
        );
        if !self.entities.is_valid(entity) {
            warn!("released {entity:?} which is not live; ignoring");
            return;
        }

        // Components go first so no store ever holds a reclaimed slot.
        for store in self.stores.iter_mut().flatten() {
            store.erase(entity);
        }
        self.names.remove(&entity);
        self.entities.release(entity);
    }

    /// Whether `entity` is live.
    #[inline]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.entities.is_valid(entity)
    }

    /// Number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// The underlying entity store.
    #[inline]
    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Ensure capacity for at least `capacity` entities in the entity store
    /// and every existing component store.
    pub fn reserve(&mut self, capacity: usize) {
        for store in self.stores.iter_mut().flatten() {
            store.reserve(capacity);
        }
        self.entities.reserve(capacity);
    }

    /// Attach a component to `entity`.
    ///
    /// The entity must be live and must not already have a component of this
    /// type; debug builds assert both.
    pub fn assign<T: Component>(&mut self, entity: Entity, value: T) {
        debug_assert!(
            self.entities.is_valid(entity),
            "assigned component to {entity:?} which is not live"
        );
        self.assure_store::<T>().insert(entity, value);
    }

    /// Attach a component to `entity`, replacing any existing value of the
    /// same type. Returns the stored value.
    pub fn assign_or_replace<T: Component>(&mut self, entity: Entity, value: T) -> &mut T {
        debug_assert!(
            self.entities.is_valid(entity),
            "assigned component to {entity:?} which is not live"
        );
        self.assure_store::<T>().insert_or_replace(entity, value)
    }

    /// Whether `entity` has a component of type `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.store::<T>()
            .is_some_and(|store| store.contains(entity))
    }

    /// Whether `entity` has every component named by the query, e.g.
    /// `registry.has_all::<(&Transform, &Velocity)>(entity)`.
    pub fn has_all<Q: ComponentQuery>(&self, entity: Entity) -> bool {
        Q::contains(self, entity)
    }

    /// The component of type `T` on `entity`.
    ///
    /// # Panics
    /// If the entity does not have the component; use
    /// [`Registry::try_get`] for the recoverable form.
    pub fn get<T: Component>(&self, entity: Entity) -> &T {
        match self.store::<T>().and_then(|store| store.get(entity)) {
            Some(value) => value,
            None => panic!(
                "{entity:?} does not have component {}",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Mutable access to the component of type `T` on `entity`.
    ///
    /// # Panics
    /// If the entity does not have the component.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        match self.store_mut::<T>().and_then(|store| store.get_mut(entity)) {
            Some(value) => value,
            None => panic!(
                "{entity:?} does not have component {}",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Every component named by the query, e.g.
    /// `registry.get_all::<(&Transform, &Velocity)>(entity)`.
    ///
    /// # Panics
    /// If any requested component is absent.
    pub fn get_all<Q: ComponentQuery>(&self, entity: Entity) -> Q::Item<'_> {
        Q::fetch(self, entity)
    }

    /// The component of type `T` on `entity`, or `None` if absent.
    pub fn try_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store::<T>()?.get(entity)
    }

    /// Mutable access to the component of type `T`, or `None` if absent.
    pub fn try_get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.store_mut::<T>()?.get_mut(entity)
    }

    /// Every component named by the query, each entry `None` when absent.
    pub fn try_get_all<Q: ComponentQuery>(&self, entity: Entity) -> Q::TryItem<'_> {
        Q::try_fetch(self, entity)
    }

    /// Detach and return the component of type `T` from `entity`; no-op
    /// returning `None` when absent.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.store_mut::<T>()?.remove(entity)
    }

    /// Allocate a new entity carrying copies of every duplicatable component
    /// on `src`.
    pub fn duplicate(&mut self, src: Entity) -> Entity {
        debug_assert!(
            self.entities.is_valid(src),
            "duplicated {src:?} which is not live"
        );
        let duplicate = self.entities.acquire();
        for store in self.stores.iter_mut().flatten() {
            store.duplicate(src, duplicate);
        }
        duplicate
    }

    /// The debug name of `entity`, if one was set.
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.names.get(&entity).map(SmallString::as_str)
    }

    /// Set the debug name of `entity`.
    pub fn set_name(&mut self, entity: Entity, name: impl Into<SmallString>) {
        debug_assert!(
            self.entities.is_valid(entity),
            "named {entity:?} which is not live"
        );
        self.names.insert(entity, name.into());
    }

    /// A read-only view over every entity possessing all components named by
    /// the query, in ascending index order. See [`View`].
    pub fn view<Q: ComponentQuery>(&self) -> View<'_, Q> {
        View::new(self)
    }

    /// An exclusive view handing out mutable component references. See
    /// [`ViewMut`].
    ///
    /// # Panics
    /// If the query requests the same component type mutably more than once.
    pub fn view_mut<Q: ComponentQueryMut>(&mut self) -> ViewMut<'_, Q> {
        ViewMut::new(self)
    }

    /// The store for `T`, if this registry ever assigned one.
    fn store<T: Component>(&self) -> Option<&SparseMap<T>> {
        let id = component_id::<T>();
        self.stores
            .get(id.index())?
            .as_ref()?
            .as_any()
            .downcast_ref::<SparseMap<T>>()
    }

    /// Mutable access to the store for `T`, if this registry ever assigned
    /// one.
    fn store_mut<T: Component>(&mut self) -> Option<&mut SparseMap<T>> {
        let id = component_id::<T>();
        self.stores
            .get_mut(id.index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<SparseMap<T>>()
    }

    /// The store for `T`, constructing it on first use.
    fn assure_store<T: Component>(&mut self) -> &mut SparseMap<T> {
        let id = component_id::<T>();
        if id.index() >= self.stores.len() {
            self.stores.resize_with(id.index() + 1, || None);
        }
        let slot = &mut self.stores[id.index()];
        if slot.is_none() {
            trace!(
                "creating component store for {}",
                std::any::type_name::<T>()
            );
            *slot = Some(Box::new(SparseMap::<T>::new()));
        }
        slot.as_mut()
            .and_then(|store| store.as_any_mut().downcast_mut::<SparseMap<T>>())
            .expect("component store type does not match its id")
    }
}
