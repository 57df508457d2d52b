//! Multi-component views over the registry.
//!
//! A view walks the entity store's live entities in ascending index order
//! and yields only those possessing every component named by its query. A
//! query is a component reference or a tuple of them:
//!
//! ```rust,ignore
//! // Read-only: a lazy iterator of (Entity, (&Transform, &Renderable)).
//! for (entity, (transform, renderable)) in registry.view::<(&Transform, &Renderable)>() {
//!     draw(entity, transform, renderable);
//! }
//!
//! // Exclusive: mutable references, visited through a closure.
//! registry.view_mut::<(&Velocity, &mut Transform)>().for_each(|_, (velocity, transform)| {
//!     transform.position[0] += velocity.dx;
//! });
//! ```
//!
//! Views do not pivot on the smallest store; they probe membership per
//! requested type while walking entity slots, so the yield order is always
//! entity-index ascending. Mutating the registry while a view is alive is
//! rejected by the borrow checker; component *values* of visited entities
//! may be mutated freely through [`ViewMut`].

use std::any::TypeId;
use std::marker::PhantomData;

use crate::all_tuples;
use crate::entity::Entity;
use crate::registry::{Component, Registry};

/// A read-only query over one or more component types.
///
/// Implemented for `&T` where `T: Component` and for tuples of queries.
pub trait ComponentQuery {
    /// What [`fetch`](ComponentQuery::fetch) produces: `&T`, or a tuple of
    /// per-element items.
    type Item<'r>;

    /// What [`try_fetch`](ComponentQuery::try_fetch) produces: each element
    /// wrapped in `Option`.
    type TryItem<'r>;

    /// Whether `entity` has every component named by the query.
    fn contains(registry: &Registry, entity: Entity) -> bool;

    /// Fetch the references. Panics when a component is absent.
    fn fetch<'r>(registry: &'r Registry, entity: Entity) -> Self::Item<'r>;

    /// Fetch the references, `None` per absent component.
    fn try_fetch<'r>(registry: &'r Registry, entity: Entity) -> Self::TryItem<'r>;
}

impl<'q, T: Component> ComponentQuery for &'q T {
    type Item<'r> = &'r T;
    type TryItem<'r> = Option<&'r T>;

    fn contains(registry: &Registry, entity: Entity) -> bool {
        registry.has::<T>(entity)
    }

    fn fetch<'r>(registry: &'r Registry, entity: Entity) -> &'r T {
        registry.get::<T>(entity)
    }

    fn try_fetch<'r>(registry: &'r Registry, entity: Entity) -> Option<&'r T> {
        registry.try_get::<T>(entity)
    }
}

macro_rules! impl_component_query {
    ($($name:ident),*) => {
        impl<$($name: ComponentQuery),*> ComponentQuery for ($($name,)*) {
            type Item<'r> = ($($name::Item<'r>,)*);
            type TryItem<'r> = ($($name::TryItem<'r>,)*);

            fn contains(registry: &Registry, entity: Entity) -> bool {
                $($name::contains(registry, entity))&&*
            }

            fn fetch<'r>(registry: &'r Registry, entity: Entity) -> Self::Item<'r> {
                ($($name::fetch(registry, entity),)*)
            }

            fn try_fetch<'r>(registry: &'r Registry, entity: Entity) -> Self::TryItem<'r> {
                ($($name::try_fetch(registry, entity),)*)
            }
        }
    }
}

all_tuples!(impl_component_query);

/// A query for exclusive views: `&T` reads, `&mut T` writes, tuples mix.
pub trait ComponentQueryMut {
    /// What [`fetch_mut`](ComponentQueryMut::fetch_mut) produces.
    type Item<'r>;

    /// Whether `entity` has every component named by the query.
    fn contains(registry: &Registry, entity: Entity) -> bool;

    /// Report each element's component type and write flag, for the
    /// aliasing check at view construction.
    fn for_each_access<Visitor: FnMut(TypeId, &'static str, bool)>(visit: &mut Visitor);

    /// Fetch the references for `entity`.
    ///
    /// # Safety
    /// - `registry` must point at a registry the caller exclusively borrows
    ///   for at least `'r`.
    /// - The query must have passed the aliasing check, so no component type
    ///   is fetched mutably twice.
    /// - The caller must not fetch the same entity again while any returned
    ///   reference is alive.
    unsafe fn fetch_mut<'r>(registry: *mut Registry, entity: Entity) -> Self::Item<'r>;
}

impl<'q, T: Component> ComponentQueryMut for &'q T {
    type Item<'r> = &'r T;

    fn contains(registry: &Registry, entity: Entity) -> bool {
        registry.has::<T>(entity)
    }

    fn for_each_access<Visitor: FnMut(TypeId, &'static str, bool)>(visit: &mut Visitor) {
        visit(TypeId::of::<T>(), std::any::type_name::<T>(), false);
    }

    unsafe fn fetch_mut<'r>(registry: *mut Registry, entity: Entity) -> &'r T {
        // Safety: caller upholds the trait contract; shared access to a
        // store never fetched mutably cannot alias a handed-out reference.
        unsafe { (*registry).get::<T>(entity) }
    }
}

impl<'q, T: Component> ComponentQueryMut for &'q mut T {
    type Item<'r> = &'r mut T;

    fn contains(registry: &Registry, entity: Entity) -> bool {
        registry.has::<T>(entity)
    }

    fn for_each_access<Visitor: FnMut(TypeId, &'static str, bool)>(visit: &mut Visitor) {
        visit(TypeId::of::<T>(), std::any::type_name::<T>(), true);
    }

    unsafe fn fetch_mut<'r>(registry: *mut Registry, entity: Entity) -> &'r mut T {
        // Safety: caller upholds the trait contract; the aliasing check
        // guarantees this is the only mutable fetch of `T`, and distinct
        // component types live in distinct stores.
        unsafe { (*registry).get_mut::<T>(entity) }
    }
}

macro_rules! impl_component_query_mut {
    ($($name:ident),*) => {
        impl<$($name: ComponentQueryMut),*> ComponentQueryMut for ($($name,)*) {
            type Item<'r> = ($($name::Item<'r>,)*);

            fn contains(registry: &Registry, entity: Entity) -> bool {
                $($name::contains(registry, entity))&&*
            }

            fn for_each_access<Visitor: FnMut(TypeId, &'static str, bool)>(visit: &mut Visitor) {
                $($name::for_each_access(visit);)*
            }

            unsafe fn fetch_mut<'r>(registry: *mut Registry, entity: Entity) -> Self::Item<'r> {
                // Safety: forwarded to each element; element stores are
                // pairwise distinct by the aliasing check.
                ($(unsafe { $name::fetch_mut(registry, entity) },)*)
            }
        }
    }
}

all_tuples!(impl_component_query_mut);

/// Panic if the query requests a component type twice with a write.
fn validate_access<Q: ComponentQueryMut>() {
    let mut seen: Vec<(TypeId, &'static str, bool)> = Vec::new();
    Q::for_each_access(&mut |id, name, writes| {
        for (seen_id, seen_name, seen_writes) in &seen {
            assert!(
                !(id == *seen_id && (writes || *seen_writes)),
                "mutable view requests component {seen_name} more than once"
            );
        }
        seen.push((id, name, writes));
    });
}

/// A lazy read-only join iterator. Created by [`Registry::view`].
///
/// Yields `(Entity, Q::Item)` for every live entity possessing all queried
/// components, ascending by entity index.
pub struct View<'r, Q: ComponentQuery> {
    registry: &'r Registry,
    cursor: usize,
    _query: PhantomData<fn() -> Q>,
}

impl<'r, Q: ComponentQuery> View<'r, Q> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            cursor: 0,
            _query: PhantomData,
        }
    }
}

impl<'r, Q: ComponentQuery> Iterator for View<'r, Q> {
    type Item = (Entity, Q::Item<'r>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entity) = self.registry.entities().next_live(self.cursor) {
            self.cursor = entity.index() as usize + 1;
            if Q::contains(self.registry, entity) {
                return Some((entity, Q::fetch(self.registry, entity)));
            }
        }
        None
    }
}

/// An exclusive join traversal handing out mutable component references.
/// Created by [`Registry::view_mut`].
///
/// The traversal is internal ([`ViewMut::for_each`]) so every borrow handed
/// to the closure ends before the next entity is visited; structural
/// registry mutation while visiting is statically impossible.
pub struct ViewMut<'r, Q: ComponentQueryMut> {
    registry: &'r mut Registry,
    _query: PhantomData<fn() -> Q>,
}

impl<'r, Q: ComponentQueryMut> ViewMut<'r, Q> {
    pub(crate) fn new(registry: &'r mut Registry) -> Self {
        validate_access::<Q>();
        Self {
            registry,
            _query: PhantomData,
        }
    }

    /// Visit every live entity possessing all queried components, ascending
    /// by entity index.
    pub fn for_each<F>(self, mut visit: F)
    where
        F: FnMut(Entity, Q::Item<'_>),
    {
        let registry: *mut Registry = self.registry;
        let mut cursor = 0usize;
        loop {
            // Safety: the pointer comes from the exclusive borrow held by
            // the view. Each shared read below ends before the exclusive
            // fetch, the fetched item dies when `visit` returns, and every
            // entity is visited at most once.
            let next = unsafe { (*registry).entities().next_live(cursor) };
            let Some(entity) = next else {
                break;
            };
            cursor = entity.index() as usize + 1;
            if unsafe { Q::contains(&*registry, entity) } {
                let item = unsafe { Q::fetch_mut(registry, entity) };
                visit(entity, item);
            }
        }
    }
}
