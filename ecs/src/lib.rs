//! The entity-component storage core of the ember rendering engine.
//!
//! This crate owns the data structures a frame is built from: generational
//! entity handles, the chunked store that recycles them, per-component
//! sparse-dense maps, and the registry that joins them into multi-component
//! views. Rendering, windowing, and device code live elsewhere and consume
//! this crate through the [`Registry`] API.
//!
//! # Architecture
//!
//! - **[`entity`]**: the 64-bit generational [`Entity`] handle and the
//!   chunked, bitmap-tracked [`EntityStore`] that allocates and validates it.
//! - **[`sparse`]**: the page-indexed [`SparseSet`] and [`SparseMap`], the
//!   O(1) per-component storage with swap-and-pop compaction.
//! - **[`registry`]**: the [`Registry`] of type-erased component stores,
//!   entity lifecycles, debug names, and [`View`]/[`ViewMut`] joins.
//! - **[`string`]**: the [`SmallString`] container used by component
//!   payloads and debug names.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_ecs::Registry;
//! use ember_macros::Component;
//!
//! #[derive(Component, Clone)]
//! struct Transform { position: [f32; 3] }
//!
//! #[derive(Component, Clone)]
//! struct Renderable { object_id: u32 }
//!
//! let mut registry = Registry::new();
//! let entity = registry.acquire_entity();
//! registry.assign(entity, Transform { position: [0.0; 3] });
//! registry.assign(entity, Renderable { object_id: 7 });
//!
//! for (entity, (transform, renderable)) in registry.view::<(&Transform, &Renderable)>() {
//!     // gather draw data
//! }
//! ```

// Allow the derive macro's emitted `::ember_ecs::...` paths to resolve when
// the derive is used inside this crate's own tests and examples.
extern crate self as ember_ecs;

pub mod entity;
pub mod registry;
pub mod sparse;
pub mod string;
pub(crate) mod util;

pub use entity::{Entity, EntityStore};
pub use registry::{Component, ComponentId, Registry, View, ViewMut};
pub use sparse::{SparseMap, SparseSet};
pub use string::SmallString;
