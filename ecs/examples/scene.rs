//! A miniature scene walk shaped like the renderer's per-frame passes:
//! find the active camera, gather draw data through a view, compose
//! transforms across the parent chain, and refresh object ids while
//! preserving the ones that survived the rebuild.

use ember_ecs::{Entity, Registry};
use ember_macros::Component;

#[derive(Component, Clone, Debug)]
struct Transform {
    position: [f32; 3],
}

#[derive(Component, Clone, Debug)]
struct Renderable {
    mesh: &'static str,
    object_id: u32,
}

#[derive(Component, Clone, Debug)]
struct Camera {
    fov: f32,
}

/// Parent link for ancestor walks. Hierarchy is itself a component; the
/// registry knows nothing about it.
#[derive(Component, Clone, Copy, Debug)]
struct Parent(Entity);

/// Compose an entity's translation with every ancestor that carries one.
fn world_position(registry: &Registry, entity: Entity) -> [f32; 3] {
    let mut position = registry.get::<Transform>(entity).position;
    let mut current = entity;
    while let Some(parent) = registry.try_get::<Parent>(current) {
        current = parent.0;
        if let Some(transform) = registry.try_get::<Transform>(current) {
            for axis in 0..3 {
                position[axis] += transform.position[axis];
            }
        }
    }
    position
}

fn main() {
    let mut registry = Registry::new();

    // A root node the props hang off.
    let root = registry.acquire_entity();
    registry.assign(root, Transform { position: [0.0, 1.0, 0.0] });
    registry.set_name(root, "root");

    let camera = registry.acquire_entity();
    registry.assign(camera, Transform { position: [0.0, 2.0, -10.0] });
    registry.assign(camera, Camera { fov: 60.0 });
    registry.set_name(camera, "main-camera");

    for index in 0..8u32 {
        let prop = registry.acquire_entity();
        registry.assign(prop, Transform { position: [index as f32, 0.0, 0.0] });
        registry.assign(prop, Renderable { mesh: "cube", object_id: index });
        registry.assign(prop, Parent(root));
    }

    // Locate the active camera the way the forward pass does.
    let (camera_entity, fov) = registry
        .view::<(&Camera, &Transform)>()
        .map(|(entity, (camera, _))| (entity, camera.fov))
        .next()
        .expect("scene has a camera");
    println!(
        "camera {} at {:?} (fov {fov})",
        registry.name(camera_entity).unwrap_or("<unnamed>"),
        world_position(&registry, camera_entity),
    );

    // Gather draw data.
    let mut draws = Vec::new();
    for (entity, (renderable, _)) in registry.view::<(&Renderable, &Transform)>() {
        draws.push((entity, renderable.mesh, world_position(&registry, entity)));
    }
    println!("gathered {} draws", draws.len());
    for (entity, mesh, position) in &draws {
        println!("  {entity:?}: {mesh} at {position:?}");
    }

    // Nudge every prop sideways for the next frame.
    registry
        .view_mut::<(&Parent, &mut Transform)>()
        .for_each(|_, (_, transform)| {
            transform.position[0] += 0.25;
        });

    // Rebuild object ids, preserving the id of anything still renderable.
    let candidates: Vec<Entity> = registry.view::<&Transform>().map(|(entity, _)| entity).collect();
    let mut next_object_id = 1000;
    for entity in candidates {
        let object_id = match registry.try_get::<Renderable>(entity) {
            Some(existing) => existing.object_id,
            None => {
                next_object_id += 1;
                next_object_id
            }
        };
        registry.assign_or_replace(entity, Renderable { mesh: "cube", object_id });
    }
    println!(
        "{} renderables after rebuild",
        registry.view::<&Renderable>().count()
    );

    // Tear the scene down; components cascade with each release.
    let all: Vec<Entity> = registry.entities().iter().collect();
    for entity in all {
        registry.release_entity(entity);
    }
    println!("released everything, {} entities remain", registry.entity_count());
}
