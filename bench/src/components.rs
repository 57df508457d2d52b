//! Common component types used across benchmarks.
//!
//! These components are representative of real render-scene components in
//! terms of size and access patterns.

use ember_macros::Component;

/// 3D position component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 3D velocity component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 4x4 transformation matrix (64 bytes).
#[derive(Component, Clone, Copy, Debug)]
pub struct Transform {
    pub matrix: [[f32; 4]; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

/// Per-object draw data (8 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Renderable {
    pub object_id: u32,
    pub mesh_id: u32,
}
