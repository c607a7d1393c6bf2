//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const RED: [f32; 4] = [0.9, 0.1, 0.1, 1.0];
    pub const YELLOW: [f32; 4] = [1.0, 0.9, 0.1, 1.0];
    pub const GOLD: [f32; 4] = [0.85, 0.7, 0.0, 1.0];
    pub const ORANGE: [f32; 4] = [1.0, 0.55, 0.0, 1.0];
    pub const SKIN: [f32; 4] = [1.0, 0.78, 0.6, 1.0];
    pub const GRAY: [f32; 4] = [0.6, 0.6, 0.6, 1.0];

    pub const PLAYER_FIRE: [f32; 4] = [0.95, 0.95, 0.95, 1.0];
    pub const OVERALLS: [f32; 4] = [0.1, 0.3, 0.85, 1.0];

    pub const GRASS: [f32; 4] = [0.2, 0.7, 0.2, 1.0];
    pub const GRASS_DARK: [f32; 4] = [0.1, 0.45, 0.1, 1.0];
    pub const DIRT: [f32; 4] = [0.55, 0.27, 0.07, 1.0];
    pub const BRICK: [f32; 4] = [0.6, 0.3, 0.0, 1.0];
    pub const BRICK_MORTAR: [f32; 4] = [0.4, 0.4, 0.4, 1.0];

    pub const GOOMBA: [f32; 4] = [0.55, 0.27, 0.07, 1.0];
    pub const GOOMBA_DARK: [f32; 4] = [0.4, 0.16, 0.0, 1.0];
    pub const KOOPA: [f32; 4] = [0.0, 0.75, 0.0, 1.0];
    pub const KOOPA_SHELL: [f32; 4] = [0.0, 0.4, 0.0, 1.0];

    pub const KAMEK: [f32; 4] = [0.78, 0.0, 0.78, 1.0];
    pub const KAMEK_HAT: [f32; 4] = [0.59, 0.0, 0.59, 1.0];
    pub const BOO: [f32; 4] = [0.97, 0.97, 1.0, 1.0];
    pub const WIGGLER: [f32; 4] = [1.0, 0.8, 0.0, 1.0];
    pub const DRY_BONES: [f32; 4] = [0.82, 0.82, 0.78, 1.0];

    pub const MAGIC: [f32; 4] = [0.78, 0.78, 1.0, 1.0];

    pub const INTRO_BLUE: [f32; 4] = [0.0, 0.47, 1.0, 1.0];

    /// Full-screen dimming behind terminal overlays
    pub const DIM: [f32; 4] = [0.0, 0.0, 0.0, 0.55];
}
