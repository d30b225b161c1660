//! macroquad backend
//!
//! Must only be used after the macroquad window exists; texture creation
//! talks to the GL context directly.

use macroquad::prelude::{draw_rectangle, draw_texture, Color, FilterMode, Texture2D, WHITE};

use super::{Rgba, TileRenderer};
use crate::geometry::{Point, Rect};

/// Draws tiles straight to the macroquad screen
#[derive(Debug, Default)]
pub struct QuadRenderer {
    uploads: usize,
}

impl QuadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of textures created so far
    pub fn uploads(&self) -> usize {
        self.uploads
    }
}

impl TileRenderer for QuadRenderer {
    type Texture = Texture2D;

    fn upload(&mut self, rgba: &[u8], size: u32) -> Texture2D {
        let texture = Texture2D::from_rgba8(size as u16, size as u16, rgba);
        // Pixel art: no smoothing when the camera lands between pixels
        texture.set_filter(FilterMode::Nearest);
        self.uploads += 1;
        texture
    }

    fn draw_texture(&mut self, texture: &Texture2D, dest: Point) {
        draw_texture(texture, dest.x as f32, dest.y as f32, WHITE);
    }

    fn fill_rect(&mut self, dest: Rect, color: Rgba) {
        draw_rectangle(
            dest.x as f32,
            dest.y as f32,
            dest.w as f32,
            dest.h as f32,
            Color::from_rgba(color.r, color.g, color.b, color.a),
        );
    }
}
