//! Renderer collaborators
//!
//! Tiles only need two things from a renderer: turn an RGBA buffer into
//! something drawable, and draw either that texture or a flat color at a
//! screen position. Two backends are provided:
//!
//! - [`QuadRenderer`]: macroquad textures and rectangles (GPU, main thread)
//! - [`Framebuffer`]: a software RGBA target, used headless and in tests

mod framebuffer;
mod quad;

pub use framebuffer::{Framebuffer, FramebufferTexture};
pub use quad::QuadRenderer;

use crate::geometry::{Point, Rect};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Drawing capabilities a tile needs
///
/// All calls happen on the thread that owns the rendering surface.
pub trait TileRenderer {
    type Texture;

    /// Upload a square RGBA buffer of `size * size` pixels
    fn upload(&mut self, rgba: &[u8], size: u32) -> Self::Texture;

    /// Draw a texture with its top-left corner at `dest` (screen space)
    fn draw_texture(&mut self, texture: &Self::Texture, dest: Point);

    /// Fill a screen-space rectangle with a flat color
    fn fill_rect(&mut self, dest: Rect, color: Rgba);
}
