//! Software render target
//!
//! Tiles are blitted into an RGBA byte buffer that can be read back pixel
//! by pixel. Used for headless runs and tests.

use super::{Rgba, TileRenderer};
use crate::geometry::{Point, Rect};

/// A texture owned by the software renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferTexture {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub size: usize,
}

pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub width: usize,
    pub height: usize,
    uploads: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
            uploads: 0,
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Number of textures uploaded since creation
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let idx = (y * self.width + x) * 4;
        Rgba::from_bytes([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    /// Part of `dest` that lands on the buffer
    fn clip(&self, dest: Rect) -> Option<Rect> {
        dest.intersection(&Rect::new(0, 0, self.width as i32, self.height as i32))
    }

    /// Source-over blend of one pixel
    fn put(&mut self, x: i32, y: i32, src: [u8; 4]) {
        let idx = (y as usize * self.width + x as usize) * 4;
        let dst = &mut self.pixels[idx..idx + 4];
        match src[3] {
            255 => dst.copy_from_slice(&src),
            0 => {}
            a => {
                let a = a as u16;
                for c in 0..3 {
                    dst[c] = ((src[c] as u16 * a + dst[c] as u16 * (255 - a)) / 255) as u8;
                }
                dst[3] = dst[3].max(src[3]);
            }
        }
    }
}

impl TileRenderer for Framebuffer {
    type Texture = FramebufferTexture;

    fn upload(&mut self, rgba: &[u8], size: u32) -> FramebufferTexture {
        self.uploads += 1;
        FramebufferTexture {
            pixels: rgba.to_vec(),
            size: size as usize,
        }
    }

    fn draw_texture(&mut self, texture: &FramebufferTexture, dest: Point) {
        let size = texture.size as i32;
        let Some(visible) = self.clip(Rect::new(dest.x, dest.y, size, size)) else {
            return;
        };
        for y in visible.y..visible.bottom() {
            let ty = (y - dest.y) as usize;
            for x in visible.x..visible.right() {
                let tx = (x - dest.x) as usize;
                let idx = (ty * texture.size + tx) * 4;
                let src = [
                    texture.pixels[idx],
                    texture.pixels[idx + 1],
                    texture.pixels[idx + 2],
                    texture.pixels[idx + 3],
                ];
                self.put(x, y, src);
            }
        }
    }

    fn fill_rect(&mut self, dest: Rect, color: Rgba) {
        let Some(visible) = self.clip(dest) else {
            return;
        };
        let bytes = color.to_bytes();
        for y in visible.y..visible.bottom() {
            for x in visible.x..visible.right() {
                self.put(x, y, bytes);
            }
        }
    }
}
