//! Scene primitives
//!
//! A [`SpriteNode`] is a renderable rectangular image positioned within a
//! 2D scene. Nodes and widgets expose themselves to a host scene through
//! the [`Drawable`] trait.

use std::sync::Arc;

use crate::atlas::Texture;
use crate::surface::Surface;

/// Anything that can draw itself into a [`Surface`]
pub trait Drawable {
    /// Render this element
    fn draw(&self, surface: &mut Surface);
}

/// A textured rectangle in a 2D scene.
///
/// The horizontal `crop` fraction limits how much of the sprite is drawn,
/// measured from the left edge; the progress bar's fill layer is a sprite
/// with a moving crop.
pub struct SpriteNode {
    texture: Arc<Texture>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    crop: f32,
}

impl SpriteNode {
    /// Create a node at the origin
    pub fn new(texture: Arc<Texture>, width: f32, height: f32) -> Self {
        Self {
            texture,
            x: 0.0,
            y: 0.0,
            width,
            height,
            crop: 1.0,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn set_texture(&mut self, texture: Arc<Texture>) {
        self.texture = texture;
    }

    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    /// Set the visible fraction, clamped to [0, 1]. NaN hides the sprite.
    pub fn set_crop(&mut self, crop: f32) {
        self.crop = if crop.is_finite() { crop.clamp(0.0, 1.0) } else { 0.0 };
    }

    pub fn crop(&self) -> f32 {
        self.crop
    }
}

impl Drawable for SpriteNode {
    fn draw(&self, surface: &mut Surface) {
        surface.blit_cropped(&self.texture, self.x, self.y, self.width, self.height, self.crop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_node(width: f32, height: f32) -> SpriteNode {
        SpriteNode::new(Arc::new(Texture::solid(2, 2, [255, 0, 0, 255])), width, height)
    }

    #[test]
    fn test_crop_is_clamped() {
        let mut node = red_node(4.0, 1.0);
        node.set_crop(-0.5);
        assert_eq!(node.crop(), 0.0);
        node.set_crop(1.5);
        assert_eq!(node.crop(), 1.0);
        node.set_crop(f32::NAN);
        assert_eq!(node.crop(), 0.0);
    }

    #[test]
    fn test_draw_respects_position() {
        let mut node = red_node(2.0, 1.0);
        node.set_position(2.0, 0.0);

        let mut surface = Surface::new(4, 1);
        node.draw(&mut surface);

        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(2, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(3, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_zero_crop_draws_nothing() {
        let mut node = red_node(2.0, 1.0);
        node.set_crop(0.0);

        let mut surface = Surface::new(2, 1);
        node.draw(&mut surface);
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
