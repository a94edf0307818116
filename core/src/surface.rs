//! CPU render surface
//!
//! A [`Surface`] owns an RGBA pixel buffer and provides the drawing
//! primitives the widget layer needs: clears, rectangle fills and scaled
//! texture blits. All drawing is total; degenerate inputs draw nothing.

use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, PixmapMut, Rect, Stroke, Transform,
};

use crate::atlas::Texture;

/// An RGBA8 pixel buffer with drawing primitives
pub struct Surface {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Surface {
    /// Create a transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; (width as usize) * (height as usize) * 4],
            width,
            height,
        }
    }

    /// Surface width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data (width * height * 4 bytes)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Clear the whole surface with a color
    pub fn clear(&mut self, color: Color) {
        if let Some(mut pixmap) = PixmapMut::from_bytes(&mut self.data, self.width, self.height) {
            pixmap.fill(color);
        }
    }

    /// Draw a filled rectangle
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let Some(mut pixmap) = PixmapMut::from_bytes(&mut self.data, self.width, self.height)
        else {
            return;
        };

        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Draw a filled rounded rectangle
    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        let Some(mut pixmap) = PixmapMut::from_bytes(&mut self.data, self.width, self.height)
        else {
            return;
        };

        let Some(path) = rounded_rect_path(x, y, w, h, radius) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Draw a rounded rectangle outline
    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        stroke_width: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(&mut self.data, self.width, self.height)
        else {
            return;
        };

        let Some(path) = rounded_rect_path(x, y, w, h, radius) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };

        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Draw a texture scaled to `w` x `h` at `(x, y)`
    pub fn blit(&mut self, texture: &Texture, x: f32, y: f32, w: f32, h: f32) {
        self.blit_cropped(texture, x, y, w, h, 1.0);
    }

    /// Draw the left `crop` fraction of a texture.
    ///
    /// Both the source region and the destination width are limited to the
    /// fraction, so the texture is cropped rather than squashed. Sampling
    /// is nearest-neighbour; pixels are alpha-blended over the surface.
    pub fn blit_cropped(&mut self, texture: &Texture, x: f32, y: f32, w: f32, h: f32, crop: f32) {
        let crop = if crop.is_finite() { crop.clamp(0.0, 1.0) } else { 0.0 };
        if texture.width == 0 || texture.height == 0 || w <= 0.0 || h <= 0.0 || crop <= 0.0 {
            return;
        }

        let dest_w = (w * crop).round() as i32;
        let dest_h = h.round() as i32;
        let origin_x = x.round() as i32;
        let origin_y = y.round() as i32;
        let surface_w = self.width as i32;
        let surface_h = self.height as i32;

        for dy in 0..dest_h {
            let py = origin_y + dy;
            if py < 0 || py >= surface_h {
                continue;
            }

            let src_y = (((dy as f32 + 0.5) / h) * texture.height as f32) as u32;
            let src_y = src_y.min(texture.height - 1);

            for dx in 0..dest_w {
                let px = origin_x + dx;
                if px < 0 || px >= surface_w {
                    continue;
                }

                let src_x = (((dx as f32 + 0.5) / w) * texture.width as f32) as u32;
                let src_x = src_x.min(texture.width - 1);

                let src_idx = ((src_y * texture.width + src_x) * 4) as usize;
                if src_idx + 3 >= texture.rgba.len() {
                    continue;
                }

                let src_a = texture.rgba[src_idx + 3] as u32;
                if src_a == 0 {
                    continue;
                }

                let dest_idx = ((py as u32 * self.width + px as u32) * 4) as usize;
                if dest_idx + 3 >= self.data.len() {
                    continue;
                }

                // Alpha blend the texture pixel onto the surface
                let inv_a = 255 - src_a;
                for channel in 0..3 {
                    let src = texture.rgba[src_idx + channel] as u32;
                    let dst = self.data[dest_idx + channel] as u32;
                    self.data[dest_idx + channel] = ((src * src_a + dst * inv_a) / 255) as u8;
                }
                self.data[dest_idx + 3] =
                    (src_a + (self.data[dest_idx + 3] as u32 * inv_a) / 255) as u8;
            }
        }
    }

    /// Read back a single pixel as RGBA (for tests and probing)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }
}

/// Create a rounded rectangle path
fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<tiny_skia::Path> {
    let r = r.min(w / 2.0).min(h / 2.0);

    let mut pb = PathBuilder::new();

    pb.move_to(x + r, y);

    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);

    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);

    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);

    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);

    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_fills_every_pixel() {
        let mut surface = Surface::new(2, 2);
        surface.clear(Color::from_rgba8(10, 20, 30, 255));
        assert_eq!(surface.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(surface.pixel(1, 1), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_blit_covers_destination() {
        let texture = Texture::solid(4, 4, [255, 0, 0, 255]);
        let mut surface = Surface::new(8, 2);
        surface.blit(&texture, 0.0, 0.0, 8.0, 2.0);
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(7, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_cropped_blit_covers_left_fraction_only() {
        let texture = Texture::solid(4, 1, [0, 0, 255, 255]);
        let mut surface = Surface::new(4, 1);
        surface.blit_cropped(&texture, 0.0, 0.0, 4.0, 1.0, 0.5);
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(2, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(3, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_blit_clips_to_surface() {
        let texture = Texture::solid(4, 4, [255, 255, 255, 255]);
        let mut surface = Surface::new(2, 2);
        // Partially and fully out of bounds; neither may panic
        surface.blit(&texture, -1.0, -1.0, 4.0, 4.0);
        surface.blit(&texture, 10.0, 10.0, 4.0, 4.0);
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_degenerate_draws_are_noops() {
        let texture = Texture::solid(0, 0, [255, 255, 255, 255]);
        let mut surface = Surface::new(2, 2);
        surface.blit(&texture, 0.0, 0.0, 2.0, 2.0);
        surface.fill_rect(0.0, 0.0, -1.0, 2.0, Color::from_rgba8(255, 0, 0, 255));
        let mut empty = Surface::new(0, 0);
        empty.clear(Color::from_rgba8(255, 0, 0, 255));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_rounded_rect_fills_center() {
        let mut surface = Surface::new(10, 10);
        surface.fill_rounded_rect(0.0, 0.0, 10.0, 10.0, 3.0, Color::from_rgba8(0, 255, 0, 255));
        let center = surface.pixel(5, 5).unwrap();
        assert_eq!(center[3], 255);
        assert_eq!(center[1], 255);
    }
}
