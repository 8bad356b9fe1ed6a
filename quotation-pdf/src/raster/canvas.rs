//! Scaled painting onto an RGB bitmap.
//!
//! Callers work in logical pixels; each logical pixel covers a
//! `scale × scale` block of the output image. Anything outside the image is
//! clipped.

use ::image::imageops::{self, FilterType};
use ::image::{DynamicImage, Rgb, RgbImage, Rgba};

use super::font::{FontBook, FontSize};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub size: FontSize,
    /// Integer magnification on top of the font cell.
    pub mult: u32,
}

impl TextStyle {
    pub const SMALL: TextStyle = TextStyle { size: FontSize::Small, mult: 1 };
    pub const BODY: TextStyle = TextStyle { size: FontSize::Body, mult: 1 };
    pub const HEADING: TextStyle = TextStyle { size: FontSize::Heading, mult: 1 };
    pub const TITLE: TextStyle = TextStyle { size: FontSize::Heading, mult: 2 };

    pub fn char_width(self) -> u32 {
        self.size.cell().0 * self.mult
    }

    pub fn line_height(self) -> u32 {
        self.size.cell().1 * self.mult
    }

    pub fn text_width(self, text: &str) -> u32 {
        text.chars().count() as u32 * self.char_width()
    }
}

pub struct Canvas {
    image: RgbImage,
    scale: u32,
}

impl Canvas {
    /// A white canvas of exactly `width_px × height_px` output pixels.
    pub fn new(width_px: u32, height_px: u32, scale: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width_px, height_px, WHITE),
            scale: scale.max(1),
        }
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Fill a rectangle given in logical pixels.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let s = self.scale;
        self.fill_px(x * s, y * s, w * s, h * s, color);
    }

    fn fill_px(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let x_end = x.saturating_add(w).min(self.image.width());
        let y_end = y.saturating_add(h).min(self.image.height());
        for py in y.min(y_end)..y_end {
            for px in x.min(x_end)..x_end {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    /// Draw a single line of text with its top-left corner at `(x, y)`.
    pub fn draw_text(
        &mut self,
        fonts: &FontBook,
        x: u32,
        y: u32,
        text: &str,
        style: TextStyle,
        color: Rgb<u8>,
    ) {
        let block = self.scale * style.mult;
        let mut cursor_x = x * self.scale;
        let top = y * self.scale;
        for ch in text.chars() {
            let glyph = fonts.glyph(style.size, ch);
            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    if glyph.is_set(gx, gy) {
                        self.fill_px(cursor_x + gx * block, top + gy * block, block, block, color);
                    }
                }
            }
            cursor_x += glyph.width * block;
        }
    }

    /// Paste an image scaled to fit a `size × size` logical box, centered.
    pub fn draw_image(&mut self, source: &RgbImage, x: u32, y: u32, size: u32) {
        let (src_w, src_h) = source.dimensions();
        if src_w == 0 || src_h == 0 {
            return;
        }
        let box_px = size * self.scale;
        let aspect_ratio = src_w as f32 / src_h as f32;
        let (w, h) = if aspect_ratio >= 1.0 {
            (box_px, ((box_px as f32 / aspect_ratio).round() as u32).max(1))
        } else {
            (((box_px as f32 * aspect_ratio).round() as u32).max(1), box_px)
        };
        let resized = imageops::resize(source, w, h, FilterType::Lanczos3);
        let left = x * self.scale + (box_px - w) / 2;
        let top = y * self.scale + (box_px - h) / 2;
        for (px, py, pixel) in resized.enumerate_pixels() {
            let (dx, dy) = (left + px, top + py);
            if dx < self.image.width() && dy < self.image.height() {
                self.image.put_pixel(dx, dy, *pixel);
            }
        }
    }

    /// Rounded square with centered initials, used when no logo is given.
    pub fn draw_monogram(
        &mut self,
        fonts: &FontBook,
        x: u32,
        y: u32,
        size: u32,
        initials: &str,
        fill: Rgb<u8>,
        ink: Rgb<u8>,
    ) {
        let radius = size / 6;
        for row in 0..size {
            for col in 0..size {
                if inside_rounded_square(col, row, size, radius) {
                    self.fill_rect(x + col, y + row, 1, 1, fill);
                }
            }
        }
        let style = TextStyle::HEADING;
        let text_x = x + size.saturating_sub(style.text_width(initials)) / 2;
        let text_y = y + size.saturating_sub(style.line_height()) / 2;
        self.draw_text(fonts, text_x, text_y, initials, style, ink);
    }
}

fn inside_rounded_square(col: u32, row: u32, size: u32, radius: u32) -> bool {
    let cx = if col < radius {
        radius
    } else if col >= size - radius {
        size - radius - 1
    } else {
        return true;
    };
    let cy = if row < radius {
        radius
    } else if row >= size - radius {
        size - radius - 1
    } else {
        return true;
    };
    let dx = col.abs_diff(cx);
    let dy = row.abs_diff(cy);
    dx * dx + dy * dy <= radius * radius
}

/// Flatten a logo with transparency onto white.
pub fn composite_on_white(logo: &DynamicImage) -> RgbImage {
    let rgba_image = logo.to_rgba8();
    let (width_px, height_px) = rgba_image.dimensions();

    let mut rgb_image = RgbImage::new(width_px, height_px);
    for (x, y, pixel) in rgba_image.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *pixel;
        let alpha = a as f32 / 255.0;
        let bg = 255.0;
        let out_r = (r as f32 * alpha + bg * (1.0 - alpha)) as u8;
        let out_g = (g as f32 * alpha + bg * (1.0 - alpha)) as u8;
        let out_b = (b as f32 * alpha + bg * (1.0 - alpha)) as u8;
        rgb_image.put_pixel(x, y, Rgb([out_r, out_g, out_b]));
    }
    rgb_image
}
