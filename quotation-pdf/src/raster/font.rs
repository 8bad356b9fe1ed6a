//! Bitmap glyphs for the document rasterizer.
//!
//! Glyphs come from the Spleen bitmap font family. Every glyph the rasterizer
//! may need is decoded once when the [`FontBook`] is loaded, so rendering never
//! starts with a font that failed to parse.

use std::collections::HashMap;

use spleen_font::{PSF2Font, FONT_12X24, FONT_6X12, FONT_8X16};

use crate::error::QuoteError;

/// Characters decoded up front beyond printable ASCII and Latin-1.
const EXTRA_CHARS: &[char] = &[
    '₹', '€', '£', '¥', '–', '—', '‘', '’', '“', '”', '•', '…', '©', '·',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSize {
    Small,
    Body,
    Heading,
}

impl FontSize {
    pub const ALL: [FontSize; 3] = [FontSize::Small, FontSize::Body, FontSize::Heading];

    /// Glyph cell size in logical pixels.
    pub fn cell(self) -> (u32, u32) {
        match self {
            FontSize::Small => (6, 12),
            FontSize::Body => (8, 16),
            FontSize::Heading => (12, 24),
        }
    }

    fn data(self) -> &'static [u8] {
        match self {
            FontSize::Small => FONT_6X12,
            FontSize::Body => FONT_8X16,
            FontSize::Heading => FONT_12X24,
        }
    }
}

/// A glyph bitmap, one byte per pixel: 1 is ink, 0 is paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    pub bits: Vec<u8>,
}

impl Glyph {
    fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![0; (width * height) as usize],
        }
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize] != 0
    }

    fn ink(&self) -> usize {
        self.bits.iter().filter(|&&b| b != 0).count()
    }
}

/// Decoded glyphs for every font size.
#[derive(Debug, Clone)]
pub struct FontBook {
    glyphs: HashMap<(FontSize, char), Glyph>,
    missing: HashMap<FontSize, Glyph>,
}

impl FontBook {
    pub fn load() -> Result<Self, QuoteError> {
        let mut glyphs = HashMap::new();
        let mut missing = HashMap::new();

        for size in FontSize::ALL {
            let (w, h) = size.cell();
            let mut font = PSF2Font::new(size.data()).map_err(|_| {
                QuoteError::FontError(format!("Spleen {}x{} is not a valid PSF2 font", w, h))
            })?;

            let chars = (' '..='~')
                .chain('\u{A0}'..='\u{FF}')
                .chain(EXTRA_CHARS.iter().copied());
            for ch in chars {
                let glyph = decode_glyph(&mut font, ch, w, h)
                    .filter(|g| g.ink() > 0 || ch.is_whitespace())
                    .or_else(|| fallback_glyph(ch, w, h));
                if let Some(glyph) = glyph {
                    glyphs.insert((size, ch), glyph);
                }
            }

            let probe = glyphs.get(&(size, 'A')).map(Glyph::ink).unwrap_or(0);
            if probe == 0 {
                return Err(QuoteError::FontError(format!(
                    "Spleen {}x{} has no glyph for 'A'",
                    w, h
                )));
            }
            missing.insert(size, box_glyph(w, h));
        }

        Ok(Self { glyphs, missing })
    }

    /// Glyph for `ch`, or an outlined box when the font cannot draw it.
    pub fn glyph(&self, size: FontSize, ch: char) -> &Glyph {
        self.glyphs
            .get(&(size, ch))
            .or_else(|| self.missing.get(&size))
            .unwrap_or_else(|| unreachable!("every font size has a missing-glyph box"))
    }
}

fn decode_glyph(font: &mut PSF2Font, ch: char, w: u32, h: u32) -> Option<Glyph> {
    let utf8 = ch.to_string();
    let rows = font.glyph_for_utf8(utf8.as_bytes())?;
    let mut glyph = Glyph::blank(w, h);
    for (row_y, row) in rows.enumerate() {
        for (col_x, on) in row.enumerate() {
            let (x, y) = (col_x as u32, row_y as u32);
            if on && x < w && y < h {
                glyph.bits[(y * w + x) as usize] = 1;
            }
        }
    }
    Some(glyph)
}

fn box_glyph(w: u32, h: u32) -> Glyph {
    let mut glyph = Glyph::blank(w, h);
    fill_rect(&mut glyph, 1, 1, w - 1, 2);
    fill_rect(&mut glyph, 1, h - 2, w - 1, h - 1);
    fill_rect(&mut glyph, 1, 1, 2, h - 1);
    fill_rect(&mut glyph, w - 2, 1, w - 1, h - 1);
    glyph
}

/// Fill `[x1, x2) × [y1, y2)`, clamped to the glyph.
fn fill_rect(g: &mut Glyph, x1: u32, y1: u32, x2: u32, y2: u32) {
    for y in y1..y2.min(g.height) {
        for x in x1..x2.min(g.width) {
            g.bits[(y * g.width + x) as usize] = 1;
        }
    }
}

/// Procedurally drawn glyphs for characters Spleen does not cover.
fn fallback_glyph(ch: char, w: u32, h: u32) -> Option<Glyph> {
    let mut g = Glyph::blank(w, h);
    let stroke = (w / 6).max(1);
    let left = w / 6;
    let right = w - w / 6;

    match ch {
        // ₹ two bars, a bowl closing at mid height, a leg to the baseline
        '\u{20B9}' => {
            let top = h / 4;
            let second = top + h / 8;
            let mid = top + h / 4;
            let bottom = h - h / 6;

            fill_rect(&mut g, left, top, right, top + stroke);
            fill_rect(&mut g, left, second, right, second + stroke);
            fill_rect(&mut g, right - stroke, top, right, mid);
            fill_rect(&mut g, left, mid, right, mid + stroke);

            let span = bottom.saturating_sub(mid + stroke).max(1);
            for dy in 0..span {
                let y = mid + stroke + dy;
                let x = left + stroke + (right - left - stroke) * dy / span;
                fill_rect(&mut g, x, y, x + stroke + 1, y + 1);
            }
        }
        // • centered dot
        '\u{2022}' => {
            let cx = w / 2;
            let cy = h / 2;
            let r = (w / 4).max(1);
            fill_rect(&mut g, cx - r, cy - r, cx + r, cy + r);
        }
        // – — dashes
        '\u{2013}' | '\u{2014}' => {
            let (x1, x2) = if ch == '\u{2014}' { (0, w) } else { (left, right) };
            let y = h / 2;
            fill_rect(&mut g, x1, y, x2, y + stroke);
        }
        _ => return None,
    }

    Some(g)
}
