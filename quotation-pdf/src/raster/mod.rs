//! Rasterization of the quotation view.
//!
//! [`Rasterizer`] is the seam the export pipeline renders through: given a
//! view, a scale factor and exact pixel dimensions it returns a bitmap of
//! those dimensions on a white background. [`BitmapRasterizer`] is the
//! built-in implementation, painting Spleen bitmap text with the layout from
//! [`layout::layout_document`].

pub mod canvas;
pub mod font;
pub mod layout;

use ::image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::document::DocumentView;
use crate::error::QuoteError;
use canvas::{composite_on_white, Canvas};
use font::FontBook;
use layout::{layout_document, DrawOp, MONOGRAM_GOLD, MONOGRAM_INK};

pub const MIN_SCALE: u32 = 2;
pub const MAX_SCALE: u32 = 5;

/// Scale factor for a display density: twice the ratio, kept within 2..=5.
pub fn scale_for_device_pixel_ratio(device_pixel_ratio: f32) -> u32 {
    let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    ((ratio * 2.0).round() as u32).clamp(MIN_SCALE, MAX_SCALE)
}

/// What the caller wants back from a rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterRequest {
    pub scale: u32,
    pub width_px: u32,
    pub height_px: u32,
}

impl RasterRequest {
    /// Request covering a logical content size at the given scale.
    pub fn for_content(width: u32, height: u32, scale: u32) -> Self {
        Self {
            scale,
            width_px: width * scale,
            height_px: height * scale,
        }
    }
}

pub trait Rasterizer {
    /// Logical `(width, height)` of the view once laid out.
    fn measure(&self, view: &DocumentView) -> (u32, u32);

    /// Render the view into a bitmap of exactly the requested size.
    fn rasterize(
        &self,
        view: &DocumentView,
        request: &RasterRequest,
    ) -> Result<RgbImage, QuoteError>;
}

/// Paints document views with embedded bitmap fonts.
pub struct BitmapRasterizer {
    fonts: FontBook,
    logo: Option<RgbImage>,
}

impl BitmapRasterizer {
    /// Load fonts before anything is rendered.
    pub fn new() -> Result<Self, QuoteError> {
        Ok(Self {
            fonts: FontBook::load()?,
            logo: None,
        })
    }

    pub fn with_logo(mut self, logo: Option<&DynamicImage>) -> Self {
        self.logo = logo.map(composite_on_white);
        self
    }
}

impl Rasterizer for BitmapRasterizer {
    fn measure(&self, view: &DocumentView) -> (u32, u32) {
        let layout = layout_document(view);
        (layout.width, layout.height)
    }

    fn rasterize(
        &self,
        view: &DocumentView,
        request: &RasterRequest,
    ) -> Result<RgbImage, QuoteError> {
        if request.scale == 0 {
            return Err(QuoteError::ImageError("raster scale must be at least 1".to_string()));
        }
        let layout = layout_document(view);
        debug!(
            width_px = request.width_px,
            height_px = request.height_px,
            scale = request.scale,
            ops = layout.ops.len(),
            "Rasterizing quotation"
        );

        let mut canvas = Canvas::new(request.width_px, request.height_px, request.scale);
        for op in &layout.ops {
            match op {
                DrawOp::Rect { x, y, w, h, color } => canvas.fill_rect(*x, *y, *w, *h, *color),
                DrawOp::Text {
                    x,
                    y,
                    text,
                    style,
                    color,
                } => canvas.draw_text(&self.fonts, *x, *y, text, *style, *color),
                DrawOp::Logo { x, y, size } => match &self.logo {
                    Some(logo) => canvas.draw_image(logo, *x, *y, *size),
                    None => canvas.draw_monogram(
                        &self.fonts,
                        *x,
                        *y,
                        *size,
                        &view.business.initials(),
                        MONOGRAM_GOLD,
                        MONOGRAM_INK,
                    ),
                },
            }
        }
        Ok(canvas.into_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusinessIdentity;
    use crate::document::{render_quotation_view, QuoteMeta};
    use crate::quotation::QuotationState;
    use crate::summary::FinancialSummary;
    use ::image::Rgb;

    fn sample_view() -> DocumentView {
        let mut state = QuotationState::new();
        state.add_item("Sofa", "1200", "2").unwrap();
        state.set_client_name("Acme Corp");
        render_quotation_view(
            &state,
            &FinancialSummary::from_state(&state),
            &BusinessIdentity::default(),
            &QuoteMeta::now(),
        )
    }

    #[test]
    fn test_scale_for_device_pixel_ratio() {
        assert_eq!(scale_for_device_pixel_ratio(1.0), 2);
        assert_eq!(scale_for_device_pixel_ratio(0.5), 2);
        assert_eq!(scale_for_device_pixel_ratio(1.5), 3);
        assert_eq!(scale_for_device_pixel_ratio(2.0), 4);
        assert_eq!(scale_for_device_pixel_ratio(3.0), 5);
        assert_eq!(scale_for_device_pixel_ratio(f32::NAN), 2);
        assert_eq!(scale_for_device_pixel_ratio(-1.0), 2);
    }

    #[test]
    fn test_rasterize_returns_requested_size() {
        let rasterizer = BitmapRasterizer::new().unwrap();
        let view = sample_view();
        let (w, h) = rasterizer.measure(&view);
        let request = RasterRequest::for_content(w, h, 2);
        let bitmap = rasterizer.rasterize(&view, &request).unwrap();
        assert_eq!(bitmap.dimensions(), (w * 2, h * 2));
    }

    #[test]
    fn test_rasterize_paints_on_white() {
        let rasterizer = BitmapRasterizer::new().unwrap();
        let view = sample_view();
        let (w, h) = rasterizer.measure(&view);
        let bitmap = rasterizer
            .rasterize(&view, &RasterRequest::for_content(w, h, 2))
            .unwrap();
        let white = Rgb([255, 255, 255]);
        assert_eq!(bitmap.get_pixel(0, 0), &white);
        assert_eq!(bitmap.get_pixel(w * 2 - 1, h * 2 - 1), &white);
        assert!(bitmap.pixels().any(|p| *p != white));
        // monogram fill sits in the logo box
        assert!(bitmap.pixels().any(|p| *p == MONOGRAM_GOLD));
    }

    #[test]
    fn test_logo_replaces_monogram() {
        let logo = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 0, 0])));
        let rasterizer = BitmapRasterizer::new().unwrap().with_logo(Some(&logo));
        let view = sample_view();
        let (w, h) = rasterizer.measure(&view);
        let bitmap = rasterizer
            .rasterize(&view, &RasterRequest::for_content(w, h, 2))
            .unwrap();
        assert!(!bitmap.pixels().any(|p| *p == MONOGRAM_GOLD));
        let Rgb([r, g, b]) = *bitmap.get_pixel(32 * 2 + 60, 32 * 2 + 60);
        assert!(r > 180 && g < 20 && b < 20, "logo center is ({r}, {g}, {b})");
    }

    #[test]
    fn test_smaller_request_is_clipped_not_rejected() {
        let rasterizer = BitmapRasterizer::new().unwrap();
        let request = RasterRequest {
            scale: 3,
            width_px: 100,
            height_px: 50,
        };
        let bitmap = rasterizer.rasterize(&sample_view(), &request).unwrap();
        assert_eq!(bitmap.dimensions(), (100, 50));
    }
}
