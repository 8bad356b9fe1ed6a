// quotation-pdf: paginated PDF export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ::image::{imageops, RgbImage};
use chrono::NaiveDate;
use printpdf::*;
use tracing::{debug, info};

use crate::document::DocumentView;
use crate::error::QuoteError;
use crate::raster::{RasterRequest, Rasterizer};

// ============================================================================
// Page Geometry
// ============================================================================

const MM_PER_INCH: f64 = 25.4;

/// Physical page size the bitmap is sliced for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageFormat {
    pub const A4_PORTRAIT: PageFormat = PageFormat {
        width_mm: 210.0,
        height_mm: 297.0,
    };
    pub const A4_LANDSCAPE: PageFormat = PageFormat {
        width_mm: 297.0,
        height_mm: 210.0,
    };
    /// US Letter dimensions in mm
    pub const US_LETTER: PageFormat = PageFormat {
        width_mm: 215.9,
        height_mm: 279.4,
    };
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4_PORTRAIT
    }
}

/// Pixel/millimetre relationship between a bitmap and the page it fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub px_per_mm: f64,
    pub page_height_px: u32,
}

impl PageGeometry {
    pub fn new(bitmap_width: u32, format: &PageFormat) -> Result<Self, QuoteError> {
        let width_mm = f64::from(format.width_mm);
        let height_mm = f64::from(format.height_mm);
        if !(width_mm > 0.0 && height_mm > 0.0) {
            return Err(QuoteError::PageGeometry(format!(
                "page size {}mm x {}mm is not positive",
                format.width_mm, format.height_mm
            )));
        }

        let px_per_mm = f64::from(bitmap_width) / width_mm;
        let page_height_px = (height_mm * px_per_mm).floor();
        if !page_height_px.is_finite()
            || page_height_px < 1.0
            || page_height_px > f64::from(u32::MAX)
        {
            return Err(QuoteError::PageGeometry(format!(
                "a {}px wide bitmap gives a page height of {} px",
                bitmap_width, page_height_px
            )));
        }

        Ok(Self {
            px_per_mm,
            page_height_px: page_height_px as u32,
        })
    }

    /// Height in mm a strip of `height_px` occupies once placed at full page width.
    pub fn strip_height_mm(&self, height_px: u32) -> f32 {
        (f64::from(height_px) / self.px_per_mm) as f32
    }
}

/// One horizontal strip of the source bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub offset_px: u32,
    pub height_px: u32,
}

/// Cut `bitmap_height` rows into consecutive strips of at most `page_height_px`.
pub fn plan_slices(bitmap_height: u32, page_height_px: u32) -> Result<Vec<Slice>, QuoteError> {
    if page_height_px == 0 {
        return Err(QuoteError::PageGeometry(
            "page height in pixels must be positive".to_string(),
        ));
    }

    let mut slices = Vec::with_capacity(bitmap_height.div_ceil(page_height_px) as usize);
    let mut offset = 0;
    while offset < bitmap_height {
        let height_px = page_height_px.min(bitmap_height - offset);
        slices.push(Slice { offset_px: offset, height_px });
        offset += height_px;
    }
    Ok(slices)
}

/// A page-sized strip ready to be placed on a page.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub image: RgbImage,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Crop page strips off the bitmap lazily, top to bottom.
///
/// Each strip is cut only when the iterator reaches it, so at most one strip
/// is held alongside the bitmap while pages are assembled.
pub fn page_strips<'a>(
    bitmap: &'a RgbImage,
    format: &PageFormat,
) -> Result<impl Iterator<Item = PageImage> + 'a, QuoteError> {
    let (width, height) = bitmap.dimensions();
    let geometry = PageGeometry::new(width, format)?;
    let slices = plan_slices(height, geometry.page_height_px)?;
    let width_mm = format.width_mm;

    Ok(slices.into_iter().enumerate().map(move |(index, slice)| {
        debug!(
            page = index + 1,
            offset_px = slice.offset_px,
            height_px = slice.height_px,
            "Slicing page"
        );
        let strip = imageops::crop_imm(bitmap, 0, slice.offset_px, width, slice.height_px);
        PageImage {
            image: strip.to_image(),
            width_mm,
            height_mm: geometry.strip_height_mm(slice.height_px),
        }
    }))
}

// ============================================================================
// Document Assembly
// ============================================================================

/// Collects page images in order and writes out the finished document.
pub trait DocumentAssembler {
    /// The strip is consumed and its pixels move into the document.
    fn add_page(&mut self, page: PageImage) -> Result<(), QuoteError>;

    fn page_count(&self) -> usize;

    fn finish<W: Write>(self, target: &mut BufWriter<W>) -> Result<(), QuoteError>;
}

/// Places each page image at the top of its own PDF page.
pub struct PdfAssembler {
    title: String,
    format: PageFormat,
    doc: Option<PdfDocumentReference>,
    pages: usize,
}

impl PdfAssembler {
    pub fn new(title: impl Into<String>, format: PageFormat) -> Self {
        Self {
            title: title.into(),
            format,
            doc: None,
            pages: 0,
        }
    }

    fn next_layer(&mut self) -> PdfLayerReference {
        let (width, height) = (Mm(self.format.width_mm), Mm(self.format.height_mm));
        match &self.doc {
            Some(doc) => {
                let name = format!("Page {}", self.pages + 1);
                let (page, layer) = doc.add_page(width, height, name);
                doc.get_page(page).get_layer(layer)
            }
            None => {
                let (doc, page, layer) =
                    PdfDocument::new(self.title.as_str(), width, height, "Page 1");
                let current_layer = doc.get_page(page).get_layer(layer);
                self.doc = Some(doc);
                current_layer
            }
        }
    }
}

impl DocumentAssembler for PdfAssembler {
    fn add_page(&mut self, page: PageImage) -> Result<(), QuoteError> {
        let PageImage {
            image,
            width_mm,
            height_mm,
        } = page;
        let (width_px, height_px) = image.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(QuoteError::PdfError("page image is empty".to_string()));
        }
        let layer = self.next_layer();

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: image.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // DPI = pixels / (mm / 25.4), so the strip spans the page width exactly
        let dpi = (f64::from(width_px) / (f64::from(width_mm) / MM_PER_INCH)) as f32;

        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(self.format.height_mm - height_mm)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        self.pages += 1;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn finish<W: Write>(self, target: &mut BufWriter<W>) -> Result<(), QuoteError> {
        let doc = self.doc.ok_or(QuoteError::EmptyRender)?;
        doc.save(target).map_err(|e| QuoteError::PdfError(e.to_string()))
    }
}

// ============================================================================
// Export Pipeline
// ============================================================================

/// `Quotation-<client>-<date>.pdf`, with `Client` standing in for a blank name.
pub fn export_filename(client_name: &str, date: NaiveDate) -> String {
    let client_name = client_name.trim();
    let client = if client_name.is_empty() {
        "Client".to_string()
    } else {
        let mut out = String::with_capacity(client_name.len());
        let mut in_space = false;
        for ch in client_name.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    out.push('_');
                }
                in_space = true;
            } else {
                out.push(if matches!(ch, '/' | '\\') { '_' } else { ch });
                in_space = false;
            }
        }
        out
    };
    format!("Quotation-{}-{}.pdf", client, date.format("%Y-%m-%d"))
}

/// Rasterize a view at `scale`, sized to its laid out content.
pub fn render_bitmap<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    view: &DocumentView,
    scale: u32,
) -> Result<RgbImage, QuoteError> {
    let (width, height) = rasterizer.measure(view);
    let request = RasterRequest::for_content(width, height, scale);
    let bitmap = rasterizer.rasterize(view, &request)?;
    if bitmap.dimensions() != (request.width_px, request.height_px) {
        return Err(QuoteError::ImageError(format!(
            "rasterizer returned {}x{}, expected {}x{}",
            bitmap.width(),
            bitmap.height(),
            request.width_px,
            request.height_px
        )));
    }
    Ok(bitmap)
}

/// Slice the bitmap into pages and feed them to the assembler in order.
pub fn paginate<A: DocumentAssembler>(
    bitmap: &RgbImage,
    format: &PageFormat,
    assembler: &mut A,
) -> Result<usize, QuoteError> {
    let mut pages = 0;
    for page in page_strips(bitmap, format)? {
        assembler.add_page(page)?;
        pages += 1;
    }
    if pages == 0 {
        return Err(QuoteError::EmptyRender);
    }
    Ok(pages)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub pages: usize,
    pub bitmap_size: (u32, u32),
}

/// Paginate an already rendered bitmap and write it as a PDF.
///
/// The document is written next to `output_path` first and renamed into place,
/// so a failed export never leaves a partial file behind.
pub fn write_pdf(
    bitmap: &RgbImage,
    format: &PageFormat,
    title: &str,
    output_path: &Path,
) -> Result<ExportReport, QuoteError> {
    let mut assembler = PdfAssembler::new(title, *format);
    let pages = paginate(bitmap, format, &mut assembler)?;

    let partial_path = output_path.with_extension("pdf.part");
    let file = File::create(&partial_path)?;
    let mut writer = BufWriter::new(file);
    let written = assembler
        .finish(&mut writer)
        .and_then(|()| writer.flush().map_err(QuoteError::from));
    drop(writer);
    if let Err(e) = written {
        std::fs::remove_file(&partial_path).ok();
        return Err(e);
    }
    std::fs::rename(&partial_path, output_path)?;

    info!(
        path = %output_path.display(),
        pages,
        width_px = bitmap.width(),
        height_px = bitmap.height(),
        "Quotation exported"
    );
    Ok(ExportReport {
        path: output_path.to_path_buf(),
        pages,
        bitmap_size: bitmap.dimensions(),
    })
}

/// Render, paginate and write one quotation.
pub fn export_pdf<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    view: &DocumentView,
    format: &PageFormat,
    scale: u32,
    output_path: &Path,
) -> Result<ExportReport, QuoteError> {
    let bitmap = render_bitmap(rasterizer, view, scale)?;
    write_pdf(&bitmap, format, &format!("Quotation {}", view.quote_number), output_path)
}
