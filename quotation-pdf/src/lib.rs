//! # quotation-pdf - Interior Design Quotation Builder
//!
//! Builds customer quotations from line items, shows them as a printable
//! document and exports that document as a paginated PDF. It provides:
//!
//! - **Quotation state**: validated line items, client name, clamped discount
//! - **Financial summary**: total, discount amount and final total in exact decimals
//! - **Rendering**: a fixed-width document view rasterized with bitmap fonts
//! - **Export**: slicing the bitmap into page-sized strips placed on PDF pages
//! - **Session**: an event-driven terminal session with a delayed preview
//!
//! ## Quick Start
//!
//! ```no_run
//! use quotation_pdf::{
//!     config::BusinessIdentity,
//!     document::{render_quotation_view, QuoteMeta},
//!     export::{export_filename, export_pdf, PageFormat},
//!     quotation::QuotationState,
//!     raster::BitmapRasterizer,
//!     summary::FinancialSummary,
//! };
//!
//! let mut state = QuotationState::new();
//! state.add_item("Teak Dining Table", "45000", "1")?;
//! state.set_client_name("Acme Corp");
//! state.set_discount("10");
//!
//! let business = BusinessIdentity::default();
//! let meta = QuoteMeta::now();
//! let summary = FinancialSummary::from_state(&state);
//! let view = render_quotation_view(&state, &summary, &business, &meta);
//!
//! let rasterizer = BitmapRasterizer::new()?;
//! let path = std::path::PathBuf::from(export_filename(state.client_name(), meta.issue_date));
//! export_pdf(&rasterizer, &view, &PageFormat::A4_PORTRAIT, 2, &path)?;
//!
//! # Ok::<(), quotation_pdf::error::QuoteError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`quotation`] | Line items, client name, discount |
//! | [`summary`] | Totals and money formatting |
//! | [`document`] | The printable quotation view |
//! | [`raster`] | Bitmap rendering of the view |
//! | [`export`] | Pagination and PDF assembly |
//! | [`session`] | Interactive session controller |
//! | [`chrome`] | Navbar and footer |
//! | [`config`] | Business identity, item files, logo |
//! | [`terminal`] | Terminal tables |
//! | [`logging`] | Tracing subscriber setup |
//! | [`error`] | Error types |

pub mod chrome;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod logging;
pub mod quotation;
pub mod raster;
pub mod session;
pub mod summary;
pub mod terminal;

pub use error::{QuoteError, Result};
pub use quotation::{Discount, ItemId, LineItem, QuotationState, ValidationError};
pub use summary::FinancialSummary;
