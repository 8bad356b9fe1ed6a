// quotation-pdf: Build interior design quotations and export them as PDF

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use quotation_pdf::config::{load_business, load_items, load_logo, parse_item_spec, ItemInput};
use quotation_pdf::document::{render_quotation_view, QuoteMeta};
use quotation_pdf::error::QuoteError;
use quotation_pdf::export::{export_filename, render_bitmap, write_pdf, PageFormat};
use quotation_pdf::logging::{init_logging, LogConfig, LogFormat};
use quotation_pdf::quotation::QuotationState;
use quotation_pdf::raster::{scale_for_device_pixel_ratio, BitmapRasterizer};
use quotation_pdf::session::{run_session, App, SessionOptions};
use quotation_pdf::summary::{format_money, FinancialSummary};
use tracing::info;

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Build interior design quotations and export them as PDF")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a quotation from flags or an items file and write the PDF
    Export(ExportArgs),
    /// Build a quotation interactively, one command per line
    Session(SessionArgs),
}

/// Options shared by both commands
#[derive(Args, Debug)]
struct RenderArgs {
    /// Business identity file (JSON), defaults to the built-in studio
    #[arg(long)]
    business: Option<PathBuf>,

    /// Logo image to display in the header (PNG or JPEG)
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Page format
    #[arg(long, value_enum, default_value = "a4")]
    page: PageArg,

    /// Device pixel ratio used to pick the render scale (scale = 2 x ratio, 2..=5)
    #[arg(long, default_value = "1.0")]
    dpr: f32,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Client name shown under "Bill To"
    #[arg(short, long, default_value = "")]
    client: String,

    /// Discount percentage, clamped to 0-100
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    discount: String,

    /// Line item as NAME:PRICE:QUANTITY (repeatable)
    #[arg(short, long = "item")]
    items: Vec<String>,

    /// Items file (JSON array of {name, price, quantity})
    #[arg(long = "items")]
    items_file: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,

    /// Output filename (defaults to Quotation-<client>-<date>.pdf)
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory for the default filename
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Also save the full rendered page as PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Print a text preview of the quotation
    #[arg(long)]
    preview: bool,
}

#[derive(Args, Debug)]
struct SessionArgs {
    #[command(flatten)]
    render: RenderArgs,

    /// Directory downloads are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Delay before the preview appears, in milliseconds
    #[arg(long, default_value = "500")]
    preview_delay_ms: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PageArg {
    /// A4 portrait, 210 x 297 mm
    A4,
    /// A4 landscape, 297 x 210 mm
    A4Landscape,
    /// US Letter portrait, 215.9 x 279.4 mm
    Letter,
}

impl From<PageArg> for PageFormat {
    fn from(page: PageArg) -> Self {
        match page {
            PageArg::A4 => PageFormat::A4_PORTRAIT,
            PageArg::A4Landscape => PageFormat::A4_LANDSCAPE,
            PageArg::Letter => PageFormat::US_LETTER,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), QuoteError> {
    let cli = Cli::parse();

    init_logging(
        &LogConfig::from_verbosity(cli.verbose, cli.quiet).with_format(cli.log_format.into()),
    );

    match cli.command {
        Command::Export(args) => run_export(args),
        Command::Session(args) => run_interactive(args),
    }
}

// ============================================================================
// Export Command
// ============================================================================

fn run_export(args: ExportArgs) -> Result<(), QuoteError> {
    let business = load_business(args.render.business.as_deref())?;
    let logo = load_logo(args.render.logo.as_deref())?;

    // Items file first, then --item flags, in the order given
    let mut inputs: Vec<ItemInput> = match &args.items_file {
        Some(path) => load_items(path)?,
        None => Vec::new(),
    };
    for spec in &args.items {
        inputs.push(parse_item_spec(spec)?);
    }

    let mut state = QuotationState::new();
    for input in &inputs {
        state.add_item(&input.product_name, &input.price, &input.quantity)?;
    }
    if !state.can_export() {
        return Err(QuoteError::ItemsError(
            "no items given, use --item NAME:PRICE:QUANTITY or --items FILE".to_string(),
        ));
    }
    state.set_client_name(args.client.as_str());
    state.set_discount(&args.discount);

    let summary = FinancialSummary::from_state(&state);
    let meta = QuoteMeta::now();
    let view = render_quotation_view(&state, &summary, &business, &meta);

    if args.preview {
        println!("{}", view);
    }

    // Fonts are loaded and checked before anything is rendered
    let rasterizer = BitmapRasterizer::new()?.with_logo(logo.as_ref());
    let scale = scale_for_device_pixel_ratio(args.render.dpr);
    let format = PageFormat::from(args.render.page);

    let output_path = match args.output {
        Some(path) => path,
        None => {
            std::fs::create_dir_all(&args.output_dir)?;
            args.output_dir
                .join(export_filename(state.client_name(), meta.issue_date))
        }
    };

    info!(items = state.items().len(), scale, "Rendering quotation");
    let bitmap = render_bitmap(&rasterizer, &view, scale)?;
    if let Some(png_path) = &args.png {
        bitmap
            .save(png_path)
            .map_err(|e| QuoteError::ImageError(format!("{}: {}", png_path.display(), e)))?;
    }
    let report = write_pdf(
        &bitmap,
        &format,
        &format!("Quotation {}", meta.quote_number),
        &output_path,
    )?;

    let symbol = business.currency_symbol.as_str();
    println!("✓ Generated: {}", report.path.display());
    println!("  Quote: {}", meta.quote_number);
    println!("  Pages: {}", report.pages);
    println!("  Items: {}", state.items().len());
    println!("  Total: {}", format_money(symbol, summary.final_total));
    if let Some(png_path) = &args.png {
        println!("  Image: {}", png_path.display());
    }

    Ok(())
}

// ============================================================================
// Session Command
// ============================================================================

fn run_interactive(args: SessionArgs) -> Result<(), QuoteError> {
    let business = load_business(args.render.business.as_deref())?;
    let logo = load_logo(args.render.logo.as_deref())?;
    let rasterizer = Arc::new(BitmapRasterizer::new()?.with_logo(logo.as_ref()));
    std::fs::create_dir_all(&args.output_dir)?;

    let options = SessionOptions {
        format: args.render.page.into(),
        scale: scale_for_device_pixel_ratio(args.render.dpr),
        output_dir: args.output_dir,
        preview_delay: Duration::from_millis(args.preview_delay_ms),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    let session = run_session(App::new(business), rasterizer, options, input, &mut stdout);
    let result = runtime.block_on(session);
    // a stdin read may still be parked on its blocking thread
    runtime.shutdown_background();
    result.map(|_| ())
}
