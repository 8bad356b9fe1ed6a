// quotation-pdf: interactive quotation session

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::chrome;
use crate::config::BusinessIdentity;
use crate::document::{render_quotation_view, DocumentView, QuoteMeta};
use crate::error::QuoteError;
use crate::export::{export_filename, export_pdf, ExportReport, PageFormat};
use crate::quotation::{ItemId, QuotationState, ValidationError};
use crate::raster::Rasterizer;
use crate::summary::FinancialSummary;
use crate::terminal;

pub const DEFAULT_PREVIEW_DELAY: Duration = Duration::from_millis(500);

// ============================================================================
// Events and Reactions
// ============================================================================

/// One user action. Events are applied one at a time by [`App::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    SubmitItem {
        name: String,
        price: String,
        quantity: String,
    },
    ClientName(String),
    Discount(String),
    RemoveItem(ItemId),
    OpenPreview,
    ClosePreview,
    Download,
}

/// Work finished in the background, reported back to the session.
#[derive(Debug)]
pub enum Completion {
    PreviewReady { generation: u64 },
    ExportFinished(Result<ExportReport, QuoteError>),
}

/// Why an event had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    NoItems,
    NoSuchItem(ItemId),
    PreviewAlreadyOpen,
    PreviewNotOpen,
    PreviewNotReady,
    ExportInProgress,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::NoItems => write!(f, "Add at least one item first."),
            Refusal::NoSuchItem(id) => write!(f, "No item with id {}.", id),
            Refusal::PreviewAlreadyOpen => write!(f, "The preview is already open."),
            Refusal::PreviewNotOpen => write!(f, "The preview is not open."),
            Refusal::PreviewNotReady => {
                write!(f, "Open the preview and wait for it before downloading.")
            }
            Refusal::ExportInProgress => write!(f, "A download is already in progress."),
        }
    }
}

/// A snapshot handed to the export task. The session state is never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub view: DocumentView,
    pub filename: String,
}

#[derive(Debug)]
pub enum Reaction {
    /// Items, client or discount changed.
    Updated,
    /// Form input was rejected; the message stays until the next valid submit.
    Rejected(ValidationError),
    Ignored(Refusal),
    PreviewScheduled { generation: u64 },
    PreviewShown(Box<DocumentView>),
    PreviewClosed,
    /// A completion arrived for a preview that is no longer pending.
    Stale,
    ExportStarted(Box<ExportJob>),
    Exported(ExportReport),
    ExportFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Hidden,
    Loading { generation: u64 },
    Shown { meta: QuoteMeta },
}

// ============================================================================
// Session State
// ============================================================================

/// Everything the session owns. Only the session task touches it.
pub struct App {
    state: QuotationState,
    business: BusinessIdentity,
    form_error: Option<ValidationError>,
    preview: Preview,
    generation: u64,
    export_in_flight: bool,
}

impl App {
    pub fn new(business: BusinessIdentity) -> Self {
        Self {
            state: QuotationState::new(),
            business,
            form_error: None,
            preview: Preview::Hidden,
            generation: 0,
            export_in_flight: false,
        }
    }

    pub fn state(&self) -> &QuotationState {
        &self.state
    }

    pub fn business(&self) -> &BusinessIdentity {
        &self.business
    }

    pub fn form_error(&self) -> Option<&ValidationError> {
        self.form_error.as_ref()
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn export_in_flight(&self) -> bool {
        self.export_in_flight
    }

    pub fn summary(&self) -> FinancialSummary {
        FinancialSummary::from_state(&self.state)
    }

    /// Download is offered only with a visible preview, items, and no export running.
    pub fn can_download(&self) -> bool {
        matches!(self.preview, Preview::Shown { .. })
            && self.state.can_export()
            && !self.export_in_flight
    }

    /// The document as currently shown in the preview.
    pub fn document_view(&self) -> Option<DocumentView> {
        match &self.preview {
            Preview::Shown { meta } => Some(render_quotation_view(
                &self.state,
                &self.summary(),
                &self.business,
                meta,
            )),
            _ => None,
        }
    }

    pub fn dispatch(&mut self, event: InputEvent) -> Reaction {
        trace!(?event, "Dispatching event");
        match event {
            InputEvent::SubmitItem { name, price, quantity } => {
                match self.state.add_item(&name, &price, &quantity) {
                    Ok(_) => {
                        self.form_error = None;
                        Reaction::Updated
                    }
                    Err(e) => {
                        warn!(error = %e, "Item rejected");
                        self.form_error = Some(e.clone());
                        Reaction::Rejected(e)
                    }
                }
            }
            InputEvent::ClientName(name) => {
                self.state.set_client_name(name);
                Reaction::Updated
            }
            InputEvent::Discount(raw) => {
                self.state.set_discount(&raw);
                Reaction::Updated
            }
            InputEvent::RemoveItem(id) => match self.state.remove_item(id) {
                Some(_) => Reaction::Updated,
                None => Reaction::Ignored(Refusal::NoSuchItem(id)),
            },
            InputEvent::OpenPreview => {
                if !self.state.can_export() {
                    return Reaction::Ignored(Refusal::NoItems);
                }
                if self.preview != Preview::Hidden {
                    return Reaction::Ignored(Refusal::PreviewAlreadyOpen);
                }
                self.generation += 1;
                self.preview = Preview::Loading {
                    generation: self.generation,
                };
                Reaction::PreviewScheduled {
                    generation: self.generation,
                }
            }
            InputEvent::ClosePreview => {
                if self.preview == Preview::Hidden {
                    return Reaction::Ignored(Refusal::PreviewNotOpen);
                }
                self.preview = Preview::Hidden;
                Reaction::PreviewClosed
            }
            InputEvent::Download => {
                if self.export_in_flight {
                    return Reaction::Ignored(Refusal::ExportInProgress);
                }
                if !self.state.can_export() {
                    return Reaction::Ignored(Refusal::NoItems);
                }
                let Preview::Shown { meta } = &self.preview else {
                    return Reaction::Ignored(Refusal::PreviewNotReady);
                };
                let filename = export_filename(self.state.client_name(), meta.issue_date);
                let view =
                    render_quotation_view(&self.state, &self.summary(), &self.business, meta);
                self.export_in_flight = true;
                info!(%filename, "Export started");
                Reaction::ExportStarted(Box::new(ExportJob { view, filename }))
            }
        }
    }

    pub fn complete(&mut self, completion: Completion) -> Reaction {
        match completion {
            Completion::PreviewReady { generation } => {
                if self.preview != (Preview::Loading { generation }) {
                    debug!(generation, "Discarding stale preview");
                    return Reaction::Stale;
                }
                let meta = QuoteMeta::now();
                let view =
                    render_quotation_view(&self.state, &self.summary(), &self.business, &meta);
                self.preview = Preview::Shown { meta };
                Reaction::PreviewShown(Box::new(view))
            }
            Completion::ExportFinished(result) => {
                self.export_in_flight = false;
                match result {
                    Ok(report) => Reaction::Exported(report),
                    Err(e) => {
                        warn!(error = %e, "Export failed");
                        Reaction::ExportFailed(e.to_string())
                    }
                }
            }
        }
    }
}

// ============================================================================
// Command Parsing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(InputEvent),
    List,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command `{0}`. Type `help` for the list of commands.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
Commands:
  add <product name> <price> <quantity>   add a line item
  remove <id>                             remove a line item
  client [name]                           set the client name
  discount <percent>                      set the discount (0-100)
  list                                    show items and totals, or the open preview
  preview                                 open the quotation preview
  download                                save the previewed quotation as PDF
  close                                   close the preview
  quit                                    leave the session";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "add" => {
            // product names may contain spaces; price and quantity are the last two words
            let mut words: Vec<&str> = rest.split_whitespace().collect();
            let quantity = if words.len() >= 3 { words.pop() } else { None };
            let price = if words.len() >= 2 { words.pop() } else { None };
            Command::Event(InputEvent::SubmitItem {
                name: words.join(" "),
                price: price.unwrap_or_default().to_string(),
                quantity: quantity.unwrap_or_default().to_string(),
            })
        }
        "remove" | "rm" => {
            let id = rest
                .parse::<ItemId>()
                .map_err(|_| CommandError::Usage("remove <id>"))?;
            Command::Event(InputEvent::RemoveItem(id))
        }
        "client" => Command::Event(InputEvent::ClientName(rest.to_string())),
        "discount" => Command::Event(InputEvent::Discount(rest.to_string())),
        "preview" => Command::Event(InputEvent::OpenPreview),
        "close" => Command::Event(InputEvent::ClosePreview),
        "download" => Command::Event(InputEvent::Download),
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

// ============================================================================
// Session Runner
// ============================================================================

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub format: PageFormat,
    pub scale: u32,
    pub output_dir: PathBuf,
    pub preview_delay: Duration,
}

struct Runner<'a, R, W> {
    app: App,
    rasterizer: Arc<R>,
    options: SessionOptions,
    completions: mpsc::UnboundedSender<Completion>,
    preview_timer: Option<JoinHandle<()>>,
    export_task: Option<JoinHandle<()>>,
    out: &'a mut W,
}

impl<R, W> Runner<'_, R, W>
where
    R: Rasterizer + Send + Sync + 'static,
    W: Write,
{
    fn show_quotation(&mut self) -> Result<(), QuoteError> {
        let symbol = self.app.business().currency_symbol.clone();
        writeln!(self.out, "{}", terminal::items_table(self.app.state(), &symbol))?;
        if let Some(client) = self.app.state().bill_to() {
            writeln!(self.out, "Client: {}", client)?;
        }
        writeln!(self.out, "{}", terminal::totals_panel(&self.app.summary(), &symbol))?;
        Ok(())
    }

    fn handle(&mut self, reaction: Reaction) -> Result<(), QuoteError> {
        match reaction {
            Reaction::Updated => self.show_quotation()?,
            Reaction::Rejected(e) => writeln!(self.out, "Error: {}", e)?,
            Reaction::Ignored(refusal) => writeln!(self.out, "{}", refusal)?,
            Reaction::PreviewScheduled { generation } => {
                writeln!(self.out, "Generating preview...")?;
                if self.options.preview_delay.is_zero() {
                    let ready = self.app.complete(Completion::PreviewReady { generation });
                    return self.handle(ready);
                }
                let delay = self.options.preview_delay;
                let completions = self.completions.clone();
                self.preview_timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = completions.send(Completion::PreviewReady { generation });
                }));
            }
            Reaction::PreviewShown(view) => {
                writeln!(self.out, "{}", view)?;
                writeln!(self.out, "Type `download` to save it as PDF or `close` to go back.")?;
            }
            Reaction::PreviewClosed => {
                if let Some(timer) = self.preview_timer.take() {
                    timer.abort();
                }
                writeln!(self.out, "Preview closed.")?;
            }
            Reaction::Stale => {}
            Reaction::ExportStarted(job) => {
                writeln!(self.out, "Generating PDF...")?;
                self.spawn_export(*job);
            }
            Reaction::Exported(report) => {
                writeln!(
                    self.out,
                    "Saved {} ({} page{})",
                    report.path.display(),
                    report.pages,
                    if report.pages == 1 { "" } else { "s" }
                )?;
            }
            Reaction::ExportFailed(message) => writeln!(self.out, "Export failed: {}", message)?,
        }
        Ok(())
    }

    fn spawn_export(&mut self, job: ExportJob) {
        let rasterizer = Arc::clone(&self.rasterizer);
        let format = self.options.format;
        let scale = self.options.scale;
        let path = self.options.output_dir.join(&job.filename);
        let completions = self.completions.clone();

        self.export_task = Some(tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                export_pdf(rasterizer.as_ref(), &job.view, &format, scale, &path)
            })
            .await
            .unwrap_or_else(|e| Err(QuoteError::TaskError(e.to_string())));
            let _ = completions.send(Completion::ExportFinished(result));
        }));
    }

    fn run_command(&mut self, command: Command) -> Result<bool, QuoteError> {
        match command {
            Command::Quit => return Ok(false),
            Command::List => match self.app.document_view() {
                Some(view) => writeln!(self.out, "{}", view)?,
                None => self.show_quotation()?,
            },
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Event(event) => {
                let reaction = self.app.dispatch(event);
                self.handle(reaction)?;
            }
        }
        Ok(true)
    }
}

/// Drive a session from `input` lines until `quit` or end of input.
///
/// Preview timers and exports run as background tasks and report back over a
/// channel, so input keeps being read while they run. Quitting cancels a
/// pending preview but waits for a running export to write its file.
pub async fn run_session<R, I, W>(
    app: App,
    rasterizer: Arc<R>,
    options: SessionOptions,
    input: I,
    out: &mut W,
) -> Result<App, QuoteError>
where
    R: Rasterizer + Send + Sync + 'static,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runner = Runner {
        app,
        rasterizer,
        options,
        completions: tx,
        preview_timer: None,
        export_task: None,
        out,
    };

    writeln!(runner.out, "{}", chrome::navbar(runner.app.business()))?;
    writeln!(runner.out, "{}", terminal::EMPTY_STATE)?;
    writeln!(runner.out, "Type `help` for commands.")?;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Some(command)) => {
                        if !runner.run_command(command)? {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => writeln!(runner.out, "{}", e)?,
                }
            }
            Some(done) = rx.recv() => {
                let reaction = runner.app.complete(done);
                runner.handle(reaction)?;
            }
        }
        runner.out.flush()?;
    }

    if let Some(timer) = runner.preview_timer.take() {
        timer.abort();
    }
    if let Some(task) = runner.export_task.take() {
        if runner.app.export_in_flight() {
            writeln!(runner.out, "Waiting for the download to finish...")?;
        }
        task.await
            .map_err(|e| QuoteError::TaskError(e.to_string()))?;
    }
    while let Ok(done) = rx.try_recv() {
        let reaction = runner.app.complete(done);
        runner.handle(reaction)?;
    }

    writeln!(runner.out, "{}", chrome::footer(runner.app.business(), Local::now().year()))?;
    runner.out.flush()?;
    Ok(runner.app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::BitmapRasterizer;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn submit(name: &str, price: &str, quantity: &str) -> InputEvent {
        InputEvent::SubmitItem {
            name: name.to_string(),
            price: price.to_string(),
            quantity: quantity.to_string(),
        }
    }

    fn app_with_item() -> App {
        let mut app = App::new(BusinessIdentity::default());
        app.dispatch(submit("Sofa", "1200", "2"));
        app
    }

    fn open_preview(app: &mut App) {
        let Reaction::PreviewScheduled { generation } = app.dispatch(InputEvent::OpenPreview) else {
            panic!("preview was not scheduled");
        };
        assert!(matches!(
            app.complete(Completion::PreviewReady { generation }),
            Reaction::PreviewShown(_)
        ));
    }

    #[test]
    fn test_rejected_item_sets_form_error_until_next_success() {
        let mut app = App::new(BusinessIdentity::default());
        assert!(matches!(
            app.dispatch(submit("", "10", "1")),
            Reaction::Rejected(ValidationError::EmptyProductName)
        ));
        assert_eq!(app.form_error(), Some(&ValidationError::EmptyProductName));
        assert!(app.state().is_empty());

        assert!(matches!(app.dispatch(submit("Lamp", "10", "1")), Reaction::Updated));
        assert_eq!(app.form_error(), None);
        assert_eq!(app.state().items().len(), 1);
    }

    #[test]
    fn test_discount_event_clamps() {
        let mut app = app_with_item();
        app.dispatch(InputEvent::Discount("150".to_string()));
        assert_eq!(app.state().discount().percent(), rust_decimal::Decimal::from(100));
        app.dispatch(InputEvent::Discount("abc".to_string()));
        assert_eq!(app.state().discount().percent(), rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn test_remove_unknown_item_is_refused_without_change() {
        let mut app = app_with_item();
        let missing: ItemId = "99".parse().unwrap();
        assert!(matches!(
            app.dispatch(InputEvent::RemoveItem(missing)),
            Reaction::Ignored(Refusal::NoSuchItem(_))
        ));
        assert_eq!(app.state().items().len(), 1);
    }

    #[test]
    fn test_preview_needs_items() {
        let mut app = App::new(BusinessIdentity::default());
        assert!(matches!(
            app.dispatch(InputEvent::OpenPreview),
            Reaction::Ignored(Refusal::NoItems)
        ));
        assert_eq!(app.preview(), &Preview::Hidden);
    }

    #[test]
    fn test_close_during_loading_discards_late_render() {
        let mut app = app_with_item();
        let Reaction::PreviewScheduled { generation } = app.dispatch(InputEvent::OpenPreview) else {
            panic!("preview was not scheduled");
        };
        assert!(matches!(app.dispatch(InputEvent::ClosePreview), Reaction::PreviewClosed));
        assert!(matches!(
            app.complete(Completion::PreviewReady { generation }),
            Reaction::Stale
        ));
        assert_eq!(app.preview(), &Preview::Hidden);
    }

    #[test]
    fn test_reopened_preview_ignores_older_generation() {
        let mut app = app_with_item();
        let Reaction::PreviewScheduled { generation: first } = app.dispatch(InputEvent::OpenPreview)
        else {
            panic!("preview was not scheduled");
        };
        app.dispatch(InputEvent::ClosePreview);
        let Reaction::PreviewScheduled { generation: second } =
            app.dispatch(InputEvent::OpenPreview)
        else {
            panic!("preview was not scheduled");
        };
        assert_ne!(first, second);
        assert!(matches!(
            app.complete(Completion::PreviewReady { generation: first }),
            Reaction::Stale
        ));
        assert!(matches!(
            app.complete(Completion::PreviewReady { generation: second }),
            Reaction::PreviewShown(_)
        ));
    }

    #[test]
    fn test_download_requires_shown_preview() {
        let mut app = app_with_item();
        assert!(matches!(
            app.dispatch(InputEvent::Download),
            Reaction::Ignored(Refusal::PreviewNotReady)
        ));
        app.dispatch(InputEvent::OpenPreview);
        assert!(matches!(
            app.dispatch(InputEvent::Download),
            Reaction::Ignored(Refusal::PreviewNotReady)
        ));
        assert!(!app.export_in_flight());
    }

    #[test]
    fn test_second_download_while_exporting_is_rejected() {
        let mut app = app_with_item();
        app.dispatch(InputEvent::ClientName("Acme Corp".to_string()));
        open_preview(&mut app);
        assert!(app.can_download());

        let Reaction::ExportStarted(job) = app.dispatch(InputEvent::Download) else {
            panic!("export did not start");
        };
        assert!(job.filename.starts_with("Quotation-Acme_Corp-"));
        assert_eq!(job.view.bill_to.as_deref(), Some("Acme Corp"));
        assert!(!app.can_download());
        assert!(matches!(
            app.dispatch(InputEvent::Download),
            Reaction::Ignored(Refusal::ExportInProgress)
        ));
    }

    #[test]
    fn test_failed_export_keeps_items() {
        let mut app = app_with_item();
        open_preview(&mut app);
        app.dispatch(InputEvent::Download);
        let reaction = app.complete(Completion::ExportFinished(Err(QuoteError::EmptyRender)));
        assert!(matches!(reaction, Reaction::ExportFailed(_)));
        assert!(!app.export_in_flight());
        assert_eq!(app.state().items().len(), 1);
        assert!(app.can_download());
    }

    #[test]
    fn test_download_after_removing_every_item_is_refused() {
        let mut app = app_with_item();
        open_preview(&mut app);
        let id = app.state().items()[0].id();
        app.dispatch(InputEvent::RemoveItem(id));
        assert!(matches!(app.dispatch(InputEvent::Download), Reaction::Ignored(Refusal::NoItems)));
    }

    #[test]
    fn test_parse_add_with_spaces_in_name() {
        assert_eq!(
            parse_command("add Teak Dining Table 45000.50 1").unwrap(),
            Some(Command::Event(submit("Teak Dining Table", "45000.50", "1")))
        );
        assert_eq!(
            parse_command("add Sofa 1200").unwrap(),
            Some(Command::Event(submit("Sofa", "1200", "")))
        );
        assert_eq!(parse_command("add").unwrap(), Some(Command::Event(submit("", "", ""))));
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(
            parse_command("client  Acme Corp ").unwrap(),
            Some(Command::Event(InputEvent::ClientName("Acme Corp".to_string())))
        );
        assert_eq!(
            parse_command("PREVIEW").unwrap(),
            Some(Command::Event(InputEvent::OpenPreview))
        );
        assert_eq!(parse_command("quit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("remove x"), Err(CommandError::Usage("remove <id>")));
        assert_eq!(
            parse_command("frobnicate"),
            Err(CommandError::Unknown("frobnicate".to_string()))
        );
    }

    fn options(output_dir: &Path, preview_delay: Duration) -> SessionOptions {
        SessionOptions {
            format: PageFormat::A4_PORTRAIT,
            scale: 2,
            output_dir: output_dir.to_path_buf(),
            preview_delay,
        }
    }

    #[tokio::test]
    async fn test_session_downloads_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = Arc::new(BitmapRasterizer::new().unwrap());
        let input = "add Sofa 1200 2\nclient Acme Corp\ndiscount 10\npreview\ndownload\nquit\n";
        let mut out = Vec::new();

        let app = run_session(
            App::new(BusinessIdentity::default()),
            rasterizer,
            options(dir.path(), Duration::ZERO),
            input.as_bytes(),
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("QUOTATION"), "{text}");
        assert!(text.contains("Saved "), "{text}");
        assert!(text.contains("All rights reserved."));
        assert!(!app.export_in_flight());

        let files: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 1, "{files:?}");
        assert!(files[0].starts_with("Quotation-Acme_Corp-") && files[0].ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_session_close_cancels_pending_preview() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = Arc::new(BitmapRasterizer::new().unwrap());
        let input = "add Sofa 1200 2\npreview\nclose\ndownload\nquit\n";
        let mut out = Vec::new();

        let app = run_session(
            App::new(BusinessIdentity::default()),
            rasterizer,
            options(dir.path(), Duration::from_secs(30)),
            input.as_bytes(),
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Preview closed."));
        assert!(!text.contains("QUOTATION"));
        assert!(text.contains(&Refusal::PreviewNotReady.to_string()));
        assert_eq!(app.preview(), &Preview::Hidden);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_document_view_follows_the_open_preview() {
        let mut app = app_with_item();
        assert_eq!(app.document_view(), None);
        open_preview(&mut app);

        app.dispatch(InputEvent::ClientName("Acme Corp".to_string()));
        let view = app.document_view().unwrap();
        assert_eq!(view.bill_to.as_deref(), Some("Acme Corp"));

        app.dispatch(InputEvent::ClosePreview);
        assert_eq!(app.document_view(), None);
    }

    #[tokio::test]
    async fn test_session_list_redisplays_open_preview() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = Arc::new(BitmapRasterizer::new().unwrap());
        let input = "add Sofa 1200 2\nlist\npreview\nclient Acme Corp\nlist\nclose\nlist\nquit\n";
        let mut out = Vec::new();

        run_session(
            App::new(BusinessIdentity::default()),
            rasterizer,
            options(dir.path(), Duration::ZERO),
            input.as_bytes(),
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("QUOTATION").count(), 2, "{text}");
        let redisplay = text.rfind("QUOTATION").unwrap();
        assert!(text[redisplay..].contains("Acme Corp"), "{text}");
        assert!(text[redisplay..].contains("Preview closed."), "{text}");
    }
}
