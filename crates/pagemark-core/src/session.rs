//! The interactive session: one owned state struct, one event at a time.
//!
//! Every event is handled to completion before the next is accepted. Text
//! extraction is synchronous and covers all regions of the active slot
//! before control returns.

use crate::backend::{DisplaySurface, PageRenderer, PageView, RenderedPage, TextExtractor};
use crate::config::SessionConfig;
use crate::error::PagemarkError;
use crate::geometry::{CoordinateMapper, Point, Region};
use crate::input::{command_for_key, Button, Command, Event};
use crate::ledger::Ledger;
use crate::navigator::{Document, Navigator};
use crate::templates::TemplateStore;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Whether the session wants more events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<R, X, D> {
    navigator: Navigator,
    templates: TemplateStore,
    ledger: Ledger,
    mapper: CoordinateMapper,
    renderer: R,
    extractor: X,
    surface: D,
    pending: Option<Point>,
    page: Option<RenderedPage>,
    /// Document id and page index of `page`.
    shown: Option<(String, usize)>,
    ledger_path: PathBuf,
    templates_path: Option<PathBuf>,
}

impl<R, X, D> Session<R, X, D>
where
    R: PageRenderer,
    X: TextExtractor,
    D: DisplaySurface,
{
    pub fn new(
        navigator: Navigator,
        templates: TemplateStore,
        ledger: Ledger,
        config: &SessionConfig,
        renderer: R,
        extractor: X,
        surface: D,
    ) -> Self {
        Session {
            navigator,
            templates,
            ledger,
            mapper: config.mapper(),
            renderer,
            extractor,
            surface,
            pending: None,
            page: None,
            shown: None,
            ledger_path: config.ledger_path.clone(),
            templates_path: config.templates_path.clone(),
        }
    }

    /// Show the first document. Unreadable documents are dropped on the way.
    pub fn start(&mut self) -> Result<(), PagemarkError> {
        self.show_current()
    }

    pub fn handle(&mut self, event: Event) -> Result<Flow, PagemarkError> {
        match event {
            Event::Click {
                button: Button::Primary,
                x,
                y,
            } => {
                self.click(x, y);
                Ok(Flow::Continue)
            }
            Event::Click {
                button: Button::Secondary,
                ..
            } => Ok(Flow::Continue),
            Event::Key(key) => match command_for_key(key) {
                Some(command) => self.execute(command),
                None => {
                    debug!(%key, "unmapped key ignored");
                    Ok(Flow::Continue)
                }
            },
            Event::Command(command) => self.execute(command),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, PagemarkError> {
        debug!(%command, "command");
        match command {
            Command::Extract => {
                self.extract_current()?;
                self.navigator.next_document();
                self.report_progress();
                self.show_current()?;
            }
            Command::RemoveLastRegion => {
                self.templates.remove_last_region();
                self.redraw_overlays();
            }
            Command::MarkUnprocessed => {
                let id = self.navigator.current().0.id();
                self.ledger.mark_unprocessed(&id);
                self.navigator.next_document();
                self.report_progress();
                self.show_current()?;
            }
            Command::NextDocument => {
                self.navigator.next_document();
                self.show_current()?;
            }
            Command::PrevDocument => {
                self.navigator.prev_document();
                self.show_current()?;
            }
            Command::Save => self.save()?,
            Command::FlipPageForward => {
                self.navigator.flip_page_forward();
                self.show_current()?;
            }
            Command::FlipPageBackward => {
                self.navigator.flip_page_backward();
                self.show_current()?;
            }
            Command::SelectTemplate(id) => {
                self.templates.set_active_slot(id);
                self.redraw_overlays();
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Write the ledger (and the templates, when a templates file is configured).
    ///
    /// On failure the in-memory state is untouched and saving can be retried.
    pub fn save(&mut self) -> Result<(), PagemarkError> {
        self.ledger.save(&self.ledger_path)?;
        if let Some(path) = &self.templates_path {
            self.templates.save(path)?;
        }
        let message = format!(
            "saved {} entr{} to {}",
            self.ledger.len(),
            if self.ledger.len() == 1 { "y" } else { "ies" },
            self.ledger_path.display()
        );
        self.surface.notify(&message);
        Ok(())
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn pending_point(&self) -> Option<Point> {
        self.pending
    }

    /// The page currently on display, if any.
    pub fn page(&self) -> Option<&RenderedPage> {
        self.page.as_ref()
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    fn click(&mut self, x: f64, y: f64) {
        let point = self.mapper.point_from_click(x, y);
        match self.pending.take() {
            None => self.pending = Some(point),
            Some(first) => {
                let region = self.mapper.rectangle_from_two_points(first, point);
                self.templates.add_region(region);
            }
        }
        self.redraw_overlays();
    }

    fn extract_current(&mut self) -> Result<(), PagemarkError> {
        let (document, page_index) = self.navigator.current();
        let texts = extract_regions(
            &self.extractor,
            &self.mapper,
            document,
            page_index,
            self.templates.regions_in_active_slot(),
        )?;
        let id = document.id();
        self.ledger.record_extraction(&id, texts);
        Ok(())
    }

    /// Render the current (document, page) and redraw overlays.
    ///
    /// Documents whose pages cannot be sized are marked unprocessed and
    /// dropped from the active list until a readable one is found. Any other
    /// failure puts the cursor back on the page still on display.
    fn show_current(&mut self) -> Result<(), PagemarkError> {
        loop {
            match self.render_current() {
                Ok(page) => {
                    let (document, page_index) = self.navigator.current();
                    self.surface.show_page(&PageView {
                        document,
                        doc_index: self.navigator.doc_index(),
                        doc_count: self.navigator.len(),
                        page_index,
                        page: &page,
                    });
                    self.shown = Some((document.id(), page_index));
                    self.page = Some(page);
                    self.redraw_overlays();
                    return Ok(());
                }
                Err(e) if e.is_page_unavailable() => {
                    self.page = None;
                    self.shown = None;
                    let id = self.navigator.current().0.id();
                    warn!(document = %id, error = %e, "document dropped");
                    self.ledger.mark_unprocessed(&id);
                    self.surface
                        .notify(&format!("{e}; {id} marked unprocessed"));
                    self.navigator.remove_current_document()?;
                    self.report_progress();
                }
                Err(e) => {
                    self.return_to_shown();
                    return Err(e);
                }
            }
        }
    }

    fn return_to_shown(&mut self) {
        let restored = match &self.shown {
            Some((id, page_index)) => self.navigator.seek(id, *page_index),
            None => false,
        };
        if !restored {
            self.page = None;
            self.shown = None;
        }
        debug!(restored, "render failed, cursor returned to displayed page");
    }

    fn render_current(&mut self) -> Result<RenderedPage, PagemarkError> {
        if self.navigator.current().0.page_count.is_none() {
            let count = self.renderer.page_count(self.navigator.current().0)?;
            self.navigator.set_page_count(count);
        }
        let (document, page_index) = self.navigator.current();
        self.renderer.render(document, page_index)
    }

    fn redraw_overlays(&mut self) {
        self.surface.draw_overlays(
            self.templates.active_slot(),
            self.templates.regions_in_active_slot(),
            self.pending,
        );
    }

    /// Counts only the documents still in the active list, so entries from a
    /// resumed ledger or dropped documents do not inflate the figure.
    fn report_progress(&mut self) {
        let ids = self.navigator.documents().iter().map(Document::id);
        let (processed, total) = self.ledger.progress_among(ids);
        self.surface
            .notify(&format!("{processed}/{total} documents processed"));
    }
}

/// Extract the text under each region, in order.
///
/// All-or-nothing: the first failing region aborts the document and no
/// partial result is returned.
pub fn extract_regions<X: TextExtractor>(
    extractor: &X,
    mapper: &CoordinateMapper,
    document: &Document,
    page_index: usize,
    regions: &[Region],
) -> Result<Vec<String>, PagemarkError> {
    regions
        .iter()
        .map(|region| {
            let rect = mapper.extraction_rectangle(region);
            extractor.extract(document, page_index, &rect)
        })
        .collect::<Result<Vec<String>, PagemarkError>>()
        .map_err(|e| {
            warn!(
                document = %document.id(),
                backend = extractor.backend_name(),
                error = %e,
                "extraction aborted"
            );
            e
        })
}
