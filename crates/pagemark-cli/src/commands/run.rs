use pagemark_core::backend::{DisplaySurface, PageRenderer, TextExtractor};
use pagemark_core::config::SessionConfig;
use pagemark_core::error::PagemarkError;
use pagemark_core::input::parse_event;
use pagemark_core::session::{Flow, Session};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::info;

use crate::commands::{collect_documents, open_poppler};
use crate::surface::TerminalSurface;

pub fn run(
    documents: Vec<PathBuf>,
    list: Option<PathBuf>,
    script: Option<PathBuf>,
    config: SessionConfig,
) -> Result<(), PagemarkError> {
    let documents = collect_documents(list, documents)?;
    let poppler = open_poppler(&config)?;
    let surface = TerminalSurface::new(io::stdout());
    let mut session =
        pagemark_core::open_session(documents, &config, &poppler, &poppler, surface)?;

    let input: Box<dyn BufRead> = match &script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    if let Err(e) = session.start() {
        return finish(&mut session, Err(e));
    }
    let outcome = drive(&mut session, input);
    finish(&mut session, outcome)
}

/// Feed events to the session until quit, end of input, or a fatal error.
///
/// Errors that leave the session usable are reported and the loop goes on.
fn drive<R, X, D>(
    session: &mut Session<R, X, D>,
    input: impl BufRead,
) -> Result<(), PagemarkError>
where
    R: PageRenderer,
    X: TextExtractor,
    D: DisplaySurface,
{
    for line in input.lines() {
        let line = line?;
        let event = match parse_event(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                session.surface_mut().notify(&format!("error: {e}"));
                continue;
            }
        };
        match session.handle(event) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => session.surface_mut().notify(&format!("error: {e}")),
        }
    }
    Ok(())
}

fn is_fatal(e: &PagemarkError) -> bool {
    matches!(
        e,
        PagemarkError::LastDocument { .. } | PagemarkError::ToolNotFound { .. }
    )
}

/// Save whatever was recorded, then hand back the session outcome.
fn finish<R, X, D>(
    session: &mut Session<R, X, D>,
    outcome: Result<(), PagemarkError>,
) -> Result<(), PagemarkError>
where
    R: PageRenderer,
    X: TextExtractor,
    D: DisplaySurface,
{
    let saved = session.save();
    info!(entries = session.ledger().len(), "session finished");
    outcome.and(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemark_core::backend::{PageView, RenderedPage};
    use pagemark_core::geometry::{NativeRect, Point, Region};
    use pagemark_core::ledger::{Ledger, LedgerValue};
    use pagemark_core::navigator::Document;
    use pagemark_core::templates::SlotId;

    struct FixedPages;

    impl PageRenderer for FixedPages {
        fn page_count(&self, _document: &Document) -> Result<usize, PagemarkError> {
            Ok(2)
        }

        fn render(
            &self,
            _document: &Document,
            _page_index: usize,
        ) -> Result<RenderedPage, PagemarkError> {
            Ok(RenderedPage {
                raster: PathBuf::from("page.png"),
                width: 100,
                height: 100,
                page_count: 2,
            })
        }
    }

    struct Echo;

    impl TextExtractor for Echo {
        fn extract(
            &self,
            document: &Document,
            _page_index: usize,
            rect: &NativeRect,
        ) -> Result<String, PagemarkError> {
            Ok(format!("{} {}x{}", document.id(), rect.width, rect.height))
        }

        fn backend_name(&self) -> &str {
            "echo"
        }
    }

    #[derive(Default)]
    struct Notes(Vec<String>);

    impl DisplaySurface for Notes {
        fn show_page(&mut self, _view: &PageView<'_>) {}

        fn draw_overlays(&mut self, _slot: SlotId, _regions: &[Region], _pending: Option<Point>) {}

        fn notify(&mut self, message: &str) {
            self.0.push(message.to_string());
        }
    }

    #[test]
    fn test_script_drives_session_and_saves_on_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            ledger_path: dir.path().join("extracted.json"),
            ..SessionConfig::default()
        };
        let docs = vec![Document::new("a.pdf"), Document::new("b.pdf")];
        let mut session =
            pagemark_core::open_session(docs, &config, FixedPages, Echo, Notes::default()).unwrap();
        session.start().unwrap();

        let script = "\
# first document: one region
click 10 20
click 50 70
extract
not-a-command
key x
";
        let outcome = drive(&mut session, script.as_bytes());
        finish(&mut session, outcome).unwrap();

        let ledger = Ledger::load(&config.ledger_path).unwrap();
        assert_eq!(
            ledger.get("a.pdf"),
            Some(&LedgerValue::Extracted(vec!["a.pdf 40x50".to_string()]))
        );
        assert_eq!(ledger.get("b.pdf"), Some(&LedgerValue::Unprocessed));
        assert!(session
            .surface()
            .0
            .iter()
            .any(|n| n.starts_with("error: invalid event 'not-a-command'")));
    }

    #[test]
    fn test_quit_stops_reading() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            ledger_path: dir.path().join("extracted.json"),
            ..SessionConfig::default()
        };
        let docs = vec![Document::new("a.pdf"), Document::new("b.pdf")];
        let mut session =
            pagemark_core::open_session(docs, &config, FixedPages, Echo, Notes::default()).unwrap();
        session.start().unwrap();

        drive(&mut session, "quit\nskip\n".as_bytes()).unwrap();
        assert!(session.ledger().is_empty());
    }
}
