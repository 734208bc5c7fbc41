pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod ledger;
pub mod navigator;
pub mod session;
pub mod templates;

use backend::{DisplaySurface, PageRenderer, TextExtractor};
use config::SessionConfig;
use error::PagemarkError;
use ledger::Ledger;
use navigator::{Document, Navigator};
use session::Session;
use templates::TemplateStore;
use tracing::info;

/// Main API entry point: build a session over `documents` from `config`.
///
/// Loads templates from `config.templates_path` when the file exists. With
/// `config.resume`, the existing ledger is loaded and documents it already
/// records are left out. The session is not started; call
/// [`Session::start`] to show the first page.
pub fn open_session<R, X, D>(
    documents: Vec<Document>,
    config: &SessionConfig,
    renderer: R,
    extractor: X,
    surface: D,
) -> Result<Session<R, X, D>, PagemarkError>
where
    R: PageRenderer,
    X: TextExtractor,
    D: DisplaySurface,
{
    config.validate()?;

    let ledger = if config.resume {
        Ledger::load_or_default(&config.ledger_path)?
    } else {
        Ledger::new()
    };

    let listed = documents.len();
    let documents: Vec<Document> = documents
        .into_iter()
        .filter(|doc| !ledger.contains(&doc.id()))
        .collect();
    if documents.is_empty() {
        return Err(PagemarkError::EmptyDocumentList {
            origin: if listed == 0 {
                "the document list".to_string()
            } else {
                format!(
                    "the document list ({} already recorded in {})",
                    listed,
                    config.ledger_path.display()
                )
            },
        });
    }
    if documents.len() < listed {
        info!(
            skipped = listed - documents.len(),
            remaining = documents.len(),
            "resuming"
        );
    }

    let templates = match &config.templates_path {
        Some(path) if path.exists() => TemplateStore::load(path)?,
        _ => TemplateStore::new(),
    };

    let navigator = Navigator::new(documents, config.start_page)?;
    Ok(Session::new(
        navigator, templates, ledger, config, renderer, extractor, surface,
    ))
}
