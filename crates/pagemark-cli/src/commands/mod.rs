pub mod extract;
pub mod progress;
pub mod run;

use pagemark_core::backend::poppler::Poppler;
use pagemark_core::config::SessionConfig;
use pagemark_core::error::PagemarkError;
use pagemark_core::navigator::{dedup_documents, load_document_list, Document};
use std::path::PathBuf;

/// Poppler backend for the configured resolution and raster directory.
pub fn open_poppler(config: &SessionConfig) -> Result<Poppler, PagemarkError> {
    if !Poppler::is_available() {
        return Err(PagemarkError::ToolNotFound {
            tool: "poppler-utils",
        });
    }
    match &config.raster_dir {
        Some(dir) => Poppler::with_raster_dir(config.dpi, dir),
        None => Poppler::new(config.dpi),
    }
}

/// Documents from `--list` first, then the positional ones. A path named
/// twice is kept at its first position.
pub fn collect_documents(
    list: Option<PathBuf>,
    documents: Vec<PathBuf>,
) -> Result<Vec<Document>, PagemarkError> {
    let mut all = match &list {
        Some(path) => load_document_list(path)?,
        None => Vec::new(),
    };
    all.extend(documents.into_iter().map(Document::new));
    let all = dedup_documents(all);
    if all.is_empty() {
        return Err(PagemarkError::EmptyDocumentList {
            origin: "the command line (pass documents or --list FILE)".into(),
        });
    }
    Ok(all)
}
