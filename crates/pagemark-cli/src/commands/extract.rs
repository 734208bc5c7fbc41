use pagemark_core::backend::{PageRenderer, TextExtractor};
use pagemark_core::config::SessionConfig;
use pagemark_core::error::PagemarkError;
use pagemark_core::ledger::Ledger;
use pagemark_core::navigator::Document;
use pagemark_core::session::extract_regions;
use pagemark_core::templates::{SlotId, TemplateStore};
use std::path::PathBuf;
use tracing::warn;

use crate::commands::{collect_documents, open_poppler};

pub fn run(
    documents: Vec<PathBuf>,
    list: Option<PathBuf>,
    slot: u8,
    config: SessionConfig,
) -> Result<(), PagemarkError> {
    let documents = collect_documents(list, documents)?;
    let templates_path = config.templates_path.clone().ok_or_else(|| {
        PagemarkError::ConfigInvalid("extract needs a template file (--templates FILE)".into())
    })?;
    let slot = SlotId::new(slot)
        .ok_or_else(|| PagemarkError::ConfigInvalid(format!("slot must be 0-9, got {slot}")))?;
    let templates = TemplateStore::load(&templates_path)?;

    let poppler = open_poppler(&config)?;

    let mut ledger = if config.resume {
        Ledger::load_or_default(&config.ledger_path)?
    } else {
        Ledger::new()
    };

    let failed = extract_all(
        &poppler,
        &poppler,
        &documents,
        &templates,
        slot,
        &config,
        &mut ledger,
    )?;
    ledger.save(&config.ledger_path)?;

    let (processed, total) = ledger.progress_summary(documents.len());
    println!(
        "{processed}/{total} documents recorded in {}",
        config.ledger_path.display()
    );
    if !failed.is_empty() {
        println!("{} document(s) left unrecorded after extraction errors:", failed.len());
        for id in &failed {
            println!("  {id}");
        }
    }
    Ok(())
}

/// Apply `slot` to every document; returns the documents whose extraction failed.
///
/// Unreadable documents are recorded as unprocessed. Documents whose extraction
/// fails are left out of the ledger so a later run can retry them.
fn extract_all<R: PageRenderer, X: TextExtractor>(
    renderer: &R,
    extractor: &X,
    documents: &[Document],
    templates: &TemplateStore,
    slot: SlotId,
    config: &SessionConfig,
    ledger: &mut Ledger,
) -> Result<Vec<String>, PagemarkError> {
    let mapper = config.mapper();
    let regions = templates.regions(slot);
    let mut failed = Vec::new();

    for document in documents {
        let id = document.id();
        if config.resume && ledger.contains(&id) {
            continue;
        }

        let page_count = match renderer.page_count(document) {
            Ok(count) => count,
            Err(e) if e.is_page_unavailable() => {
                warn!(document = %id, error = %e, "unreadable document");
                ledger.mark_unprocessed(&id);
                continue;
            }
            Err(e) => return Err(e),
        };
        let page = if config.start_page < page_count {
            config.start_page
        } else {
            0
        };

        match extract_regions(extractor, &mapper, document, page, regions) {
            Ok(texts) => ledger.record_extraction(&id, texts),
            Err(PagemarkError::ToolNotFound { tool }) => {
                return Err(PagemarkError::ToolNotFound { tool })
            }
            Err(_) => failed.push(id),
        }
    }

    Ok(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemark_core::backend::RenderedPage;
    use pagemark_core::geometry::{NativeRect, Point, Region};
    use pagemark_core::ledger::LedgerValue;

    struct Pages;

    impl PageRenderer for Pages {
        fn page_count(&self, document: &Document) -> Result<usize, PagemarkError> {
            match document.id().as_str() {
                "broken.pdf" => Err(PagemarkError::PageUnavailable {
                    document: document.id(),
                    page: 0,
                    reason: "not a PDF".into(),
                }),
                "short.pdf" => Ok(1),
                _ => Ok(4),
            }
        }

        fn render(
            &self,
            _document: &Document,
            _page_index: usize,
        ) -> Result<RenderedPage, PagemarkError> {
            unreachable!("batch extraction never renders")
        }
    }

    struct PageEcho;

    impl TextExtractor for PageEcho {
        fn extract(
            &self,
            document: &Document,
            page_index: usize,
            _rect: &NativeRect,
        ) -> Result<String, PagemarkError> {
            if document.id() == "locked.pdf" {
                return Err(PagemarkError::ToolFailed {
                    tool: "pdftotext",
                    code: 1,
                    stderr: "Incorrect password".into(),
                });
            }
            Ok(format!("page {page_index}"))
        }

        fn backend_name(&self) -> &str {
            "page-echo"
        }
    }

    #[test]
    fn test_extract_all_records_per_document_outcomes() {
        let mut templates = TemplateStore::new();
        templates.set_active_slot(SlotId::new(2).unwrap());
        templates.add_region(Region {
            anchor: Point::new(0.0, 0.0),
            width: 10.0,
            height: 10.0,
        });
        let config = SessionConfig {
            start_page: 2,
            ..SessionConfig::default()
        };
        let documents: Vec<Document> = ["a.pdf", "short.pdf", "broken.pdf", "locked.pdf"]
            .into_iter()
            .map(Document::new)
            .collect();
        let mut ledger = Ledger::new();

        let failed = extract_all(
            &Pages,
            &PageEcho,
            &documents,
            &templates,
            SlotId::new(2).unwrap(),
            &config,
            &mut ledger,
        )
        .unwrap();

        assert_eq!(failed, vec!["locked.pdf".to_string()]);
        assert_eq!(
            ledger.get("a.pdf"),
            Some(&LedgerValue::Extracted(vec!["page 2".into()]))
        );
        assert_eq!(
            ledger.get("short.pdf"),
            Some(&LedgerValue::Extracted(vec!["page 0".into()]))
        );
        assert_eq!(ledger.get("broken.pdf"), Some(&LedgerValue::Unprocessed));
        assert!(!ledger.contains("locked.pdf"));
    }
}
