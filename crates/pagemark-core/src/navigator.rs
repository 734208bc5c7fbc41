use crate::error::PagemarkError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A document in the session's active list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    /// Known once the document has been rendered.
    pub page_count: Option<usize>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Document {
            path: path.into(),
            page_count: None,
        }
    }

    /// Identity used as the ledger key.
    pub fn id(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Circular cursor over the documents and the pages of the current document.
#[derive(Debug, Clone)]
pub struct Navigator {
    documents: Vec<Document>,
    doc_index: usize,
    page_index: usize,
}

impl Navigator {
    /// Repeated documents are dropped; the first occurrence keeps its place.
    pub fn new(documents: Vec<Document>, start_page: usize) -> Result<Self, PagemarkError> {
        let documents = dedup_documents(documents);
        if documents.is_empty() {
            return Err(PagemarkError::EmptyDocumentList {
                origin: "the session".into(),
            });
        }
        Ok(Navigator {
            documents,
            doc_index: 0,
            page_index: start_page,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn doc_index(&self) -> usize {
        self.doc_index
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn current(&self) -> (&Document, usize) {
        (&self.documents[self.doc_index], self.page_index)
    }

    pub fn next_document(&mut self) {
        self.doc_index = (self.doc_index + 1) % self.documents.len();
        self.fit_page_to_document();
        debug!(doc_index = self.doc_index, page = self.page_index, "next document");
    }

    pub fn prev_document(&mut self) {
        let len = self.documents.len();
        self.doc_index = (self.doc_index + len - 1) % len;
        self.fit_page_to_document();
        debug!(doc_index = self.doc_index, page = self.page_index, "previous document");
    }

    /// No-op while the page count of the current document is unknown.
    pub fn flip_page_forward(&mut self) {
        if let Some(count) = self.current_page_count() {
            self.page_index = (self.page_index + 1) % count;
            debug!(page = self.page_index, "page forward");
        }
    }

    pub fn flip_page_backward(&mut self) {
        if let Some(count) = self.current_page_count() {
            self.page_index = (self.page_index + count - 1) % count;
            debug!(page = self.page_index, "page backward");
        }
    }

    /// Record the page count of the current document, resetting the page
    /// index to 0 if it no longer fits.
    pub fn set_page_count(&mut self, count: usize) {
        self.documents[self.doc_index].page_count = Some(count);
        self.fit_page_to_document();
    }

    /// Move the cursor to `id` at `page_index`. Returns false, leaving the
    /// cursor alone, when `id` is not in the list.
    pub fn seek(&mut self, id: &str, page_index: usize) -> bool {
        match self.documents.iter().position(|doc| doc.id() == id) {
            Some(index) => {
                self.doc_index = index;
                self.page_index = page_index;
                self.fit_page_to_document();
                true
            }
            None => false,
        }
    }

    /// Remove the current document; the cursor lands on the document that
    /// followed it. The last remaining document is never removed.
    pub fn remove_current_document(&mut self) -> Result<Document, PagemarkError> {
        if self.documents.len() == 1 {
            return Err(PagemarkError::LastDocument {
                document: self.documents[0].id(),
            });
        }
        let removed = self.documents.remove(self.doc_index);
        if self.doc_index >= self.documents.len() {
            self.doc_index = 0;
        }
        self.fit_page_to_document();
        info!(document = %removed.id(), remaining = self.documents.len(), "document removed");
        Ok(removed)
    }

    fn current_page_count(&self) -> Option<usize> {
        self.documents[self.doc_index]
            .page_count
            .filter(|count| *count > 0)
    }

    fn fit_page_to_document(&mut self) {
        if let Some(count) = self.documents[self.doc_index].page_count {
            if self.page_index >= count {
                self.page_index = 0;
            }
        }
    }
}

/// Read a newline-separated document list; blank lines are skipped.
pub fn load_document_list(path: &Path) -> Result<Vec<Document>, PagemarkError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| PagemarkError::DocumentListLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let documents = parse_document_list(&content);
    if documents.is_empty() {
        return Err(PagemarkError::EmptyDocumentList {
            origin: path.display().to_string(),
        });
    }
    Ok(documents)
}

/// Drop documents whose id already appeared earlier in the list.
pub fn dedup_documents(documents: Vec<Document>) -> Vec<Document> {
    let mut seen = HashSet::new();
    documents
        .into_iter()
        .filter(|doc| {
            let id = doc.id();
            if seen.contains(&id) {
                warn!(document = %id, "duplicate document ignored");
                false
            } else {
                seen.insert(id);
                true
            }
        })
        .collect()
}

pub fn parse_document_list(content: &str) -> Vec<Document> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Document::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator(page_counts: &[usize]) -> Navigator {
        let docs = page_counts
            .iter()
            .enumerate()
            .map(|(i, count)| Document {
                path: PathBuf::from(format!("doc{i}.pdf")),
                page_count: Some(*count),
            })
            .collect();
        Navigator::new(docs, 0).unwrap()
    }

    #[test]
    fn test_prev_from_first_wraps_to_last() {
        let mut nav = navigator(&[1, 1, 1]);
        nav.prev_document();
        assert_eq!(nav.doc_index(), 2);
        nav.next_document();
        assert_eq!(nav.doc_index(), 0);
    }

    #[test]
    fn test_flip_backward_from_first_page_wraps() {
        let mut nav = navigator(&[3]);
        nav.flip_page_backward();
        assert_eq!(nav.page_index(), 2);
        nav.flip_page_forward();
        assert_eq!(nav.page_index(), 0);
    }

    #[test]
    fn test_page_kept_across_documents_when_it_fits() {
        let mut nav = navigator(&[5, 4]);
        nav.flip_page_forward();
        nav.flip_page_forward();
        nav.next_document();
        assert_eq!(nav.page_index(), 2);
    }

    #[test]
    fn test_page_reset_when_next_document_is_shorter() {
        let mut nav = navigator(&[5, 2]);
        nav.flip_page_backward();
        assert_eq!(nav.page_index(), 4);
        nav.next_document();
        assert_eq!(nav.page_index(), 0);
    }

    #[test]
    fn test_unknown_page_count_keeps_page_until_learned() {
        let docs = vec![Document::new("a.pdf"), Document::new("b.pdf")];
        let mut nav = Navigator::new(docs, 3).unwrap();
        nav.flip_page_forward();
        assert_eq!(nav.page_index(), 3);
        nav.set_page_count(2);
        assert_eq!(nav.page_index(), 0);
        assert_eq!(nav.current().0.page_count, Some(2));
    }

    #[test]
    fn test_remove_lands_on_following_document() {
        let mut nav = navigator(&[1, 1, 1]);
        nav.next_document();
        let removed = nav.remove_current_document().unwrap();
        assert_eq!(removed.id(), "doc1.pdf");
        assert_eq!(nav.current().0.id(), "doc2.pdf");

        let removed = nav.remove_current_document().unwrap();
        assert_eq!(removed.id(), "doc2.pdf");
        assert_eq!(nav.doc_index(), 0);
        assert_eq!(nav.current().0.id(), "doc0.pdf");
    }

    #[test]
    fn test_remove_last_document_is_refused() {
        let mut nav = navigator(&[1]);
        let err = nav.remove_current_document().unwrap_err();
        assert!(matches!(err, PagemarkError::LastDocument { .. }));
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn test_seek_moves_to_known_document_only() {
        let mut nav = navigator(&[1, 3, 1]);
        assert!(nav.seek("doc1.pdf", 2));
        assert_eq!(nav.current().0.id(), "doc1.pdf");
        assert_eq!(nav.page_index(), 2);

        assert!(!nav.seek("missing.pdf", 0));
        assert_eq!(nav.doc_index(), 1);
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(Navigator::new(vec![], 0).is_err());
    }

    #[test]
    fn test_repeated_documents_kept_once() {
        let docs = parse_document_list("a.pdf\nb.pdf\na.pdf\n  b.pdf\nc.pdf\n");
        let mut nav = Navigator::new(docs, 0).unwrap();
        let ids: Vec<String> = nav.documents().iter().map(Document::id).collect();
        assert_eq!(ids, vec!["a.pdf", "b.pdf", "c.pdf"]);

        nav.next_document();
        nav.next_document();
        nav.next_document();
        assert_eq!(nav.current().0.id(), "a.pdf");
    }

    #[test]
    fn test_parse_document_list_skips_blank_lines() {
        let docs = parse_document_list("a.pdf\n\n  b.pdf  \r\n");
        let ids: Vec<String> = docs.iter().map(Document::id).collect();
        assert_eq!(ids, vec!["a.pdf", "b.pdf"]);
    }
}
