use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PagemarkError {
    #[error("page {page} of {document} is unavailable: {reason}")]
    PageUnavailable {
        document: String,
        page: usize,
        reason: String,
    },

    #[error("{tool} not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    ToolNotFound { tool: &'static str },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("refusing to remove {document}: it is the last document in the session")]
    LastDocument { document: String },

    #[error("no documents to process in {origin}")]
    EmptyDocumentList { origin: String },

    #[error("failed to load document list from {path}: {reason}")]
    DocumentListLoad { path: PathBuf, reason: String },

    #[error("failed to load ledger from {path}: {reason}")]
    LedgerLoad { path: PathBuf, reason: String },

    #[error("failed to save ledger to {path}: {reason}")]
    LedgerSave { path: PathBuf, reason: String },

    #[error("failed to load templates from {path}: {reason}")]
    TemplatesLoad { path: PathBuf, reason: String },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("invalid event '{0}'")]
    InvalidEvent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PagemarkError {
    /// Whether the error means the requested page cannot be shown at all.
    pub fn is_page_unavailable(&self) -> bool {
        matches!(self, PagemarkError::PageUnavailable { .. })
    }
}
