use crate::error::PagemarkError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Persisted marker for a document that was skipped or could not be processed.
pub const UNPROCESSED: &str = "UNPROCESSED";

/// Outcome recorded for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LedgerRepr", into = "LedgerRepr")]
pub enum LedgerValue {
    Unprocessed,
    /// One text block per region, in the slot's region order at extraction time.
    Extracted(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LedgerRepr {
    Marker(String),
    Texts(Vec<String>),
}

impl TryFrom<LedgerRepr> for LedgerValue {
    type Error = String;

    fn try_from(repr: LedgerRepr) -> Result<Self, Self::Error> {
        match repr {
            LedgerRepr::Marker(m) if m == UNPROCESSED => Ok(LedgerValue::Unprocessed),
            LedgerRepr::Marker(m) => Err(format!(
                "unexpected marker '{}' (expected '{}' or a list of strings)",
                m, UNPROCESSED
            )),
            LedgerRepr::Texts(texts) => Ok(LedgerValue::Extracted(texts)),
        }
    }
}

impl From<LedgerValue> for LedgerRepr {
    fn from(value: LedgerValue) -> Self {
        match value {
            LedgerValue::Unprocessed => LedgerRepr::Marker(UNPROCESSED.to_string()),
            LedgerValue::Extracted(texts) => LedgerRepr::Texts(texts),
        }
    }
}

/// Per-document outcomes, keyed by document id. At most one entry per document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<String, LedgerValue>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_unprocessed(&mut self, document_id: &str) {
        info!(document = document_id, "marked unprocessed");
        self.entries
            .insert(document_id.to_string(), LedgerValue::Unprocessed);
    }

    pub fn record_extraction(&mut self, document_id: &str, texts: Vec<String>) {
        info!(document = document_id, blocks = texts.len(), "extraction recorded");
        self.entries
            .insert(document_id.to_string(), LedgerValue::Extracted(texts));
    }

    pub fn get(&self, document_id: &str) -> Option<&LedgerValue> {
        self.entries.get(document_id)
    }

    pub fn contains(&self, document_id: &str) -> bool {
        self.entries.contains_key(document_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &LedgerValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `(processed, total)` where `total` is the caller's document count.
    pub fn progress_summary(&self, total_count: usize) -> (usize, usize) {
        (self.entries.len(), total_count)
    }

    /// `(processed, total)` over the given document ids only: `total` is how
    /// many ids were given and `processed` how many of them have an entry.
    pub fn progress_among<I>(&self, document_ids: I) -> (usize, usize)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        document_ids
            .into_iter()
            .fold((0, 0), |(processed, total), id| {
                let recorded = self.entries.contains_key(id.as_ref());
                (processed + usize::from(recorded), total + 1)
            })
    }

    /// Write the whole ledger, replacing whatever is at `path`.
    ///
    /// The JSON goes to a temporary file in the same directory which is then
    /// renamed over `path`, so readers never observe a partial file.
    pub fn save(&self, path: &Path) -> Result<(), PagemarkError> {
        let save_err = |reason: String| PagemarkError::LedgerSave {
            path: path.to_path_buf(),
            reason,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let json = serde_json::to_string_pretty(self)?;
        let mut tmpfile =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| save_err(e.to_string()))?;
        tmpfile
            .write_all(json.as_bytes())
            .and_then(|_| tmpfile.flush())
            .map_err(|e| save_err(e.to_string()))?;
        tmpfile
            .persist(path)
            .map_err(|e| save_err(e.error.to_string()))?;

        info!(path = %path.display(), entries = self.entries.len(), "ledger saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Ledger, PagemarkError> {
        let content = std::fs::read_to_string(path).map_err(|e| PagemarkError::LedgerLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| PagemarkError::LedgerLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Like [`load`](Self::load), but a missing file is an empty ledger.
    pub fn load_or_default(path: &Path) -> Result<Ledger, PagemarkError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Ledger::new())
        }
    }
}
