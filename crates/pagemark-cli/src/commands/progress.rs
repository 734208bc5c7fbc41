use pagemark_core::error::PagemarkError;
use pagemark_core::ledger::{Ledger, LedgerValue};
use pagemark_core::navigator::load_document_list;
use serde::Serialize;
use std::path::Path;

use crate::output;

/// Progress of a document list against a ledger.
#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub processed: usize,
    pub total: usize,
    pub unprocessed: usize,
    /// Listed documents with no ledger entry yet, in list order.
    pub remaining: Vec<String>,
}

pub fn build_report(listed: &[String], ledger: &Ledger) -> ProgressReport {
    let (processed, total) = ledger.progress_summary(listed.len());
    let unprocessed = ledger
        .entries()
        .filter(|(_, value)| matches!(value, LedgerValue::Unprocessed))
        .count();
    ProgressReport {
        processed,
        total,
        unprocessed,
        remaining: listed
            .iter()
            .filter(|id| !ledger.contains(id))
            .cloned()
            .collect(),
    }
}

pub fn run(list: &Path, ledger_path: &Path, output_format: &str) -> Result<(), PagemarkError> {
    let listed: Vec<String> = load_document_list(list)?
        .iter()
        .map(|doc| doc.id())
        .collect();
    let ledger = Ledger::load_or_default(ledger_path)?;
    let report = build_report(&listed, &ledger);

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_progress(&report),
    }
    Ok(())
}

pub fn show(ledger_path: &Path, output_format: &str) -> Result<(), PagemarkError> {
    let ledger = Ledger::load(ledger_path)?;
    match output_format {
        "json" => output::json::print(&ledger)?,
        _ => print!("{}", output::table::format_ledger(&ledger)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lists_remaining_in_order() {
        let mut ledger = Ledger::new();
        ledger.record_extraction("b.pdf", vec!["x".into()]);
        ledger.mark_unprocessed("d.pdf");
        let listed: Vec<String> = ["a.pdf", "b.pdf", "c.pdf", "d.pdf"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let report = build_report(&listed, &ledger);
        assert_eq!(report.processed, 2);
        assert_eq!(report.total, 4);
        assert_eq!(report.unprocessed, 1);
        assert_eq!(report.remaining, vec!["a.pdf", "c.pdf"]);
    }
}
