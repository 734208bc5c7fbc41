use pagemark_core::ledger::{Ledger, LedgerValue, UNPROCESSED};

use crate::commands::progress::ProgressReport;

pub fn print_progress(report: &ProgressReport) {
    println!(
        "  Processed: {}/{} ({} unprocessed)",
        report.processed, report.total, report.unprocessed
    );
    if report.remaining.is_empty() {
        println!("  All listed documents are recorded.");
        return;
    }
    println!("\n  Remaining ({}):", report.remaining.len());
    for id in &report.remaining {
        println!("    {id}");
    }
}

/// One block per document: the document id, then its text blocks indented.
pub fn format_ledger(ledger: &Ledger) -> String {
    let mut out = String::new();

    for (id, value) in ledger.entries() {
        match value {
            LedgerValue::Unprocessed => {
                out.push_str(&format!("{id}  {UNPROCESSED}\n"));
            }
            LedgerValue::Extracted(texts) => {
                out.push_str(&format!("{id}  {} block(s)\n", texts.len()));
                for (i, text) in texts.iter().enumerate() {
                    let mut lines = text.lines();
                    let first = lines.next().unwrap_or("");
                    out.push_str(&format!("  [{}] {}\n", i, first));
                    for line in lines {
                        out.push_str(&format!("      {}\n", line));
                    }
                }
            }
        }
    }

    if ledger.is_empty() {
        out.push_str("(ledger is empty)\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ledger() {
        let mut ledger = Ledger::new();
        ledger.record_extraction("a.pdf", vec!["Invoice 12\nDue 2024-01-31".into(), String::new()]);
        ledger.mark_unprocessed("b.pdf");

        assert_eq!(
            format_ledger(&ledger),
            "a.pdf  2 block(s)\n  [0] Invoice 12\n      Due 2024-01-31\n  [1] \n\
             b.pdf  UNPROCESSED\n"
        );
    }

    #[test]
    fn test_format_empty_ledger() {
        assert_eq!(format_ledger(&Ledger::new()), "(ledger is empty)\n");
    }
}
