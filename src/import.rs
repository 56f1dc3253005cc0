// 📂 Filing Import - CSV intake for operator filings
//
// Row-level problems (missing name, bad numbers, bad dates) never abort
// an import; they come back as issues attached to the report so the desk
// can chase the submitting operator. Exact duplicate rows from re-uploads
// are dropped by content fingerprint.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::records::{BusinessRecord, ProcessingStatus};

/// Accepted submission-date formats on filings.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// One row-level problem found during import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportIssue {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub field: String,
    pub message: String,
}

/// Outcome of one CSV import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub records: Vec<BusinessRecord>,
    pub rows_read: usize,
    pub duplicates_skipped: usize,
    pub issues: Vec<ImportIssue>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "{} rows read, {} filings accepted, {} duplicates skipped, {} issues",
            self.rows_read,
            self.records.len(),
            self.duplicates_skipped,
            self.issues.len()
        )
    }
}

/// Whether a submission date matches one of the accepted formats.
fn is_valid_submission_date(date: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(date, format).is_ok())
}

/// Load operator filings from a CSV file.
///
/// Rows that fail to deserialize or carry an empty company name are
/// recorded as issues and skipped. Rows whose submission date does not
/// parse are kept but demoted to 要確認 so the desk reviews them.
pub fn load_filings(path: &Path) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open filings CSV at {}", path.display()))?;

    let mut records = Vec::new();
    let mut issues = Vec::new();
    let mut rows_read = 0;
    let mut duplicates_skipped = 0;
    let mut seen = HashSet::new();

    for (index, row) in reader.deserialize::<BusinessRecord>().enumerate() {
        // +2: line 1 is the header
        let line = index + 2;
        rows_read += 1;

        let mut record = match row {
            Ok(record) => record,
            Err(err) => {
                issues.push(ImportIssue {
                    line,
                    field: "row".to_string(),
                    message: err.to_string(),
                });
                continue;
            }
        };

        if record.company_name.trim().is_empty() {
            issues.push(ImportIssue {
                line,
                field: "Company_Name".to_string(),
                message: "company name is empty".to_string(),
            });
            continue;
        }

        if !seen.insert(record.fingerprint()) {
            duplicates_skipped += 1;
            continue;
        }

        if !is_valid_submission_date(&record.submission_date) {
            warn!(
                "line {}: unparseable submission date {:?}, flagging for review",
                line, record.submission_date
            );
            issues.push(ImportIssue {
                line,
                field: "Submission_Date".to_string(),
                message: format!("unparseable date {:?}", record.submission_date),
            });
            record.status = ProcessingStatus::NeedsReview;
        }

        records.push(record);
    }

    let report = ImportReport {
        records,
        rows_read,
        duplicates_skipped,
        issues,
    };
    info!("import of {}: {}", path.display(), report.summary());
    Ok(report)
}
