use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Processing state of a filing as tracked by the review desk.
/// Serialized with the labels used on the filings themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingStatus {
    #[serde(rename = "処理済み")]
    Processed,
    #[serde(rename = "要確認")]
    NeedsReview,
    #[serde(rename = "未処理")]
    Unprocessed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Processed => "処理済み",
            ProcessingStatus::NeedsReview => "要確認",
            ProcessingStatus::Unprocessed => "未処理",
        }
    }
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        ProcessingStatus::Unprocessed
    }
}

/// One regulatory filing from a transport operator.
///
/// Core fields are immutable once ingested; the analysis passes only ever
/// read `company_name` and the roll-up figures. Column names follow the
/// intake CSV headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Company_Name")]
    pub company_name: String,

    #[serde(rename = "Representative")]
    pub representative_name: String,

    #[serde(rename = "Prefecture")]
    pub prefecture: String,

    #[serde(rename = "Submission_Date")]
    pub submission_date: String,

    #[serde(rename = "Status", default)]
    pub status: ProcessingStatus,

    /// Annual passengers carried (人).
    #[serde(rename = "Passenger_Count", default)]
    pub passenger_count: u64,

    /// Annual operating revenue (円).
    #[serde(rename = "Operating_Revenue", default)]
    pub operating_revenue: u64,
}

impl BusinessRecord {
    /// Content hash for duplicate-row detection on ingest.
    /// NOTE: this is for DEDUPLICATION of identical uploads, not identity;
    /// `id` is the identity.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.as_bytes());
        hasher.update(self.company_name.as_bytes());
        hasher.update(self.prefecture.as_bytes());
        hasher.update(self.submission_date.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, company_name: &str) -> BusinessRecord {
        BusinessRecord {
            id: id.to_string(),
            company_name: company_name.to_string(),
            representative_name: "山田太郎".to_string(),
            prefecture: "東京都".to_string(),
            submission_date: "2024-06-01".to_string(),
            status: ProcessingStatus::Unprocessed,
            passenger_count: 120_000,
            operating_revenue: 450_000_000,
        }
    }

    #[test]
    fn test_status_labels_round_trip() {
        for status in [
            ProcessingStatus::Processed,
            ProcessingStatus::NeedsReview,
            ProcessingStatus::Unprocessed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: ProcessingStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let a = record("R001", "東京バス株式会社");
        let b = record("R001", "東京バス株式会社");
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = record("R001", "(株)東京バス");
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_mutable_review_fields() {
        let mut a = record("R001", "東京バス株式会社");
        let before = a.fingerprint();
        a.status = ProcessingStatus::Processed;
        a.passenger_count += 1;
        assert_eq!(a.fingerprint(), before);
    }
}
