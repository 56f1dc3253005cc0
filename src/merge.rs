// 🔀 Merge Workflow - operator-confirmed consolidation of a variation group
//
// A pending group either stays pending or is merged; a merge is terminal.
// Confirming one produces an immutable MergeTransaction, drops the affected
// filings from the working set, and recomputes groups and statistics with a
// full pass. There is no undo; restoring merged filings means re-ingesting
// the originals.

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::records::BusinessRecord;
use crate::stats::{generate_variation_stats, VariationStatistics};
use crate::variation::{detect_similar_companies, VariationGroup};

// ============================================================================
// MERGE TRANSACTION
// ============================================================================

/// Operator input required to confirm a merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Key of the pending group being merged.
    pub group_key: String,
    /// Final approved operator name.
    pub approved_name: String,
    /// Free-text reason recorded in the audit history.
    pub reason: String,
    /// Id of the member record designated as authoritative.
    pub master_id: String,
}

/// Audit entry for one confirmed merge. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeTransaction {
    pub id: String,
    pub group_key: String,
    pub merged_name: String,
    pub reason: String,
    pub master: BusinessRecord,
    /// Every filing that belonged to the merged group, master included.
    pub affected: Vec<BusinessRecord>,
    pub created_at: DateTime<Utc>,
}

impl MergeTransaction {
    /// Raw company names folded into this merge, for history display.
    pub fn original_names(&self) -> Vec<&str> {
        self.affected
            .iter()
            .map(|record| record.company_name.as_str())
            .collect()
    }

    pub fn affected_count(&self) -> usize {
        self.affected.len()
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Why a merge confirmation was rejected. Rejection leaves the pending
/// list, the record set and the history untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("no pending variation group with key {0:?}")]
    UnknownGroup(String),

    #[error("approved name must not be empty")]
    EmptyApprovedName,

    #[error("no master record selected")]
    NoMasterSelected,

    #[error("record {0:?} is not a member of the selected group")]
    MasterNotInGroup(String),
}

// ============================================================================
// MERGE SESSION
// ============================================================================

/// Working state of one review session: the authoritative record set,
/// the pending variation groups, statistics, and the audit history.
///
/// All derived state is recomputed from the record set with a full pass
/// whenever the set changes. Single operator, one merge in flight at a
/// time; there is no version stamping on groups.
#[derive(Debug, Default)]
pub struct MergeSession {
    records: Vec<BusinessRecord>,
    pending: Vec<VariationGroup>,
    history: Vec<MergeTransaction>,
    stats: VariationStatistics,
}

impl MergeSession {
    /// Start a session over an ingested record set.
    pub fn new(records: Vec<BusinessRecord>) -> Self {
        let mut session = MergeSession {
            records,
            pending: Vec::new(),
            history: Vec::new(),
            stats: generate_variation_stats(&[]),
        };
        session.recompute();
        session
    }

    /// Replace the record set (new upload) and recompute. The audit
    /// history carries over; merges are not undone by re-ingesting.
    pub fn replace_records(&mut self, records: Vec<BusinessRecord>) {
        self.records = records;
        self.recompute();
    }

    /// Current record set.
    pub fn records(&self) -> &[BusinessRecord] {
        &self.records
    }

    /// Groups still awaiting an operator decision, largest first.
    pub fn pending_groups(&self) -> &[VariationGroup] {
        &self.pending
    }

    /// Audit history, most recent merge first.
    pub fn history(&self) -> &[MergeTransaction] {
        &self.history
    }

    /// Statistics over the current record set.
    pub fn stats(&self) -> &VariationStatistics {
        &self.stats
    }

    /// Look up a pending group by key.
    pub fn find_group(&self, group_key: &str) -> Option<&VariationGroup> {
        self.pending
            .iter()
            .find(|group| group.normalized_key == group_key)
    }

    /// Confirm a merge.
    ///
    /// Preconditions: the group must be pending, the approved name
    /// non-empty, and the master an explicit member of the group. On
    /// success the transaction is prepended to the history, the affected
    /// filings leave the working set, and pending groups and statistics
    /// are recomputed.
    pub fn confirm_merge(&mut self, request: MergeRequest) -> Result<&MergeTransaction, MergeError> {
        let group = self
            .find_group(&request.group_key)
            .ok_or_else(|| MergeError::UnknownGroup(request.group_key.clone()))?;

        if request.approved_name.trim().is_empty() {
            return Err(MergeError::EmptyApprovedName);
        }
        if request.master_id.is_empty() {
            return Err(MergeError::NoMasterSelected);
        }

        let master = group
            .companies
            .iter()
            .find(|member| member.record.id == request.master_id)
            .map(|member| member.record.clone())
            .ok_or_else(|| MergeError::MasterNotInGroup(request.master_id.clone()))?;

        let affected: Vec<BusinessRecord> = group
            .companies
            .iter()
            .map(|member| member.record.clone())
            .collect();

        let transaction = MergeTransaction {
            id: Uuid::new_v4().to_string(),
            group_key: request.group_key,
            merged_name: request.approved_name,
            reason: request.reason,
            master,
            affected,
            created_at: Utc::now(),
        };

        info!(
            "merge confirmed: {} filings -> {:?}",
            transaction.affected_count(),
            transaction.merged_name
        );

        self.records
            .retain(|record| !transaction.affected.iter().any(|a| a.id == record.id));
        self.history.insert(0, transaction);
        self.recompute();

        Ok(&self.history[0])
    }

    fn recompute(&mut self) {
        self.pending = detect_similar_companies(&self.records);
        self.stats = generate_variation_stats(&self.records);
    }
}

// ============================================================================
// TESTS
// ============================================================================
