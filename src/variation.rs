// 🔍 Variation Grouper - cluster filings that denote the same operator
//
// Partitions a record set by normalization key. Records whose name
// normalizes to the same key are treated as spelling variants of one
// real-world operator; only clusters with two or more members surface.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::normalizer::{normalize_company_name, NormalizationResult};
use crate::records::BusinessRecord;

/// A record together with the normalization derived from its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub record: BusinessRecord,
    pub normalization: NormalizationResult,
}

/// A cluster of ≥2 filings sharing one normalization key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationGroup {
    /// Shared grouping key. Opaque; not for display.
    pub normalized_key: String,
    /// Members in first-seen order.
    pub companies: Vec<GroupMember>,
    /// Member count; always equals `companies.len()` and is ≥ 2.
    pub count: usize,
    /// Canonical display name proposed for the merged operator: the
    /// normalized name of the first member encountered.
    pub suggested_name: String,
}

impl VariationGroup {
    /// Combined annual passengers across all member filings.
    pub fn total_passengers(&self) -> u64 {
        self.companies
            .iter()
            .map(|member| member.record.passenger_count)
            .sum()
    }

    /// Combined annual operating revenue across all member filings.
    pub fn total_revenue(&self) -> u64 {
        self.companies
            .iter()
            .map(|member| member.record.operating_revenue)
            .sum()
    }

    /// Whether a record id belongs to this group.
    pub fn contains_record(&self, record_id: &str) -> bool {
        self.companies
            .iter()
            .any(|member| member.record.id == record_id)
    }

    /// Raw company names of the members, in first-seen order.
    pub fn member_names(&self) -> Vec<&str> {
        self.companies
            .iter()
            .map(|member| member.record.company_name.as_str())
            .collect()
    }
}

/// Detect 表記ゆれ groups across a record set.
///
/// Records whose name normalizes to `None` (empty names) are silently
/// excluded; they are not errors. Groups come back sorted by size,
/// largest first; ties keep the order in which their keys were first
/// discovered in the input.
pub fn detect_similar_companies(records: &[BusinessRecord]) -> Vec<VariationGroup> {
    // Buckets keep discovery order; the map is only an index into them.
    let mut bucket_index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<GroupMember>)> = Vec::new();

    for record in records {
        let Some(normalization) = normalize_company_name(&record.company_name) else {
            continue;
        };
        let key = normalization.normalized_key.clone();
        let slot = *bucket_index.entry(key.clone()).or_insert_with(|| {
            buckets.push((key, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(GroupMember {
            record: record.clone(),
            normalization,
        });
    }

    let mut groups: Vec<VariationGroup> = buckets
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(normalized_key, members)| VariationGroup {
            suggested_name: members[0].normalization.normalized.clone(),
            count: members.len(),
            normalized_key,
            companies: members,
        })
        .collect();

    // Stable: equal counts keep first-discovery order.
    groups.sort_by(|a, b| b.count.cmp(&a.count));

    debug!(
        "detected {} variation groups across {} records",
        groups.len(),
        records.len()
    );

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ProcessingStatus;

    fn record(id: &str, company_name: &str) -> BusinessRecord {
        BusinessRecord {
            id: id.to_string(),
            company_name: company_name.to_string(),
            representative_name: "担当者".to_string(),
            prefecture: "東京都".to_string(),
            submission_date: "2024-06-01".to_string(),
            status: ProcessingStatus::Unprocessed,
            passenger_count: 1_000,
            operating_revenue: 2_000,
        }
    }

    #[test]
    fn test_groups_marker_and_width_variants_together() {
        let records = vec![
            record("R001", "東京バス株式会社"),
            record("R002", "(株)東京バス"),
            record("R003", "㈱東京ﾊﾞｽ"),
            record("R004", "トウキョウバス"),
        ];

        let groups = detect_similar_companies(&records);
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert!(group.count >= 3);
        assert!(group.contains_record("R001"));
        assert!(group.contains_record("R002"));
        assert!(group.contains_record("R003"));
        // Different script entirely; stays outside the cluster.
        assert!(!group.contains_record("R004"));
    }

    #[test]
    fn test_suggested_name_comes_from_first_member() {
        let records = vec![
            record("R001", "(株)東京バス"),
            record("R002", "東京バス株式会社"),
        ];
        let groups = detect_similar_companies(&records);
        assert_eq!(groups[0].suggested_name, "株式会社東京バス");
        assert_eq!(groups[0].companies[0].record.id, "R001");
        assert_eq!(groups[0].companies[1].record.id, "R002");
    }

    #[test]
    fn test_singletons_and_empty_names_excluded() {
        let records = vec![
            record("R001", "独立タクシー株式会社"),
            record("R002", ""),
            record("R003", "東京バス株式会社"),
            record("R004", "(株)東京バス"),
        ];
        let groups = detect_similar_companies(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn test_membership_matches_key_equality() {
        let records = vec![
            record("R001", "大阪交通株式会社"),
            record("R002", "大阪運輸(株)"),
            record("R003", "名古屋観光バス有限会社"),
            record("R004", "(有)名古屋ツーリズムバス"),
            record("R005", "独立運送株式会社"),
        ];
        let groups = detect_similar_companies(&records);

        for group in &groups {
            assert_eq!(group.count, group.companies.len());
            assert!(group.count >= 2);
            for member in &group.companies {
                assert_eq!(member.normalization.normalized_key, group.normalized_key);
            }
        }

        // 運輸 canonicalizes to 交通, so R001/R002 share a key.
        let osaka = groups
            .iter()
            .find(|g| g.contains_record("R001"))
            .expect("osaka group");
        assert!(osaka.contains_record("R002"));

        // ツーリズム canonicalizes to 観光, so R003/R004 share a key.
        let nagoya = groups
            .iter()
            .find(|g| g.contains_record("R003"))
            .expect("nagoya group");
        assert!(nagoya.contains_record("R004"));
    }

    #[test]
    fn test_sorted_by_size_with_stable_ties() {
        let records = vec![
            // Pair discovered first
            record("R001", "札幌タクシー株式会社"),
            record("R002", "(株)札幌タクシー"),
            // Trio
            record("R003", "東京バス株式会社"),
            record("R004", "(株)東京バス"),
            record("R005", "㈱東京ﾊﾞｽ"),
            // Pair discovered second
            record("R006", "仙台交通株式会社"),
            record("R007", "仙台運輸(株)"),
        ];
        let groups = detect_similar_companies(&records);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].count, 3);
        assert!(groups[0].contains_record("R003"));
        // Ties keep discovery order: 札幌 before 仙台.
        assert!(groups[1].contains_record("R001"));
        assert!(groups[2].contains_record("R006"));
    }

    #[test]
    fn test_group_roll_ups() {
        let mut first = record("R001", "東京バス株式会社");
        first.passenger_count = 100;
        first.operating_revenue = 1_000;
        let mut second = record("R002", "(株)東京バス");
        second.passenger_count = 50;
        second.operating_revenue = 500;

        let groups = detect_similar_companies(&[first, second]);
        assert_eq!(groups[0].total_passengers(), 150);
        assert_eq!(groups[0].total_revenue(), 1_500);
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_similar_companies(&[]).is_empty());
    }
}
