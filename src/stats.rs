// 📊 Variation Statistics - summary metrics over a record set
//
// Single-shot aggregation recomputed from the current record set after
// every change (new upload, confirmed merge); nothing is updated
// incrementally.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::normalizer::normalize_company_name;
use crate::records::BusinessRecord;
use crate::variation::{detect_similar_companies, VariationGroup};

/// How many of the largest groups are carried in the summary.
const TOP_GROUP_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationStatistics {
    /// Input record count.
    pub total_companies: usize,
    /// Distinct normalization keys across records with a non-empty name.
    pub unique_normalized_names: usize,
    /// Number of detected variation groups.
    pub variation_groups: usize,
    /// Records sitting inside some variation group.
    pub total_variations: usize,
    /// Records that would disappear if every group merged down to one.
    pub potential_duplicates: usize,
    /// Occurrences per detected 法人格 label. Records with no detected
    /// marker are not counted under any bucket.
    pub legal_entity_distribution: HashMap<String, usize>,
    /// The largest groups, in the grouper's size-sorted order.
    pub top_variation_groups: Vec<VariationGroup>,
}

impl Default for VariationStatistics {
    /// Statistics of an empty record set: every count zero.
    fn default() -> Self {
        VariationStatistics {
            total_companies: 0,
            unique_normalized_names: 0,
            variation_groups: 0,
            total_variations: 0,
            potential_duplicates: 0,
            legal_entity_distribution: HashMap::new(),
            top_variation_groups: Vec::new(),
        }
    }
}

impl VariationStatistics {
    /// One-line report for logs and the console report.
    pub fn summary(&self) -> String {
        format!(
            "{} filings, {} unique names | {} variation groups covering {} filings, {} potential duplicates",
            self.total_companies,
            self.unique_normalized_names,
            self.variation_groups,
            self.total_variations,
            self.potential_duplicates
        )
    }
}

/// Aggregate variation metrics over a record set.
pub fn generate_variation_stats(records: &[BusinessRecord]) -> VariationStatistics {
    let groups = detect_similar_companies(records);

    let unique_normalized_names = records
        .iter()
        .filter_map(|record| normalize_company_name(&record.company_name))
        .map(|normalization| normalization.normalized_key)
        .collect::<HashSet<_>>()
        .len();

    let total_variations: usize = groups.iter().map(|group| group.count).sum();
    let potential_duplicates: usize = groups.iter().map(|group| group.count - 1).sum();

    let mut legal_entity_distribution: HashMap<String, usize> = HashMap::new();
    for record in records {
        if let Some(normalization) = normalize_company_name(&record.company_name) {
            if !normalization.legal_entity.is_empty() {
                *legal_entity_distribution
                    .entry(normalization.legal_entity)
                    .or_insert(0) += 1;
            }
        }
    }

    let top_variation_groups: Vec<VariationGroup> =
        groups.iter().take(TOP_GROUP_LIMIT).cloned().collect();

    VariationStatistics {
        total_companies: records.len(),
        unique_normalized_names,
        variation_groups: groups.len(),
        total_variations,
        potential_duplicates,
        legal_entity_distribution,
        top_variation_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{BusinessRecord, ProcessingStatus};

    fn record(id: &str, company_name: &str) -> BusinessRecord {
        BusinessRecord {
            id: id.to_string(),
            company_name: company_name.to_string(),
            representative_name: "担当者".to_string(),
            prefecture: "東京都".to_string(),
            submission_date: "2024-06-01".to_string(),
            status: ProcessingStatus::Unprocessed,
            passenger_count: 0,
            operating_revenue: 0,
        }
    }

    #[test]
    fn test_empty_record_set() {
        let stats = generate_variation_stats(&[]);
        assert_eq!(stats.total_companies, 0);
        assert_eq!(stats.unique_normalized_names, 0);
        assert_eq!(stats.variation_groups, 0);
        assert_eq!(stats.total_variations, 0);
        assert_eq!(stats.potential_duplicates, 0);
        assert!(stats.legal_entity_distribution.is_empty());
        assert!(stats.top_variation_groups.is_empty());
    }

    #[test]
    fn test_counts_are_consistent_with_groups() {
        let records = vec![
            record("R001", "東京バス株式会社"),
            record("R002", "(株)東京バス"),
            record("R003", "㈱東京ﾊﾞｽ"),
            record("R004", "名古屋観光バス有限会社"),
            record("R005", "(有)名古屋観光バス"),
            record("R006", "独立タクシー合同会社"),
        ];
        let stats = generate_variation_stats(&records);

        assert_eq!(stats.total_companies, 6);
        // 東京バス key, 名古屋観光バス key, 独立タクシー key
        assert_eq!(stats.unique_normalized_names, 3);
        assert_eq!(stats.variation_groups, 2);
        assert_eq!(stats.total_variations, 5);
        assert_eq!(stats.potential_duplicates, 3);

        let groups = detect_similar_companies(&records);
        let expected_variations: usize = groups.iter().map(|g| g.count).sum();
        let expected_duplicates: usize = groups.iter().map(|g| g.count - 1).sum();
        assert_eq!(stats.total_variations, expected_variations);
        assert_eq!(stats.potential_duplicates, expected_duplicates);
    }

    #[test]
    fn test_legal_entity_distribution_skips_unmarked_names() {
        let records = vec![
            record("R001", "東京バス株式会社"),
            record("R002", "(株)東京バス"),
            record("R003", "名古屋観光バス有限会社"),
            record("R004", "トウキョウバス"),
        ];
        let stats = generate_variation_stats(&records);

        assert_eq!(stats.legal_entity_distribution.get("株式会社"), Some(&2));
        assert_eq!(stats.legal_entity_distribution.get("有限会社"), Some(&1));
        // No bucket for the unmarked name, under any label.
        let counted: usize = stats.legal_entity_distribution.values().sum();
        assert_eq!(counted, 3);
    }

    #[test]
    fn test_top_groups_are_capped_and_size_sorted() {
        let mut records = Vec::new();
        // Twelve pairs, one trio; the trio must lead.
        for i in 0..12 {
            records.push(record(&format!("A{}", i), &format!("第{}交通株式会社", i)));
            records.push(record(&format!("B{}", i), &format!("(株)第{}交通", i)));
        }
        records.push(record("C1", "東京バス株式会社"));
        records.push(record("C2", "(株)東京バス"));
        records.push(record("C3", "㈱東京バス"));

        let stats = generate_variation_stats(&records);
        assert_eq!(stats.variation_groups, 13);
        assert_eq!(stats.top_variation_groups.len(), 10);
        assert_eq!(stats.top_variation_groups[0].count, 3);
        assert!(stats.top_variation_groups[0].contains_record("C1"));
    }

    #[test]
    fn test_summary_mentions_key_figures() {
        let records = vec![
            record("R001", "東京バス株式会社"),
            record("R002", "(株)東京バス"),
        ];
        let summary = generate_variation_stats(&records).summary();
        assert!(summary.contains("2 filings"));
        assert!(summary.contains("1 variation group"));
    }
}
