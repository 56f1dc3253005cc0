use anyhow::Result;
use std::env;
use std::path::Path;

use operator_filings::{load_filings, MergeSession};

const DEFAULT_CSV: &str = "data/sample_filings.csv";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let csv_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_CSV);

    run_analysis(Path::new(csv_path))
}

fn run_analysis(csv_path: &Path) -> Result<()> {
    println!("🚌 事業者提出データ 表記ゆれ分析");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load filings
    println!("\n📂 Loading filings from {} ...", csv_path.display());
    let report = load_filings(csv_path)?;
    println!("✓ {}", report.summary());
    for issue in &report.issues {
        println!("  ⚠ line {}: {} ({})", issue.line, issue.message, issue.field);
    }

    // 2. Detect variation groups
    let session = MergeSession::new(report.records);
    let stats = session.stats();

    println!("\n🔍 Variation analysis");
    println!("✓ {}", stats.summary());

    if !session.pending_groups().is_empty() {
        println!("\n📋 Pending groups (largest first)");
        for (rank, group) in session.pending_groups().iter().enumerate() {
            println!(
                "  {}. {} — {}件 | 輸送人員 {}人 | 営業収入 ¥{}",
                rank + 1,
                group.suggested_name,
                group.count,
                group.total_passengers(),
                group.total_revenue()
            );
            for name in group.member_names() {
                println!("       - {}", name);
            }
        }
    }

    // 3. Legal-entity distribution
    if !stats.legal_entity_distribution.is_empty() {
        println!("\n🏢 法人格の分布");
        let mut distribution: Vec<(&String, &usize)> =
            stats.legal_entity_distribution.iter().collect();
        distribution.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (label, count) in distribution {
            println!("  {:<8} {}件", label, count);
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Analysis complete");

    Ok(())
}
