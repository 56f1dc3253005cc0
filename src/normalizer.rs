// 🔤 Company Name Normalizer - 表記ゆれ detection core
// Folds width/case/punctuation, standardizes 法人格 markers and
// transport vocabulary, and derives the grouping key for a filing.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

// ============================================================================
// PATTERN TABLES
// ============================================================================
//
// Both tables are ordered slices, not maps: the first label whose variant
// matches wins, and replacements run top to bottom. Reordering entries
// changes produced keys.

/// 法人格 markers: standard label → surface variants (kanji form,
/// parenthesized abbreviation, circled character, katakana shorthand).
pub const LEGAL_ENTITY_PATTERNS: &[(&str, &[&str])] = &[
    ("株式会社", &["株式会社", "(株)", "㈱", "カ)", "ｶ)"]),
    ("有限会社", &["有限会社", "(有)", "㈲", "ユ)", "ﾕ)"]),
    ("合同会社", &["合同会社", "(同)", "㈳", "ゴ)", "ｺﾞ)"]),
    ("合資会社", &["合資会社", "(資)", "㈾", "シ)", "ｼ)"]),
    ("一般社団法人", &["一般社団法人", "(一社)", "㈳"]),
    ("公益社団法人", &["公益社団法人", "(公社)", "㈳"]),
    ("財団法人", &["財団法人", "(財)", "㈶"]),
    ("社会福祉法人", &["社会福祉法人", "(社福)", "㈳"]),
    ("医療法人", &["医療法人", "(医)", "㈱"]),
    ("学校法人", &["学校法人", "(学)", "㈱"]),
    ("宗教法人", &["宗教法人", "(宗)", "㈱"]),
];

/// Transport vocabulary: canonical term → variants, including half-width
/// katakana transliterations and Latin spellings.
///
/// 運輸 is listed under both 交通 and 運送; the 交通 row runs first and
/// consumes every occurrence, so the 運送 row never sees it.
pub const TRANSPORT_TERMS: &[(&str, &[&str])] = &[
    ("バス", &["バス", "ﾊﾞｽ", "bus", "Bus", "BUS"]),
    ("タクシー", &["タクシー", "ﾀｸｼｰ", "taxi", "Taxi", "TAXI"]),
    ("交通", &["交通", "ｺｳﾂｳ", "運輸", "ｳﾝﾕ"]),
    ("観光", &["観光", "ｶﾝｺｳ", "ツーリズム", "tourism", "Tourism"]),
    ("運送", &["運送", "ｳﾝｿｳ", "運輸", "ｳﾝﾕ"]),
    ("サービス", &["サービス", "ｻｰﾋﾞｽ", "service", "Service", "SERVICE"]),
];

/// Compile one table of literal variants into case-insensitive regexes,
/// preserving entry order.
fn compile_table(table: &[(&'static str, &[&'static str])]) -> Vec<(&'static str, Vec<Regex>)> {
    table
        .iter()
        .map(|(standard, variants)| {
            let compiled = variants
                .iter()
                .map(|variant| {
                    RegexBuilder::new(&regex::escape(variant))
                        .case_insensitive(true)
                        .build()
                        .expect("escaped literal always compiles")
                })
                .collect();
            (*standard, compiled)
        })
        .collect()
}

static LEGAL_ENTITY_REGEXES: Lazy<Vec<(&'static str, Vec<Regex>)>> =
    Lazy::new(|| compile_table(LEGAL_ENTITY_PATTERNS));

static TRANSPORT_TERM_REGEXES: Lazy<Vec<(&'static str, Vec<Regex>)>> =
    Lazy::new(|| compile_table(TRANSPORT_TERMS));

// ============================================================================
// TEXT NORMALIZER
// ============================================================================

/// Characters stripped from grouping keys: separators, brackets, spacing.
fn is_stripped(c: char) -> bool {
    matches!(
        c,
        '・' | '-' | '_' | '(' | ')' | '（' | '）' | '【' | '】' | '「' | '」' | '『' | '』'
    ) || c.is_whitespace()
}

/// Fold a raw string for key comparison.
///
/// - Full-width Latin letters and digits shift down by 0xFEE0.
/// - Full-width katakana (U+30A1..=U+30F6) shifts down by 0x60. That shift
///   lands in the hiragana block, not the half-width katakana block; the
///   folded form is only ever used inside grouping keys, never displayed,
///   and must stay byte-stable so previously produced keys keep matching.
/// - Separator/bracket characters and whitespace are dropped.
/// - The result is lowercased.
///
/// Total over any input; empty in, empty out. Idempotent.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let folded = match c {
            'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９' => {
                char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
            }
            '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
            _ => c,
        };
        if is_stripped(folded) {
            continue;
        }
        for lower in folded.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

// ============================================================================
// LEGAL ENTITY CLASSIFIER
// ============================================================================

/// Result of splitting a 法人格 marker out of a company name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntitySplit {
    /// Standard label + base name, e.g. "株式会社東京バス".
    pub normalized_name: String,
    /// Detected standard label, empty when no marker matched.
    pub legal_entity: String,
    /// Name with the matched marker removed and trimmed.
    pub base_name: String,
}

/// Detect and standardize the corporate-form marker embedded anywhere in a
/// name. First match wins, across labels and across variants, in table
/// order; all occurrences of the matched variant are removed from the base.
///
/// No marker → `legal_entity` empty and the name passes through unchanged.
pub fn normalize_legal_entity(company_name: &str) -> LegalEntitySplit {
    if company_name.is_empty() {
        return LegalEntitySplit {
            normalized_name: String::new(),
            legal_entity: String::new(),
            base_name: String::new(),
        };
    }

    for (standard, variants) in LEGAL_ENTITY_REGEXES.iter() {
        for variant in variants {
            if variant.is_match(company_name) {
                let base_name = variant.replace_all(company_name, "").trim().to_string();
                return LegalEntitySplit {
                    normalized_name: format!("{}{}", standard, base_name),
                    legal_entity: (*standard).to_string(),
                    base_name,
                };
            }
        }
    }

    LegalEntitySplit {
        normalized_name: company_name.to_string(),
        legal_entity: String::new(),
        base_name: company_name.to_string(),
    }
}

// ============================================================================
// TRANSPORT TERM CANONICALIZER
// ============================================================================

/// Rewrite transport vocabulary variants to their canonical term.
///
/// Every variant of every canonical term is replaced globally, in table
/// order. Earlier rows may consume substrings that later rows would have
/// matched; the sequencing is part of the contract.
pub fn normalize_transport_terms(text: &str) -> String {
    let mut normalized = text.to_string();
    for (standard, variants) in TRANSPORT_TERM_REGEXES.iter() {
        for variant in variants {
            if variant.is_match(&normalized) {
                normalized = variant.replace_all(&normalized, *standard).into_owned();
            }
        }
    }
    normalized
}

// ============================================================================
// NAME NORMALIZATION PIPELINE
// ============================================================================

/// Full normalization of one raw company name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationResult {
    /// Input exactly as entered on the filing.
    pub original: String,
    /// Canonical display name: standard 法人格 label + base name.
    pub normalized: String,
    /// Fully folded string used for equality-based grouping. Opaque;
    /// not intended for display.
    pub normalized_key: String,
    /// Detected standard 法人格 label, empty when none matched.
    pub legal_entity: String,
    /// Base name with transport vocabulary canonicalized.
    pub base_name: String,
    /// Width/case fold of the raw input, no marker or term substitution.
    pub basic_normalized: String,
}

/// Normalize a raw company name into display form and grouping key.
/// Returns `None` only for empty input.
///
/// The step order is load-bearing: the marker tables must see the raw
/// casing and punctuation, and the final fold runs only after marker and
/// vocabulary substitution, so that two names differing in corporate-form
/// notation or term spelling collapse to the same key.
pub fn normalize_company_name(company_name: &str) -> Option<NormalizationResult> {
    if company_name.is_empty() {
        return None;
    }

    // 1. Width/case fold of the raw input
    let basic_normalized = normalize_text(company_name);

    // 2. 法人格 split on the raw input
    let split = normalize_legal_entity(company_name);

    // 3. Transport vocabulary on the base name
    let base_name = normalize_transport_terms(&split.base_name);

    // 4. Grouping key from the canonicalized base
    let normalized_key = normalize_text(&base_name);

    Some(NormalizationResult {
        original: company_name.to_string(),
        normalized: split.normalized_name,
        normalized_key,
        legal_entity: split.legal_entity,
        base_name,
        basic_normalized,
    })
}

// ============================================================================
// TESTS
// ============================================================================
