//! Core domain types for the published knowledge base.
//!
//! These structs define the JSON contract consumed by the chatbot: the
//! per-location FAQ and promotion documents plus the top-level index that
//! maps messaging identities to location slugs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unix timestamp (seconds) for stamping generated documents.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One valid row of the location registry.
///
/// Rows with a blank `slug`, `external_id`, or `dataset_id` never become
/// entries; the registry parser drops them silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Stable short key identifying the location (`slugs/<slug>/` on disk).
    pub slug: String,
    /// Messaging-channel identity the bot routes on (e.g., a WhatsApp id).
    pub external_id: String,
    /// Spreadsheet document holding this location's tables.
    pub dataset_id: String,
    /// Named FAQ table within the dataset.
    pub faqs_table: String,
    /// Named promotion table within the dataset.
    pub promos_table: String,
    /// Named override table layering extra promotions, if any.
    pub overrides_table: Option<String>,
}

// ---------------------------------------------------------------------------
// Per-location documents
// ---------------------------------------------------------------------------

/// A single FAQ entry. No uniqueness constraint on `intent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRow {
    /// Intent label the bot matches on.
    pub intent: String,
    /// Comma-separated trigger keywords.
    pub keywords: String,
    /// Answer text sent to the user.
    pub answer: String,
}

/// The `faqs.json` document for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqDocument {
    /// FAQ entries in source order.
    pub rows: Vec<FaqRow>,
    /// Unix timestamp of normalization.
    pub generated_at: i64,
}

/// A single promotion. Dates are opaque strings; no parsing is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoRow {
    pub name: String,
    pub trigger_keywords: String,
    pub message: String,
    pub start_date: String,
    pub end_date: String,
}

/// The `promos.json` document for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoDocument {
    /// Promotions in source order, overrides appended after base rows.
    pub rows: Vec<PromoRow>,
    /// Unix timestamp of normalization (refreshed by the override merge).
    pub generated_at: i64,
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Relative locations of one slug's documents, resolved against the
/// index's own base URL by the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugMeta {
    /// Relative reference to `faqs.json` (e.g., `./slugs/store1/faqs.json`).
    pub faqs_url: String,
    /// Relative reference to `promos.json`.
    pub promos_url: String,
}

impl SlugMeta {
    /// Build the relative document references for a slug.
    pub fn for_slug(slug: &str) -> Self {
        Self {
            faqs_url: format!("./slugs/{slug}/faqs.json"),
            promos_url: format!("./slugs/{slug}/promos.json"),
        }
    }
}

/// The `index.json` document — the single entry point a consumer reads
/// first to discover routing and per-location documents.
///
/// Maps are ordered so repeated runs over identical sources produce
/// byte-identical output apart from timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Unix timestamp of the run.
    pub generated_at: i64,
    /// external_id → slug. Last registry row wins on duplicate ids.
    pub routing: BTreeMap<String, String>,
    /// slug → document locations.
    pub slugs: BTreeMap<String, SlugMeta>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faq_document_serialization() {
        let doc = FaqDocument {
            rows: vec![FaqRow {
                intent: "hours".into(),
                keywords: "open,hours".into(),
                answer: "9-5".into(),
            }],
            generated_at: 1_700_000_000,
        };

        let json = serde_json::to_string(&doc).expect("serialize");
        assert_eq!(
            json,
            r#"{"rows":[{"intent":"hours","keywords":"open,hours","answer":"9-5"}],"generated_at":1700000000}"#
        );

        let parsed: FaqDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, doc);
    }

    #[test]
    fn unicode_survives_serialization_unescaped() {
        let doc = PromoDocument {
            rows: vec![PromoRow {
                name: "Día del Niño".into(),
                trigger_keywords: "niño,promo".into(),
                message: "¡20% de descuento!".into(),
                start_date: "2024-04-30".into(),
                end_date: "2024-05-01".into(),
            }],
            generated_at: 0,
        };

        let json = serde_json::to_string(&doc).expect("serialize");
        assert!(json.contains("Día del Niño"));
        assert!(json.contains("¡20% de descuento!"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn slug_meta_relative_urls() {
        let meta = SlugMeta::for_slug("store1");
        assert_eq!(meta.faqs_url, "./slugs/store1/faqs.json");
        assert_eq!(meta.promos_url, "./slugs/store1/promos.json");
    }

    #[test]
    fn index_document_serialization() {
        let mut routing = BTreeMap::new();
        routing.insert("5551234".to_string(), "store1".to_string());
        let mut slugs = BTreeMap::new();
        slugs.insert("store1".to_string(), SlugMeta::for_slug("store1"));

        let index = IndexDocument {
            generated_at: 1_700_000_000,
            routing,
            slugs,
        };

        let json = serde_json::to_string(&index).expect("serialize");
        assert!(json.contains(r#""routing":{"5551234":"store1"}"#));
        assert!(json.contains(r#""faqs_url":"./slugs/store1/faqs.json""#));

        let parsed: IndexDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, index);
    }
}
