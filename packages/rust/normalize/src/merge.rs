//! Promotion override merge.
//!
//! An override table layers location-specific or chain-wide promotions onto
//! a location's base promotion table. The merge is an optional enhancement:
//! any failure here is returned to the caller, which logs it and keeps the
//! base document.

use kbpress_shared::{PromoDocument, PromoRow, Result};
use kbpress_tabular::Table;
use tracing::debug;

use crate::normalize_promo_rows;
use crate::schema::OVERRIDE_SCHEMA;

/// Matches every location.
const WILDCARD_SLUG: &str = "*";

/// Layer matching override rows onto a base promotion document.
///
/// Override rows apply when `target_slug` equals `slug` or is the `*`
/// wildcard. Matches keep their source order and are appended after the
/// base rows, then the combined set is re-normalized (which refreshes
/// `generated_at`).
pub fn merge_overrides(
    base: &PromoDocument,
    overrides: &Table,
    slug: &str,
) -> Result<PromoDocument> {
    OVERRIDE_SCHEMA.check(overrides)?;

    let mut combined = base.rows.clone();
    let mut matched = 0usize;

    for values in OVERRIDE_SCHEMA.project(overrides) {
        let mut values = values.into_iter();
        let target = values.next().unwrap_or_default();
        if target != slug && target != WILDCARD_SLUG {
            continue;
        }
        matched += 1;
        combined.push(PromoRow {
            name: values.next().unwrap_or_default(),
            trigger_keywords: values.next().unwrap_or_default(),
            message: values.next().unwrap_or_default(),
            start_date: values.next().unwrap_or_default(),
            end_date: values.next().unwrap_or_default(),
        });
    }

    debug!(slug, matched, base_rows = base.rows.len(), "overrides merged");

    Ok(normalize_promo_rows(combined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbpress_shared::unix_now;

    fn base_doc(names: &[&str]) -> PromoDocument {
        PromoDocument {
            rows: names
                .iter()
                .map(|n| PromoRow {
                    name: n.to_string(),
                    trigger_keywords: String::new(),
                    message: String::new(),
                    start_date: String::new(),
                    end_date: String::new(),
                })
                .collect(),
            generated_at: unix_now(),
        }
    }

    #[test]
    fn appends_exact_and_wildcard_matches_in_source_order() {
        let overrides = Table::from_csv(
            "target_slug,name,trigger_keywords,message,start_date,end_date\n\
             x,B,kw,msg,2024-01-01,2024-02-01\n\
             *,C,kw,msg,2024-01-01,2024-02-01\n\
             y,D,kw,msg,2024-01-01,2024-02-01\n",
        )
        .unwrap();

        let merged = merge_overrides(&base_doc(&["A"]), &overrides, "x").unwrap();

        let names: Vec<&str> = merged.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn no_matches_keeps_base_rows() {
        let overrides = Table::from_csv(
            "target_slug,name,trigger_keywords,message,start_date,end_date\n\
             other,B,kw,msg,,\n",
        )
        .unwrap();

        let base = base_doc(&["A"]);
        let merged = merge_overrides(&base, &overrides, "x").unwrap();

        assert_eq!(merged.rows, base.rows);
        assert!(merged.generated_at >= base.generated_at);
    }

    #[test]
    fn missing_override_column_is_an_error() {
        let overrides = Table::from_csv("target_slug,name\nx,B\n").unwrap();

        let err = merge_overrides(&base_doc(&[]), &overrides, "x").unwrap_err();
        assert_eq!(err.to_string(), "overrides: missing column trigger_keywords");
    }

    #[test]
    fn override_values_are_trimmed() {
        let overrides = Table::from_csv(
            "target_slug,name,trigger_keywords,message,start_date,end_date\n\
             x,\"  2x1 Pizza  \",pizza,Hoy 2x1,2024-01-01,2024-02-01\n",
        )
        .unwrap();

        let merged = merge_overrides(&base_doc(&[]), &overrides, "x").unwrap();
        assert_eq!(merged.rows[0].name, "2x1 Pizza");
    }
}
