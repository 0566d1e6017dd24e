//! Schema normalization for kbpress.
//!
//! Turns heterogeneous spreadsheet rows into the fixed-field documents the
//! chatbot consumes. This crate provides:
//! - [`TableSchema`] — declarative required-column descriptors
//! - [`normalize_faqs`] / [`normalize_promos`] — table → document projection
//! - [`merge_overrides`] — the optional promotion override merge

mod merge;
mod schema;

use kbpress_shared::{FaqDocument, FaqRow, PromoDocument, PromoRow, Result, unix_now};
use kbpress_tabular::Table;
use tracing::debug;

pub use merge::merge_overrides;
pub use schema::{FAQ_SCHEMA, OVERRIDE_SCHEMA, PROMO_SCHEMA, TableSchema};

/// Normalize a FAQ table into a [`FaqDocument`].
///
/// Every required column must be present; the first missing one fails the
/// call. Rows are projected in source order, each field trimmed, and the
/// document stamped with the current time.
pub fn normalize_faqs(table: &Table) -> Result<FaqDocument> {
    FAQ_SCHEMA.check(table)?;

    let rows = FAQ_SCHEMA
        .project(table)
        .into_iter()
        .map(|values| {
            let mut values = values.into_iter();
            FaqRow {
                intent: values.next().unwrap_or_default(),
                keywords: values.next().unwrap_or_default(),
                answer: values.next().unwrap_or_default(),
            }
        })
        .collect::<Vec<_>>();

    debug!(rows = rows.len(), "faqs normalized");

    Ok(FaqDocument {
        rows,
        generated_at: unix_now(),
    })
}

/// Normalize a promotion table into a [`PromoDocument`].
pub fn normalize_promos(table: &Table) -> Result<PromoDocument> {
    PROMO_SCHEMA.check(table)?;

    let rows = PROMO_SCHEMA
        .project(table)
        .into_iter()
        .map(|values| {
            let mut values = values.into_iter();
            PromoRow {
                name: values.next().unwrap_or_default(),
                trigger_keywords: values.next().unwrap_or_default(),
                message: values.next().unwrap_or_default(),
                start_date: values.next().unwrap_or_default(),
                end_date: values.next().unwrap_or_default(),
            }
        })
        .collect::<Vec<_>>();

    debug!(rows = rows.len(), "promos normalized");

    Ok(PromoDocument {
        rows,
        generated_at: unix_now(),
    })
}

/// Re-normalize an already-assembled promotion row set.
///
/// Used by the override merge so the combined rows pass through the same
/// trimming and get a fresh `generated_at`.
pub fn normalize_promo_rows(rows: Vec<PromoRow>) -> PromoDocument {
    let rows = rows
        .into_iter()
        .map(|r| PromoRow {
            name: r.name.trim().to_string(),
            trigger_keywords: r.trigger_keywords.trim().to_string(),
            message: r.message.trim().to_string(),
            start_date: r.start_date.trim().to_string(),
            end_date: r.end_date.trim().to_string(),
        })
        .collect();

    PromoDocument {
        rows,
        generated_at: unix_now(),
    }
}
