//! Location registry parsing.
//!
//! The registry is itself a spreadsheet table: one row per business
//! location, naming the dataset and tables that hold the location's FAQ
//! and promotion data.

use kbpress_normalize::TableSchema;
use kbpress_shared::{RegistryEntry, Result};
use kbpress_tabular::Table;
use tracing::debug;

/// Required registry columns. `locales_sheet_name` is optional, as are the
/// presentation columns (`display_name`, `folder`) this pipeline ignores.
pub const REGISTRY_SCHEMA: TableSchema = TableSchema {
    doc: "registry",
    columns: &[
        "slug",
        "wa_id",
        "doc_id",
        "faqs_sheet_name",
        "promos_sheet_name",
    ],
};

/// Column naming the optional promotion override table.
const OVERRIDES_COLUMN: &str = "locales_sheet_name";

/// Default FAQ table name when the registry cell is blank.
const DEFAULT_FAQS_TABLE: &str = "faqs";

/// Default promotion table name when the registry cell is blank.
const DEFAULT_PROMOS_TABLE: &str = "promos";

/// Parse the registry table into location entries.
///
/// A missing required column is fatal. Rows with a blank `slug`, `wa_id`,
/// or `doc_id` are dropped silently; they contribute nothing downstream.
/// Row order is preserved so later rows win routing collisions.
pub fn parse_registry(table: &Table) -> Result<Vec<RegistryEntry>> {
    REGISTRY_SCHEMA.check(table)?;

    let mut entries = Vec::new();

    for row in 0..table.row_count() {
        let cell = |name: &str| -> String {
            table
                .column(name)
                .map(|col| table.cell(row, col).trim().to_string())
                .unwrap_or_default()
        };

        let slug = cell("slug");
        let external_id = cell("wa_id");
        let dataset_id = cell("doc_id");

        if slug.is_empty() || external_id.is_empty() || dataset_id.is_empty() {
            debug!(row, "registry row incomplete, skipping");
            continue;
        }

        entries.push(RegistryEntry {
            slug,
            external_id,
            dataset_id,
            faqs_table: non_blank_or(cell("faqs_sheet_name"), DEFAULT_FAQS_TABLE),
            promos_table: non_blank_or(cell("promos_sheet_name"), DEFAULT_PROMOS_TABLE),
            overrides_table: Some(cell(OVERRIDES_COLUMN)).filter(|s| !s.is_empty()),
        });
    }

    Ok(entries)
}

fn non_blank_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "slug,wa_id,doc_id,faqs_sheet_name,promos_sheet_name,locales_sheet_name";

    #[test]
    fn parses_complete_rows() {
        let table = Table::from_csv(&format!(
            "{HEADER}\nstore1,5551234,D1,faqs,promos,locales\n"
        ))
        .unwrap();

        let entries = parse_registry(&table).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slug, "store1");
        assert_eq!(entries[0].external_id, "5551234");
        assert_eq!(entries[0].overrides_table.as_deref(), Some("locales"));
    }

    #[test]
    fn blank_table_names_fall_back_to_defaults() {
        let table =
            Table::from_csv(&format!("{HEADER}\nstore1,5551234,D1,,,\n")).unwrap();

        let entries = parse_registry(&table).unwrap();
        assert_eq!(entries[0].faqs_table, "faqs");
        assert_eq!(entries[0].promos_table, "promos");
        assert!(entries[0].overrides_table.is_none());
    }

    #[test]
    fn incomplete_rows_are_dropped_silently() {
        let table = Table::from_csv(&format!(
            "{HEADER}\n,5551234,D1,,,\nstore2,,D2,,,\nstore3,5553456,,,,\nstore4,5554567,D4,,,\n"
        ))
        .unwrap();

        let entries = parse_registry(&table).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slug, "store4");
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let table = Table::from_csv("slug,doc_id\nstore1,D1\n").unwrap();

        let err = parse_registry(&table).unwrap_err();
        assert_eq!(err.to_string(), "registry: missing column wa_id");
    }

    #[test]
    fn optional_columns_may_be_absent_entirely() {
        let table = Table::from_csv(
            "slug,wa_id,doc_id,faqs_sheet_name,promos_sheet_name\nstore1,5551234,D1,f,p\n",
        )
        .unwrap();

        let entries = parse_registry(&table).unwrap();
        assert_eq!(entries[0].faqs_table, "f");
        assert!(entries[0].overrides_table.is_none());
    }

    #[test]
    fn row_order_is_preserved() {
        let table = Table::from_csv(&format!(
            "{HEADER}\nb,2,D2,,,\na,1,D1,,,\n"
        ))
        .unwrap();

        let entries = parse_registry(&table).unwrap();
        let slugs: Vec<&str> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, ["b", "a"]);
    }
}
