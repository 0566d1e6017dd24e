//! Declarative table schemas and row projection.
//!
//! Each document type is described by an ordered list of required column
//! names. Validation and projection are generic over the descriptor, so
//! per-document-type code stays down to a constructor.

use kbpress_shared::{PublishError, Result};
use kbpress_tabular::Table;

/// Required columns for a document type, in projection order.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    /// Table label used in error messages and logs.
    pub doc: &'static str,
    /// Required column names.
    pub columns: &'static [&'static str],
}

/// FAQ table: one row per intent.
pub const FAQ_SCHEMA: TableSchema = TableSchema {
    doc: "faqs",
    columns: &["intent", "keywords", "answer"],
};

/// Promotion table.
pub const PROMO_SCHEMA: TableSchema = TableSchema {
    doc: "promos",
    columns: &["name", "trigger_keywords", "message", "start_date", "end_date"],
};

/// Per-location promotion override table. `target_slug` selects which
/// locations a row applies to (`*` matches all).
pub const OVERRIDE_SCHEMA: TableSchema = TableSchema {
    doc: "overrides",
    columns: &[
        "target_slug",
        "name",
        "trigger_keywords",
        "message",
        "start_date",
        "end_date",
    ],
};

impl TableSchema {
    /// Verify every required column is present in the table header.
    ///
    /// Fails on the first missing column, naming it.
    pub fn check(&self, table: &Table) -> Result<()> {
        for column in self.columns {
            if table.column(column).is_none() {
                return Err(PublishError::schema(self.doc, *column));
            }
        }
        Ok(())
    }

    /// Project every row onto the schema columns, in source order.
    ///
    /// Each value is the trimmed cell text; cells absent from a row come
    /// back as empty strings. Column order follows [`Self::columns`].
    pub fn project(&self, table: &Table) -> Vec<Vec<String>> {
        let indices: Vec<Option<usize>> =
            self.columns.iter().map(|c| table.column(c)).collect();

        (0..table.row_count())
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| match idx {
                        Some(col) => table.cell(row, *col).trim().to_string(),
                        None => String::new(),
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_names_first_missing_column() {
        let table = Table::from_csv("intent\nhours\n").unwrap();
        let err = FAQ_SCHEMA.check(&table).unwrap_err();
        assert_eq!(err.to_string(), "faqs: missing column keywords");
    }

    #[test]
    fn check_accepts_extra_columns() {
        let table =
            Table::from_csv("answer,intent,keywords,notes\n9-5,hours,open,internal\n").unwrap();
        assert!(FAQ_SCHEMA.check(&table).is_ok());
    }

    #[test]
    fn project_follows_schema_order_not_table_order() {
        let table = Table::from_csv("answer,intent,keywords\n9-5,hours,\" open,hours \"\n").unwrap();

        let rows = FAQ_SCHEMA.project(&table);
        assert_eq!(rows, vec![vec!["hours", "open,hours", "9-5"]]);
    }

    #[test]
    fn project_defaults_missing_cells_to_empty() {
        let table = Table::from_csv("intent,keywords,answer\nhours\n").unwrap();

        let rows = FAQ_SCHEMA.project(&table);
        assert_eq!(rows, vec![vec!["hours", "", ""]]);
    }
}
