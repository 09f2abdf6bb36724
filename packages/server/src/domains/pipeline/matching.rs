//! Row matching against the declared dataset schemas.
//!
//! A schema lists candidate columns in priority order. The first candidate
//! whose column is present in the table *and* whose value the submission
//! carries decides the predicate; later candidates are not consulted.

use foundry_client::Table;

use super::models::{DatasetKey, DatasetSchema, MatchRule, MatchTarget};

/// No candidate column of the schema was usable for this table and target
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported schema for '{dataset}' output: no usable match column among {columns:?}")]
pub struct UnsupportedSchema {
    pub dataset: DatasetKey,
    pub columns: Vec<String>,
}

/// Drop CR/LF anywhere and trim surrounding whitespace
pub fn normalize_path(value: &str) -> String {
    value.replace(['\r', '\n'], "").trim().to_string()
}

/// Text before the first newline, trimmed
pub fn first_line(value: &str) -> &str {
    value.split('\n').next().unwrap_or_default().trim()
}

/// Last `/` segment of a path
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl MatchRule {
    pub fn matches(&self, cell: &str, needle: &str) -> bool {
        match self {
            MatchRule::ExactPath => normalize_path(cell) == normalize_path(needle),
            MatchRule::FirstLine => first_line(cell) == needle.trim(),
            MatchRule::FileName => file_name_of(&normalize_path(cell)) == needle.trim(),
            MatchRule::ExactId => cell.trim() == needle.trim(),
            MatchRule::ContainsId => cell.contains(needle.trim()),
        }
    }
}

/// Rows of `table` that belong to `target`.
///
/// A table without any columns has nothing to match and yields an empty
/// result rather than an error.
pub fn select_matching_rows(
    schema: &DatasetSchema,
    table: &Table,
    target: &MatchTarget,
) -> Result<Table, UnsupportedSchema> {
    if table.columns().is_empty() {
        return Ok(table.empty_like());
    }

    for candidate in schema.candidates {
        if !table.has_column(candidate.column) {
            continue;
        }
        let Some(needle) = target.value_for(candidate.rule) else {
            continue;
        };

        tracing::debug!(
            dataset = %schema.key,
            column = candidate.column,
            rule = ?candidate.rule,
            "Matching rows"
        );
        return Ok(table.filter_column(candidate.column, |cell| candidate.rule.matches(cell, needle)));
    }

    Err(UnsupportedSchema {
        dataset: schema.key,
        columns: table.columns().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn path_normalization_ignores_crlf_and_padding() {
        assert_eq!(
            normalize_path("  incoming/2024-01-01/notes.txt\r\n"),
            "incoming/2024-01-01/notes.txt"
        );
        assert!(MatchRule::ExactPath.matches(
            "incoming/2024-01-01/\nnotes.txt ",
            " incoming/2024-01-01/notes.txt"
        ));
    }

    #[test]
    fn first_line_and_file_name_helpers() {
        assert_eq!(first_line("Texas Blockchain\nAustin, TX"), "Texas Blockchain");
        assert_eq!(first_line(""), "");
        assert_eq!(file_name_of("incoming/2024-01-01/flyer.png"), "flyer.png");
        assert_eq!(file_name_of("flyer.png"), "flyer.png");
    }

    #[test]
    fn file_column_beats_org_name() {
        let t = table(
            &["org_name", "_file", "response"],
            &[
                &["Chess Club", "incoming/2024-01-01/other.txt", "a"],
                &["Other", "incoming/2024-01-01/notes.txt\r\n", "b"],
            ],
        );
        let target = MatchTarget::for_upload("incoming/2024-01-01/notes.txt")
            .with_org_name(Some("Chess Club".into()));

        let rows = select_matching_rows(&DatasetKey::Qna.schema(), &t, &target).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first_value("response"), Some("b"));
    }

    #[test]
    fn skips_candidates_the_target_cannot_satisfy() {
        // `_file` exists but the target has no remote path: falls through to org_name
        let t = table(
            &["_file", "org_name"],
            &[&["x", "Texas Blockchain\nAustin"], &["y", "Chess Club"]],
        );
        let target = MatchTarget::default().with_org_name(Some("Texas Blockchain".into()));

        let rows = select_matching_rows(&DatasetKey::General.schema(), &t, &target).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first_value("_file"), Some("x"));
    }

    #[test]
    fn events_match_media_reference_by_containment() {
        let t = table(
            &["media_reference", "title"],
            &[
                &["{\"mediaItemRid\":\"ri.mio.main.media-item.abc\"}", "Mixer"],
                &["{\"mediaItemRid\":\"ri.mio.main.media-item.zzz\"}", "Other"],
            ],
        );
        let target = MatchTarget::default()
            .with_media_item_rid(Some("ri.mio.main.media-item.abc".into()));

        let rows = select_matching_rows(&DatasetKey::Events.schema(), &t, &target).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first_value("title"), Some("Mixer"));
    }

    #[test]
    fn events_fall_back_to_file_name_without_rid() {
        let t = table(
            &["media_item_rid", "path"],
            &[&["ri.mio.main.media-item.1", "incoming/2024-01-01/flyer.png"]],
        );
        let target = MatchTarget::for_upload("incoming/2024-01-01/flyer.png");

        let rows = select_matching_rows(&DatasetKey::Events.schema(), &t, &target).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn events_prefer_org_name_over_file_name() {
        let t = table(
            &["path", "org_name", "title"],
            &[
                &["incoming/2024-01-01/flyer.png", "Robotics Society", "A"],
                &["incoming/2024-01-02/poster.png", "Chess Club\nweekly", "B"],
            ],
        );
        let target = MatchTarget::default()
            .with_file_name(Some("flyer.png".into()))
            .with_org_name(Some("Chess Club".into()));

        let rows = select_matching_rows(&DatasetKey::Events.schema(), &t, &target).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first_value("title"), Some("B"));
    }

    #[test]
    fn unsupported_schema_names_dataset_and_columns() {
        let t = table(&["title", "date"], &[&["Mixer", "2024-01-20"]]);
        let target = MatchTarget::for_upload("incoming/2024-01-01/flyer.png");

        let err = select_matching_rows(&DatasetKey::Summary.schema(), &t, &target).unwrap_err();
        assert_eq!(err.dataset, DatasetKey::Summary);
        assert_eq!(err.columns, ["title", "date"]);
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn columnless_table_is_empty_not_unsupported() {
        let rows = select_matching_rows(
            &DatasetKey::Qna.schema(),
            &Table::default(),
            &MatchTarget::for_upload("a.txt"),
        )
        .unwrap();
        assert!(rows.is_empty());
    }
}
