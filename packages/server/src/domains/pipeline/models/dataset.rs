use serde::{Deserialize, Serialize};

use crate::config::PipelineDatasets;

/// The output tables the pipeline produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKey {
    Qna,
    Summary,
    General,
    Events,
}

impl DatasetKey {
    /// Outputs produced from a text artifact
    pub const TEXT_OUTPUTS: [DatasetKey; 3] = [DatasetKey::Qna, DatasetKey::Summary, DatasetKey::General];

    pub fn rid<'a>(&self, datasets: &'a PipelineDatasets) -> &'a str {
        match self {
            DatasetKey::Qna => &datasets.qna,
            DatasetKey::Summary => &datasets.summary,
            DatasetKey::General => &datasets.general,
            DatasetKey::Events => &datasets.events,
        }
    }

    pub fn schema(&self) -> DatasetSchema {
        let candidates = match self {
            DatasetKey::Qna | DatasetKey::Summary | DatasetKey::General => TEXT_OUTPUT_COLUMNS,
            DatasetKey::Events => EVENT_COLUMNS,
        };
        DatasetSchema {
            key: *self,
            candidates,
        }
    }
}

impl std::fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetKey::Qna => write!(f, "qna"),
            DatasetKey::Summary => write!(f, "summary"),
            DatasetKey::General => write!(f, "general"),
            DatasetKey::Events => write!(f, "events"),
        }
    }
}

impl std::str::FromStr for DatasetKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qna" => Ok(DatasetKey::Qna),
            "summary" => Ok(DatasetKey::Summary),
            "general" => Ok(DatasetKey::General),
            "events" => Ok(DatasetKey::Events),
            _ => Err(anyhow::anyhow!(
                "dataset must be one of qna|general|summary|events, got '{}'",
                s
            )),
        }
    }
}

/// How a candidate column is compared against the submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Cell equals the full remote path after CR/LF removal and trimming
    ExactPath,
    /// First line of the cell equals the organization name
    FirstLine,
    /// Last `/` segment of the cell equals the file name
    FileName,
    /// Cell equals the media item rid
    ExactId,
    /// Cell contains the media item rid
    ContainsId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchColumn {
    pub column: &'static str,
    pub rule: MatchRule,
}

const fn col(column: &'static str, rule: MatchRule) -> MatchColumn {
    MatchColumn { column, rule }
}

const TEXT_OUTPUT_COLUMNS: &[MatchColumn] = &[
    col("_file", MatchRule::ExactPath),
    col("org_name", MatchRule::FirstLine),
    col("path", MatchRule::FileName),
];

const EVENT_COLUMNS: &[MatchColumn] = &[
    col("media_item_rid", MatchRule::ExactId),
    col("mediaItemRid", MatchRule::ExactId),
    col("MEDIA_ITEM_RID", MatchRule::ExactId),
    col("mediaitemrid", MatchRule::ExactId),
    col("media_reference", MatchRule::ContainsId),
    col("org_name", MatchRule::FirstLine),
    col("path", MatchRule::FileName),
];

/// Declared match columns of one output table, in priority order
#[derive(Debug, Clone, Copy)]
pub struct DatasetSchema {
    pub key: DatasetKey,
    pub candidates: &'static [MatchColumn],
}

/// An output table to poll
#[derive(Debug, Clone)]
pub struct OutputTable {
    pub key: DatasetKey,
    pub rid: String,
}

impl OutputTable {
    pub fn new(key: DatasetKey, datasets: &PipelineDatasets) -> Self {
        Self {
            key,
            rid: key.rid(datasets).to_string(),
        }
    }

    pub fn text_outputs(datasets: &PipelineDatasets) -> Vec<Self> {
        DatasetKey::TEXT_OUTPUTS
            .iter()
            .map(|key| Self::new(*key, datasets))
            .collect()
    }
}
