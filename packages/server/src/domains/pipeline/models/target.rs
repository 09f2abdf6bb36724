use super::dataset::MatchRule;
use crate::domains::pipeline::matching::file_name_of;

/// What a submission is recognized by in the output tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTarget {
    /// Full constructed remote path, e.g. `incoming/2024-01-01/notes.txt`
    pub remote_path: Option<String>,
    pub file_name: Option<String>,
    pub org_name: Option<String>,
    pub media_item_rid: Option<String>,
}

impl MatchTarget {
    /// Target for an uploaded artifact; the file name is the path's last segment.
    pub fn for_upload(remote_path: &str) -> Self {
        Self {
            remote_path: Some(remote_path.to_string()),
            file_name: Some(file_name_of(remote_path).to_string()),
            ..Self::default()
        }
    }

    pub fn with_org_name(mut self, org_name: Option<String>) -> Self {
        self.org_name = org_name;
        self
    }

    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }

    pub fn with_media_item_rid(mut self, rid: Option<String>) -> Self {
        self.media_item_rid = rid;
        self
    }

    /// Value a rule compares against; blank values count as absent.
    pub fn value_for(&self, rule: MatchRule) -> Option<&str> {
        let value = match rule {
            MatchRule::ExactPath => self.remote_path.as_deref(),
            MatchRule::FirstLine => self.org_name.as_deref(),
            MatchRule::FileName => self.file_name.as_deref(),
            MatchRule::ExactId | MatchRule::ContainsId => self.media_item_rid.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}
