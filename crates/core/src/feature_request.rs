//! Forum-style feature requests with per-user votes.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    #[default]
    Open,
    Planned,
    InProgress,
    Done,
    Rejected,
}

impl FeatureStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Open => "open",
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Rejected => "rejected",
        }
    }

    /// Closed requests no longer accept votes.
    #[must_use]
    pub const fn accepts_votes(&self) -> bool {
        matches!(*self, Self::Open | Self::Planned | Self::InProgress)
    }
}

impl FromStr for FeatureStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "open" => Ok(Self::Open),
            "planned" => Ok(Self::Planned),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "done" | "completed" => Ok(Self::Done),
            "rejected" | "declined" => Ok(Self::Rejected),
            other => Err(CoreError::InvalidInput(format!("invalid feature status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Option<String>,
    pub status: FeatureStatus,
    pub vote_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFeatureRequest {
    pub title: String,
    pub description: Option<String>,
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVote {
    pub feature_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_status_parse_aliases() {
        assert_eq!("in-progress".parse::<FeatureStatus>().unwrap(), FeatureStatus::InProgress);
        assert_eq!("Completed".parse::<FeatureStatus>().unwrap(), FeatureStatus::Done);
        assert!("someday".parse::<FeatureStatus>().is_err());
    }

    #[test]
    fn test_closed_statuses_reject_votes() {
        assert!(FeatureStatus::Open.accepts_votes());
        assert!(!FeatureStatus::Done.accepts_votes());
        assert!(!FeatureStatus::Rejected.accepts_votes());
    }
}
