//! Sync types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{LeetCodeHandle, UserId};

/// Platform tag stamped on every auto-synced task.
pub const SYNC_PLATFORM: &str = "leetcode";

/// Problem difficulty as reported by LeetCode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[schema(example = "Medium")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Parses an upstream difficulty string; anything unrecognized falls back
    /// to [`Difficulty::Medium`], which also carries the default score.
    pub fn from_api(value: &str) -> Self {
        match value.trim() {
            v if v.eq_ignore_ascii_case("Easy") => Self::Easy,
            v if v.eq_ignore_ascii_case("Hard") => Self::Hard,
            _ => Self::Medium,
        }
    }

    /// XP awarded for one solved problem of this difficulty.
    pub fn points(self) -> i32 {
        match self {
            Self::Easy => 1,
            Self::Medium => 3,
            Self::Hard => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted submission as reported by the LeetCode API.
///
/// Transient: either discarded as a duplicate or turned into a new solved
/// task during reconciliation. The timestamp stays raw (the API serializes it
/// as a string) so a malformed value is a per-item error, not a fetch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// Submission id on the platform. Not stable per problem, so it is kept
    /// for provenance only and never used for dedup.
    pub submission_id: Option<String>,
    pub title: String,
    pub title_slug: String,
    /// Epoch seconds, UTC, as delivered by the API.
    pub timestamp: String,
    pub lang: Option<String>,
}

/// A user eligible for background sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub user_id: UserId,
    pub handle: LeetCodeHandle,
}

/// A practice log entry staged by the reconciler, not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSolvedTask {
    /// UTC calendar date of the submission, part of the dedup key.
    pub date: NaiveDate,
    pub title: String,
    pub problem_id: Option<String>,
    pub difficulty: Difficulty,
    pub points: i32,
    pub platform: String,
    pub notes: Option<String>,
}

/// Counts produced by one reconciliation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SyncOutcome {
    /// New solved tasks committed.
    pub created: u64,
    /// Fetched submissions that matched an existing `(title, date)` row.
    pub skipped: u64,
}

/// Request to register a LeetCode handle for sync.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct SetHandleRequest {
    /// LeetCode username. Verified against the platform before being stored.
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "tourist")]
    pub handle: String,
}

/// Response after a handle update.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SetHandleResponse {
    pub handle: LeetCodeHandle,
}

/// Acknowledgement for a scheduled on-demand sync run.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncScheduledResponse {
    /// Correlation id; resolvable later via the status endpoint.
    #[schema(value_type = String, example = "f47ac10b-58cc-4372-a567-0e02b2c3d479")]
    pub run_id: Uuid,
    pub handle: LeetCodeHandle,
    pub limit: u32,
}

/// Summary of the most recent sync run for a user, periodic or on-demand.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SyncRunSummary {
    #[schema(value_type = String, example = "f47ac10b-58cc-4372-a567-0e02b2c3d479")]
    pub run_id: Uuid,
    #[schema(example = "2026-08-06T16:00:00Z")]
    pub started_at: DateTime<Utc>,
    #[schema(example = "2026-08-06T16:00:02Z")]
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Option<SyncOutcome>,
    /// Present when the run failed; counts are absent in that case.
    pub error: Option<String>,
}

/// Sync status for one user.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncStatusResponse {
    pub leetcode_handle: Option<LeetCodeHandle>,
    pub has_leetcode_handle: bool,
    /// Number of solved tasks this user has accumulated via sync.
    pub total_synced_tasks: i64,
    pub last_run: Option<SyncRunSummary>,
}
