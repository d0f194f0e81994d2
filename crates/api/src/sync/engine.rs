//! Insert-only reconciliation of fetched submissions against stored tasks.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

use leettrack_domain::{
    LeetCodeHandle, NewSolvedTask, SYNC_PLATFORM, SubmissionRecord, SyncOutcome, UserId,
};
use leettrack_storage::{StorageError, TaskRepository};

use crate::leetcode::{LeetCodeApi, LeetCodeClientError};
use crate::sync::difficulty_cache::DifficultyCache;

/// Errors that abort one user's sync run. Anything smaller (a bad timestamp,
/// one failed difficulty lookup) is absorbed inside the batch.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetching submissions failed: {0}")]
    Client(#[from] LeetCodeClientError),

    #[error("persisting sync batch failed: {0}")]
    Storage(#[from] StorageError),
}

/// Reconciles fetched submission records into solved tasks.
pub struct SyncEngine {
    client: Arc<dyn LeetCodeApi>,
    tasks: Arc<dyn TaskRepository>,
}

impl SyncEngine {
    pub fn new(client: Arc<dyn LeetCodeApi>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { client, tasks }
    }

    /// Fetches one user's recent accepted submissions and reconciles them.
    pub async fn sync_user(
        &self,
        owner: UserId,
        handle: &LeetCodeHandle,
        limit: u32,
    ) -> Result<SyncOutcome, SyncError> {
        let submissions = self.client.recent_accepted_submissions(handle, limit).await?;

        if submissions.is_empty() {
            tracing::debug!(user_id = %owner, handle = %handle, "No submissions to reconcile");
            return Ok(SyncOutcome::default());
        }

        self.reconcile(owner, submissions).await
    }

    /// Stages every submission without an existing `(title, date)` match and
    /// commits the staged rows in a single transaction. Existing rows are
    /// never touched; calling this repeatedly with overlapping submission
    /// sets cannot accumulate duplicates.
    pub async fn reconcile(
        &self,
        owner: UserId,
        submissions: Vec<SubmissionRecord>,
    ) -> Result<SyncOutcome, SyncError> {
        let mut cache = DifficultyCache::new(self.client.as_ref());
        let mut staged: Vec<NewSolvedTask> = Vec::new();
        let mut staged_keys: HashSet<(String, NaiveDate)> = HashSet::new();
        let mut outcome = SyncOutcome::default();

        for submission in submissions {
            match self
                .stage(owner, &submission, &mut cache, &staged_keys)
                .await
            {
                Ok(Staged::Duplicate) => outcome.skipped += 1,
                Ok(Staged::New(task)) => {
                    staged_keys.insert((task.title.clone(), task.date));
                    staged.push(task);
                }
                Err(error) => {
                    tracing::error!(
                        user_id = %owner,
                        title = %submission.title,
                        error = %error,
                        "Skipping submission that failed to process"
                    );
                }
            }
        }

        if !staged.is_empty() {
            let batch = self.tasks.insert_synced_batch(owner, staged).await?;
            outcome.created = batch.inserted;
            // Rows a concurrent sync committed first count as skips too.
            outcome.skipped += batch.skipped;
        }

        Ok(outcome)
    }

    async fn stage(
        &self,
        owner: UserId,
        submission: &SubmissionRecord,
        cache: &mut DifficultyCache<'_>,
        staged_keys: &HashSet<(String, NaiveDate)>,
    ) -> Result<Staged, StageError> {
        let date = submission_date(&submission.timestamp)?;

        if staged_keys.contains(&(submission.title.clone(), date))
            || self
                .tasks
                .exists_by_title_and_date(owner, submission.title.clone(), date)
                .await?
        {
            return Ok(Staged::Duplicate);
        }

        let difficulty = cache.get(&submission.title_slug).await;
        let language = submission.lang.as_deref().unwrap_or("Unknown");

        Ok(Staged::New(NewSolvedTask {
            date,
            title: submission.title.clone(),
            problem_id: submission.submission_id.clone(),
            difficulty,
            points: difficulty.points(),
            platform: SYNC_PLATFORM.to_string(),
            notes: Some(format!("Auto-synced from LeetCode (Language: {language})")),
        }))
    }
}

enum Staged {
    Duplicate,
    New(NewSolvedTask),
}

#[derive(Debug, Error)]
enum StageError {
    #[error("invalid submission timestamp `{0}`")]
    Timestamp(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// UTC calendar date of an epoch-seconds timestamp, independent of the
/// server's local timezone.
fn submission_date(raw: &str) -> Result<NaiveDate, StageError> {
    let seconds: i64 = raw
        .trim()
        .parse()
        .map_err(|_| StageError::Timestamp(raw.to_string()))?;
    let timestamp =
        DateTime::from_timestamp(seconds, 0).ok_or_else(|| StageError::Timestamp(raw.to_string()))?;
    Ok(timestamp.date_naive())
}
