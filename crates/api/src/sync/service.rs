//! Background synchronization service.
//!
//! Owns the periodic sync loop and the per-user last-run table that the
//! status endpoint reads. Constructed once by the composition root; lifetime
//! is bounded by explicit `start`/`stop` calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use leettrack_domain::{LeetCodeHandle, SyncOutcome, SyncRunSummary, UserId};
use leettrack_storage::UserRepository;

use crate::sync::engine::SyncEngine;

struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives periodic sync across all eligible users.
pub struct SyncService {
    users: Arc<dyn UserRepository>,
    engine: Arc<SyncEngine>,
    interval: Duration,
    fetch_limit: u32,
    running: Mutex<Option<RunningLoop>>,
    last_runs: DashMap<UserId, SyncRunSummary>,
}

impl SyncService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        engine: Arc<SyncEngine>,
        interval: Duration,
        fetch_limit: u32,
    ) -> Self {
        Self {
            users,
            engine,
            interval,
            fetch_limit,
            running: Mutex::new(None),
            last_runs: DashMap::new(),
        }
    }

    /// Starts the background loop. No-op when already running.
    pub async fn start(self: &Arc<Self>) {
        let mut running = self.running.lock().await;
        if let Some(current) = running.as_ref() {
            if !current.handle.is_finished() {
                tracing::warn!("Sync service is already running");
                return;
            }
        }

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let service = Arc::clone(self);
        let handle = tokio::spawn(async move { service.run_loop(loop_cancel).await });
        *running = Some(RunningLoop { cancel, handle });
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "LeetCode sync service started"
        );
    }

    /// Stops the loop and waits for it to wind down. The loop observes
    /// cancellation between users and at the sleep boundary, so an in-flight
    /// owner commit always completes before this returns. No-op when stopped.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            return;
        };

        running.cancel.cancel();
        if let Err(error) = running.handle.await {
            tracing::error!(error = %error, "Sync loop task failed to join");
        }
        tracing::info!("LeetCode sync service stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|current| !current.handle.is_finished())
    }

    /// Schedules a one-shot sync outside the periodic loop and returns its
    /// correlation id immediately; the outcome lands in the last-run table.
    pub fn trigger_now(self: &Arc<Self>, user_id: UserId, handle: LeetCodeHandle, limit: u32) -> Uuid {
        let run_id = self.begin_run(user_id);
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.execute_run(user_id, &handle, limit, run_id).await;
        });
        run_id
    }

    /// Most recent run recorded for this user, periodic or on-demand.
    pub fn last_run(&self, user_id: UserId) -> Option<SyncRunSummary> {
        self.last_runs.get(&user_id).map(|entry| entry.clone())
    }

    async fn run_loop(self: Arc<Self>, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.run_tick(&cancel).await;

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::debug!("Sync loop exited");
    }

    /// One pass over all eligible users. Failures never escape a tick: a bad
    /// target list skips the tick, a failing user skips only that user.
    async fn run_tick(&self, cancel: &CancellationToken) {
        let targets = match self.users.list_sync_targets().await {
            Ok(targets) => targets,
            Err(error) => {
                tracing::error!(error = %error, "Failed to load sync targets; skipping tick");
                return;
            }
        };

        if targets.is_empty() {
            tracing::debug!("No users with a LeetCode handle to sync");
            return;
        }

        tracing::debug!(users = targets.len(), "Syncing users");
        for target in targets {
            // Checked between users so stop() never interrupts a commit.
            if cancel.is_cancelled() {
                break;
            }
            let run_id = self.begin_run(target.user_id);
            self.execute_run(target.user_id, &target.handle, self.fetch_limit, run_id)
                .await;
        }
    }

    fn begin_run(&self, user_id: UserId) -> Uuid {
        let run_id = Uuid::new_v4();
        self.last_runs.insert(
            user_id,
            SyncRunSummary {
                run_id,
                started_at: Utc::now(),
                finished_at: None,
                outcome: None,
                error: None,
            },
        );
        run_id
    }

    async fn execute_run(&self, user_id: UserId, handle: &LeetCodeHandle, limit: u32, run_id: Uuid) {
        match self.engine.sync_user(user_id, handle, limit).await {
            Ok(outcome) => {
                if outcome.created > 0 {
                    tracing::info!(
                        user_id = %user_id,
                        handle = %handle,
                        created = outcome.created,
                        skipped = outcome.skipped,
                        "Synced new tasks"
                    );
                }
                self.finish_run(user_id, run_id, Some(outcome), None);
            }
            Err(error) => {
                tracing::error!(
                    user_id = %user_id,
                    handle = %handle,
                    error = %error,
                    "User sync failed"
                );
                self.finish_run(user_id, run_id, None, Some(error.to_string()));
            }
        }
    }

    fn finish_run(
        &self,
        user_id: UserId,
        run_id: Uuid,
        outcome: Option<SyncOutcome>,
        error: Option<String>,
    ) {
        if let Some(mut entry) = self.last_runs.get_mut(&user_id) {
            // A newer run may have replaced this entry already.
            if entry.run_id == run_id {
                entry.finished_at = Some(Utc::now());
                entry.outcome = outcome;
                entry.error = error;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::leetcode::{LeetCodeClientError, MockLeetCodeApi};
    use crate::sync::engine::SyncEngine;
    use crate::test_support::{InMemoryTaskRepository, StubUserRepository};
    use leettrack_domain::{Difficulty, SubmissionRecord};
    use uuid::Uuid;

    fn submission(title: &str, slug: &str, timestamp: &str) -> SubmissionRecord {
        SubmissionRecord {
            submission_id: None,
            title: title.to_string(),
            title_slug: slug.to_string(),
            timestamp: timestamp.to_string(),
            lang: Some("python".to_string()),
        }
    }

    fn service_with(
        users: Arc<StubUserRepository>,
        client: MockLeetCodeApi,
        tasks: Arc<InMemoryTaskRepository>,
        interval: Duration,
    ) -> Arc<SyncService> {
        let engine = Arc::new(SyncEngine::new(Arc::new(client), tasks));
        Arc::new(SyncService::new(users, engine, interval, 20))
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within 2s");
    }

    #[tokio::test]
    async fn one_failing_user_does_not_affect_the_others() {
        let alice = UserId(Uuid::new_v4());
        let bob = UserId(Uuid::new_v4());
        let carol = UserId(Uuid::new_v4());
        let users = StubUserRepository::with_handles(vec![
            (alice, "alice"),
            (bob, "bob"),
            (carol, "carol"),
        ]);

        let mut client = MockLeetCodeApi::new();
        client
            .expect_recent_accepted_submissions()
            .returning(|handle, _| match handle.as_str() {
                "bob" => Err(LeetCodeClientError::Api("profile hidden".to_string())),
                _ => Ok(vec![submission("Two Sum", "two-sum", "1700000000")]),
            });
        client
            .expect_problem_difficulty()
            .returning(|_| Ok(Difficulty::Easy));

        let tasks = InMemoryTaskRepository::new();
        let service = service_with(users, client, tasks.clone(), Duration::from_secs(60));

        service.run_tick(&CancellationToken::new()).await;

        assert_eq!(tasks.rows_for(alice).len(), 1);
        assert!(tasks.rows_for(bob).is_empty());
        assert_eq!(tasks.rows_for(carol).len(), 1);

        let alice_run = service.last_run(alice).expect("alice run recorded");
        assert_eq!(alice_run.outcome.expect("outcome present").created, 1);
        assert!(alice_run.error.is_none());

        let bob_run = service.last_run(bob).expect("bob run recorded");
        assert!(bob_run.outcome.is_none());
        assert!(bob_run.error.expect("error recorded").contains("profile hidden"));
    }

    #[tokio::test]
    async fn tick_survives_target_listing_failure() {
        let users = StubUserRepository::with_handles(vec![]);
        users.fail_listing(true);

        let client = MockLeetCodeApi::new();
        let tasks = InMemoryTaskRepository::new();
        let service = service_with(users.clone(), client, tasks.clone(), Duration::from_secs(60));

        // Must not panic or record anything.
        service.run_tick(&CancellationToken::new()).await;
        assert_eq!(tasks.total(), 0);
    }

    #[tokio::test]
    async fn start_is_a_noop_while_running() {
        let users = StubUserRepository::with_handles(vec![]);
        let client = MockLeetCodeApi::new();
        let service = service_with(
            users.clone(),
            client,
            InMemoryTaskRepository::new(),
            Duration::from_secs(60),
        );

        service.start().await;
        {
            let users = users.clone();
            wait_until(move || users.list_calls() == 1).await;
        }

        // A second start must not spawn a second loop (which would tick
        // immediately and bump the counter).
        service.start().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(users.list_calls(), 1);
        assert!(service.is_running().await);

        service.stop().await;
        assert!(!service.is_running().await);
    }

    #[tokio::test]
    async fn stop_joins_the_loop_and_restart_begins_a_fresh_cycle() {
        let users = StubUserRepository::with_handles(vec![]);
        let client = MockLeetCodeApi::new();
        let service = service_with(
            users.clone(),
            client,
            InMemoryTaskRepository::new(),
            Duration::from_secs(60),
        );

        service.start().await;
        {
            let users = users.clone();
            wait_until(move || users.list_calls() == 1).await;
        }

        // The loop is now parked in its 60s sleep; stop must return promptly.
        service.stop().await;
        assert!(!service.is_running().await);
        assert_eq!(users.list_calls(), 1);

        // Double stop is a no-op.
        service.stop().await;

        // Restarting begins a fresh tick cycle rather than resuming the old
        // sleep.
        service.start().await;
        {
            let users = users.clone();
            wait_until(move || users.list_calls() == 2).await;
        }
        service.stop().await;
    }

    #[tokio::test]
    async fn trigger_now_records_a_resolvable_outcome() {
        let user = UserId(Uuid::new_v4());
        let users = StubUserRepository::with_handles(vec![(user, "alice")]);

        let mut client = MockLeetCodeApi::new();
        client
            .expect_recent_accepted_submissions()
            .returning(|_, _| Ok(vec![submission("Two Sum", "two-sum", "1700000000")]));
        client
            .expect_problem_difficulty()
            .returning(|_| Ok(Difficulty::Easy));

        let tasks = InMemoryTaskRepository::new();
        let service = service_with(users, client, tasks.clone(), Duration::from_secs(60));

        let handle = leettrack_domain::LeetCodeHandle::new("alice").expect("valid handle");
        let run_id = service.trigger_now(user, handle, 20);

        {
            let service = service.clone();
            wait_until(move || {
                service
                    .last_run(user)
                    .is_some_and(|run| run.finished_at.is_some())
            })
            .await;
        }

        let run = service.last_run(user).expect("run recorded");
        assert_eq!(run.run_id, run_id);
        assert_eq!(run.outcome.expect("outcome present").created, 1);
        assert_eq!(tasks.rows_for(user).len(), 1);
    }

    #[tokio::test]
    async fn cancellation_is_observed_between_users() {
        let alice = UserId(Uuid::new_v4());
        let bob = UserId(Uuid::new_v4());
        let users = StubUserRepository::with_handles(vec![(alice, "alice"), (bob, "bob")]);

        let cancel = CancellationToken::new();
        let mut client = MockLeetCodeApi::new();
        {
            // Cancel mid-tick, while the first user's fetch is in flight.
            let cancel = cancel.clone();
            client
                .expect_recent_accepted_submissions()
                .returning(move |_, _| {
                    cancel.cancel();
                    Ok(Vec::new())
                });
        }

        let tasks = InMemoryTaskRepository::new();
        let service = service_with(users, client, tasks, Duration::from_secs(60));

        service.run_tick(&cancel).await;

        // The first user finished; the second was never started.
        assert!(service.last_run(alice).is_some());
        assert!(service.last_run(bob).is_none());
    }
}
