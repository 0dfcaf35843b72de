use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use simple_log::warn;
use tokio::sync::{Mutex, RwLock};

use crate::api::{ApiResult, ContestApi};
use crate::schedule::{self, TaskHandle};
use crate::types::{Submission, SubmissionRequest, SubmissionResponse};

/// Tracks the in-flight submission of one editor slot: issues the submit
/// call, then polls the backend until a terminal verdict. At most one
/// polling session is active per slot; starting a new one supersedes the
/// previous one, and responses from superseded sessions are discarded.
pub struct SubmissionTracker {
    api: Arc<dyn ContestApi>,
    poll_interval: Duration,
    slot: Arc<Slot>,
}

struct Slot {
    /// Sequence number of the session that currently owns the slot.
    seq: AtomicU64,
    /// Latest known submission record, replaced wholesale on every poll.
    latest: RwLock<Option<Submission>>,
    task: Mutex<Option<TaskHandle>>,
}

impl Slot {
    fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            latest: RwLock::new(None),
            task: Mutex::new(None),
        }
    }

    /// Applies one poll response; returns whether polling should continue.
    async fn apply(&self, session: u64, update: Submission) -> bool {
        let mut latest = self.latest.write().await;
        if self.seq.load(Ordering::SeqCst) != session {
            // a newer session owns the slot, this response is stale
            return false;
        }
        if let Some(current) = latest.as_ref() {
            if current.id == update.id
                && current.status.is_terminal()
                && !update.status.is_terminal()
            {
                // the backend reported non-terminal after a terminal verdict;
                // keep the verdict we already have
                return false;
            }
        }
        let terminal = update.status.is_terminal();
        *latest = Some(update);
        !terminal
    }
}

impl SubmissionTracker {
    pub fn new(api: Arc<dyn ContestApi>, poll_interval: Duration) -> Self {
        Self {
            api,
            poll_interval,
            slot: Arc::new(Slot::new()),
        }
    }

    /// One-shot submit; fails fast on any error. On success the returned
    /// submission is tracked until its verdict is terminal.
    pub async fn submit(&self, request: SubmissionRequest) -> ApiResult<SubmissionResponse> {
        let response = self.api.submit(&request).await?;
        self.track(response.submission_id.clone()).await;
        Ok(response)
    }

    /// Starts a polling session for `submission_id`, superseding any session
    /// still running in this slot. Polls once immediately, then on the fixed
    /// interval until a terminal status is observed. A failed poll is logged
    /// and retried on the next tick; polling only ends on a terminal verdict
    /// or an explicit [`cancel`](Self::cancel).
    pub async fn track(&self, submission_id: String) {
        let session = self.slot.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut task = self.slot.task.lock().await;
        if let Some(previous) = task.take() {
            previous.cancel();
        }
        *self.slot.latest.write().await = None;

        let api = self.api.clone();
        let slot = self.slot.clone();
        let handle = schedule::repeat(self.poll_interval, move || {
            let api = api.clone();
            let slot = slot.clone();
            let submission_id = submission_id.clone();
            async move {
                match api.submission(&submission_id).await {
                    Ok(update) => slot.apply(session, update).await,
                    Err(e) => {
                        warn!("status poll for submission {} failed, will retry: {}", submission_id, e);
                        true
                    }
                }
            }
        });
        *task = Some(handle);
    }

    /// Latest known record of the tracked submission. Final once a terminal
    /// status was observed; stops changing after [`cancel`](Self::cancel).
    pub async fn latest(&self) -> Option<Submission> {
        self.slot.latest.read().await.clone()
    }

    pub async fn is_polling(&self) -> bool {
        self.slot
            .task
            .lock()
            .await
            .as_ref()
            .map_or(false, TaskHandle::is_active)
    }

    /// Stops the active polling session, terminal or not. The exposed record
    /// keeps its last value; an in-flight response can no longer change it.
    pub async fn cancel(&self) {
        self.slot.seq.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.slot.task.lock().await.take() {
            task.cancel();
        }
    }
}

/// Submission history of a user within a contest, with test runs dropped;
/// the backend does not filter those out itself.
pub async fn contest_history(
    api: &dyn ContestApi,
    user_id: i64,
    contest_id: i64,
) -> ApiResult<Vec<Submission>> {
    let submissions = api.user_contest_submissions(user_id, contest_id).await?;
    Ok(submissions.into_iter().filter(|s| !s.is_test_run).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{submission_with, MockApi};
    use crate::types::SubmissionStatus::{Accepted, Pending, Running};
    use tokio::sync::Semaphore;

    const POLL: Duration = Duration::from_secs(2);

    #[tokio::test(start_paused = true)]
    async fn polls_until_terminal_then_stops() {
        let api = Arc::new(MockApi::with_statuses([
            Ok(submission_with(Pending)),
            Ok(submission_with(Running)),
            Ok(submission_with(Running)),
            Ok(submission_with(Accepted)),
        ]));
        let tracker = SubmissionTracker::new(api.clone(), POLL);
        tracker.track("s1".into()).await;

        tokio::time::sleep(POLL * 10).await;
        // one immediate poll plus three scheduled ones, then silence
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 4);
        let latest = tracker.latest().await.unwrap();
        assert_eq!(latest.id, "s1");
        assert_eq!(latest.status, Accepted);
        assert!(!tracker.is_polling().await);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_reports_id_and_starts_polling() {
        let api = Arc::new(MockApi::with_statuses([
            Ok(submission_with(Pending)),
            Ok(submission_with(Accepted)),
        ]));
        api.submit_script.lock().await.push_back(Ok(SubmissionResponse {
            submission_id: "x9".into(),
            status: Pending,
        }));

        let tracker = SubmissionTracker::new(api.clone(), POLL);
        let response = tracker
            .submit(SubmissionRequest {
                user_id: 1,
                problem_id: 2,
                code: "print(1)".into(),
                language: crate::types::Language::Python3,
                is_test_run: false,
            })
            .await
            .unwrap();
        assert_eq!(response.submission_id, "x9");

        tokio::time::sleep(POLL * 5).await;
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.latest().await.unwrap().status, Accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submit_starts_no_session() {
        let api = Arc::new(MockApi::default());
        api.submit_script
            .lock()
            .await
            .push_back(Err("Contest is over".into()));

        let tracker = SubmissionTracker::new(api.clone(), POLL);
        let err = tracker
            .submit(SubmissionRequest {
                user_id: 1,
                problem_id: 2,
                code: String::new(),
                language: Default::default(),
                is_test_run: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Contest is over");
        assert!(!tracker.is_polling().await);
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn new_session_supersedes_old_one() {
        let api = Arc::new(MockApi::with_statuses([Ok(submission_with(Pending))]));
        let tracker = SubmissionTracker::new(api.clone(), POLL);

        tracker.track("a".into()).await;
        tokio::time::sleep(POLL * 2 + POLL / 2).await; // polls at 0, 2, 4
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 3);

        tracker.track("b".into()).await;
        tokio::time::sleep(POLL / 2).await;
        let at_switch = api.status_calls.load(Ordering::SeqCst);
        assert_eq!(tracker.latest().await.unwrap().id, "b");

        // exactly one timer left running: one poll per interval
        tokio::time::sleep(POLL * 4).await;
        assert_eq!(api.status_calls.load(Ordering::SeqCst), at_switch + 4);
        assert_eq!(tracker.latest().await.unwrap().id, "b");
        tracker.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_in_flight_poll() {
        let gate = Arc::new(Semaphore::new(0));
        let api = Arc::new(MockApi {
            status_gate: Some(gate.clone()),
            ..MockApi::with_statuses([Ok(submission_with(Pending))])
        });
        let tracker = SubmissionTracker::new(api.clone(), POLL);
        tracker.track("s".into()).await;

        // the first poll is now parked on the gate
        tokio::time::sleep(Duration::from_millis(1)).await;
        tracker.cancel().await;
        gate.add_permits(1);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert!(tracker.latest().await.is_none());
        assert!(!tracker.is_polling().await);
    }

    #[tokio::test]
    async fn stale_session_response_is_discarded() {
        let slot = Slot::new();
        let old_session = slot.seq.fetch_add(1, Ordering::SeqCst) + 1;
        slot.seq.fetch_add(1, Ordering::SeqCst); // a newer session took over

        assert!(!slot.apply(old_session, submission_with(Pending)).await);
        assert!(slot.latest.read().await.is_none());
    }

    #[tokio::test]
    async fn terminal_verdict_is_never_regressed() {
        let slot = Slot::new();
        let session = slot.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let mut accepted = submission_with(Accepted);
        accepted.id = "z".into();
        assert!(!slot.apply(session, accepted).await);

        let mut running = submission_with(Running);
        running.id = "z".into();
        assert!(!slot.apply(session, running).await);
        assert_eq!(slot.latest.read().await.as_ref().unwrap().status, Accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_failures_are_retried_forever() {
        let api = Arc::new(MockApi::with_statuses([
            Ok(submission_with(Pending)),
            Err("connection refused".into()),
        ]));
        let tracker = SubmissionTracker::new(api.clone(), POLL);
        tracker.track("s".into()).await;

        tokio::time::sleep(POLL / 2).await;
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);

        // every further tick fails; the tracker keeps going and the record
        // stays at the last successful fetch
        tokio::time::sleep(POLL * 10).await;
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 11);
        assert_eq!(tracker.latest().await.unwrap().status, Pending);
        assert!(tracker.is_polling().await);
        tracker.cancel().await;
    }

    #[tokio::test]
    async fn contest_history_drops_test_runs() {
        let api = MockApi::default();
        let mut test_run = submission_with(Accepted);
        test_run.is_test_run = true;
        let graded = submission_with(Accepted);
        *api.history.lock().await = vec![test_run, graded];

        let history = contest_history(&api, 1, 5).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(!history[0].is_test_run);
    }
}
