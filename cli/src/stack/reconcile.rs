use crate::stack::status::StackStatus;
use crate::stack::StackRequest;
use async_trait::async_trait;
use std::time::Duration;

/// Stack management calls the reconciler depends on
///
/// `describe` resolves to `None` when the stack does not exist, so callers
/// never have to sniff provider error strings.
#[async_trait]
pub trait StackOperations {
    /// Current status of the named stack, `None` when it does not exist
    async fn describe(&self, name: &str) -> eyre::Result<Option<StackStatus>>;

    /// Submit a brand new stack
    async fn create(&self, request: &StackRequest) -> eyre::Result<()>;

    /// Submit a changed template for an existing stack
    async fn update(&self, request: &StackRequest) -> eyre::Result<()>;
}

/// Why a deployment did not end in a successful terminal status
#[derive(Debug, thiserror::Error)]
pub enum StackDeployError {
    /// The initial existence check never got an answer
    #[error("Failed to determine whether the stack exists: {0}")]
    QueryFailed(eyre::Report),

    /// CloudFormation refused the create or update submission
    #[error("Stack submission was rejected: {0}")]
    SubmissionRejected(eyre::Report),

    /// The stack settled, but in a failure status
    #[error("Stack settled in failure status {0}")]
    StackFailed(StackStatus),

    /// A status check failed in transit
    #[error("Lost contact while waiting for the stack to settle: {0}")]
    PollingFailed(eyre::Report),

    /// The stack was still settling when the poll budget ran out
    #[error("Stack did not settle within {0} status checks")]
    Timeout(usize),
}

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Drives one stack to a terminal status
///
/// Checks whether the stack exists, submits a create or an update
/// accordingly, then polls until CloudFormation reports a terminal status.
pub struct Reconciler<O> {
    operations: O,
    poll_interval: Duration,
    max_polls: Option<usize>,
}

impl<O: StackOperations> Reconciler<O> {
    pub fn new(operations: O) -> Self {
        Self {
            operations,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
        }
    }

    /// Time to wait between consecutive status checks
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Upper bound on status checks, unlimited by default
    pub fn with_max_polls(mut self, max_polls: Option<usize>) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Create or update the stack and wait until it settles
    ///
    /// An existing stack gets an update, a missing one gets a create; the
    /// follow-up polling is identical either way. Returns the terminal status
    /// on success.
    pub async fn reconcile(&self, request: &StackRequest) -> Result<StackStatus, StackDeployError> {
        let existing = self
            .operations
            .describe(&request.name)
            .await
            .map_err(StackDeployError::QueryFailed)?;

        if existing.is_some() {
            log::info!("Stack {} exists, submitting an update", request.name);

            self.operations
                .update(request)
                .await
                .map_err(StackDeployError::SubmissionRejected)?;
        } else {
            log::info!("Stack {} not found, submitting a create", request.name);

            self.operations
                .create(request)
                .await
                .map_err(StackDeployError::SubmissionRejected)?;
        }

        self.wait_until_settled(&request.name).await
    }

    /// Poll the stack status until it turns terminal
    async fn wait_until_settled(&self, name: &str) -> Result<StackStatus, StackDeployError> {
        let mut polls = 0;

        loop {
            let status = self
                .operations
                .describe(name)
                .await
                .map_err(StackDeployError::PollingFailed)?
                .ok_or_else(|| {
                    StackDeployError::PollingFailed(eyre::eyre!(
                        "Stack {name} disappeared while settling"
                    ))
                })?;

            polls += 1;
            log::info!("Stack {name} status: {status}");

            if status.is_complete() {
                return Ok(status);
            }

            if status.is_failed() {
                return Err(StackDeployError::StackFailed(status));
            }

            if let Some(limit) = self.max_polls {
                if polls >= limit {
                    return Err(StackDeployError::Timeout(polls));
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::CAPABILITY_IAM;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Instant;

    /// Replays a scripted sequence of describe answers and records submissions
    ///
    /// Panics when describe is called more times than the script allows, so
    /// every test also pins down the exact number of status checks.
    #[derive(Default)]
    struct ScriptedStack {
        describes: Mutex<VecDeque<eyre::Result<Option<StackStatus>>>>,
        creates: AtomicUsize,
        updates: AtomicUsize,
        reject_submission: bool,
    }

    impl ScriptedStack {
        fn with_describes(script: Vec<eyre::Result<Option<StackStatus>>>) -> Self {
            Self {
                describes: Mutex::new(script.into_iter().collect()),
                ..Self::default()
            }
        }

        fn remaining_describes(&self) -> usize {
            self.describes.lock().expect("describe script lock").len()
        }
    }

    #[async_trait]
    impl StackOperations for ScriptedStack {
        async fn describe(&self, _name: &str) -> eyre::Result<Option<StackStatus>> {
            self.describes
                .lock()
                .expect("describe script lock")
                .pop_front()
                .expect("describe called more times than scripted")
        }

        async fn create(&self, _request: &StackRequest) -> eyre::Result<()> {
            self.creates.fetch_add(1, Ordering::SeqCst);

            if self.reject_submission {
                return Err(eyre::eyre!("Template format error"));
            }

            Ok(())
        }

        async fn update(&self, _request: &StackRequest) -> eyre::Result<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);

            if self.reject_submission {
                return Err(eyre::eyre!("Template format error"));
            }

            Ok(())
        }
    }

    fn request() -> StackRequest {
        StackRequest {
            name: "copy-pipeline".to_string(),
            template_body: "Resources: {}".to_string(),
            parameters: vec![("SourceBucketName".to_string(), "incoming".to_string())],
            capabilities: vec![CAPABILITY_IAM.to_string()],
        }
    }

    fn reconciler(stack: ScriptedStack) -> Reconciler<ScriptedStack> {
        Reconciler::new(stack).with_poll_interval(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn creates_missing_stack_and_polls_to_completion() {
        let stack = ScriptedStack::with_describes(vec![
            Ok(None),
            Ok(Some(StackStatus::CreateInProgress)),
            Ok(Some(StackStatus::CreateInProgress)),
            Ok(Some(StackStatus::CreateInProgress)),
            Ok(Some(StackStatus::CreateComplete)),
        ]);

        let reconciler = reconciler(stack);
        let status = reconciler
            .reconcile(&request())
            .await
            .expect("deployment should settle successfully");

        assert_eq!(status, StackStatus::CreateComplete);
        assert_eq!(reconciler.operations.creates.load(Ordering::SeqCst), 1);
        assert_eq!(reconciler.operations.updates.load(Ordering::SeqCst), 0);

        // One existence check plus exactly four status checks
        assert_eq!(reconciler.operations.remaining_describes(), 0);
    }

    #[tokio::test]
    async fn updates_existing_stack() {
        let stack = ScriptedStack::with_describes(vec![
            Ok(Some(StackStatus::CreateComplete)),
            Ok(Some(StackStatus::UpdateInProgress)),
            Ok(Some(StackStatus::UpdateComplete)),
        ]);

        let reconciler = reconciler(stack);
        let status = reconciler
            .reconcile(&request())
            .await
            .expect("update should settle successfully");

        assert_eq!(status, StackStatus::UpdateComplete);
        assert_eq!(reconciler.operations.creates.load(Ordering::SeqCst), 0);
        assert_eq!(reconciler.operations.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn surfaces_failure_status_from_the_first_poll() {
        let stack = ScriptedStack::with_describes(vec![
            Ok(Some(StackStatus::CreateComplete)),
            Ok(Some(StackStatus::UpdateFailed)),
        ]);

        let reconciler = reconciler(stack);
        let result = reconciler.reconcile(&request()).await;

        match result {
            Err(StackDeployError::StackFailed(status)) => {
                assert_eq!(status, StackStatus::UpdateFailed)
            }
            other => panic!("expected a stack failure, got {other:?}"),
        }

        assert_eq!(reconciler.operations.updates.load(Ordering::SeqCst), 1);

        // The failure was reported after a single status check
        assert_eq!(reconciler.operations.remaining_describes(), 0);
    }

    #[tokio::test]
    async fn query_failure_stops_before_any_submission() {
        let stack = ScriptedStack::with_describes(vec![Err(eyre::eyre!("connection refused"))]);

        let reconciler = reconciler(stack);
        let result = reconciler.reconcile(&request()).await;

        assert!(matches!(result, Err(StackDeployError::QueryFailed(_))));
        assert_eq!(reconciler.operations.creates.load(Ordering::SeqCst), 0);
        assert_eq!(reconciler.operations.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_submission_is_not_polled() {
        let stack = ScriptedStack {
            describes: Mutex::new(VecDeque::from([Ok(None)])),
            reject_submission: true,
            ..ScriptedStack::default()
        };

        let reconciler = reconciler(stack);
        let result = reconciler.reconcile(&request()).await;

        assert!(matches!(
            result,
            Err(StackDeployError::SubmissionRejected(_))
        ));
        assert_eq!(reconciler.operations.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn keeps_polling_through_unrecognized_statuses() {
        let stack = ScriptedStack::with_describes(vec![
            Ok(None),
            Ok(Some(StackStatus::Other("REVIEW_IN_PROGRESS".to_string()))),
            Ok(Some(StackStatus::CreateComplete)),
        ]);

        let reconciler = reconciler(stack);
        let status = reconciler
            .reconcile(&request())
            .await
            .expect("unknown statuses should not abort the wait");

        assert_eq!(status, StackStatus::CreateComplete);
    }

    #[tokio::test]
    async fn transport_error_during_polling_is_surfaced() {
        let stack = ScriptedStack::with_describes(vec![
            Ok(None),
            Ok(Some(StackStatus::CreateInProgress)),
            Err(eyre::eyre!("request timed out")),
        ]);

        let reconciler = reconciler(stack);
        let result = reconciler.reconcile(&request()).await;

        assert!(matches!(result, Err(StackDeployError::PollingFailed(_))));
    }

    #[tokio::test]
    async fn stack_disappearing_mid_wait_is_a_polling_error() {
        let stack =
            ScriptedStack::with_describes(vec![Ok(Some(StackStatus::CreateComplete)), Ok(None)]);

        let reconciler = reconciler(stack);
        let result = reconciler.reconcile(&request()).await;

        assert!(matches!(result, Err(StackDeployError::PollingFailed(_))));
        assert_eq!(reconciler.operations.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_once_the_poll_budget_is_spent() {
        let stack = ScriptedStack::with_describes(vec![
            Ok(None),
            Ok(Some(StackStatus::CreateInProgress)),
            Ok(Some(StackStatus::CreateInProgress)),
        ]);

        let reconciler = reconciler(stack).with_max_polls(Some(2));
        let result = reconciler.reconcile(&request()).await;

        assert!(matches!(result, Err(StackDeployError::Timeout(2))));
    }

    #[tokio::test]
    async fn waits_between_status_checks() {
        let stack = ScriptedStack::with_describes(vec![
            Ok(None),
            Ok(Some(StackStatus::CreateInProgress)),
            Ok(Some(StackStatus::CreateInProgress)),
            Ok(Some(StackStatus::CreateComplete)),
        ]);

        let reconciler =
            Reconciler::new(stack).with_poll_interval(Duration::from_millis(25));

        let started = Instant::now();
        reconciler
            .reconcile(&request())
            .await
            .expect("deployment should settle successfully");

        // Two in-progress answers mean two waits before the terminal poll
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
