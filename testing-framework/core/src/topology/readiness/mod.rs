pub mod endpoint;
pub mod funding;
pub mod gossip;
pub mod mempool;

use std::{fmt::Display, future::Future, time::Duration};

pub use endpoint::wait_endpoints_reachable;
pub use funding::FundingReadiness;
pub use gossip::wait_gossip_converged;
pub use mempool::MempoolReadiness;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::info;

use crate::adjust_timeout;

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("{message}")]
    Timeout { message: String },
}

/// Timing of a convergence barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollPolicy {
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Same policy with the timeout scaled for slow environments.
    #[must_use]
    pub fn adjusted(self) -> Self {
        Self {
            timeout: adjust_timeout(self.timeout),
            ..self
        }
    }
}

/// Wall-clock budget of one barrier.
struct Deadline {
    started: Instant,
    policy: PollPolicy,
}

impl Deadline {
    fn start(policy: PollPolicy) -> Self {
        Self {
            started: Instant::now(),
            policy,
        }
    }

    /// Sleeps until the next poll, or returns false once the budget is spent.
    /// Sleeps are clamped to the remaining budget so a failing barrier gives
    /// up at most one interval after its timeout.
    async fn next_poll(&self) -> bool {
        let elapsed = self.started.elapsed();
        if elapsed >= self.policy.timeout {
            return false;
        }

        sleep(self.policy.interval.min(self.policy.timeout - elapsed)).await;
        true
    }
}

/// Re-collects until `is_ready` holds, handing back the last observation on
/// timeout.
async fn poll_until<D, C, Fut, R>(policy: PollPolicy, mut collect: C, is_ready: R) -> Result<(), D>
where
    C: FnMut() -> Fut,
    Fut: Future<Output = D>,
    R: Fn(&D) -> bool,
{
    let deadline = Deadline::start(policy);
    loop {
        let data = collect().await;
        if is_ready(&data) {
            return Ok(());
        }

        if !deadline.next_poll().await {
            return Err(data);
        }
    }
}

/// Blocks until `predicate` returns true.
pub async fn wait_until<F, Fut>(
    label: &str,
    policy: PollPolicy,
    predicate: F,
) -> Result<(), ReadinessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    poll_until(policy, predicate, |ready| *ready)
        .await
        .map_err(|_| ReadinessError::Timeout {
            message: format!("timed out waiting for {label} after {:?}", policy.timeout),
        })
}

/// Blocks until `check` has passed for every item.
///
/// Each poll partitions the work list and keeps only the items still failing;
/// an item that passed once is never checked again.
pub async fn wait_for_each<T, F, Fut>(
    label: &str,
    policy: PollPolicy,
    mut pending: Vec<T>,
    mut check: F,
) -> Result<(), ReadinessError>
where
    T: Clone + Display,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Deadline::start(policy);
    loop {
        if pending.is_empty() {
            return Ok(());
        }

        info!(
            target: "readiness",
            barrier = label,
            remaining = %join_labels(&pending),
            "waiting for work list"
        );

        let mut remaining = Vec::with_capacity(pending.len());
        for item in pending {
            if !check(item.clone()).await {
                remaining.push(item);
            }
        }
        pending = remaining;

        if pending.is_empty() {
            return Ok(());
        }

        if !deadline.next_poll().await {
            return Err(ReadinessError::Timeout {
                message: format!(
                    "timed out waiting for {label} after {:?}; still pending: {}",
                    policy.timeout,
                    join_labels(&pending)
                ),
            });
        }
    }
}

fn join_labels<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait::async_trait]
pub trait ReadinessCheck<'a> {
    type Data: Send;

    async fn collect(&'a self) -> Self::Data;

    fn is_ready(&self, data: &Self::Data) -> bool;

    fn timeout_message(&self, data: Self::Data) -> String;

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(200)
    }

    fn timeout(&self) -> Duration {
        adjust_timeout(Duration::from_secs(60))
    }

    async fn wait(&'a self) -> Result<(), ReadinessError> {
        let policy = PollPolicy::new(self.timeout(), self.poll_interval());
        match poll_until(policy, || self.collect(), |data| self.is_ready(data)).await {
            Ok(()) => Ok(()),
            Err(data) => Err(ReadinessError::Timeout {
                message: self.timeout_message(data),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        future::ready,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    const POLICY: PollPolicy = PollPolicy::new(Duration::from_secs(10), Duration::from_secs(3));

    #[tokio::test(start_paused = true)]
    async fn true_predicate_returns_without_sleeping() {
        let calls = AtomicUsize::new(0);
        let started = Instant::now();

        wait_until("always", POLICY, || {
            calls.fetch_add(1, Ordering::SeqCst);
            ready(true)
        })
        .await
        .unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn false_predicate_times_out_within_one_interval() {
        let started = Instant::now();

        let err = wait_until("never", POLICY, || ready(false))
            .await
            .unwrap_err();

        let elapsed = started.elapsed();
        assert!(elapsed >= POLICY.timeout, "gave up early: {elapsed:?}");
        assert!(elapsed <= POLICY.timeout + POLICY.interval);
        assert!(err.to_string().contains("never"));
    }

    #[tokio::test(start_paused = true)]
    async fn work_list_never_rechecks_satisfied_items() {
        // item `n` passes on its n-th check
        let mut checks: HashMap<u32, u32> = HashMap::new();
        let started = Instant::now();

        wait_for_each("work", POLICY, vec![1, 2, 3], |item| {
            let seen = checks.entry(item).or_default();
            *seen += 1;
            ready(*seen >= item)
        })
        .await
        .unwrap();

        assert_eq!(checks, HashMap::from([(1, 1), (2, 2), (3, 3)]));
        // three polls, two sleeps, no trailing sleep once the list is empty
        assert_eq!(started.elapsed(), POLICY.interval * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_work_list_is_immediately_done() {
        let mut calls = 0;
        wait_for_each("empty", POLICY, Vec::<u32>::new(), |_| {
            calls += 1;
            ready(false)
        })
        .await
        .unwrap();
        assert_eq!(calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn work_list_timeout_names_pending_items() {
        let err = wait_for_each("gossip", POLICY, vec![4, 5], |item| ready(item == 4))
            .await
            .unwrap_err();

        let ReadinessError::Timeout { message } = err;
        assert!(message.contains("still pending: 5"), "{message}");
    }

    struct CountdownCheck {
        remaining: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl<'a> ReadinessCheck<'a> for CountdownCheck {
        type Data = usize;

        async fn collect(&'a self) -> usize {
            self.remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .unwrap_or(0)
        }

        fn is_ready(&self, data: &usize) -> bool {
            *data == 0
        }

        fn timeout_message(&self, data: usize) -> String {
            format!("countdown stuck at {data}")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn readiness_check_polls_until_ready() {
        let check = CountdownCheck {
            remaining: AtomicUsize::new(3),
        };
        let started = Instant::now();

        check.wait().await.unwrap();

        assert_eq!(started.elapsed(), check.poll_interval() * 3);
    }
}
