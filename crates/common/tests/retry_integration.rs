//! Integration tests for the retry module
//!
//! Drives budgets the way the dispatcher and chunk worker do, with tokio's
//! paused clock so the delays can be asserted exactly.

#![cfg(feature = "runtime")]

use std::time::Duration;

use conduit_common::retry::{Backoff, RetryBudget, RetrySpan};
use tokio::time::Instant;

/// Outcome of one simulated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Busy,
    Ok,
}

async fn run_with_budget(mut budget: RetryBudget, script: &[Outcome]) -> (Option<u32>, u32) {
    let span = RetrySpan::new("scripted", budget.max_attempts());
    let mut calls = 0;
    while let Some(attempt) = budget.acquire().await {
        calls += 1;
        match script.get(attempt as usize - 1).copied().unwrap_or(Outcome::Busy) {
            Outcome::Ok => {
                span.record_recovered(attempt);
                return (Some(attempt), calls);
            }
            Outcome::Busy => span.record_failure(attempt, "busy"),
        }
    }
    span.record_exhausted(budget.total_delay(), "busy");
    (None, calls)
}

#[tokio::test(start_paused = true)]
async fn always_busy_target_is_tried_exactly_max_attempts() {
    let started = Instant::now();
    let budget = RetryBudget::exponential(5, Duration::from_secs(1));

    let (succeeded_on, calls) = run_with_budget(budget, &[]).await;

    assert_eq!(succeeded_on, None);
    assert_eq!(calls, 5);
    // 1 + 2 + 4 + 8 seconds of backoff between five attempts
    assert_eq!(started.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn success_on_third_attempt_stops_early() {
    let started = Instant::now();
    let budget = RetryBudget::exponential(5, Duration::from_secs(1));

    let script = [Outcome::Busy, Outcome::Busy, Outcome::Ok];
    let (succeeded_on, calls) = run_with_budget(budget, &script).await;

    assert_eq!(succeeded_on, Some(3));
    assert_eq!(calls, 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn fixed_schedule_waits_zero_then_one_then_two_seconds() {
    let started = Instant::now();
    let budget = RetryBudget::fixed(vec![
        Duration::ZERO,
        Duration::from_millis(1000),
        Duration::from_millis(2000),
    ]);

    let (succeeded_on, calls) = run_with_budget(budget, &[]).await;

    assert_eq!(succeeded_on, None);
    assert_eq!(calls, 3);
    assert_eq!(started.elapsed(), Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn first_attempt_runs_immediately() {
    let started = Instant::now();
    let budget = RetryBudget::new(2, Backoff::exponential(Duration::from_secs(30)));

    let (succeeded_on, _) = run_with_budget(budget, &[Outcome::Ok]).await;

    assert_eq!(succeeded_on, Some(1));
    assert_eq!(started.elapsed(), Duration::ZERO);
}
