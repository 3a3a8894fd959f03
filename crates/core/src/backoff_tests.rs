// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
}

#[test]
fn default_values() {
    let policy = BackoffPolicy::default();
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.base, Duration::from_secs(1));
    assert_eq!(policy.cap, Duration::from_secs(3600));
    assert_eq!(policy.max_jitter, Duration::from_secs(1));
}

#[parameterized(
    zero = { 0, 1 },
    one = { 1, 2 },
    two = { 2, 4 },
    three = { 3, 8 },
    four = { 4, 16 },
)]
fn delay_doubles(attempts: u32, expected_secs: u64) {
    let policy = BackoffPolicy::default();
    assert_eq!(
        policy.delay_for(attempts),
        Duration::from_secs(expected_secs)
    );
}

#[test]
fn delay_is_capped() {
    let policy = BackoffPolicy {
        cap: Duration::from_secs(10),
        ..Default::default()
    };
    assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    assert_eq!(policy.delay_for(4), Duration::from_secs(10));
    assert_eq!(policy.delay_for(31), Duration::from_secs(10));
    // 2^40 overflows u32
    assert_eq!(policy.delay_for(40), Duration::from_secs(10));
}

#[test]
fn delay_is_monotonic_up_to_cap() {
    let policy = BackoffPolicy {
        max_attempts: 64,
        ..Default::default()
    };
    let mut previous = Duration::ZERO;
    for attempts in 0..64 {
        let decision = policy.compute_next_retry(attempts, now(), &NoJitter);
        let delay = (decision.next_retry_at.unwrap() - now()).to_std().unwrap();
        assert!(
            delay >= previous,
            "attempt {attempts}: {delay:?} < {previous:?}"
        );
        assert!(delay <= policy.cap);
        previous = delay;
    }
    assert_eq!(previous, policy.cap);
}

#[test]
fn exact_retry_time_without_jitter() {
    let policy = BackoffPolicy::default();
    let decision = policy.compute_next_retry(2, now(), &NoJitter);

    assert!(!decision.give_up);
    assert_eq!(
        decision.next_retry_at,
        Some(now() + chrono::Duration::seconds(4))
    );
}

#[test]
fn fixed_jitter_is_added() {
    let policy = BackoffPolicy::default();
    let jitter = FixedJitter(Duration::from_millis(300));
    let decision = policy.compute_next_retry(1, now(), &jitter);

    assert_eq!(
        decision.next_retry_at,
        Some(now() + chrono::Duration::milliseconds(2_300))
    );
}

#[test]
fn fixed_jitter_clamped_to_max() {
    let policy = BackoffPolicy {
        max_jitter: Duration::from_millis(100),
        ..Default::default()
    };
    let jitter = FixedJitter(Duration::from_secs(5));
    let decision = policy.compute_next_retry(0, now(), &jitter);

    assert_eq!(
        decision.next_retry_at,
        Some(now() + chrono::Duration::milliseconds(1_100))
    );
}

#[test]
fn random_jitter_stays_in_range() {
    let max = Duration::from_millis(500);
    for _ in 0..200 {
        assert!(RandomJitter.sample(max) <= max);
    }
    assert_eq!(RandomJitter.sample(Duration::ZERO), Duration::ZERO);
}

#[parameterized(
    below = { 4, false },
    at = { 5, true },
    above = { 9, true },
)]
fn give_up_at_max_attempts(attempts: u32, give_up: bool) {
    let policy = BackoffPolicy::default();
    let decision = policy.compute_next_retry(attempts, now(), &NoJitter);
    assert_eq!(decision.give_up, give_up);
    assert_eq!(decision.next_retry_at.is_none(), give_up);
}

#[test]
fn huge_cap_does_not_overflow() {
    let policy = BackoffPolicy {
        max_attempts: 100,
        cap: Duration::MAX,
        max_jitter: Duration::MAX,
        ..Default::default()
    };
    let decision = policy.compute_next_retry(80, now(), &FixedJitter(Duration::MAX));
    assert!(decision.next_retry_at.unwrap() > now());
}
