use std::time::{Duration, SystemTime};

use wirecall_core::Headers;
use wirecall_exec::retry::{
    decide_retry, parse_retry_after, FailureKind, HintFormat, RetryConfig, RetryContext,
    RetryDecision, RetryHeadersConfig, RetryHint, RetryReason,
};
use wirecall_exec::{NoRetry, RetryPolicy, TransportError};

fn status_ctx(attempt_no: u32, status: u16, headers: &Headers) -> RetryContext<'_> {
    RetryContext {
        attempt_no,
        redirects: 0,
        failure: FailureKind::Status { status, headers },
        now: SystemTime::UNIX_EPOCH,
    }
}

#[test]
fn backoff_uses_full_jitter() {
    let cfg = RetryConfig::default();
    let h = Headers::new();

    let d = decide_retry(&cfg, &status_ctx(1, 503, &h), || 123);
    assert_eq!(
        d,
        RetryDecision::RetryAfter {
            delay: Duration::from_millis(123),
            reason: RetryReason::HttpStatus(503)
        }
    );

    // Second attempt doubles the window to 2000ms.
    let d = decide_retry(&cfg, &status_ctx(2, 503, &h), || 5000);
    assert_eq!(
        d,
        RetryDecision::RetryAfter {
            delay: Duration::from_millis(998),
            reason: RetryReason::HttpStatus(503)
        }
    );
}

#[test]
fn backoff_window_is_capped() {
    let cfg = RetryConfig {
        max_attempts: 20,
        ..RetryConfig::default()
    };
    let h = Headers::new();
    let d = decide_retry(&cfg, &status_ctx(12, 502, &h), || u64::MAX);
    assert_eq!(
        d,
        RetryDecision::RetryAfter {
            delay: Duration::from_millis(59_966),
            reason: RetryReason::HttpStatus(502)
        }
    );
}

#[test]
fn stops_when_attempts_exhausted() {
    let cfg = RetryConfig::default();
    let h = Headers::new();
    let d = decide_retry(&cfg, &status_ctx(5, 503, &h), || 0);
    assert_eq!(
        d,
        RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted
        }
    );
}

#[test]
fn retry_after_header_wins_and_is_capped() {
    let cfg = RetryConfig::default();

    let h: Headers = [("Retry-After", "5")].into_iter().collect();
    let d = decide_retry(&cfg, &status_ctx(1, 429, &h), || 123);
    assert_eq!(
        d,
        RetryDecision::RetryAfter {
            delay: Duration::from_secs(5),
            reason: RetryReason::RetryAfterHeader
        }
    );

    let h: Headers = [("retry-after", "600")].into_iter().collect();
    let d = decide_retry(&cfg, &status_ctx(1, 429, &h), || 123);
    assert_eq!(
        d,
        RetryDecision::RetryAfter {
            delay: Duration::from_secs(60),
            reason: RetryReason::RetryAfterHeader
        }
    );
}

#[test]
fn retry_after_http_date() {
    let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let at = httpdate::fmt_http_date(now + Duration::from_secs(30));
    let h: Headers = [("Retry-After", at.as_str())].into_iter().collect();

    assert_eq!(
        parse_retry_after(&h, &RetryHeadersConfig::default(), now),
        Some(Duration::from_secs(30))
    );
}

#[test]
fn vendor_reset_header() {
    let cfg = RetryHeadersConfig {
        hints: vec![RetryHint::new("X-RateLimit-Reset", HintFormat::EpochSeconds)],
    };
    let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let h: Headers = [("x-ratelimit-reset", "1010")].into_iter().collect();
    assert_eq!(parse_retry_after(&h, &cfg, now), Some(Duration::from_secs(10)));

    let h: Headers = [("x-ratelimit-reset", "garbage")].into_iter().collect();
    assert_eq!(parse_retry_after(&h, &cfg, now), None);

    // Already past.
    let h: Headers = [("x-ratelimit-reset", "900")].into_iter().collect();
    assert_eq!(parse_retry_after(&h, &cfg, now), None);
}

#[test]
fn retry_after_wins_over_hints() {
    let cfg = RetryHeadersConfig {
        hints: vec![
            RetryHint::new("X-Backoff", HintFormat::Seconds),
            RetryHint::new("X-Retry-At", HintFormat::HttpDate),
        ],
    };
    let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let at = httpdate::fmt_http_date(now + Duration::from_secs(7));

    let h: Headers = [("Retry-After", "3"), ("X-Backoff", "9")].into_iter().collect();
    assert_eq!(parse_retry_after(&h, &cfg, now), Some(Duration::from_secs(3)));

    let h: Headers = [("X-Retry-At", at.as_str())].into_iter().collect();
    assert_eq!(parse_retry_after(&h, &cfg, now), Some(Duration::from_secs(7)));
}

#[test]
fn transport_failures_need_explicit_opt_in() {
    let err = TransportError::Timeout;
    let ctx = RetryContext {
        attempt_no: 1,
        redirects: 0,
        failure: FailureKind::Transport(&err),
        now: SystemTime::UNIX_EPOCH,
    };

    assert_eq!(
        decide_retry(&RetryConfig::default(), &ctx, || 7),
        RetryDecision::Stop {
            reason: RetryReason::NotRetryable
        }
    );

    let cfg = RetryConfig {
        retry_transport_errors: true,
        ..RetryConfig::default()
    };
    assert_eq!(
        decide_retry(&cfg, &ctx, || 7),
        RetryDecision::RetryAfter {
            delay: Duration::from_millis(7),
            reason: RetryReason::TransportFailure
        }
    );
}

#[test]
fn redirects_bounded_separately_from_attempts() {
    let cfg = RetryConfig {
        max_attempts: 1,
        max_redirects: 2,
        ..RetryConfig::default()
    };
    let ctx = |redirects| RetryContext {
        attempt_no: 1,
        redirects,
        failure: FailureKind::Redirect { status: 302 },
        now: SystemTime::UNIX_EPOCH,
    };

    assert!(decide_retry(&cfg, &ctx(1), || 0).is_retry());
    assert_eq!(
        decide_retry(&cfg, &ctx(2), || 0),
        RetryDecision::Stop {
            reason: RetryReason::RedirectLimit
        }
    );
}

#[test]
fn no_retry_policy_always_stops() {
    let h = Headers::new();
    assert!(!NoRetry.decide(&status_ctx(1, 503, &h)).is_retry());
}
