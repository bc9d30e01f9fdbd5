use std::time::{Duration, SystemTime};

use httpdate::parse_http_date;
use wirecall_core::Headers;

use crate::retry::config::{HintFormat, RetryHeadersConfig};

const RETRY_AFTER_FORMATS: &[HintFormat] = &[HintFormat::Seconds, HintFormat::HttpDate];

/// Server-requested delay: `Retry-After` first, then each configured hint in order.
/// Times already in the past yield `None`.
pub fn parse_retry_after(
    headers: &Headers,
    cfg: &RetryHeadersConfig,
    now: SystemTime,
) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| delay_from(v, RETRY_AFTER_FORMATS, now))
        .or_else(|| {
            cfg.hints.iter().find_map(|hint| {
                headers
                    .get(&hint.header)
                    .and_then(|v| delay_from(v, &[hint.format], now))
            })
        })
}

fn delay_from(raw: &str, formats: &[HintFormat], now: SystemTime) -> Option<Duration> {
    let raw = raw.trim();
    formats.iter().find_map(|format| {
        let at = match format {
            HintFormat::Seconds => return raw.parse().ok().map(Duration::from_secs),
            HintFormat::EpochSeconds => {
                SystemTime::UNIX_EPOCH + Duration::from_secs(raw.parse().ok()?)
            }
            HintFormat::HttpDate => parse_http_date(raw).ok()?,
        };
        at.duration_since(now).ok()
    })
}
