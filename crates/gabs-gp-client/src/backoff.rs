//! Exponential backoff with equal jitter (§4.3, §8 "Backoff bounds").
//!
//! Kept dependency-free beyond `rand`, the same way tool-name normalization
//! is kept dependency-free: the grammar (`"<min>..<max>"`, `inf` allowed as
//! the upper bound) is narrow enough that pulling in a duration-parsing
//! crate would buy nothing.

use std::time::Duration;

use rand::Rng;

use crate::GpClientError;

#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub min: Duration,
    pub max: Option<Duration>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(100),
            max: Some(Duration::from_secs(5)),
        }
    }
}

impl BackoffConfig {
    /// Parse `"<min>..<max>"`, e.g. `"250ms..5s"` or `"100ms..inf"`.
    pub fn parse(spec: &str) -> Result<Self, GpClientError> {
        let (min_raw, max_raw) = spec
            .split_once("..")
            .ok_or_else(|| GpClientError::BadBackoffSpec(spec.to_string()))?;

        let min = parse_duration(min_raw).ok_or_else(|| GpClientError::BadBackoffSpec(spec.to_string()))?;
        let max = if max_raw.trim() == "inf" {
            None
        } else {
            Some(parse_duration(max_raw).ok_or_else(|| GpClientError::BadBackoffSpec(spec.to_string()))?)
        };

        Ok(Self { min, max })
    }

    /// Nominal (un-jittered) delay for zero-indexed attempt `n`: `min(max,
    /// min * 2^n)`.
    pub fn nominal(&self, attempt: u32) -> Duration {
        let scaled = self.min.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
        match self.max {
            Some(max) => scaled.min(max),
            None => scaled,
        }
    }

    /// Sample the actual delay uniformly in `[0.5 * nominal, 1.5 * nominal]`.
    pub fn sample(&self, attempt: u32) -> Duration {
        let nominal = self.nominal(attempt);
        let lo = nominal.mul_f64(0.5);
        let hi = nominal.mul_f64(1.5);
        let lo_nanos = lo.as_nanos() as u64;
        let hi_nanos = hi.as_nanos() as u64;
        if hi_nanos <= lo_nanos {
            return lo;
        }
        let sampled = rand::thread_rng().gen_range(lo_nanos..=hi_nanos);
        Duration::from_nanos(sampled)
    }
}

fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if let Some(ms) = raw.strip_suffix("ms") {
        return ms.trim().parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(s) = raw.strip_suffix('s') {
        return s.trim().parse::<f64>().ok().map(Duration::from_secs_f64);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typical_spec() {
        let cfg = BackoffConfig::parse("100ms..5s").unwrap();
        assert_eq!(cfg.min, Duration::from_millis(100));
        assert_eq!(cfg.max, Some(Duration::from_secs(5)));
    }

    #[test]
    fn parses_infinite_max() {
        let cfg = BackoffConfig::parse("250ms..inf").unwrap();
        assert_eq!(cfg.max, None);
    }

    #[test]
    fn rejects_malformed_spec() {
        assert!(BackoffConfig::parse("not-a-spec").is_err());
    }

    #[test]
    fn nominal_caps_at_max() {
        let cfg = BackoffConfig {
            min: Duration::from_millis(100),
            max: Some(Duration::from_secs(5)),
        };
        assert_eq!(cfg.nominal(0), Duration::from_millis(100));
        assert_eq!(cfg.nominal(3), Duration::from_millis(800));
        assert_eq!(cfg.nominal(20), Duration::from_secs(5));
    }

    #[test]
    fn every_sample_falls_within_the_jitter_envelope() {
        let cfg = BackoffConfig {
            min: Duration::from_millis(100),
            max: Some(Duration::from_secs(5)),
        };
        for attempt in 0..10 {
            let nominal = cfg.nominal(attempt);
            let lo = nominal.mul_f64(0.5);
            let hi = nominal.mul_f64(1.5);
            for _ in 0..50 {
                let sampled = cfg.sample(attempt);
                assert!(sampled >= lo && sampled <= hi, "attempt {attempt}: {sampled:?} not in [{lo:?}, {hi:?}]");
            }
        }
    }
}
