//! Parses the small duration-string vocabulary used on the command line
//! (`250ms`, `5s`), independent of `gabs-gp-client`'s backoff-spec parser.

use std::time::Duration;

use anyhow::{anyhow, Result};

pub fn parse_duration(spec: &str) -> Result<Duration> {
    let spec = spec.trim();
    if let Some(ms) = spec.strip_suffix("ms") {
        let ms: f64 = ms.parse().map_err(|_| anyhow!("invalid duration `{spec}`"))?;
        return Ok(Duration::from_secs_f64(ms / 1000.0));
    }
    if let Some(secs) = spec.strip_suffix('s') {
        let secs: f64 = secs.parse().map_err(|_| anyhow!("invalid duration `{spec}`"))?;
        return Ok(Duration::from_secs_f64(secs));
    }
    Err(anyhow!("duration `{spec}` must end in `ms` or `s`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_milliseconds_and_seconds() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn rejects_an_unsuffixed_number() {
        assert!(parse_duration("3").is_err());
    }
}
