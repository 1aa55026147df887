//! Tool-name normalization (§3, §8, §9).
//!
//! Pure, total, dependency-free: rewrites a possibly-dotted mod tool name
//! into a conservative identifier matching
//! `^[A-Za-z][A-Za-z0-9_-]{0,maxLength-1}$`, suitable for strict downstream
//! consumers. Re-normalizing an already-normalized name is a no-op
//! (`normalize(normalize(n, L), L) == normalize(n, L)`, §8 "Normalization
//! fixed point").

/// Default `maxLength` when none is configured, or when a configured value
/// is `<= 0` (§8 boundary behavior).
pub const DEFAULT_MAX_LENGTH: usize = 64;

/// Options controlling [`normalize_tool_name`].
#[derive(Debug, Clone, Copy)]
pub struct NormalizeConfig {
    pub max_length: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl NormalizeConfig {
    /// Build a config from a possibly non-positive requested length,
    /// applying the `<= 0` -> default rule.
    pub fn with_max_length(requested: i64) -> Self {
        let max_length = if requested <= 0 {
            DEFAULT_MAX_LENGTH
        } else {
            requested as usize
        };
        Self { max_length }
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Apply the normalization function described in §3/§9.
pub fn normalize_tool_name(original: &str, config: NormalizeConfig) -> String {
    let max_length = if config.max_length == 0 {
        DEFAULT_MAX_LENGTH
    } else {
        config.max_length
    };

    // Replace '.' and anything outside [A-Za-z0-9_-] with '_'.
    let replaced: String = original
        .chars()
        .map(|c| if c == '.' || !is_allowed(c) { '_' } else { c })
        .collect();

    // Collapse runs of '_'.
    let mut collapsed = String::with_capacity(replaced.len());
    let mut prev_underscore = false;
    for c in replaced.chars() {
        if c == '_' {
            if !prev_underscore {
                collapsed.push('_');
            }
            prev_underscore = true;
        } else {
            collapsed.push(c);
            prev_underscore = false;
        }
    }

    // Strip leading/trailing '_'.
    let trimmed = collapsed.trim_matches('_');

    // Empty -> "tool".
    let mut name = if trimmed.is_empty() {
        "tool".to_string()
    } else {
        trimmed.to_string()
    };

    // Must start with a letter.
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        name = format!("tool_{name}");
    }

    truncate(&name, max_length)
}

/// Truncate to `max_length`, preferring a cut at an `_` past the midpoint.
fn truncate(name: &str, max_length: usize) -> String {
    if name.len() <= max_length {
        return name.to_string();
    }

    let midpoint = max_length / 2;
    let window = &name[..max_length];
    let cut_at = window
        .char_indices()
        .filter(|(idx, c)| *c == '_' && *idx >= midpoint && *idx > 0)
        .map(|(idx, _)| idx)
        .next_back();

    let truncated = match cut_at {
        Some(idx) => &name[..idx],
        None => window,
    };

    let truncated = truncated.trim_end_matches('_');
    if truncated.is_empty() {
        // Degenerate case: hard cut left nothing usable after trimming.
        window.to_string()
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dots_and_slashes_become_underscores() {
        let n = normalize_tool_name("minecraft.inventory/get", NormalizeConfig::default());
        assert_eq!(n, "minecraft_inventory_get");
    }

    #[test]
    fn collapses_runs_of_underscores() {
        let n = normalize_tool_name("a...b", NormalizeConfig::default());
        assert_eq!(n, "a_b");
    }

    #[test]
    fn strips_leading_and_trailing_underscores() {
        let n = normalize_tool_name("...hello...", NormalizeConfig::default());
        assert_eq!(n, "hello");
    }

    #[test]
    fn empty_becomes_tool() {
        let n = normalize_tool_name("...", NormalizeConfig::default());
        assert_eq!(n, "tool");
    }

    #[test]
    fn non_letter_start_gets_prefixed() {
        let n = normalize_tool_name("123abc", NormalizeConfig::default());
        assert_eq!(n, "tool_123abc");
    }

    #[test]
    fn non_positive_max_length_defaults_to_64() {
        let cfg = NormalizeConfig::with_max_length(0);
        assert_eq!(cfg.max_length, DEFAULT_MAX_LENGTH);
        let cfg = NormalizeConfig::with_max_length(-5);
        assert_eq!(cfg.max_length, DEFAULT_MAX_LENGTH);
    }

    #[test]
    fn truncates_preferring_a_trailing_underscore_cut() {
        let long = format!("abcdefgh_{}", "x".repeat(20));
        let cfg = NormalizeConfig { max_length: 12 };
        let n = normalize_tool_name(&long, cfg);
        assert!(n.len() <= 12);
        assert!(!n.ends_with('_'));
    }

    #[test]
    fn hard_cuts_when_no_underscore_past_midpoint() {
        let long = "a".repeat(100);
        let cfg = NormalizeConfig { max_length: 10 };
        let n = normalize_tool_name(&long, cfg);
        assert_eq!(n.len(), 10);
    }

    #[test]
    fn always_matches_the_required_pattern() {
        for input in [
            "inventory/get",
            "...",
            "123",
            "Already_Fine-Name",
            "a.b.c.d.e.f.g.h.i.j.k.l.m.n.o.p.q.r.s.t.u.v.w.x.y.z",
        ] {
            let n = normalize_tool_name(input, NormalizeConfig::default());
            assert!(n.chars().next().unwrap().is_ascii_alphabetic());
            assert!(n.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
            assert!(n.len() <= DEFAULT_MAX_LENGTH);
        }
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fixed_point_under_renormalization(s in "\\PC{0,80}", max_length in 1usize..128) {
            let cfg = NormalizeConfig { max_length };
            let once = normalize_tool_name(&s, cfg);
            let twice = normalize_tool_name(&once, cfg);
            prop_assert_eq!(once, twice);
        }
    }
}
