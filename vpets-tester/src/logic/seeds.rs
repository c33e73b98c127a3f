use anyhow::{Context, Result, bail};
use std::collections::HashSet;

/// Range tokens covering more seeds than this are refused.
const MAX_RANGE_LEN: u64 = 10_000;
const DEFAULT_SEED: u64 = 1337;

/// A resolved seed and the CLI token it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub source: String,
}

impl SeedInfo {
    #[must_use]
    pub fn new(seed: u64, source: impl Into<String>) -> Self {
        Self {
            seed,
            source: source.into(),
        }
    }
}

fn parse_seed(token: &str) -> Result<u64> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed: {token}"));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    token
        .parse::<u64>()
        .with_context(|| format!("Unrecognized seed token: {token}"))
}

fn parse_range(token: &str) -> Option<Result<(u64, u64)>> {
    if let Some((start, end)) = token.split_once("..=") {
        return Some(bounded_range(token, start, end, true));
    }
    let (start, end) = token.split_once("..")?;
    Some(bounded_range(token, start, end, false))
}

/// Half-open bounds of a range token.
fn bounded_range(token: &str, start: &str, end: &str, inclusive: bool) -> Result<(u64, u64)> {
    let start = parse_seed(start.trim())?;
    let end = parse_seed(end.trim())?;
    let end = if inclusive { end.checked_add(1) } else { Some(end) }
        .with_context(|| format!("seed range overflows: {token}"))?;
    if end <= start {
        bail!("empty seed range: {token}");
    }
    if end - start > MAX_RANGE_LEN {
        bail!("seed range {token} is longer than {MAX_RANGE_LEN}");
    }
    Ok((start, end))
}

/// Resolve a list of CLI seed arguments into concrete seeds.
///
/// Supports decimal integers (negative values use their magnitude), `0x`
/// hex literals, and ranges written `a..b` or `a..=b`. Duplicates keep their
/// first position; an empty list falls back to the default seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();
    let mut push = |seed: u64, token: &str| {
        if seen.insert(seed) {
            seeds.push(SeedInfo::new(seed, token));
        }
    };

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(range) = parse_range(token) {
            let (start, end) = range?;
            for seed in start..end {
                push(seed, token);
            }
            continue;
        }
        push(parse_seed(token)?, token);
    }

    if seeds.is_empty() {
        seeds.push(SeedInfo::new(DEFAULT_SEED, "default"));
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numeric_hex_and_negative() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "0xff"])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(values, vec![42, 7, 255]);
        assert_eq!(seeds[2].source, "0xff");
    }

    #[test]
    fn expands_ranges_and_dedupes() {
        let seeds = resolve_seed_inputs(&tokens(&["3..6", "5", "6..=7"])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(values, vec![3, 4, 5, 6, 7]);
        assert_eq!(seeds[2].source, "3..6");
    }

    #[test]
    fn empty_input_uses_the_default() {
        let seeds = resolve_seed_inputs(&tokens(&["", " "])).unwrap();
        assert_eq!(seeds, vec![SeedInfo::new(1337, "default")]);
    }

    #[test]
    fn rejects_garbage_and_bad_ranges() {
        assert!(resolve_seed_inputs(&tokens(&["banana"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["9..3"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0..99999999"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0xzz"])).is_err());
    }

    #[test]
    fn huge_unsigned_seeds_parse() {
        let seeds = resolve_seed_inputs(&tokens(&["18446744073709551615"])).unwrap();
        assert_eq!(seeds[0].seed, u64::MAX);
    }
}
