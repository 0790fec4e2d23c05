use anyhow::{Result, bail};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;
const MAX_RANGE_LEN: u64 = 10_000;

/// Resolve CLI seed tokens into a deduplicated, ordered seed list.
///
/// Accepts literal integers (negative values use their magnitude) and
/// inclusive ranges written `start..end`. An empty list yields the default
/// seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut pending: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once("..") {
            pending.extend(expand_range(token, start, end)?);
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(value.unsigned_abs());
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(value);
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    let mut seen = HashSet::new();
    pending.retain(|seed| seen.insert(*seed));

    if pending.is_empty() {
        pending.push(DEFAULT_SEED);
    }

    Ok(pending)
}

fn expand_range(token: &str, start: &str, end: &str) -> Result<Vec<u64>> {
    let (Ok(start), Ok(end)) = (start.trim().parse::<u64>(), end.trim().parse::<u64>()) else {
        bail!("Unrecognized seed range: {token}");
    };
    if start > end {
        bail!("Seed range {token} runs backwards");
    }
    if end - start >= MAX_RANGE_LEN {
        bail!("Seed range {token} spans more than {MAX_RANGE_LEN} seeds");
    }
    Ok((start..=end).collect())
}
