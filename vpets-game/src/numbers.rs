//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

use crate::constants::{STAT_MAX, STAT_MIN};

/// Clamp a raw stat value into the `[0, 100]` range shared by all pet stats.
#[must_use]
pub const fn clamp_stat(value: i32) -> i32 {
    if value < STAT_MIN {
        STAT_MIN
    } else if value > STAT_MAX {
        STAT_MAX
    } else {
        value
    }
}

/// Apply a signed delta to a stat, saturating before clamping.
#[must_use]
pub const fn apply_stat_delta(value: i32, delta: i32) -> i32 {
    clamp_stat(value.saturating_add(delta))
}

/// Linear risk ramp: zero at `threshold`, `max_chance` at zero.
///
/// Used for draws that grow more likely the further a stat sinks below a
/// warning threshold. Returns a probability in `[0, max_chance]`.
#[must_use]
pub fn ramp_chance(value: i32, threshold: i32, max_chance: f64) -> f64 {
    if threshold <= 0 || value >= threshold {
        return 0.0;
    }
    let deficit = cast::<i32, f64>(threshold - value.max(0)).unwrap_or(0.0);
    let span = cast::<i32, f64>(threshold).unwrap_or(1.0);
    (deficit / span * max_chance).clamp(0.0, max_chance)
}

/// Convert a usize count to u32, saturating on overflow.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    cast::<usize, u32>(value).unwrap_or(u32::MAX)
}

/// Convert a u128 stream position to u64, saturating on overflow.
#[must_use]
pub fn u128_to_u64(value: u128) -> u64 {
    cast::<u128, u64>(value).unwrap_or(u64::MAX)
}
