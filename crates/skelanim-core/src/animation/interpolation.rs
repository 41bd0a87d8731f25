//! Keyframe interpolation for bone animation channels

use super::types::{Interpolate, Keyframe};

/// Find the index of the earlier key of the segment bracketing `time`
///
/// Returns `i` such that `keys[i].time <= time < keys[i + 1].time`. Times past the
/// last interior boundary map to the final segment (`len - 2`) and times before the
/// first key map to segment 0. Returns None for tracks with fewer than two keys,
/// which have no segment to interpolate. A non-finite `time` maps to segment 0.
pub fn find_key_index<T>(keys: &[Keyframe<T>], time: f64) -> Option<usize> {
    if keys.len() < 2 {
        return None;
    }
    if !time.is_finite() {
        return Some(0);
    }

    // Number of keys at or before `time`; equal to the result of a forward scan
    let at_or_before = keys.partition_point(|key| key.time <= time);
    Some(at_or_before.saturating_sub(1).min(keys.len() - 2))
}

/// Interpolation factor of `time` within the segment starting at `index`
///
/// Clamped to [0, 1]. Zero-length segments and non-finite times yield 0.
pub fn segment_factor<T>(keys: &[Keyframe<T>], index: usize, time: f64) -> f32 {
    let start = keys[index].time;
    let end = keys[index + 1].time;
    let span = end - start;
    if span <= 0.0 || !time.is_finite() {
        return 0.0;
    }
    ((time - start) / span).clamp(0.0, 1.0) as f32
}

/// Sample a channel at the given time (ticks)
///
/// Returns None only for an empty channel. A single key is returned unmodified.
pub fn sample_channel<T: Interpolate>(keys: &[Keyframe<T>], time: f64) -> Option<T> {
    let first = keys.first()?;

    let Some(index) = find_key_index(keys, time) else {
        return Some(first.value);
    };

    let factor = segment_factor(keys, index, time);
    let from = &keys[index].value;
    let to = &keys[index + 1].value;

    // Exact at key boundaries
    let value = if factor <= 0.0 {
        *from
    } else if factor >= 1.0 {
        *to
    } else {
        from.interpolate(to, factor)
    };
    Some(value)
}
